//! Capacitive matrix keyboard firmware for ATmega32U4 (Teensy 2.0).
//!
//! Runs the update cycle from `strobe-core` against the analog front end
//! in [`board`]. USB transport is not wired up yet; the LED mirrors whether
//! the last keyboard report held anything.

#![no_std]
#![no_main]
#![feature(abi_avr_interrupt)]
#![feature(asm_experimental_arch)]

mod board;

use avr_device::atmega32u4::Peripherals;
use strobe_core::state::KeyboardReport;
use strobe_core::{Engine, Hardware, Keymap, ReportSink};

use board::Board;

/// Keys and layers held in RAM by the firmware keymap.
const KEYS: usize = 8;
const LAYERS: usize = 6;

/// Remembers whether the last keyboard report was non-empty.
#[derive(Default)]
struct ActivitySink {
    active: bool,
}

impl ReportSink for ActivitySink {
    fn send_keyboard(&mut self, report: &KeyboardReport) {
        self.active = !report.is_empty();
    }
}

/// Panic handler: on AVR we just loop forever.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    // Disable clock prescaler (CLKPR) for 16MHz
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) });

    let board = Board::new(dp);
    unsafe { avr_device::interrupt::enable() };

    let keymap = Keymap::<KEYS, LAYERS>::demo().unwrap_or_else(|_| Keymap::new());
    let mut engine = Engine::new(board, keymap, ActivitySink::default());
    engine.start();

    loop {
        engine.run_cycle();

        let active = engine.sink().active;
        let hw = engine.hardware_mut();
        if active {
            hw.led_on();
        } else {
            hw.led_off();
        }
    }
}
