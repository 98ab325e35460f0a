//! Analog front end of the capacitive matrix on an ATmega32U4 (Teensy 2.0).
//!
//! Pin mapping:
//!   Strobe columns 0-7:   PB0-PB7
//!   Strobe columns 8-13:  PD0-PD5
//!   Strobe columns 14-15: PC6, PC7
//!   Row mux select S0-S2: PF4, PF5, PF6
//!   Row sense:            PF0 (ADC0)
//!   LED:                  PD6
//!
//! Timer0 provides the millisecond clock, Timer1 free-runs at 2 MHz and
//! times the row relax interval between strobes.

use core::cell::Cell;

use avr_device::atmega32u4::Peripherals;
use avr_device::interrupt::{self, Mutex};
use strobe_core::Hardware;

/// Time the row lines need to fall back to 0 V after a strobe.
const ROW_RELAX_US: u16 = 130;
/// Time the sense amplifier needs after the column goes high.
const STROBE_SETTLE_US: u16 = 3;
/// Timer1 ticks per microsecond (16 MHz / 8).
const T1_TICKS_PER_US: u16 = 2;

static MILLIS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

#[avr_device::interrupt(atmega32u4)]
fn TIMER0_COMPA() {
    interrupt::free(|cs| {
        let counter = MILLIS.borrow(cs);
        counter.set(counter.get().wrapping_add(1));
    });
}

#[derive(Clone, Copy)]
enum Port {
    B,
    C,
    D,
}

/// Port and bit mask driving strobe column `col`.
fn column_pin(col: usize) -> Option<(Port, u8)> {
    match col {
        0..=7 => Some((Port::B, 1 << col)),
        8..=13 => Some((Port::D, 1 << (col - 8))),
        14 | 15 => Some((Port::C, 1 << (col - 8))),
        _ => None,
    }
}

pub struct Board {
    dp: Peripherals,
    /// Timer1 count at the end of the last strobe.
    last_strobe: u16,
}

impl Board {
    /// Configure pins, ADC and timers. Interrupts stay disabled until the
    /// caller enables them.
    pub fn new(dp: Peripherals) -> Self {
        // Strobe columns: outputs, idle low
        dp.PORTB.ddrb.write(|w| unsafe { w.bits(0xFF) });
        dp.PORTB.portb.write(|w| unsafe { w.bits(0x00) });
        dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(r.bits() | 0x3F) });
        dp.PORTD.portd.modify(|r, w| unsafe { w.bits(r.bits() & !0x3F) });
        dp.PORTC.ddrc.modify(|r, w| unsafe { w.bits(r.bits() | 0xC0) });
        dp.PORTC.portc.modify(|r, w| unsafe { w.bits(r.bits() & !0xC0) });

        // LED
        dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(r.bits() | 0x40) });

        // Mux select outputs, sense pin input without pull-up
        dp.PORTF.ddrf.modify(|r, w| unsafe { w.bits((r.bits() | 0x70) & !0x01) });
        dp.PORTF.portf.modify(|r, w| unsafe { w.bits(r.bits() & !0x71) });

        // ADC0, AVcc reference, enabled, clock / 16
        dp.ADC.didr0.write(|w| unsafe { w.bits(0x01) });
        dp.ADC.admux.write(|w| unsafe { w.bits(0x40) });
        dp.ADC.adcsra.write(|w| unsafe { w.bits(0x84) });

        // Timer0: CTC, clock / 64, compare at 250 -> 1 kHz
        dp.TC0.tccr0a.write(|w| unsafe { w.bits(0x02) });
        dp.TC0.tccr0b.write(|w| unsafe { w.bits(0x03) });
        dp.TC0.ocr0a.write(|w| unsafe { w.bits(249) });
        dp.TC0.timsk0.write(|w| unsafe { w.bits(0x02) });

        // Timer1: normal mode, clock / 8
        dp.TC1.tccr1a.write(|w| unsafe { w.bits(0x00) });
        dp.TC1.tccr1b.write(|w| unsafe { w.bits(0x02) });

        let last_strobe = dp.TC1.tcnt1.read().bits();
        Self { dp, last_strobe }
    }

    fn ticks(&self) -> u16 {
        self.dp.TC1.tcnt1.read().bits()
    }

    fn wait_relax(&self) {
        let relax = ROW_RELAX_US * T1_TICKS_PER_US;
        while self.ticks().wrapping_sub(self.last_strobe) < relax {}
    }

    fn set_column(&self, col: usize, high: bool) {
        let Some((port, mask)) = column_pin(col) else {
            return;
        };
        let apply = |bits: u8| if high { bits | mask } else { bits & !mask };
        match port {
            Port::B => self.dp.PORTB.portb.modify(|r, w| unsafe { w.bits(apply(r.bits())) }),
            Port::C => self.dp.PORTC.portc.modify(|r, w| unsafe { w.bits(apply(r.bits())) }),
            Port::D => self.dp.PORTD.portd.modify(|r, w| unsafe { w.bits(apply(r.bits())) }),
        }
    }

    /// Single 10-bit conversion on the selected channel, scaled to 8 bits.
    fn read_adc(&self) -> u8 {
        let adc = &self.dp.ADC;
        adc.adcsra.modify(|r, w| unsafe { w.bits(r.bits() | 0x40) });
        while adc.adcsra.read().bits() & 0x40 != 0 {}
        (adc.adc.read().bits() >> 2) as u8
    }
}

impl Hardware for Board {
    fn select_row(&mut self, row: usize) {
        let select = ((row & 0x07) as u8) << 4;
        self.dp
            .PORTF
            .portf
            .modify(|r, w| unsafe { w.bits((r.bits() & !0x70) | select) });
        delay_us(ROW_RELAX_US);
    }

    fn strobe_read(&mut self, col: usize) -> u8 {
        self.wait_relax();

        let value = interrupt::free(|_| {
            self.set_column(col, true);
            delay_us(STROBE_SETTLE_US);
            let value = self.read_adc();
            self.set_column(col, false);
            value
        });

        self.last_strobe = self.ticks();
        value
    }

    fn led_on(&mut self) {
        self.dp.PORTD.portd.modify(|r, w| unsafe { w.bits(r.bits() | 0x40) });
    }

    fn led_off(&mut self) {
        self.dp.PORTD.portd.modify(|r, w| unsafe { w.bits(r.bits() & !0x40) });
    }

    fn delay_ms(&mut self, ms: u16) {
        let start = self.millis();
        while self.millis().wrapping_sub(start) < u32::from(ms) {}
    }

    fn millis(&mut self) -> u32 {
        interrupt::free(|cs| MILLIS.borrow(cs).get())
    }
}

/// Busy-wait delay in microseconds (approximate, at 16MHz).
fn delay_us(us: u16) {
    for _ in 0..us {
        // 16 cycles: 4 loop iterations of nop + branch overhead
        for _ in 0..4u8 {
            unsafe { core::arch::asm!("nop") };
        }
    }
}
