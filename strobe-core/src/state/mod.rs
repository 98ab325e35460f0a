//! Output-domain state machines.
//!
//! Each domain holds the logical state of the elements payloads address
//! and is driven only through [`OutputDomain`] (and [`AnalogDomain`] for
//! the continuous ones). Encoding and transmission live behind
//! [`crate::cycle::ReportSink`].

mod joystick;
mod keyboard;
mod mouse;

pub use joystick::{JoystickReport, JoystickState};
pub use keyboard::{KeyboardReport, KeyboardState};
pub use mouse::{MouseReport, MouseState};

use crate::route::Operation;

/// Domain addressed by discrete payloads.
pub trait OutputDomain {
    /// Apply `operation` to element `index`. Out-of-range indices are ignored.
    fn update(&mut self, index: u8, operation: Operation);

    /// Release everything held.
    fn init_state(&mut self);

    /// Whether nothing is held.
    fn is_clear(&self) -> bool;
}

/// Domain that also accepts a continuous value per element.
pub trait AnalogDomain: OutputDomain {
    /// Last write in a cycle wins.
    fn update_analog(&mut self, index: u8, value: u8);

    /// Zero the per-cycle analog accumulators.
    fn reset_analog(&mut self);
}

/// Number of analog elements on the mouse and joystick domains.
pub const ANALOG_ELEMENTS: usize = 16;

fn set_bit(bits: &mut u32, index: u8, operation: Operation) {
    let mask = 1u32 << index;
    if operation.apply(*bits & mask != 0) {
        *bits |= mask;
    } else {
        *bits &= !mask;
    }
}
