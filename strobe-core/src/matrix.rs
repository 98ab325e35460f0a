//! Capacitive matrix access.
//!
//! The matrix has 8 multiplexed read lines (rows) and 16 strobe lines
//! (columns). A row is selected once, then each column is strobed and the
//! row voltage sampled. Only positions the configuration marks active are
//! read, and each reading lands on the logical key mapped to that position.

use crate::config::ConfigStore;
use crate::debounce::Key;
use crate::{COLS, NUM_KEYS, ROWS};

/// Board-level capability handed to the engine.
///
/// Implementations own the timing rules of the analog front end: after a
/// strobe, the same lines need a relax interval before the next strobe, and
/// `strobe_read` must wait out whatever is left of it.
pub trait Hardware {
    /// Route row `row` to the ADC.
    fn select_row(&mut self, row: usize);

    /// Pulse column `col` and sample the selected row (0-255).
    fn strobe_read(&mut self, col: usize) -> u8;

    fn led_on(&mut self);

    fn led_off(&mut self);

    fn delay_ms(&mut self, ms: u16);

    /// Free-running millisecond counter. Wraps.
    fn millis(&mut self) -> u32;
}

/// Number of blinks shown at power-up.
pub const STARTUP_BLINKS: u8 = 5;
const BLINK_MS: u16 = 100;

/// Flash the LED to show the firmware is alive.
pub fn startup_blink<H: Hardware + ?Sized>(hw: &mut H) {
    for _ in 0..STARTUP_BLINKS {
        hw.led_on();
        hw.delay_ms(BLINK_MS);
        hw.led_off();
        hw.delay_ms(BLINK_MS);
    }
}

/// Read every active matrix position into `keys`.
///
/// A position mapped to a key id the engine cannot hold ends the scan of
/// that row.
pub fn scan<H, C>(hw: &mut H, config: &C, keys: &mut [Key; NUM_KEYS])
where
    H: Hardware + ?Sized,
    C: ConfigStore + ?Sized,
{
    for row in 0..ROWS {
        hw.select_row(row);
        for col in 0..COLS {
            if !config.is_position_active(row, col) {
                continue;
            }
            let id = usize::from(config.user_id(row, col));
            let Some(key) = keys.get_mut(id) else {
                break;
            };
            let raw = hw.strobe_read(col);
            key.depth = config.normalise(row, col, raw);
        }
    }
}
