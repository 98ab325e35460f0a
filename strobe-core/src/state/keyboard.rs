//! Keyboard domain: held HID usage codes and the boot-protocol report.

use super::OutputDomain;
use crate::route::Operation;

/// Standard USB HID keyboard report (8 bytes).
/// Byte 0: modifier keys bitmask
/// Byte 1: reserved (0x00)
/// Bytes 2-7: up to 6 simultaneous keycodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardReport {
    pub modifiers: u8,
    pub reserved: u8,
    pub keys: [u8; 6],
}

impl Default for KeyboardReport {
    fn default() -> Self {
        Self::empty()
    }
}

impl KeyboardReport {
    pub const fn empty() -> Self {
        Self {
            modifiers: 0,
            reserved: 0,
            keys: [0; 6],
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::empty()
    }

    pub fn to_bytes(&self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out[0] = self.modifiers;
        out[1] = self.reserved;
        out[2..].copy_from_slice(&self.keys);
        out
    }
}

/// One bit per usage code, so any number of keys can be held at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardState {
    held: [u32; 8],
}

impl KeyboardState {
    pub const fn new() -> Self {
        Self { held: [0; 8] }
    }

    pub fn is_held(&self, code: u8) -> bool {
        self.held[usize::from(code >> 5)] & (1 << (code & 31)) != 0
    }

    /// Build the report. Codes past the sixth are dropped without a
    /// rollover error.
    pub fn report(&self) -> KeyboardReport {
        let mut report = KeyboardReport::empty();
        let mut key_idx = 0usize;

        for code in 1..=u8::MAX {
            if !self.is_held(code) {
                continue;
            }
            if (0xE0..=0xE7).contains(&code) {
                report.modifiers |= 1 << (code - 0xE0);
            } else if key_idx < report.keys.len() {
                report.keys[key_idx] = code;
                key_idx += 1;
            }
        }

        report
    }
}

impl OutputDomain for KeyboardState {
    fn update(&mut self, code: u8, operation: Operation) {
        super::set_bit(&mut self.held[usize::from(code >> 5)], code & 31, operation);
    }

    fn init_state(&mut self) {
        self.held = [0; 8];
    }

    fn is_clear(&self) -> bool {
        self.held.iter().all(|&w| w == 0)
    }
}
