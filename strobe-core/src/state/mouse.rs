use super::{AnalogDomain, OutputDomain, ANALOG_ELEMENTS};
use crate::route::Operation;

/// Mouse button count (payloads 0xA5-0xAA).
pub const MOUSE_BUTTONS: u8 = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseReport {
    pub buttons: u8,
    pub analog: [u8; ANALOG_ELEMENTS],
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MouseState {
    buttons: u32,
    analog: [u8; ANALOG_ELEMENTS],
}

impl MouseState {
    pub const fn new() -> Self {
        Self {
            buttons: 0,
            analog: [0; ANALOG_ELEMENTS],
        }
    }

    pub fn is_pressed(&self, button: u8) -> bool {
        button < MOUSE_BUTTONS && self.buttons & (1 << button) != 0
    }

    pub fn analog(&self, index: u8) -> u8 {
        self.analog.get(usize::from(index)).copied().unwrap_or(0)
    }

    pub fn report(&self) -> MouseReport {
        MouseReport {
            buttons: self.buttons as u8,
            analog: self.analog,
        }
    }
}

impl OutputDomain for MouseState {
    fn update(&mut self, button: u8, operation: Operation) {
        if button < MOUSE_BUTTONS {
            super::set_bit(&mut self.buttons, button, operation);
        }
    }

    fn init_state(&mut self) {
        *self = Self::new();
    }

    fn is_clear(&self) -> bool {
        self.buttons == 0 && self.analog.iter().all(|&v| v == 0)
    }
}

impl AnalogDomain for MouseState {
    fn update_analog(&mut self, index: u8, value: u8) {
        if let Some(slot) = self.analog.get_mut(usize::from(index)) {
            *slot = value;
        }
    }

    fn reset_analog(&mut self) {
        self.analog = [0; ANALOG_ELEMENTS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons() {
        let mut m = MouseState::new();
        m.update(1, Operation::Set);
        assert!(m.is_pressed(1));
        assert_eq!(m.report().buttons, 0b10);
        m.update(6, Operation::Set);
        assert_eq!(m.report().buttons, 0b10);
        m.update(1, Operation::Toggle);
        assert!(m.is_clear());
    }

    #[test]
    fn test_analog_last_write_wins() {
        let mut m = MouseState::new();
        m.update_analog(3, 10);
        m.update_analog(3, 90);
        m.update_analog(16, 5);
        assert_eq!(m.analog(3), 90);
        m.reset_analog();
        assert_eq!(m.analog(3), 0);
    }
}
