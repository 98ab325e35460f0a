use super::{AnalogDomain, OutputDomain, ANALOG_ELEMENTS};
use crate::route::Operation;

/// Joystick button/element count (payloads 0xB0-0xCF).
pub const JOYSTICK_BUTTONS: u8 = 32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoystickReport {
    pub buttons: u32,
    pub axes: [u8; ANALOG_ELEMENTS],
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JoystickState {
    buttons: u32,
    axes: [u8; ANALOG_ELEMENTS],
}

impl JoystickState {
    pub const fn new() -> Self {
        Self {
            buttons: 0,
            axes: [0; ANALOG_ELEMENTS],
        }
    }

    pub fn is_pressed(&self, button: u8) -> bool {
        button < JOYSTICK_BUTTONS && self.buttons & (1 << button) != 0
    }

    pub fn axis(&self, index: u8) -> u8 {
        self.axes.get(usize::from(index)).copied().unwrap_or(0)
    }

    pub fn report(&self) -> JoystickReport {
        JoystickReport {
            buttons: self.buttons,
            axes: self.axes,
        }
    }
}

impl OutputDomain for JoystickState {
    fn update(&mut self, button: u8, operation: Operation) {
        if button < JOYSTICK_BUTTONS {
            super::set_bit(&mut self.buttons, button, operation);
        }
    }

    fn init_state(&mut self) {
        *self = Self::new();
    }

    fn is_clear(&self) -> bool {
        self.buttons == 0 && self.axes.iter().all(|&v| v == 0)
    }
}

impl AnalogDomain for JoystickState {
    fn update_analog(&mut self, index: u8, value: u8) {
        if let Some(axis) = self.axes.get_mut(usize::from(index)) {
            *axis = value;
        }
    }

    fn reset_analog(&mut self) {
        self.axes = [0; ANALOG_ELEMENTS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_32_elements() {
        let mut j = JoystickState::new();
        j.update(0, Operation::Set);
        j.update(31, Operation::Set);
        assert_eq!(j.report().buttons, 0x8000_0001);
        j.update(32, Operation::Set);
        assert_eq!(j.report().buttons, 0x8000_0001);
    }

    #[test]
    fn test_init_state_clears_axes_and_buttons() {
        let mut j = JoystickState::new();
        j.update(4, Operation::Toggle);
        j.update_analog(2, 200);
        assert!(!j.is_clear());
        j.init_state();
        assert!(j.is_clear());
    }
}
