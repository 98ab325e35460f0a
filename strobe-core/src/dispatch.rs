//! Routing of fired payloads into the output domains.

use crate::layer::LayerState;
use crate::payload::{AnalogTarget, Domain};
use crate::route::Operation;
use crate::state::{AnalogDomain, JoystickState, KeyboardState, MouseState, OutputDomain};

/// Every output domain the engine drives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outputs {
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
    pub joystick: JoystickState,
    pub layers: LayerState,
}

impl Outputs {
    pub const fn new() -> Self {
        Self {
            keyboard: KeyboardState::new(),
            mouse: MouseState::new(),
            joystick: JoystickState::new(),
            layers: LayerState::new(),
        }
    }

    /// Apply `operation` to whatever `payload` addresses.
    pub fn dispatch(&mut self, payload: u8, operation: Operation) -> Domain {
        let domain = Domain::classify(payload);
        log::trace!("dispatch {:#04x} {:?} -> {:?}", payload, operation, domain);
        match domain {
            Domain::Keyboard(code) => self.keyboard.update(code, operation),
            Domain::MouseButton(button) => self.mouse.update(button, operation),
            Domain::Joystick(element) => self.joystick.update(element, operation),
            Domain::Layer(layer) => {
                self.layers.update(layer, operation);
                // Nothing held may survive a layer change.
                self.release_all();
                log::debug!("layers now {:#06x}", self.layers.bits());
            }
            Domain::Lock => log::debug!("keyboard lock requested"),
            Domain::Unassigned => {}
        }
        domain
    }

    /// Forward an analog depth to its continuous domain. Payloads outside
    /// both analog ranges are ignored.
    pub fn dispatch_analog(&mut self, payload: u8, depth: u8) {
        match AnalogTarget::classify(payload) {
            Some(AnalogTarget::Mouse(index)) => self.mouse.update_analog(index, depth),
            Some(AnalogTarget::Joystick(index)) => self.joystick.update_analog(index, depth),
            None => {}
        }
    }

    /// Clear held state in the keyboard, mouse and joystick domains.
    pub fn release_all(&mut self) {
        self.keyboard.init_state();
        self.joystick.init_state();
        self.mouse.init_state();
    }

    /// End-of-cycle reset of the analog accumulators.
    pub fn reset_analog(&mut self) {
        self.mouse.reset_analog();
        self.joystick.reset_analog();
    }
}
