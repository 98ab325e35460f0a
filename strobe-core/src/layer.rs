//! Layer activation and binding resolution.
//!
//! Any number of layers may be active at once. Resolution walks the stack
//! from the highest index down and the first active layer decides the
//! binding, even when that binding is empty. Transparent fall-through to
//! lower layers does not exist.

use crate::config::{ConfigStore, Setting};
use crate::route::{Binding, Operation};
use crate::state::OutputDomain;
use crate::MAX_LAYERS;

/// Activation flags, one bit per layer. Layer 0 is always active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerState {
    active: u16,
}

impl Default for LayerState {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerState {
    pub const BASE: u16 = 0b1;

    pub const fn new() -> Self {
        Self { active: Self::BASE }
    }

    pub fn is_active(&self, layer: usize) -> bool {
        layer < MAX_LAYERS && self.active & (1 << layer) != 0
    }

    /// Highest active layer index.
    pub fn top(&self) -> usize {
        (u16::BITS - 1).saturating_sub(self.active.leading_zeros()) as usize
    }

    pub fn bits(&self) -> u16 {
        self.active
    }
}

impl OutputDomain for LayerState {
    /// Setting or toggling layer 0 drops back to the base layer alone;
    /// unsetting it is ignored.
    fn update(&mut self, layer: u8, operation: Operation) {
        let layer = usize::from(layer);
        if layer >= MAX_LAYERS {
            return;
        }
        if layer == 0 {
            if operation != Operation::Unset {
                self.active = Self::BASE;
            }
            return;
        }
        let mask = 1u16 << layer;
        if operation.apply(self.active & mask != 0) {
            self.active |= mask;
        } else {
            self.active &= !mask;
        }
    }

    fn init_state(&mut self) {
        self.active = Self::BASE;
    }

    fn is_clear(&self) -> bool {
        self.active == Self::BASE
    }
}

/// Find the binding for `key` on the highest active layer.
///
/// Returns `None` when no layer below the configured count is active. The
/// returned binding may be unbound (payload 0); lower layers are not
/// consulted in that case.
pub fn resolve<C: ConfigStore + ?Sized>(
    key: usize,
    layers: &LayerState,
    config: &C,
) -> Option<Binding> {
    let count = usize::from(config.setting(Setting::LayerCount)).min(MAX_LAYERS);
    (0..count)
        .rev()
        .find(|&layer| layers.is_active(layer))
        .map(|layer| config.binding(key, layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Keymap;
    use crate::route::Route;

    fn keymap() -> Keymap<4, 3> {
        let mut km = Keymap::new();
        km.set_setting(Setting::LayerCount, 3);
        km.set_binding(0, 0, Binding::new(Route::Momentary, 0x04)).unwrap();
        km.set_binding(0, 1, Binding::new(Route::Momentary, 0x05)).unwrap();
        km.set_binding(0, 2, Binding::new(Route::Toggle, 0x06)).unwrap();
        km.set_binding(1, 0, Binding::new(Route::Momentary, 0x07)).unwrap();
        km
    }

    #[test]
    fn test_highest_active_layer_wins() {
        let km = keymap();
        // [false, true, true]
        let layers = LayerState { active: 0b110 };
        assert!(!layers.is_active(0));
        assert_eq!(
            resolve(0, &layers, &km),
            Some(Binding::new(Route::Toggle, 0x06))
        );
    }

    #[test]
    fn test_empty_binding_shadows_lower_layers() {
        let km = keymap();
        let mut layers = LayerState::new();
        layers.update(2, Operation::Set);
        // Key 1 is only bound on layer 0, but layer 2 is on top.
        let b = resolve(1, &layers, &km).unwrap();
        assert!(!b.is_bound());
    }

    #[test]
    fn test_no_active_layer() {
        let km = keymap();
        let layers = LayerState { active: 0 };
        assert_eq!(resolve(0, &layers, &km), None);
    }

    #[test]
    fn test_layers_beyond_count_ignored() {
        let mut km = keymap();
        km.set_setting(Setting::LayerCount, 2);
        let mut layers = LayerState::new();
        layers.update(2, Operation::Set);
        assert_eq!(
            resolve(0, &layers, &km),
            Some(Binding::new(Route::Momentary, 0x04))
        );
    }

    #[test]
    fn test_layer_zero_resets_stack() {
        let mut layers = LayerState::new();
        layers.update(3, Operation::Toggle);
        layers.update(5, Operation::Set);
        assert_eq!(layers.top(), 5);
        layers.update(0, Operation::Unset);
        assert_eq!(layers.top(), 5);
        layers.update(0, Operation::Toggle);
        assert!(layers.is_clear());
        assert_eq!(layers.top(), 0);
    }

    #[test]
    fn test_toggle_layer() {
        let mut layers = LayerState::new();
        layers.update(1, Operation::Toggle);
        assert!(layers.is_active(1));
        layers.update(1, Operation::Toggle);
        assert!(!layers.is_active(1));
        layers.update(16, Operation::Set);
        assert!(layers.is_clear());
    }
}
