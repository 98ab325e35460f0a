//! Configuration store interface and an in-memory implementation.
//!
//! The engine reads routes, payloads, thresholds and the matrix position
//! table through [`ConfigStore`] every cycle, so a store may be edited
//! between cycles and the change takes effect immediately.

use crate::route::{Binding, Route};
use crate::{COLS, ROWS};

/// Named numeric settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Setting {
    /// Release threshold: a held key releases below this depth.
    MinThreshold = 0,
    /// Press threshold: an idle key presses above this depth.
    MaxThreshold = 1,
    Sensitivity = 2,
    Deadzone = 3,
    /// Number of layers the resolver considers.
    LayerCount = 4,
}

impl Setting {
    pub const COUNT: usize = 5;

    pub const ALL: [Setting; Setting::COUNT] = [
        Setting::MinThreshold,
        Setting::MaxThreshold,
        Setting::Sensitivity,
        Setting::Deadzone,
        Setting::LayerCount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Setting::MinThreshold => "min_threshold",
            Setting::MaxThreshold => "max_threshold",
            Setting::Sensitivity => "sensitivity",
            Setting::Deadzone => "deadzone",
            Setting::LayerCount => "layer_count",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// Everything the engine needs to know about the user's configuration.
pub trait ConfigStore {
    fn route(&self, key: usize, layer: usize) -> Route;

    /// 0 when the key is unbound on `layer`.
    fn payload(&self, key: usize, layer: usize) -> u8;

    fn binding(&self, key: usize, layer: usize) -> Binding {
        Binding::new(self.route(key, layer), self.payload(key, layer))
    }

    fn setting(&self, setting: Setting) -> u8;

    /// Whether a key sits at this matrix position.
    fn is_position_active(&self, row: usize, col: usize) -> bool;

    /// Logical key id of the key at this matrix position.
    fn user_id(&self, row: usize, col: usize) -> u8;

    /// Convert a raw row reading into a key depth. Calibration hook;
    /// the default passes the reading through.
    fn normalise(&self, _row: usize, _col: usize, raw: u8) -> u8 {
        raw
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum KeymapError {
    #[error("key {0} out of range")]
    KeyOutOfRange(usize),
    #[error("layer {0} out of range")]
    LayerOutOfRange(usize),
    #[error("matrix position ({row}, {col}) out of range")]
    PositionOutOfRange { row: usize, col: usize },
}

/// Fixed-size store for `KEYS` keys on `LAYERS` layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap<const KEYS: usize, const LAYERS: usize> {
    bindings: [[Binding; LAYERS]; KEYS],
    settings: [u8; Setting::COUNT],
    positions: [[Option<u8>; COLS]; ROWS],
}

impl<const KEYS: usize, const LAYERS: usize> Default for Keymap<KEYS, LAYERS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const KEYS: usize, const LAYERS: usize> Keymap<KEYS, LAYERS> {
    /// Empty keymap with factory thresholds.
    pub const fn new() -> Self {
        Self {
            bindings: [[Binding::UNBOUND; LAYERS]; KEYS],
            settings: [127, 153, 20, 10, LAYERS as u8],
            positions: [[None; COLS]; ROWS],
        }
    }

    /// The factory configuration: two keys on row 2. Key 0 types a/b/c
    /// depending on the layer, key 1 cycles layers 1 -> 2 -> base.
    pub fn demo() -> Result<Self, KeymapError> {
        let mut km = Self::new();
        km.set_setting(Setting::MinThreshold, 127);
        km.set_setting(Setting::MaxThreshold, 153);
        km.set_setting(Setting::Sensitivity, 20);
        km.set_setting(Setting::Deadzone, 10);
        km.set_setting(Setting::LayerCount, 6);

        km.map_position(2, 0, 0)?;
        km.map_position(2, 1, 1)?;

        km.set_binding(0, 0, Binding::new(Route::Momentary, 0x04))?;
        km.set_binding(0, 1, Binding::new(Route::Momentary, 0x05))?;
        km.set_binding(0, 2, Binding::new(Route::Momentary, 0x06))?;

        km.set_binding(1, 0, Binding::new(Route::Toggle, 0xD1))?;
        km.set_binding(1, 1, Binding::new(Route::Toggle, 0xD2))?;
        km.set_binding(1, 2, Binding::new(Route::Toggle, 0xD0))?;
        Ok(km)
    }

    pub fn set_binding(
        &mut self,
        key: usize,
        layer: usize,
        binding: Binding,
    ) -> Result<(), KeymapError> {
        let slot = self
            .bindings
            .get_mut(key)
            .ok_or(KeymapError::KeyOutOfRange(key))?
            .get_mut(layer)
            .ok_or(KeymapError::LayerOutOfRange(layer))?;
        *slot = binding;
        Ok(())
    }

    pub fn set_route(&mut self, key: usize, layer: usize, route: Route) -> Result<(), KeymapError> {
        let payload = self.payload(key, layer);
        self.set_binding(key, layer, Binding::new(route, payload))
    }

    pub fn set_payload(&mut self, key: usize, layer: usize, payload: u8) -> Result<(), KeymapError> {
        let route = self.route(key, layer);
        self.set_binding(key, layer, Binding::new(route, payload))
    }

    pub fn set_setting(&mut self, setting: Setting, value: u8) {
        self.settings[setting as usize] = value;
    }

    /// Put key `id` at a matrix position. The id is not range-checked here;
    /// the scan skips ids the engine cannot hold.
    pub fn map_position(&mut self, row: usize, col: usize, id: u8) -> Result<(), KeymapError> {
        *self.position_mut(row, col)? = Some(id);
        Ok(())
    }

    pub fn clear_position(&mut self, row: usize, col: usize) -> Result<(), KeymapError> {
        *self.position_mut(row, col)? = None;
        Ok(())
    }

    fn position_mut(&mut self, row: usize, col: usize) -> Result<&mut Option<u8>, KeymapError> {
        self.positions
            .get_mut(row)
            .and_then(|r| r.get_mut(col))
            .ok_or(KeymapError::PositionOutOfRange { row, col })
    }

    fn position(&self, row: usize, col: usize) -> Option<u8> {
        self.positions.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    fn get(&self, key: usize, layer: usize) -> Binding {
        self.bindings
            .get(key)
            .and_then(|layers| layers.get(layer))
            .copied()
            .unwrap_or(Binding::UNBOUND)
    }
}

impl<const KEYS: usize, const LAYERS: usize> ConfigStore for Keymap<KEYS, LAYERS> {
    fn route(&self, key: usize, layer: usize) -> Route {
        self.get(key, layer).route
    }

    fn payload(&self, key: usize, layer: usize) -> u8 {
        self.get(key, layer).payload
    }

    fn binding(&self, key: usize, layer: usize) -> Binding {
        self.get(key, layer)
    }

    fn setting(&self, setting: Setting) -> u8 {
        self.settings[setting as usize]
    }

    fn is_position_active(&self, row: usize, col: usize) -> bool {
        self.position(row, col).is_some()
    }

    fn user_id(&self, row: usize, col: usize) -> u8 {
        self.position(row, col).unwrap_or(0)
    }
}
