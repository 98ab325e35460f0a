//! Per-key hysteresis on analog depth.
//!
//! A key flips to pressed only once its depth rises above the upper
//! threshold, and flips back only once it falls below the lower one. Noise
//! around a single threshold therefore never produces chatter. There is no
//! time-based debounce window; the matrix relax delay is the only timing
//! applied to a reading.

use crate::config::{ConfigStore, Setting};

/// One physical switch position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Key {
    /// Normalised depth, 0 = fully released, 255 = bottomed out.
    pub depth: u8,
    /// Last debounced state.
    pub pressed: bool,
}

impl Key {
    pub const fn new() -> Self {
        Self {
            depth: 0,
            pressed: false,
        }
    }
}

/// Transition detected on a key this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    None,
    Pressed,
    Released,
}

impl Edge {
    pub fn is_pressed(self) -> bool {
        self == Edge::Pressed
    }

    pub fn is_released(self) -> bool {
        self == Edge::Released
    }
}

/// Schmitt-trigger thresholds. `min` should be below `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hysteresis {
    pub min: u8,
    pub max: u8,
}

impl Hysteresis {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    /// Read the current thresholds from the configuration store.
    pub fn from_config<C: ConfigStore + ?Sized>(config: &C) -> Self {
        Self::new(
            config.setting(Setting::MinThreshold),
            config.setting(Setting::MaxThreshold),
        )
    }

    /// Compare the key's depth against the band and flip its state if it
    /// crossed into the opposite side. Only the crossing itself is reported.
    pub fn classify(&self, key: &mut Key) -> Edge {
        if key.pressed {
            if key.depth < self.min {
                key.pressed = false;
                return Edge::Released;
            }
        } else if key.depth > self.max {
            key.pressed = true;
            return Edge::Pressed;
        }
        Edge::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BAND: Hysteresis = Hysteresis::new(127, 153);

    fn feed(key: &mut Key, depths: &[u8]) -> Vec<Edge> {
        depths
            .iter()
            .map(|&d| {
                key.depth = d;
                BAND.classify(key)
            })
            .collect()
    }

    #[test]
    fn test_press_then_release() {
        let mut key = Key::new();
        let edges = feed(&mut key, &[100, 160, 160, 90]);
        assert_eq!(edges, vec![Edge::None, Edge::Pressed, Edge::None, Edge::Released]);
        assert!(!key.pressed);
    }

    #[test]
    fn test_inside_band_holds_state() {
        let mut key = Key::new();
        // 140 sits between the thresholds: never presses an idle key...
        assert_eq!(feed(&mut key, &[140, 153, 140]), vec![Edge::None; 3]);
        // ...and never releases a held one.
        key.depth = 200;
        assert_eq!(BAND.classify(&mut key), Edge::Pressed);
        assert_eq!(feed(&mut key, &[140, 127, 135]), vec![Edge::None; 3]);
        assert!(key.pressed);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let mut key = Key::new();
        key.depth = 153;
        assert_eq!(BAND.classify(&mut key), Edge::None);
        key.depth = 154;
        assert_eq!(BAND.classify(&mut key), Edge::Pressed);
        key.depth = 127;
        assert_eq!(BAND.classify(&mut key), Edge::None);
        key.depth = 126;
        assert_eq!(BAND.classify(&mut key), Edge::Released);
    }

    proptest! {
        #[test]
        fn prop_single_press_while_above_min(
            above in proptest::collection::vec(154u8..=255, 1..20),
            held in proptest::collection::vec(127u8..=255, 0..20),
            below in 0u8..127,
        ) {
            let mut key = Key::new();
            let mut edges = feed(&mut key, &above);
            edges.extend(feed(&mut key, &held));
            edges.extend(feed(&mut key, &[below]));

            let presses = edges.iter().filter(|e| e.is_pressed()).count();
            let releases = edges.iter().filter(|e| e.is_released()).count();
            prop_assert_eq!(presses, 1);
            prop_assert_eq!(releases, 1);
            prop_assert_eq!(edges[0], Edge::Pressed);
            prop_assert_eq!(*edges.last().unwrap(), Edge::Released);
        }
    }
}
