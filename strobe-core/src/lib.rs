//! Event interpretation and dispatch engine for the strobe capacitive keyboard.
//!
//! This crate is `no_std`-compatible so it can be used by both the AVR
//! firmware and the native CLI simulator. It turns per-key analog depth
//! readings into press/release edges, resolves each key's binding through
//! the active layer stack, defers the resulting operations through a
//! fixed-capacity scheduler and routes fired operations into the keyboard,
//! mouse, joystick and layer state machines.
//!
//! Nothing in the per-cycle path allocates or returns an error: every
//! unexpected input degrades to a no-op so the device keeps responding.

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod cycle;
pub mod debounce;
pub mod dispatch;
pub mod keycode;
pub mod layer;
pub mod matrix;
pub mod payload;
pub mod route;
pub mod schedule;
pub mod state;

/// Number of multiplexed row (read) lines.
pub const ROWS: usize = 8;
/// Number of strobed column lines.
pub const COLS: usize = 16;
/// Maximum number of logical keys the engine tracks.
pub const NUM_KEYS: usize = ROWS * COLS;
/// Maximum number of keymap layers (one per layer-toggle payload).
pub const MAX_LAYERS: usize = 16;

pub use config::{ConfigStore, Keymap, KeymapError, Setting};
pub use cycle::{Engine, ReportSink};
pub use debounce::{Edge, Hysteresis, Key};
pub use dispatch::Outputs;
pub use layer::LayerState;
pub use matrix::Hardware;
pub use payload::Domain;
pub use route::{Binding, Operation, Route};
pub use schedule::{Admission, Entry, Scheduler, SCHEDULE_LENGTH};
