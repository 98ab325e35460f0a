//! Routes, operations and the per-key route handler.

use crate::debounce::Edge;

/// Interaction style bound to a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Route {
    /// Continuous depth forwarded to an analog axis every cycle.
    Analog = 0,
    /// Held while pressed.
    Momentary = 1,
    /// Flips on each press.
    Toggle = 2,
    /// Indirect/macro action addressed by the payload.
    Special = 3,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Analog, Route::Momentary, Route::Toggle, Route::Special];

    pub fn name(self) -> &'static str {
        match self {
            Route::Analog => "analog",
            Route::Momentary => "momentary",
            Route::Toggle => "toggle",
            Route::Special => "special",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(name))
    }
}

/// Effect applied to whatever element a payload addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Set,
    Unset,
    Toggle,
}

impl Operation {
    /// Apply the operation to a single held flag.
    pub fn apply(self, held: bool) -> bool {
        match self {
            Operation::Set => true,
            Operation::Unset => false,
            Operation::Toggle => !held,
        }
    }
}

/// The (route, payload) pair resolved for a key on one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub route: Route,
    pub payload: u8,
}

impl Binding {
    /// Placeholder for positions nobody has bound.
    pub const UNBOUND: Binding = Binding {
        route: Route::Momentary,
        payload: 0,
    };

    pub const fn new(route: Route, payload: u8) -> Self {
        Self { route, payload }
    }

    /// Payload 0 means the key does nothing on this layer.
    pub fn is_bound(&self) -> bool {
        self.payload != 0
    }
}

/// What the route handler wants done with a key this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Forward the depth straight to a continuous output.
    Analog { payload: u8, depth: u8 },
    /// Queue an operation to fire after `delay` milliseconds.
    Schedule {
        payload: u8,
        operation: Operation,
        delay: u16,
    },
    /// Indirect action. Currently a placeholder.
    Special { payload: u8, depth: u8 },
}

/// Decide what a bound key does given this cycle's edge.
///
/// All state-changing routes go through the scheduler, even with a zero
/// delay, so every operation reaches the outputs through one dispatch path.
pub fn interpret(binding: Binding, depth: u8, edge: Edge) -> Option<Action> {
    let payload = binding.payload;
    match binding.route {
        Route::Analog => Some(Action::Analog { payload, depth }),
        Route::Momentary => match edge {
            Edge::Pressed => Some(schedule(payload, Operation::Set)),
            Edge::Released => Some(schedule(payload, Operation::Unset)),
            Edge::None => None,
        },
        // Toggle fires on press only.
        Route::Toggle => edge
            .is_pressed()
            .then(|| schedule(payload, Operation::Toggle)),
        Route::Special => Some(Action::Special { payload, depth }),
    }
}

fn schedule(payload: u8, operation: Operation) -> Action {
    Action::Schedule {
        payload,
        operation,
        delay: 0,
    }
}
