//! Function-pointer finite state machine engine.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │  StateTable                                                │
//! │  ┌───────────┬───────────┬──────────┬──────────────────────┐│
//! │  │ Mode      │ on_enter  │ on_exit  │ on_input             ││
//! │  ├───────────┼───────────┼──────────┼──────────────────────┤│
//! │  │ Automatic │ fn(ctx)   │ —        │ fn(ctx, in)->Option<>││
//! │  │ Manual    │ fn(ctx)   │ fn(ctx)  │ fn(ctx, in)->Option<>││
//! │  └───────────┴───────────┴──────────┴──────────────────────┘│
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is event-driven: every accepted button edge and every
//! expired timer becomes one [`ControlInput`] handed to `on_input` of the
//! **current** mode.  If it returns `Some(next)`, the engine runs
//! `on_exit` for the current mode, then `on_enter` for the next, and
//! updates the current pointer.  Handlers only write to
//! [`ControlContext`]; hardware is touched afterwards by the service.

pub mod context;
pub mod states;

use context::ControlContext;
use log::info;
use serde::Serialize;

use crate::drivers::button::PanelInput;

// ---------------------------------------------------------------------------
// Mode identity
// ---------------------------------------------------------------------------

/// Operating mode of the controller.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ControlMode {
    Automatic = 0,
    Manual = 1,
}

impl ControlMode {
    /// Total number of modes, used to size the table array.
    pub const COUNT: usize = 2;

    /// Convert an index back to `ControlMode`.  Panics on out-of-range in
    /// debug builds; returns `Automatic` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Automatic,
            1 => Self::Manual,
            _ => {
                debug_assert!(false, "invalid mode index: {idx}");
                Self::Automatic
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Everything a mode handler can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlInput {
    /// A debounced, enabled panel button edge.
    Panel(PanelInput),
    /// The automatic loop period elapsed; `ctx.sensors` holds a fresh
    /// reading.
    PollDue,
    /// The irrigation pulse duration elapsed.
    PumpPulseElapsed,
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each transition.
pub type StateActionFn = fn(&mut ControlContext);

/// Signature for the input handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateInputFn = fn(&mut ControlContext, ControlInput) -> Option<ControlMode>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single mode.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: ControlMode,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_input: StateInputFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm {
    /// Fixed-size table indexed by `ControlMode as usize`.
    table: [StateDescriptor; ControlMode::COUNT],
    /// Index of the currently active mode.
    current: usize,
}

impl Fsm {
    /// Construct a new FSM with the given table, starting in `initial`.
    pub fn new(table: [StateDescriptor; ControlMode::COUNT], initial: ControlMode) -> Self {
        debug_assert!(
            table.iter().enumerate().all(|(i, s)| s.id as usize == i),
            "state table rows must be in ControlMode order"
        );
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting mode.
    /// Call once after construction, before the first `dispatch()`.
    pub fn start(&mut self, ctx: &mut ControlContext) {
        info!("FSM starting in mode: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Hand one input to the current mode and take the transition it
    /// asks for, if any.
    pub fn dispatch(&mut self, input: ControlInput, ctx: &mut ControlContext) {
        let next = (self.table[self.current].on_input)(ctx, input);

        if let Some(next_id) = next {
            self.force_transition(next_id, ctx);
        }
    }

    /// Transition immediately.  A transition to the current mode is a
    /// no-op.
    pub fn force_transition(&mut self, next: ControlMode, ctx: &mut ControlContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    /// The current mode.
    pub fn current_state(&self) -> ControlMode {
        ControlMode::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: ControlMode, ctx: &mut ControlContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
