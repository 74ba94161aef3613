//! Panel push-buttons: identities, ISR entry point and debounce guard.
//!
//! ## Hardware
//!
//! Four momentary switches with external pull-downs: the override toggle
//! and one toggle per actuator.  Each GPIO fires on the rising edge.  The
//! ISR does nothing but push the matching [`Event`] into the queue; all
//! gating and debouncing happens in the main loop.
//!
//! ## Debounce
//!
//! [`EdgeDebouncer`] is a timestamp guard.  Once an edge is accepted, any
//! further edge on the same input inside [`DEBOUNCE_MS`] is dropped
//! outright (never queued for later).
//!
//! [`DEBOUNCE_MS`]: crate::config::DEBOUNCE_MS

use crate::events::{push_event, Event};

/// One of the four rising-edge panel inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PanelInput {
    /// Toggles between automatic and manual control.
    Override = 0,
    /// Manual fan toggle.
    Fan = 1,
    /// Manual heating-relay toggle.
    Relay = 2,
    /// Manual pump toggle.
    Pump = 3,
}

impl PanelInput {
    pub const COUNT: usize = 4;

    pub const ALL: [PanelInput; Self::COUNT] = [
        PanelInput::Override,
        PanelInput::Fan,
        PanelInput::Relay,
        PanelInput::Pump,
    ];

    /// Whether this is one of the three actuator toggles (as opposed to
    /// the override line).
    pub fn is_manual_toggle(self) -> bool {
        !matches!(self, PanelInput::Override)
    }

    /// Recover the input from an ISR argument index.
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }
}

/// Timestamp-based edge debouncer for a single input.
#[derive(Debug, Clone, Copy)]
pub struct EdgeDebouncer {
    window_ms: u64,
    blocked_until_ms: Option<u64>,
}

impl EdgeDebouncer {
    pub const fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            blocked_until_ms: None,
        }
    }

    /// Offer an edge seen at `now_ms`.  Returns `true` and opens a new
    /// window if the input is not inside a previous one.
    pub fn accept(&mut self, now_ms: u64) -> bool {
        if self.is_blocked(now_ms) {
            return false;
        }
        self.blocked_until_ms = Some(now_ms.saturating_add(self.window_ms));
        true
    }

    /// Whether an edge at `now_ms` would be dropped.
    pub fn is_blocked(&self, now_ms: u64) -> bool {
        self.blocked_until_ms.is_some_and(|until| now_ms < until)
    }
}

/// ISR body. Call from the rising-edge handler of `input`'s GPIO.
/// Lock-free with respect to the main loop; returns `false` if the event
/// queue was full and the edge was lost.
pub fn panel_isr_handler(input: PanelInput) -> bool {
    push_event(Event::Panel(input))
}
