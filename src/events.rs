//! Interrupt-to-main-loop event queue.
//!
//! Events are produced by the panel GPIO ISRs and consumed by the main
//! loop, which hands each one to the application service in FIFO order.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Override ISR │────▶│              │     │              │
//! │ Fan ISR      │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Relay ISR    │────▶│  (crit-sect) │     │  (consumer)  │
//! │ Pump ISR     │────▶│              │     │              │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! The queue never coalesces: each edge is one entry.  When it is full the
//! newest edge is dropped and counted.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::drivers::button::PanelInput;

/// Maximum number of pending events.
const EVENT_QUEUE_CAP: usize = 16;

/// Something interrupt context needs the main loop to handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Rising edge on a panel button.
    Panel(PanelInput),
}

struct QueueState {
    pending: Deque<Event, EVENT_QUEUE_CAP>,
    dropped: u32,
}

/// Bounded FIFO shared between ISRs and the main loop.
pub struct EventQueue {
    inner: Mutex<RefCell<QueueState>>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(QueueState {
                pending: Deque::new(),
                dropped: 0,
            })),
        }
    }

    /// Push an event.  Safe from ISR context.
    /// Returns `false` if the queue is full (event dropped).
    pub fn push(&self, event: Event) -> bool {
        critical_section::with(|cs| {
            let mut q = self.inner.borrow_ref_mut(cs);
            if q.pending.push_back(event).is_ok() {
                true
            } else {
                q.dropped = q.dropped.saturating_add(1);
                false
            }
        })
    }

    /// Pop the oldest event, if any.
    pub fn pop(&self) -> Option<Event> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).pending.pop_front())
    }

    /// Pop events into `handler` until the queue is empty.
    ///
    /// The critical section is released between events, so ISRs can keep
    /// pushing while the handler runs.
    pub fn drain(&self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow_ref(cs).pending.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of events dropped on overflow since the last call.
    pub fn take_dropped(&self) -> u32 {
        critical_section::with(|cs| core::mem::take(&mut self.inner.borrow_ref_mut(cs).dropped))
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ── Global instance (ISR producers, main-loop consumer) ───────

static EVENTS: EventQueue = EventQueue::new();

/// Push into the global queue.  Safe to call from ISR context.
pub fn push_event(event: Event) -> bool {
    EVENTS.push(event)
}

/// Drain the global queue in FIFO order.
pub fn drain_events(handler: impl FnMut(Event)) {
    EVENTS.drain(handler);
}

/// Overflow count of the global queue since the last call.
pub fn take_dropped_events() -> u32 {
    EVENTS.take_dropped()
}
