//! Deadline scheduler for the controller's software timers.
//!
//! Stands in for both the periodic hardware ticker and every inline wait
//! the control logic would otherwise need.  Nothing here blocks: the main
//! loop passes the current time to [`Scheduler::expire`] and gets back the
//! timers whose deadline has passed.
//!
//! ```text
//!  arm_periodic(PollLoop, 20 s) ──▶ ┌─────────────┐
//!  arm_once(PumpPulseEnd, 2 s)  ──▶ │  Scheduler  │ ──expire(now)──▶ [TimerId…]
//!  cancel(PollLoop)             ──▶ └─────────────┘
//! ```
//!
//! Cancelling removes the slot outright, so a cancelled timer can never
//! produce a late firing.

use heapless::Vec;
use log::debug;

// ═══════════════════════════════════════════════════════════════
//  Timer identity
// ═══════════════════════════════════════════════════════════════

/// Every software timer the controller owns.  One slot per id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TimerId {
    /// Automatic control loop period.
    PollLoop = 0,
    /// End of the current irrigation pulse.
    PumpPulseEnd = 1,
}

impl TimerId {
    /// Total number of timers, used to size the slot array.
    pub const COUNT: usize = 2;

    /// Reporting order for equal deadlines: a pulse end is handled before
    /// a loop firing due at the same instant.
    const ALL: [TimerId; Self::COUNT] = [TimerId::PumpPulseEnd, TimerId::PollLoop];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Periodic { period_ms: u64 },
    OneShot,
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    due_ms: u64,
    kind: TimerKind,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Fixed-slot deadline scheduler.  Stack-allocated, no heap.
#[derive(Debug, Default)]
pub struct Scheduler {
    slots: [Option<TimerEntry>; TimerId::COUNT],
}

impl Scheduler {
    pub const fn new() -> Self {
        Self {
            slots: [None; TimerId::COUNT],
        }
    }

    /// (Re-)arm a periodic timer.  The first firing is one full period
    /// after `now_ms`; any previous deadline for `id` is discarded.
    pub fn arm_periodic(&mut self, id: TimerId, period_ms: u64, now_ms: u64) {
        let period_ms = period_ms.max(1);
        debug!("Scheduler: {:?} armed every {} ms", id, period_ms);
        self.slots[id as usize] = Some(TimerEntry {
            due_ms: now_ms.saturating_add(period_ms),
            kind: TimerKind::Periodic { period_ms },
        });
    }

    /// (Re-)arm a one-shot timer firing `delay_ms` after `now_ms`.
    pub fn arm_once(&mut self, id: TimerId, delay_ms: u64, now_ms: u64) {
        debug!("Scheduler: {:?} armed once in {} ms", id, delay_ms);
        self.slots[id as usize] = Some(TimerEntry {
            due_ms: now_ms.saturating_add(delay_ms),
            kind: TimerKind::OneShot,
        });
    }

    /// Remove a timer.  Returns whether it was armed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let was_armed = self.slots[id as usize].take().is_some();
        if was_armed {
            debug!("Scheduler: {:?} cancelled", id);
        }
        was_armed
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.slots[id as usize].is_some()
    }

    /// Absolute time of the next firing, if armed.
    pub fn due_at(&self, id: TimerId) -> Option<u64> {
        self.slots[id as usize].map(|e| e.due_ms)
    }

    /// Collect every timer whose deadline is at or before `now_ms`, in
    /// deadline order (ties in [`TimerId::ALL`] order).
    ///
    /// One-shot timers are removed.  Periodic timers fire once even if
    /// several periods were missed, and their next deadline stays on the
    /// original grid (`due + k * period`), strictly after `now_ms`.
    pub fn expire(&mut self, now_ms: u64) -> Vec<TimerId, { TimerId::COUNT }> {
        let mut fired: Vec<(u64, TimerId), { TimerId::COUNT }> = Vec::new();

        for id in TimerId::ALL {
            let slot = &mut self.slots[id as usize];
            let Some(entry) = *slot else { continue };
            if entry.due_ms > now_ms {
                continue;
            }

            match entry.kind {
                TimerKind::OneShot => *slot = None,
                TimerKind::Periodic { period_ms } => {
                    let missed = (now_ms - entry.due_ms) / period_ms;
                    let next = entry.due_ms + (missed + 1) * period_ms;
                    *slot = Some(TimerEntry {
                        due_ms: next,
                        kind: entry.kind,
                    });
                }
            }

            // Capacity equals the number of slots, so this cannot overflow.
            let _ = fired.push((entry.due_ms, id));
        }

        fired.sort_by_key(|(due, _)| *due);
        fired.into_iter().map(|(_, id)| id).collect()
    }
}
