//! On/off output with per-device active polarity.
//!
//! Drives the fan MOSFET, the heater relay board, the pump MOSFET and the
//! manual-mode LED.  Callers only ever deal in the *logical* state; the
//! physical pin level is `on XOR active_low`.
//!
//! | Device | Polarity    | `on` drives |
//! |--------|-------------|-------------|
//! | Fan    | active-high | HIGH        |
//! | Relay  | active-low  | LOW         |
//! | Pump   | active-high | HIGH        |
//! | LED    | active-high | HIGH        |
//!
//! Generic over [`OutputPin`], so the same code drives ESP-IDF pin
//! drivers on the board and recording mock pins on the host.

use embedded_hal::digital::{Error as _, OutputPin, PinState};
use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    /// Physical level that represents the logical state `on`.
    pub fn level(self, on: bool) -> PinState {
        PinState::from(on != matches!(self, Polarity::ActiveLow))
    }
}

pub struct SwitchedOutput<P> {
    name: &'static str,
    pin: P,
    polarity: Polarity,
    on: bool,
}

impl<P: OutputPin> SwitchedOutput<P> {
    /// Wrap `pin` and immediately drive it to the logical *off* level.
    pub fn new(name: &'static str, pin: P, polarity: Polarity) -> Self {
        let mut out = Self {
            name,
            pin,
            polarity,
            on: false,
        };
        out.set(false);
        out
    }

    pub fn active_high(name: &'static str, pin: P) -> Self {
        Self::new(name, pin, Polarity::ActiveHigh)
    }

    pub fn active_low(name: &'static str, pin: P) -> Self {
        Self::new(name, pin, Polarity::ActiveLow)
    }

    /// Idempotent write of the logical state.  A failed pin write is
    /// logged; the logical state is recorded regardless.
    pub fn set(&mut self, on: bool) {
        if let Err(e) = self.pin.set_state(self.polarity.level(on)) {
            warn!("{}: pin write failed ({:?})", self.name, e.kind());
        }
        self.on = on;
    }

    pub fn toggle(&mut self) {
        self.set(!self.on);
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Borrow the underlying pin (host tests inspect mock levels).
    pub fn pin(&self) -> &P {
        &self.pin
    }
}
