//! Shared mutable context threaded through every FSM handler.
//!
//! `ControlContext` is the single struct that state handlers read from
//! and write to.  It holds the latest sensor reading, the logical actuator
//! commands, the threshold store and the software timers.  The
//! [`AppService`](crate::app::service::AppService) owns it for the whole
//! process lifetime and applies `commands` to hardware after each event.

use serde::Serialize;

use crate::config::{ThresholdConfig, ThresholdStore};
use crate::scheduler::{Scheduler, TimerId};

// ---------------------------------------------------------------------------
// Sensor reading (written by the service right before a loop firing)
// ---------------------------------------------------------------------------

/// One sample of both analog sensors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SensorReading {
    /// Air temperature (°C).
    pub temperature_c: f32,
    /// Soil moisture as a fraction of ADC full scale (0.0–1.0).
    pub moisture: f32,
}

// ---------------------------------------------------------------------------
// Actuator commands (written by state handlers; applied by the service)
// ---------------------------------------------------------------------------

/// The three switched loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Actuator {
    Fan,
    Relay,
    Pump,
}

/// Logical (polarity-free) output states requested by the FSM.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActuatorCommands {
    pub fan: bool,
    pub relay: bool,
    pub pump: bool,
    /// Manual-mode indicator LED.
    pub manual_led: bool,
    /// Whether the three actuator toggle buttons are live.
    pub manual_buttons: bool,
}

impl ActuatorCommands {
    pub fn get(&self, actuator: Actuator) -> bool {
        match actuator {
            Actuator::Fan => self.fan,
            Actuator::Relay => self.relay,
            Actuator::Pump => self.pump,
        }
    }

    pub fn toggle(&mut self, actuator: Actuator) -> bool {
        let slot = match actuator {
            Actuator::Fan => &mut self.fan,
            Actuator::Relay => &mut self.relay,
            Actuator::Pump => &mut self.pump,
        };
        *slot = !*slot;
        *slot
    }
}

// ---------------------------------------------------------------------------
// ControlContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct ControlContext {
    /// Monotonic time of the event being handled (ms since boot).
    pub now_ms: u64,
    /// Reading taken for the current loop firing.
    pub sensors: SensorReading,
    /// Commands to be applied to actuators after the handler returns.
    pub commands: ActuatorCommands,
    /// Live thresholds.
    pub thresholds: ThresholdStore,
    /// Poll loop and pump pulse deadlines.
    pub timers: Scheduler,
    /// Number of automatic loop firings since boot.
    pub loop_firings: u64,
    /// Number of irrigation pulses started since boot.
    pub pump_pulses: u64,
}

impl ControlContext {
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            now_ms: 0,
            sensors: SensorReading::default(),
            commands: ActuatorCommands::default(),
            thresholds: ThresholdStore::new(config),
            timers: Scheduler::new(),
            loop_firings: 0,
            pump_pulses: 0,
        }
    }

    /// (Re-)arm the automatic loop with the current poll interval; the
    /// next firing is one full period from now.
    pub fn arm_poll_loop(&mut self) {
        let period_ms = self.thresholds.snapshot().poll_interval_ms();
        self.timers.arm_periodic(TimerId::PollLoop, period_ms, self.now_ms);
    }

    /// Detach the automatic loop entirely.  Returns whether it was armed.
    pub fn cancel_poll_loop(&mut self) -> bool {
        self.timers.cancel(TimerId::PollLoop)
    }

    pub fn poll_loop_armed(&self) -> bool {
        self.timers.is_armed(TimerId::PollLoop)
    }

    /// Whether an irrigation pulse is still counting down.
    pub fn pump_pulse_active(&self) -> bool {
        self.timers.is_armed(TimerId::PumpPulseEnd)
    }
}
