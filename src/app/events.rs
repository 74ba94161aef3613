//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use serde::Serialize;

use crate::config::ThresholdConfig;
use crate::drivers::button::PanelInput;
use crate::error::ConfigError;
use crate::fsm::context::{Actuator, ActuatorCommands, SensorReading};
use crate::fsm::ControlMode;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The application service has started (carries initial mode).
    Started(ControlMode),

    /// The override button switched modes.
    ModeChanged { from: ControlMode, to: ControlMode },

    /// An override press landed during a pump pulse.  `pending` is whether
    /// the mode switch is now waiting for the pulse to end.
    OverrideDeferred { pending: bool },

    /// One automatic loop firing completed.
    LoopFired(LoopReport),

    /// An irrigation pulse finished and the pump was switched off.
    PumpPulseEnded,

    /// A manual button toggled an output.
    ManualToggle { actuator: Actuator, on: bool },

    /// A threshold change was accepted.
    ThresholdsChanged(ThresholdConfig),

    /// A threshold change was refused; the previous value is kept.
    ThresholdRejected(ConfigError),

    /// A button edge was discarded before reaching the FSM.
    InputDropped { input: PanelInput, reason: DropReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Arrived inside the debounce window of the previous accepted edge.
    Debounce,
    /// A toggle button pressed while not in manual mode.
    ButtonsDisabled,
}

/// Result of one automatic loop firing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopReport {
    pub reading: SensorReading,
    pub fan: bool,
    pub relay: bool,
    pub pump: bool,
    /// This firing started a new irrigation pulse.
    pub pulse_started: bool,
}

/// A point-in-time status snapshot, serialized for the console.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusReport {
    pub mode: ControlMode,
    pub outputs: ActuatorCommands,
    pub thresholds: ThresholdConfig,
    pub poll_loop_armed: bool,
    pub pump_pulse_active: bool,
    pub override_pending: bool,
    pub loop_firings: u64,
    pub pump_pulses: u64,
}
