//! Threshold comparison for one automatic loop firing.
//!
//! Pure function of a reading and the live thresholds; the FSM applies
//! the result.  All comparisons are inclusive at the threshold.
//!
//! | Output | Condition                                  |
//! |--------|--------------------------------------------|
//! | Fan    | `temperature_c >= fan_on_at_or_above_c`    |
//! | Relay  | `temperature_c <= relay_on_at_or_below_c`  |
//! | Pump   | `moisture <= pump_on_at_or_below` (pulse)  |
//!
//! Fan and relay are evaluated independently, so an overlapping pair of
//! thresholds can drive both at once.

use crate::config::ThresholdConfig;
use crate::fsm::context::SensorReading;

/// What one firing asks of the actuators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopDecision {
    pub fan: bool,
    pub relay: bool,
    /// Start a bounded irrigation pulse.
    pub pump_pulse: bool,
}

pub fn evaluate(reading: &SensorReading, thresholds: &ThresholdConfig) -> LoopDecision {
    LoopDecision {
        fan: reading.temperature_c >= thresholds.fan_on_at_or_above_c,
        relay: reading.temperature_c <= thresholds.relay_on_at_or_below_c,
        pump_pulse: reading.moisture <= thresholds.pump_on_at_or_below,
    }
}
