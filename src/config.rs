//! Controller thresholds and timing constants.
//!
//! [`ThresholdConfig`] holds the four tunables read by the automatic
//! control loop.  It lives in RAM only and resets to [`Default`] on every
//! boot.  [`ThresholdStore`] wraps it with the validated setters the serial
//! console goes through.
//!
//! Validation is uneven: the poll interval and the pump
//! fraction are range-checked, the two temperature thresholds accept any
//! value.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Timing constants
// ---------------------------------------------------------------------------

/// Debounce window applied to the override line and each manual button.
pub const DEBOUNCE_MS: u64 = 250;

/// How long one irrigation pulse keeps the pump energised.
pub const PUMP_PULSE_MS: u64 = 2_000;

/// Main loop service period on the device.
pub const MAIN_LOOP_PERIOD_MS: u32 = 10;

// ---------------------------------------------------------------------------
// ThresholdConfig
// ---------------------------------------------------------------------------

/// Tunable thresholds for the automatic control loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Seconds between automatic sensor polls.
    pub poll_interval_secs: f32,
    /// Fan runs when temperature is at or above this (°C).
    pub fan_on_at_or_above_c: f32,
    /// Heating relay closes when temperature is at or below this (°C).
    pub relay_on_at_or_below_c: f32,
    /// Pump pulses when the moisture fraction is at or below this.
    pub pump_on_at_or_below: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 20.0,
            fan_on_at_or_above_c: 25.0,
            relay_on_at_or_below_c: 16.0,
            pump_on_at_or_below: 0.45,
        }
    }
}

impl ThresholdConfig {
    /// Poll period in whole milliseconds, rounded and never zero.
    pub fn poll_interval_ms(&self) -> u64 {
        ((self.poll_interval_secs * 1000.0).round() as u64).max(1)
    }
}

// ---------------------------------------------------------------------------
// ThresholdStore
// ---------------------------------------------------------------------------

/// Validated access to the live [`ThresholdConfig`].
#[derive(Debug, Clone, Default)]
pub struct ThresholdStore {
    current: ThresholdConfig,
}

impl ThresholdStore {
    pub fn new(config: ThresholdConfig) -> Self {
        Self { current: config }
    }

    /// Copy of the current thresholds.
    pub fn snapshot(&self) -> ThresholdConfig {
        self.current
    }

    pub fn poll_interval_secs(&self) -> f32 {
        self.current.poll_interval_secs
    }

    pub fn fan_on_at_or_above_c(&self) -> f32 {
        self.current.fan_on_at_or_above_c
    }

    pub fn relay_on_at_or_below_c(&self) -> f32 {
        self.current.relay_on_at_or_below_c
    }

    pub fn pump_on_at_or_below(&self) -> f32 {
        self.current.pump_on_at_or_below
    }

    /// Rejects zero, negative and non-finite intervals.
    pub fn set_poll_interval_secs(&mut self, secs: f32) -> Result<(), ConfigError> {
        if !secs.is_finite() || secs <= 0.0 {
            warn!("Poll interval {} s rejected, keeping {} s", secs, self.current.poll_interval_secs);
            return Err(ConfigError::PollIntervalNotPositive(secs));
        }
        info!("Poll interval: {} s -> {} s", self.current.poll_interval_secs, secs);
        self.current.poll_interval_secs = secs;
        Ok(())
    }

    pub fn set_fan_on_at_or_above_c(&mut self, celsius: f32) {
        info!("Fan threshold: {} C -> {} C", self.current.fan_on_at_or_above_c, celsius);
        self.current.fan_on_at_or_above_c = celsius;
    }

    pub fn set_relay_on_at_or_below_c(&mut self, celsius: f32) {
        info!("Relay threshold: {} C -> {} C", self.current.relay_on_at_or_below_c, celsius);
        self.current.relay_on_at_or_below_c = celsius;
    }

    /// Rejects fractions outside `0.0..=1.0` (NaN included).
    pub fn set_pump_on_at_or_below(&mut self, fraction: f32) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&fraction) {
            warn!("Pump threshold {} rejected, keeping {}", fraction, self.current.pump_on_at_or_below);
            return Err(ConfigError::PumpThresholdOutOfRange(fraction));
        }
        info!("Pump threshold: {} -> {}", self.current.pump_on_at_or_below, fraction);
        self.current.pump_on_at_or_below = fraction;
        Ok(())
    }
}
