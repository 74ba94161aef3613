//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, panel, event sinks) implement these
//! traits.  The [`AppService`](super::service::AppService) consumes them via
//! generics, so the domain core never touches hardware directly.

use crate::fsm::context::SensorReading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// Air temperature in °C.  Not clamped.
    fn read_temperature(&mut self) -> f32;

    /// Soil moisture as a fraction of ADC full scale, clamped to 0.0–1.0.
    fn read_moisture(&mut self) -> f32;

    /// Sample both sensors.
    fn read_all(&mut self) -> SensorReading {
        SensorReading {
            temperature_c: self.read_temperature(),
            moisture: self.read_moisture(),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this with *logical* states; the
/// adapter owns each device's polarity.  Every setter is idempotent.
pub trait ActuatorPort {
    fn set_fan(&mut self, on: bool);

    fn set_relay(&mut self, on: bool);

    fn set_pump(&mut self, on: bool);

    /// Manual-mode indicator LED.
    fn set_manual_led(&mut self, on: bool);

    /// Drive every output to its logical *off* level.
    fn all_off(&mut self) {
        self.set_fan(false);
        self.set_relay(false);
        self.set_pump(false);
        self.set_manual_led(false);
    }
}

// ───────────────────────────────────────────────────────────────
// Panel port (driven adapter: domain → button interrupt masks)
// ───────────────────────────────────────────────────────────────

/// Controls whether the three actuator toggle buttons raise events.
/// The override button is always live.
pub trait PanelPort {
    fn set_manual_buttons_enabled(&mut self, enabled: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
