//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`] and the four switched outputs, exposing them
//! through [`SensorPort`], [`ActuatorPort`] and [`PanelPort`].  This is
//! the only module in the system that touches actual hardware.  The
//! output pins are generic, so host tests substitute recording mocks and
//! the sensors fall back to their simulation stubs.

use embedded_hal::digital::OutputPin;
use log::debug;

use crate::app::ports::{ActuatorPort, PanelPort, SensorPort};
use crate::drivers::hw_init;
use crate::drivers::switched::SwitchedOutput;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<F, R, P, L> {
    sensor_hub: SensorHub,
    fan: SwitchedOutput<F>,
    relay: SwitchedOutput<R>,
    pump: SwitchedOutput<P>,
    manual_led: SwitchedOutput<L>,
    manual_buttons_enabled: bool,
}

impl<F, R, P, L> HardwareAdapter<F, R, P, L>
where
    F: OutputPin,
    R: OutputPin,
    P: OutputPin,
    L: OutputPin,
{
    pub fn new(
        sensor_hub: SensorHub,
        fan: SwitchedOutput<F>,
        relay: SwitchedOutput<R>,
        pump: SwitchedOutput<P>,
        manual_led: SwitchedOutput<L>,
    ) -> Self {
        Self {
            sensor_hub,
            fan,
            relay,
            pump,
            manual_led,
            manual_buttons_enabled: false,
        }
    }

    pub fn fan(&self) -> &SwitchedOutput<F> {
        &self.fan
    }

    pub fn relay(&self) -> &SwitchedOutput<R> {
        &self.relay
    }

    pub fn pump(&self) -> &SwitchedOutput<P> {
        &self.pump
    }

    pub fn manual_led(&self) -> &SwitchedOutput<L> {
        &self.manual_led
    }

    pub fn manual_buttons_enabled(&self) -> bool {
        self.manual_buttons_enabled
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<F, R, P, L> SensorPort for HardwareAdapter<F, R, P, L> {
    fn read_temperature(&mut self) -> f32 {
        self.sensor_hub.read_temperature()
    }

    fn read_moisture(&mut self) -> f32 {
        self.sensor_hub.read_moisture()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<F, R, P, L> ActuatorPort for HardwareAdapter<F, R, P, L>
where
    F: OutputPin,
    R: OutputPin,
    P: OutputPin,
    L: OutputPin,
{
    fn set_fan(&mut self, on: bool) {
        self.fan.set(on);
    }

    fn set_relay(&mut self, on: bool) {
        self.relay.set(on);
    }

    fn set_pump(&mut self, on: bool) {
        self.pump.set(on);
    }

    fn set_manual_led(&mut self, on: bool) {
        self.manual_led.set(on);
    }
}

// ── PanelPort implementation ──────────────────────────────────

impl<F, R, P, L> PanelPort for HardwareAdapter<F, R, P, L> {
    fn set_manual_buttons_enabled(&mut self, enabled: bool) {
        if self.manual_buttons_enabled == enabled {
            return;
        }
        hw_init::set_manual_button_interrupts(enabled);
        self.manual_buttons_enabled = enabled;
        debug!(
            "panel: manual toggles {}",
            if enabled { "unmasked" } else { "masked" }
        );
    }
}
