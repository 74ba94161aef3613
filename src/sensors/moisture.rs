//! Resistive soil-moisture probe.
//!
//! Reported as the raw ADC fraction, `0.0` (dry) to `1.0` (saturated).
//! No calibration curve is applied.  The fraction is clamped into
//! `0.0..=1.0` so that a mis-scaled reading can never fall outside the
//! pump threshold's domain.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static AtomicU16 for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

use super::adc_fraction;

#[cfg(not(target_os = "espidf"))]
static SIM_MOISTURE_ADC: AtomicU16 = AtomicU16::new(2048);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_moisture_adc(raw: u16) {
    SIM_MOISTURE_ADC.store(raw, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy)]
pub struct MoistureReading {
    pub raw: u16,
    pub fraction: f32,
}

pub struct MoistureSensor {
    adc_channel: u32,
}

impl MoistureSensor {
    pub fn new(adc_channel: u32) -> Self {
        Self { adc_channel }
    }

    pub fn read(&self) -> MoistureReading {
        let raw = self.read_adc();
        MoistureReading {
            raw,
            fraction: adc_fraction(raw).clamp(0.0, 1.0),
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(self.adc_channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        let _ = self.adc_channel;
        SIM_MOISTURE_ADC.load(Ordering::Relaxed)
    }
}
