//! TMP36 analog temperature sensor.
//!
//! Output is linear: 0.5 V at 0 °C, 10 mV/°C.  Read through ADC1 at
//! 12 bits against a 3.3 V full scale:
//!
//! ```text
//! volts   = raw / 4095 * 3.3
//! celsius = (volts - 0.5) * 100
//! ```
//!
//! No clamping: a shorted or floating input shows up as an implausible
//! temperature and is passed through as-is.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static AtomicU16 for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::pins::ADC_VREF;

use super::adc_fraction;

/// 869 counts ≈ 0.70 V ≈ 20 °C.
#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_ADC: AtomicU16 = AtomicU16::new(869);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temp_adc(raw: u16) {
    SIM_TEMP_ADC.store(raw, Ordering::Relaxed);
}

const TMP36_OFFSET_V: f32 = 0.5;
const TMP36_C_PER_V: f32 = 100.0;

#[derive(Debug, Clone, Copy)]
pub struct TemperatureReading {
    pub raw: u16,
    pub celsius: f32,
}

pub struct TemperatureSensor {
    adc_channel: u32,
}

impl TemperatureSensor {
    pub fn new(adc_channel: u32) -> Self {
        Self { adc_channel }
    }

    pub fn read(&self) -> TemperatureReading {
        let raw = self.read_adc();
        TemperatureReading {
            raw,
            celsius: raw_to_celsius(raw),
        }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(self.adc_channel)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        let _ = self.adc_channel;
        SIM_TEMP_ADC.load(Ordering::Relaxed)
    }
}

/// Convert a 12-bit ADC count to degrees Celsius.
pub fn raw_to_celsius(raw: u16) -> f32 {
    let volts = adc_fraction(raw) * ADC_VREF;
    (volts - TMP36_OFFSET_V) * TMP36_C_PER_V
}
