//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns both analog sensors and produces a fresh [`SensorReading`]
//! whenever the control loop fires or the console asks for one.  Nothing
//! is cached between reads.

pub mod moisture;
pub mod temperature;

use crate::fsm::context::SensorReading;
use crate::pins::ADC_MAX_COUNT;
use moisture::MoistureSensor;
use temperature::TemperatureSensor;

/// Normalise a 12-bit ADC count to `0.0..=1.0` of full scale.
pub(crate) fn adc_fraction(raw: u16) -> f32 {
    raw as f32 / ADC_MAX_COUNT as f32
}

/// Aggregates the sensor drivers.
pub struct SensorHub {
    pub temperature: TemperatureSensor,
    pub moisture: MoistureSensor,
}

impl SensorHub {
    pub fn new(temperature: TemperatureSensor, moisture: MoistureSensor) -> Self {
        Self {
            temperature,
            moisture,
        }
    }

    pub fn read_temperature(&self) -> f32 {
        self.temperature.read().celsius
    }

    pub fn read_moisture(&self) -> f32 {
        self.moisture.read().fraction
    }

    /// Sample both sensors once.
    pub fn read_all(&self) -> SensorReading {
        SensorReading {
            temperature_c: self.read_temperature(),
            moisture: self.read_moisture(),
        }
    }
}
