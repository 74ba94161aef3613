//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                  |
//! |------------|--------------|------------------------------|
//! | `hardware` | SensorPort   | ESP32 ADC1                   |
//! |            | ActuatorPort | Fan / relay / pump / LED GPIO|
//! |            | PanelPort    | Panel button interrupt masks |
//! | `log_sink` | EventSink    | Serial log output            |
//! | `time`     | —            | ESP32 system timer           |

pub mod hardware;
pub mod log_sink;
pub mod time;
