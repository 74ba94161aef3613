//! GPIO / ADC assignments for the greenhouse controller board (ESP32
//! DevKitC).
//!
//! Drivers that address pins by number read them from here.  The output
//! pins are claimed as typed `Peripherals` fields in `main.rs`, which must
//! follow the assignments listed below.

// ---------------------------------------------------------------------------
// Sensors: analog (ADC1)
// ---------------------------------------------------------------------------

/// TMP36 temperature sensor output on GPIO 36.
pub const TEMP_ADC_CHANNEL: u32 = 0;

/// Resistive soil-moisture probe on GPIO 39.
pub const MOISTURE_ADC_CHANNEL: u32 = 3;

// ---------------------------------------------------------------------------
// Actuators: digital outputs
// ---------------------------------------------------------------------------

// | Output     | GPIO | Level for "on"                          |
// |------------|------|-----------------------------------------|
// | Fan        | 25   | HIGH (MOSFET gate)                      |
// | Relay      | 26   | LOW (the relay module closes on a low)  |
// | Pump       | 27   | HIGH (MOSFET gate)                      |
// | Manual LED | 2    | HIGH                                    |

// ---------------------------------------------------------------------------
// Panel buttons: rising-edge inputs with external pull-downs
// ---------------------------------------------------------------------------

// GPIO 32–35 have no internal pulls; the panel board provides 10 kΩ
// pull-downs.

/// Automatic ↔ manual override toggle.
pub const OVERRIDE_BUTTON_GPIO: i32 = 32;
/// Manual fan toggle.
pub const FAN_BUTTON_GPIO: i32 = 33;
/// Manual relay toggle.
pub const RELAY_BUTTON_GPIO: i32 = 34;
/// Manual pump toggle.
pub const PUMP_BUTTON_GPIO: i32 = 35;

// ---------------------------------------------------------------------------
// ADC configuration
// ---------------------------------------------------------------------------

/// Full-scale ADC count at 12-bit resolution.
pub const ADC_MAX_COUNT: u16 = 4095;
/// Reference voltage the TMP36 conversion assumes at full scale.
pub const ADC_VREF: f32 = 3.3;
