//! HardwareAdapter over recording pins: checks per-device polarity and the
//! full service → adapter → pin path.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use super::mock_hw::RecordingSink;

use greenhouse::adapters::hardware::HardwareAdapter;
use greenhouse::app::ports::{ActuatorPort, PanelPort, SensorPort};
use greenhouse::app::service::AppService;
use greenhouse::config::ThresholdConfig;
use greenhouse::drivers::button::PanelInput;
use greenhouse::drivers::switched::SwitchedOutput;
use greenhouse::pins;
use greenhouse::sensors::moisture::MoistureSensor;
use greenhouse::sensors::temperature::TemperatureSensor;
use greenhouse::sensors::SensorHub;

#[derive(Default)]
struct MockPin {
    high: bool,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        Ok(())
    }
}

type Board = HardwareAdapter<MockPin, MockPin, MockPin, MockPin>;

fn board() -> Board {
    HardwareAdapter::new(
        SensorHub::new(
            TemperatureSensor::new(pins::TEMP_ADC_CHANNEL),
            MoistureSensor::new(pins::MOISTURE_ADC_CHANNEL),
        ),
        SwitchedOutput::active_high("fan", MockPin::default()),
        SwitchedOutput::active_low("relay", MockPin::default()),
        SwitchedOutput::active_high("pump", MockPin::default()),
        SwitchedOutput::active_high("manual_led", MockPin::default()),
    )
}

#[test]
fn outputs_start_at_their_off_levels() {
    let hw = board();
    assert!(!hw.fan().pin().high);
    assert!(hw.relay().pin().high, "relay off is a high pin");
    assert!(!hw.pump().pin().high);
    assert!(!hw.manual_led().pin().high);
}

#[test]
fn relay_drives_inverted_level() {
    let mut hw = board();
    hw.set_relay(true);
    assert!(hw.relay().is_on());
    assert!(!hw.relay().pin().high);

    hw.set_fan(true);
    assert!(hw.fan().pin().high);
}

#[test]
fn all_off_restores_off_levels() {
    let mut hw = board();
    hw.set_fan(true);
    hw.set_relay(true);
    hw.set_pump(true);
    hw.set_manual_led(true);
    hw.all_off();
    assert!(!hw.fan().pin().high);
    assert!(hw.relay().pin().high);
    assert!(!hw.pump().pin().high);
    assert!(!hw.manual_led().pin().high);
}

#[test]
fn panel_mask_tracks_requests() {
    let mut hw = board();
    assert!(!hw.manual_buttons_enabled());
    hw.set_manual_buttons_enabled(true);
    hw.set_manual_buttons_enabled(true);
    assert!(hw.manual_buttons_enabled());
    hw.set_manual_buttons_enabled(false);
    assert!(!hw.manual_buttons_enabled());
}

#[test]
fn sim_sensors_read_plausible_defaults() {
    let mut hw = board();
    let r = hw.read_all();
    assert!((r.temperature_c - 20.0).abs() < 0.5, "got {}", r.temperature_c);
    assert!((r.moisture - 0.5).abs() < 0.01, "got {}", r.moisture);
}

#[test]
fn manual_relay_toggle_reaches_the_pin() {
    let mut hw = board();
    let mut sink = RecordingSink::new();
    let mut app = AppService::new(ThresholdConfig::default());
    app.start(0, &mut hw, &mut sink);

    app.handle_input(PanelInput::Override, 100, &mut hw, &mut sink);
    assert!(hw.manual_led().pin().high);
    assert!(hw.manual_buttons_enabled());

    app.handle_input(PanelInput::Relay, 200, &mut hw, &mut sink);
    assert!(hw.relay().is_on());
    assert!(!hw.relay().pin().high);
}
