//! Integration tests for the AppService → FSM → actuators pipeline.
//!
//! Time is driven explicitly: every call passes `now_ms`, so these tests
//! step through poll periods and debounce windows without sleeping.

use super::mock_hw::{ActuatorCall, MockHardware, RecordingSink};

use greenhouse::app::commands::AppCommand;
use greenhouse::app::events::{AppEvent, DropReason};
use greenhouse::app::service::AppService;
use greenhouse::config::{ThresholdConfig, DEBOUNCE_MS, PUMP_PULSE_MS};
use greenhouse::drivers::button::PanelInput;
use greenhouse::error::ConfigError;
use greenhouse::fsm::ControlMode;

const PERIOD_MS: u64 = 20_000;

fn make_app(hw: &mut MockHardware) -> (AppService, RecordingSink) {
    let mut app = AppService::new(ThresholdConfig::default());
    let mut sink = RecordingSink::new();
    app.start(0, hw, &mut sink);
    (app, sink)
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn starts_automatic_with_everything_off() {
    let mut hw = MockHardware::new();
    let (app, sink) = make_app(&mut hw);

    assert_eq!(app.mode(), ControlMode::Automatic);
    assert!(app.poll_loop_armed());
    assert_eq!(app.next_poll_due_ms(), Some(PERIOD_MS));
    assert!(!hw.fan && !hw.relay && !hw.pump && !hw.manual_led);
    assert!(!hw.manual_buttons);
    assert!(matches!(sink.events[0], AppEvent::Started(ControlMode::Automatic)));
}

#[test]
fn nothing_fires_before_first_period() {
    let mut hw = MockHardware::with_reading(30.0, 0.1);
    let (mut app, mut sink) = make_app(&mut hw);

    app.tick(PERIOD_MS - 1, &mut hw, &mut sink);
    assert_eq!(hw.sensor_reads, 0);
    assert_eq!(app.loop_firings(), 0);
    assert!(!hw.fan);
}

// ── Automatic loop scenarios ──────────────────────────────────

#[test]
fn cold_reading_closes_relay_on_next_firing() {
    let mut hw = MockHardware::with_reading(10.0, 0.9);
    let (mut app, mut sink) = make_app(&mut hw);

    app.tick(PERIOD_MS, &mut hw, &mut sink);
    assert!(hw.relay);
    assert!(!hw.fan);
    assert_eq!(app.loop_firings(), 1);
}

#[test]
fn mild_reading_releases_relay() {
    let mut hw = MockHardware::with_reading(10.0, 0.9);
    let (mut app, mut sink) = make_app(&mut hw);
    app.tick(PERIOD_MS, &mut hw, &mut sink);
    assert!(hw.relay);

    hw.temperature_c = 20.0;
    app.tick(2 * PERIOD_MS, &mut hw, &mut sink);
    assert!(!hw.relay);
    assert!(!hw.fan);
}

#[test]
fn hot_reading_runs_fan() {
    let mut hw = MockHardware::with_reading(25.0, 0.9);
    let (mut app, mut sink) = make_app(&mut hw);

    app.tick(PERIOD_MS, &mut hw, &mut sink);
    assert!(hw.fan);
    assert!(!hw.relay);
}

#[test]
fn dry_soil_pulses_pump_for_exactly_the_pulse_duration() {
    let mut hw = MockHardware::with_reading(20.0, 0.30);
    let (mut app, mut sink) = make_app(&mut hw);

    app.tick(PERIOD_MS, &mut hw, &mut sink);
    assert!(hw.pump);
    assert!(app.pump_pulse_active());

    app.tick(PERIOD_MS + PUMP_PULSE_MS - 1, &mut hw, &mut sink);
    assert!(hw.pump, "pump must stay on until the pulse elapses");

    app.tick(PERIOD_MS + PUMP_PULSE_MS, &mut hw, &mut sink);
    assert!(!hw.pump);
    assert!(!app.pump_pulse_active());
    assert_eq!(hw.pump_rising_edges(), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::PumpPulseEnded)), 1);
}

#[test]
fn wet_soil_never_energises_pump() {
    let mut hw = MockHardware::with_reading(20.0, 0.46);
    let (mut app, mut sink) = make_app(&mut hw);

    for n in 1..=5 {
        app.tick(n * PERIOD_MS, &mut hw, &mut sink);
        app.tick(n * PERIOD_MS + PUMP_PULSE_MS / 2, &mut hw, &mut sink);
        assert!(!hw.pump);
    }
    assert_eq!(hw.pump_rising_edges(), 0);
}

#[test]
fn firing_during_pulse_does_not_extend_it() {
    let mut hw = MockHardware::with_reading(20.0, 0.1);
    let (mut app, mut sink) = make_app(&mut hw);
    app.handle_command(AppCommand::SetPollInterval(1.5), 0, &mut sink)
        .unwrap();

    app.tick(1_500, &mut hw, &mut sink);
    app.tick(3_000, &mut hw, &mut sink);
    assert!(hw.pump);
    app.tick(3_499, &mut hw, &mut sink);
    assert!(hw.pump);
    app.tick(3_500, &mut hw, &mut sink);
    assert!(!hw.pump, "pulse started at 1500 ms must end at 3500 ms");
    assert_eq!(hw.pump_rising_edges(), 1);
    assert_eq!(app.loop_firings(), 2);
}

#[test]
fn stalled_loop_fires_once_then_keeps_its_grid() {
    let mut hw = MockHardware::with_reading(30.0, 0.9);
    let (mut app, mut sink) = make_app(&mut hw);

    app.tick(5 * PERIOD_MS + 123, &mut hw, &mut sink);
    assert_eq!(app.loop_firings(), 1);
    assert_eq!(app.next_poll_due_ms(), Some(6 * PERIOD_MS));
}

// ── Override / manual ─────────────────────────────────────────

#[test]
fn override_detaches_loop_and_lights_led() {
    let mut hw = MockHardware::new();
    let (mut app, mut sink) = make_app(&mut hw);

    assert!(app.handle_input(PanelInput::Override, 1_000, &mut hw, &mut sink));
    assert_eq!(app.mode(), ControlMode::Manual);
    assert!(!app.poll_loop_armed());
    assert!(hw.manual_led);
    assert!(hw.manual_buttons);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ModeChanged {
            from: ControlMode::Automatic,
            to: ControlMode::Manual
        }
    )));
}

#[test]
fn loop_never_fires_in_manual() {
    let mut hw = MockHardware::with_reading(40.0, 0.0);
    let (mut app, mut sink) = make_app(&mut hw);
    app.handle_input(PanelInput::Override, 10, &mut hw, &mut sink);

    for secs in [0.5, 3.0, 60.0] {
        app.handle_command(AppCommand::SetPollInterval(secs), 100, &mut sink)
            .unwrap();
    }
    for n in 1..=50 {
        app.tick(n * PERIOD_MS, &mut hw, &mut sink);
    }
    assert_eq!(app.loop_firings(), 0);
    assert_eq!(hw.sensor_reads, 0);
    assert!(!hw.fan && !hw.pump);
}

#[test]
fn fan_toggle_flips_once_then_auto_resumes_on_new_period() {
    let mut hw = MockHardware::with_reading(20.0, 0.9);
    let (mut app, mut sink) = make_app(&mut hw);

    app.handle_input(PanelInput::Override, 1_000, &mut hw, &mut sink);
    app.handle_input(PanelInput::Fan, 2_000, &mut hw, &mut sink);
    assert!(hw.fan);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ManualToggle { on: true, .. })),
        1
    );

    app.handle_command(AppCommand::SetPollInterval(5.0), 2_500, &mut sink)
        .unwrap();
    app.handle_input(PanelInput::Override, 3_000, &mut hw, &mut sink);
    assert_eq!(app.mode(), ControlMode::Automatic);
    assert_eq!(app.next_poll_due_ms(), Some(8_000));

    // Manual fan state holds until the first automatic firing.
    app.tick(7_999, &mut hw, &mut sink);
    assert!(hw.fan);
    app.tick(8_000, &mut hw, &mut sink);
    assert!(!hw.fan);
    assert_eq!(app.loop_firings(), 1);
}

#[test]
fn double_override_restores_mode_and_loop() {
    let mut hw = MockHardware::new();
    let (mut app, mut sink) = make_app(&mut hw);

    app.handle_input(PanelInput::Override, 1_000, &mut hw, &mut sink);
    app.handle_input(PanelInput::Override, 2_000, &mut hw, &mut sink);
    assert_eq!(app.mode(), ControlMode::Automatic);
    assert!(app.poll_loop_armed());
    assert!(!hw.manual_led);
    assert!(!hw.manual_buttons);
}

#[test]
fn toggles_have_no_effect_in_automatic() {
    let mut hw = MockHardware::new();
    let (mut app, mut sink) = make_app(&mut hw);
    let before = app.outputs();

    for (i, input) in [PanelInput::Fan, PanelInput::Relay, PanelInput::Pump]
        .into_iter()
        .enumerate()
    {
        assert!(!app.handle_input(input, 1_000 * (i as u64 + 1), &mut hw, &mut sink));
    }
    assert_eq!(app.outputs(), before);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::InputDropped {
                reason: DropReason::ButtonsDisabled,
                ..
            }
        )),
        3
    );
}

#[test]
fn override_during_pulse_waits_for_pulse_end() {
    let mut hw = MockHardware::with_reading(20.0, 0.1);
    let (mut app, mut sink) = make_app(&mut hw);
    app.tick(PERIOD_MS, &mut hw, &mut sink);
    assert!(hw.pump);

    assert!(app.handle_input(PanelInput::Override, PERIOD_MS + 100, &mut hw, &mut sink));
    assert_eq!(app.mode(), ControlMode::Automatic);
    assert!(app.override_pending());
    assert!(hw.pump && !hw.manual_led && !hw.manual_buttons);

    app.tick(PERIOD_MS + PUMP_PULSE_MS - 1, &mut hw, &mut sink);
    assert_eq!(app.mode(), ControlMode::Automatic);
    assert!(hw.pump, "the pulse keeps its full length");

    app.tick(PERIOD_MS + PUMP_PULSE_MS, &mut hw, &mut sink);
    assert_eq!(app.mode(), ControlMode::Manual);
    assert!(!app.override_pending());
    assert!(!app.pump_pulse_active());
    assert!(!app.poll_loop_armed());
    assert!(!hw.pump);
    assert!(hw.manual_led && hw.manual_buttons);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::ModeChanged {
                from: ControlMode::Automatic,
                to: ControlMode::Manual,
            }
        )),
        1
    );
}

#[test]
fn first_manual_pump_press_after_pulse_turns_pump_on() {
    let mut hw = MockHardware::with_reading(20.0, 0.1);
    let (mut app, mut sink) = make_app(&mut hw);
    app.tick(PERIOD_MS, &mut hw, &mut sink);
    app.handle_input(PanelInput::Override, PERIOD_MS + 100, &mut hw, &mut sink);
    app.tick(PERIOD_MS + PUMP_PULSE_MS, &mut hw, &mut sink);

    assert!(app.handle_input(PanelInput::Pump, PERIOD_MS + PUMP_PULSE_MS + 500, &mut hw, &mut sink));
    assert!(hw.pump);

    app.tick(10 * PERIOD_MS, &mut hw, &mut sink);
    assert!(hw.pump, "nothing but the operator switches a manual pump");
    assert_eq!(app.loop_firings(), 1);
}

#[test]
fn manual_pump_left_alone_stays_off_after_pulse() {
    let mut hw = MockHardware::with_reading(20.0, 0.1);
    let (mut app, mut sink) = make_app(&mut hw);
    app.tick(PERIOD_MS, &mut hw, &mut sink);
    app.handle_input(PanelInput::Override, PERIOD_MS + 100, &mut hw, &mut sink);
    app.tick(PERIOD_MS + PUMP_PULSE_MS, &mut hw, &mut sink);
    let edges = hw.pump_rising_edges();

    let mut now = PERIOD_MS + PUMP_PULSE_MS;
    while now < 5 * PERIOD_MS {
        app.tick(now, &mut hw, &mut sink);
        assert!(!hw.pump);
        now += 250;
    }
    assert_eq!(hw.pump_rising_edges(), edges);
}

#[test]
fn second_override_during_pulse_withdraws_switch() {
    let mut hw = MockHardware::with_reading(20.0, 0.1);
    let (mut app, mut sink) = make_app(&mut hw);
    app.tick(PERIOD_MS, &mut hw, &mut sink);

    app.handle_input(PanelInput::Override, PERIOD_MS + 100, &mut hw, &mut sink);
    assert!(app.handle_input(PanelInput::Override, PERIOD_MS + 600, &mut hw, &mut sink));
    assert!(!app.override_pending());

    app.tick(PERIOD_MS + PUMP_PULSE_MS, &mut hw, &mut sink);
    assert_eq!(app.mode(), ControlMode::Automatic);
    assert!(app.poll_loop_armed());
    assert!(!hw.pump);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::ModeChanged { .. })), 0);
}

#[test]
fn deferred_override_wins_over_firing_on_same_tick() {
    let mut hw = MockHardware::with_reading(20.0, 0.1);
    let (mut app, mut sink) = make_app(&mut hw);
    // A 2 s period puts the next firing on the pulse-end instant.
    app.handle_command(AppCommand::SetPollInterval(2.0), 0, &mut sink).unwrap();
    app.tick(PUMP_PULSE_MS, &mut hw, &mut sink);
    assert!(hw.pump);

    app.handle_input(PanelInput::Override, PUMP_PULSE_MS + 100, &mut hw, &mut sink);
    app.tick(2 * PUMP_PULSE_MS, &mut hw, &mut sink);

    assert_eq!(app.mode(), ControlMode::Manual);
    assert!(!hw.pump);
    assert_eq!(app.loop_firings(), 1);
    assert!(!app.poll_loop_armed());
}

// ── Debounce ──────────────────────────────────────────────────

#[test]
fn bouncing_override_switches_mode_once() {
    let mut hw = MockHardware::new();
    let (mut app, mut sink) = make_app(&mut hw);

    assert!(app.handle_input(PanelInput::Override, 1_000, &mut hw, &mut sink));
    for dt in [1, 5, 40, DEBOUNCE_MS - 1] {
        assert!(!app.handle_input(PanelInput::Override, 1_000 + dt, &mut hw, &mut sink));
    }
    assert_eq!(app.mode(), ControlMode::Manual);

    assert!(app.handle_input(PanelInput::Override, 1_000 + DEBOUNCE_MS, &mut hw, &mut sink));
    assert_eq!(app.mode(), ControlMode::Automatic);
}

#[test]
fn debounce_is_per_button() {
    let mut hw = MockHardware::new();
    let (mut app, mut sink) = make_app(&mut hw);
    app.handle_input(PanelInput::Override, 1_000, &mut hw, &mut sink);

    assert!(app.handle_input(PanelInput::Fan, 1_010, &mut hw, &mut sink));
    assert!(app.handle_input(PanelInput::Relay, 1_020, &mut hw, &mut sink));
    assert!(!app.handle_input(PanelInput::Fan, 1_100, &mut hw, &mut sink));
    assert!(hw.fan && hw.relay);
}

// ── Threshold commands ────────────────────────────────────────

#[test]
fn invalid_poll_interval_keeps_value_and_schedule() {
    let mut hw = MockHardware::new();
    let (mut app, mut sink) = make_app(&mut hw);
    let due = app.next_poll_due_ms();

    for bad in [0.0, -5.0, f32::NAN, f32::INFINITY] {
        let err = app
            .handle_command(AppCommand::SetPollInterval(bad), 7_000, &mut sink)
            .unwrap_err();
        assert!(matches!(err, ConfigError::PollIntervalNotPositive(_)));
    }
    assert_eq!(app.thresholds().poll_interval_secs, 20.0);
    assert_eq!(app.next_poll_due_ms(), due);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ThresholdRejected(_))),
        4
    );
}

#[test]
fn valid_poll_interval_rearms_from_now() {
    let mut hw = MockHardware::new();
    let (mut app, mut sink) = make_app(&mut hw);

    app.handle_command(AppCommand::SetPollInterval(2.5), 7_000, &mut sink)
        .unwrap();
    assert_eq!(app.next_poll_due_ms(), Some(9_500));
}

#[test]
fn pump_threshold_range_is_enforced() {
    let mut hw = MockHardware::new();
    let (mut app, mut sink) = make_app(&mut hw);

    assert!(app
        .handle_command(AppCommand::SetPumpThreshold(1.2), 0, &mut sink)
        .is_err());
    assert!(app
        .handle_command(AppCommand::SetPumpThreshold(-0.1), 0, &mut sink)
        .is_err());
    assert_eq!(app.thresholds().pump_on_at_or_below, 0.45);

    app.handle_command(AppCommand::SetPumpThreshold(1.0), 0, &mut sink)
        .unwrap();
    assert_eq!(app.thresholds().pump_on_at_or_below, 1.0);
}

#[test]
fn temperature_thresholds_accept_any_value() {
    let mut hw = MockHardware::with_reading(-30.0, 0.9);
    let (mut app, mut sink) = make_app(&mut hw);

    app.handle_command(AppCommand::SetFanThreshold(-40.0), 0, &mut sink)
        .unwrap();
    app.handle_command(AppCommand::SetRelayThreshold(-50.0), 0, &mut sink)
        .unwrap();
    app.tick(PERIOD_MS, &mut hw, &mut sink);
    assert!(hw.fan);
    assert!(!hw.relay);
}

#[test]
fn threshold_change_applies_on_next_firing() {
    let mut hw = MockHardware::with_reading(22.0, 0.9);
    let (mut app, mut sink) = make_app(&mut hw);
    app.tick(PERIOD_MS, &mut hw, &mut sink);
    assert!(!hw.fan);

    app.handle_command(AppCommand::SetFanThreshold(21.0), PERIOD_MS + 1, &mut sink)
        .unwrap();
    assert!(!hw.fan, "threshold change alone must not switch outputs");
    app.tick(2 * PERIOD_MS, &mut hw, &mut sink);
    assert!(hw.fan);
}

#[test]
fn on_demand_read_does_not_touch_outputs() {
    let mut hw = MockHardware::with_reading(35.0, 0.0);
    let (app, _sink) = make_app(&mut hw);
    let calls_before = hw.calls.len();

    let reading = app.read_sensors(&mut hw);
    assert_eq!(reading.temperature_c, 35.0);
    assert_eq!(reading.moisture, 0.0);
    assert_eq!(hw.calls.len(), calls_before);
    assert!(!hw.calls.contains(&ActuatorCall::Fan(true)));
}
