//! Greenhouse Controller Firmware: Main Entry Point
//!
//! Hexagonal architecture with an event-driven, never-blocking main loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter            LogEventSink     Esp32TimeAdapter  │
//! │  (Sensor+Actuator+Panel)    (EventSink)      (ms clock)        │
//! │  Console (serial menu, fed by a stdin reader thread)           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · Scheduler · Debounce                            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Panel ISRs ──▶ EventQueue ──▶ main loop                       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::io::BufRead;
use std::sync::mpsc;

use anyhow::Result;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::PinDriver;
use esp_idf_svc::hal::peripherals::Peripherals;
use log::{debug, info, warn};

use greenhouse::adapters::hardware::HardwareAdapter;
use greenhouse::adapters::log_sink::LogEventSink;
use greenhouse::adapters::time::Esp32TimeAdapter;
use greenhouse::app::service::AppService;
use greenhouse::config::{ThresholdConfig, MAIN_LOOP_PERIOD_MS};
use greenhouse::console::Console;
use greenhouse::drivers::hw_init;
use greenhouse::drivers::switched::SwitchedOutput;
use greenhouse::error::Error;
use greenhouse::events::{self, Event};
use greenhouse::pins;
use greenhouse::sensors::moisture::MoistureSensor;
use greenhouse::sensors::temperature::TemperatureSensor;
use greenhouse::sensors::SensorHub;

// ── Console reader ────────────────────────────────────────────
//
// stdin blocks, so it lives on its own thread and hands complete lines to
// the main loop.  The main loop never waits on the channel.

fn spawn_console_reader() -> Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(4096)
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("console: read failed ({}), retrying", e);
                        FreeRtos::delay_ms(100);
                    }
                }
            }
        })?;
    Ok(rx)
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Greenhouse v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;
    hw_init::init_isr_service()?;
    hw_init::init_console_input()?;

    // Output assignments and polarities: see `pins.rs`.
    let peripherals = Peripherals::take()?;
    let fan = PinDriver::output(peripherals.pins.gpio25)?;
    let relay = PinDriver::output(peripherals.pins.gpio26)?;
    let pump = PinDriver::output(peripherals.pins.gpio27)?;
    let manual_led = PinDriver::output(peripherals.pins.gpio2)?;

    // ── 3. Construct adapters ─────────────────────────────────
    let sensor_hub = SensorHub::new(
        TemperatureSensor::new(pins::TEMP_ADC_CHANNEL),
        MoistureSensor::new(pins::MOISTURE_ADC_CHANNEL),
    );

    let mut hw = HardwareAdapter::new(
        sensor_hub,
        SwitchedOutput::active_high("fan", fan),
        SwitchedOutput::active_low("relay", relay),
        SwitchedOutput::active_high("pump", pump),
        SwitchedOutput::active_high("manual_led", manual_led),
    );

    let clock = Esp32TimeAdapter::new();
    let mut log_sink = LogEventSink::new();

    // ── 4. Construct app service ──────────────────────────────
    let mut app = AppService::new(ThresholdConfig::default());
    app.start(clock.uptime_ms(), &mut hw, &mut log_sink);

    let mut console = Console::new();
    let mut out = String::new();
    console.write_banner(&app, &mut out)?;
    print!("{out}");

    let lines = spawn_console_reader()?;

    info!("System ready. Entering event loop.");

    // ── 5. Event loop ─────────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();

        events::drain_events(|event| match event {
            Event::Panel(input) => {
                app.handle_input(input, now_ms, &mut hw, &mut log_sink);
            }
        });

        let dropped = events::take_dropped_events();
        if dropped > 0 {
            warn!("event queue overflow: {} edge(s) lost", dropped);
        }

        app.tick(now_ms, &mut hw, &mut log_sink);

        while let Ok(line) = lines.try_recv() {
            out.clear();
            match console.handle_line(&line, now_ms, &mut app, &mut hw, &mut log_sink, &mut out) {
                Ok(()) => {}
                Err(Error::Output) => warn!("console: reply truncated"),
                Err(e) => debug!("console: {}", e),
            }
            print!("{out}");
        }

        FreeRtos::delay_ms(MAIN_LOOP_PERIOD_MS);
    }
}
