//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(mode) => {
                info!("START | initial_mode={:?}", mode);
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {:?} -> {:?}", from, to);
            }
            AppEvent::OverrideDeferred { pending } => {
                info!("MODE | override pending={} (pump pulse running)", pending);
            }
            AppEvent::LoopFired(r) => {
                info!(
                    "LOOP | T={:.2}\u{00b0}C | moisture={:.3} | fan={} relay={} pump={}{}",
                    r.reading.temperature_c,
                    r.reading.moisture,
                    on_off(r.fan),
                    on_off(r.relay),
                    on_off(r.pump),
                    if r.pulse_started { " (pulse)" } else { "" },
                );
            }
            AppEvent::PumpPulseEnded => {
                info!("PUMP | pulse ended");
            }
            AppEvent::ManualToggle { actuator, on } => {
                info!("MANUAL | {:?}={}", actuator, on_off(*on));
            }
            AppEvent::ThresholdsChanged(t) => {
                info!(
                    "CONFIG | poll={:.2}s fan>={:.2}\u{00b0}C relay<={:.2}\u{00b0}C pump<={:.3}",
                    t.poll_interval_secs,
                    t.fan_on_at_or_above_c,
                    t.relay_on_at_or_below_c,
                    t.pump_on_at_or_below,
                );
            }
            AppEvent::ThresholdRejected(e) => {
                warn!("CONFIG | rejected: {}", e);
            }
            AppEvent::InputDropped { input, reason } => {
                debug!("INPUT | {:?} dropped ({:?})", input, reason);
            }
        }
    }
}
