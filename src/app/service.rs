//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the FSM, the shared context (thresholds, timers,
//! logical outputs) and the per-button debounce guards.  It exposes a
//! hardware-agnostic API.  All I/O flows through port traits injected at
//! call sites, making the entire service testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │        AppService        │
//! ActuatorPort ◀──│ FSM · Scheduler · Guards │
//!    PanelPort ◀──└──────────────────────────┘
//! ```
//!
//! Time is always passed in by the caller (`now_ms`, monotonic ms since
//! boot); the service never sleeps or blocks.

use log::{debug, info};

use crate::config::{ThresholdConfig, DEBOUNCE_MS};
use crate::drivers::button::{EdgeDebouncer, PanelInput};
use crate::error::ConfigError;
use crate::fsm::context::{Actuator, ActuatorCommands, ControlContext, SensorReading};
use crate::fsm::states::build_state_table;
use crate::fsm::{ControlInput, ControlMode, Fsm};
use crate::scheduler::TimerId;

use super::commands::AppCommand;
use super::events::{AppEvent, DropReason, LoopReport, StatusReport};
use super::ports::{ActuatorPort, EventSink, PanelPort, SensorPort};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: ControlContext,
    /// One guard per panel input, indexed by `PanelInput as usize`.
    debounce: [EdgeDebouncer; PanelInput::COUNT],
    /// An override accepted while a pump pulse runs.  Dispatched when the
    /// pulse ends so MANUAL never inherits a pump the loop switched on.
    override_deferred: bool,
}

impl AppService {
    /// Construct the service from thresholds.
    ///
    /// Does **not** start the FSM; call [`start`](Self::start) next.
    pub fn new(config: ThresholdConfig) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), ControlMode::Automatic),
            ctx: ControlContext::new(config),
            debounce: [EdgeDebouncer::new(DEBOUNCE_MS); PanelInput::COUNT],
            override_deferred: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every output off, enter automatic mode and arm the loop.
    /// The first loop firing is one full poll interval after `now_ms`.
    pub fn start(
        &mut self,
        now_ms: u64,
        hw: &mut (impl ActuatorPort + PanelPort),
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = now_ms;
        hw.all_off();
        self.fsm.start(&mut self.ctx);
        self.apply_actuators(hw);
        sink.emit(&AppEvent::Started(self.fsm.current_state()));
        info!("AppService started in {:?}", self.fsm.current_state());
    }

    // ── Panel input ───────────────────────────────────────────

    /// Handle one rising edge from the panel.
    ///
    /// Toggle buttons are discarded unless manual mode has enabled them;
    /// every input is then passed through its debounce guard.  An override
    /// accepted during a pump pulse is held until the pulse ends; a second
    /// one inside the same pulse withdraws it.  Returns whether the edge
    /// was accepted.
    pub fn handle_input(
        &mut self,
        input: PanelInput,
        now_ms: u64,
        hw: &mut (impl ActuatorPort + PanelPort),
        sink: &mut impl EventSink,
    ) -> bool {
        if input.is_manual_toggle() && !self.ctx.commands.manual_buttons {
            debug!("{:?} edge ignored: manual buttons disabled", input);
            sink.emit(&AppEvent::InputDropped {
                input,
                reason: DropReason::ButtonsDisabled,
            });
            return false;
        }
        if !self.debounce[input as usize].accept(now_ms) {
            debug!("{:?} edge ignored: inside debounce window", input);
            sink.emit(&AppEvent::InputDropped {
                input,
                reason: DropReason::Debounce,
            });
            return false;
        }

        self.ctx.now_ms = now_ms;
        if input == PanelInput::Override && self.ctx.pump_pulse_active() {
            self.override_deferred = !self.override_deferred;
            debug!("override deferred until pulse end: {}", self.override_deferred);
            sink.emit(&AppEvent::OverrideDeferred {
                pending: self.override_deferred,
            });
            return true;
        }

        self.dispatch_panel(input, sink);
        self.apply_actuators(hw);
        true
    }

    fn dispatch_panel(&mut self, input: PanelInput, sink: &mut impl EventSink) {
        let prev_mode = self.fsm.current_state();
        let before = self.ctx.commands;

        self.fsm.dispatch(ControlInput::Panel(input), &mut self.ctx);

        let mode = self.fsm.current_state();
        if mode != prev_mode {
            sink.emit(&AppEvent::ModeChanged {
                from: prev_mode,
                to: mode,
            });
        } else {
            emit_toggles(&before, &self.ctx.commands, sink);
        }
    }

    // ── Timers ────────────────────────────────────────────────

    /// Fire every timer due at or before `now_ms`.
    ///
    /// A loop firing samples both sensors through `hw` before the FSM sees
    /// it.  After a stall the loop fires once, not once per missed period.
    /// The end of a pump pulse applies any override held during it.
    pub fn tick(
        &mut self,
        now_ms: u64,
        hw: &mut (impl SensorPort + ActuatorPort + PanelPort),
        sink: &mut impl EventSink,
    ) {
        self.ctx.now_ms = now_ms;
        let expired = self.ctx.timers.expire(now_ms);
        if expired.is_empty() {
            return;
        }

        for id in expired {
            match id {
                TimerId::PollLoop => self.fire_poll_loop(hw, sink),
                TimerId::PumpPulseEnd => {
                    self.fsm
                        .dispatch(ControlInput::PumpPulseElapsed, &mut self.ctx);
                    sink.emit(&AppEvent::PumpPulseEnded);
                    if core::mem::take(&mut self.override_deferred) {
                        self.dispatch_panel(PanelInput::Override, sink);
                    }
                }
            }
        }
        self.apply_actuators(hw);
    }

    fn fire_poll_loop(&mut self, hw: &mut impl SensorPort, sink: &mut impl EventSink) {
        // A deferred override can switch to MANUAL earlier on this tick.
        if self.fsm.current_state() != ControlMode::Automatic {
            debug!("poll loop firing dropped outside automatic mode");
            self.ctx.cancel_poll_loop();
            return;
        }

        let pulses_before = self.ctx.pump_pulses;
        self.ctx.sensors = hw.read_all();
        self.fsm.dispatch(ControlInput::PollDue, &mut self.ctx);

        let c = &self.ctx.commands;
        sink.emit(&AppEvent::LoopFired(LoopReport {
            reading: self.ctx.sensors,
            fan: c.fan,
            relay: c.relay,
            pump: c.pump,
            pulse_started: self.ctx.pump_pulses != pulses_before,
        }));
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply a threshold change from the console.
    ///
    /// A rejected value leaves the thresholds and the loop untouched.  An
    /// accepted poll interval re-arms the loop (automatic mode only) so
    /// the next firing is one new period after `now_ms`.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now_ms: u64,
        sink: &mut impl EventSink,
    ) -> Result<(), ConfigError> {
        self.ctx.now_ms = now_ms;
        let store = &mut self.ctx.thresholds;

        let result = match cmd {
            AppCommand::SetPollInterval(secs) => store.set_poll_interval_secs(secs),
            AppCommand::SetFanThreshold(c) => {
                store.set_fan_on_at_or_above_c(c);
                Ok(())
            }
            AppCommand::SetRelayThreshold(c) => {
                store.set_relay_on_at_or_below_c(c);
                Ok(())
            }
            AppCommand::SetPumpThreshold(f) => store.set_pump_on_at_or_below(f),
        };

        if let Err(e) = result {
            sink.emit(&AppEvent::ThresholdRejected(e));
            return Err(e);
        }

        if matches!(cmd, AppCommand::SetPollInterval(_))
            && self.fsm.current_state() == ControlMode::Automatic
        {
            self.ctx.arm_poll_loop();
        }
        sink.emit(&AppEvent::ThresholdsChanged(self.ctx.thresholds.snapshot()));
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Take a fresh reading on demand.  Does not affect control state.
    pub fn read_sensors(&self, hw: &mut impl SensorPort) -> SensorReading {
        hw.read_all()
    }

    /// Current mode.
    pub fn mode(&self) -> ControlMode {
        self.fsm.current_state()
    }

    /// Copy of the live thresholds.
    pub fn thresholds(&self) -> ThresholdConfig {
        self.ctx.thresholds.snapshot()
    }

    /// Logical output states as last commanded.
    pub fn outputs(&self) -> ActuatorCommands {
        self.ctx.commands
    }

    pub fn poll_loop_armed(&self) -> bool {
        self.ctx.poll_loop_armed()
    }

    /// When the next automatic firing is due, if the loop is armed.
    pub fn next_poll_due_ms(&self) -> Option<u64> {
        self.ctx.timers.due_at(TimerId::PollLoop)
    }

    pub fn pump_pulse_active(&self) -> bool {
        self.ctx.pump_pulse_active()
    }

    /// An override press is waiting for the running pump pulse to end.
    pub fn override_pending(&self) -> bool {
        self.override_deferred
    }

    /// Automatic loop firings since start.
    pub fn loop_firings(&self) -> u64 {
        self.ctx.loop_firings
    }

    pub fn status(&self) -> StatusReport {
        StatusReport {
            mode: self.fsm.current_state(),
            outputs: self.ctx.commands,
            thresholds: self.ctx.thresholds.snapshot(),
            poll_loop_armed: self.ctx.poll_loop_armed(),
            pump_pulse_active: self.ctx.pump_pulse_active(),
            override_pending: self.override_deferred,
            loop_firings: self.ctx.loop_firings,
            pump_pulses: self.ctx.pump_pulses,
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate FSM commands into port calls.
    fn apply_actuators(&self, hw: &mut (impl ActuatorPort + PanelPort)) {
        let cmds = &self.ctx.commands;
        hw.set_fan(cmds.fan);
        hw.set_relay(cmds.relay);
        hw.set_pump(cmds.pump);
        hw.set_manual_led(cmds.manual_led);
        hw.set_manual_buttons_enabled(cmds.manual_buttons);
    }
}

fn emit_toggles(before: &ActuatorCommands, after: &ActuatorCommands, sink: &mut impl EventSink) {
    for actuator in [Actuator::Fan, Actuator::Relay, Actuator::Pump] {
        let on = after.get(actuator);
        if before.get(actuator) != on {
            sink.emit(&AppEvent::ManualToggle { actuator, on });
        }
    }
}
