//! Concrete mode handler functions and table builder.
//!
//! Each mode is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!              [override]
//!  AUTOMATIC ─────────────▶ MANUAL
//!      ▲                      │
//!      └──────[override]──────┘
//!
//!  AUTOMATIC: PollDue ──▶ evaluate thresholds ──▶ fan / relay / pump pulse
//!             PumpPulseElapsed ──▶ pump off
//!  MANUAL:    fan / relay / pump buttons ──▶ toggle that output
//! ```
//!
//! MANUAL is only entered between pulses; the service holds an override
//! that arrives mid-pulse until the pulse has ended.

use log::{debug, info, warn};

use super::context::{Actuator, ControlContext};
use super::{ControlInput, ControlMode, StateDescriptor};
use crate::config::PUMP_PULSE_MS;
use crate::control::automatic::evaluate;
use crate::drivers::button::PanelInput;
use crate::scheduler::TimerId;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static mode table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; ControlMode::COUNT] {
    [
        // Index 0: Automatic
        StateDescriptor {
            id: ControlMode::Automatic,
            name: "Automatic",
            on_enter: Some(automatic_enter),
            on_exit: None,
            on_input: automatic_input,
        },
        // Index 1: Manual
        StateDescriptor {
            id: ControlMode::Manual,
            name: "Manual",
            on_enter: Some(manual_enter),
            on_exit: Some(manual_exit),
            on_input: manual_input,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  AUTOMATIC mode: thresholds drive the outputs on every loop firing
// ═══════════════════════════════════════════════════════════════════════════

fn automatic_enter(ctx: &mut ControlContext) {
    ctx.arm_poll_loop();
    info!(
        "AUTOMATIC: loop armed every {:.2}s",
        ctx.thresholds.poll_interval_secs()
    );
}

fn automatic_input(ctx: &mut ControlContext, input: ControlInput) -> Option<ControlMode> {
    match input {
        ControlInput::Panel(PanelInput::Override) => Some(ControlMode::Manual),
        ControlInput::Panel(other) => {
            debug!("AUTOMATIC: {:?} button ignored", other);
            None
        }
        ControlInput::PollDue => {
            run_control_loop(ctx);
            None
        }
        ControlInput::PumpPulseElapsed => {
            ctx.commands.pump = false;
            None
        }
    }
}

/// One loop firing: compare the reading against the thresholds and set
/// fan and relay; start a pump pulse when the soil is dry.
///
/// A pulse already in flight is left alone: it is neither restarted nor
/// cut short by this firing.
fn run_control_loop(ctx: &mut ControlContext) {
    let thresholds = ctx.thresholds.snapshot();
    let decision = evaluate(&ctx.sensors, &thresholds);
    ctx.loop_firings += 1;

    ctx.commands.fan = decision.fan;
    ctx.commands.relay = decision.relay;

    if ctx.pump_pulse_active() {
        debug!("AUTOMATIC: pump pulse still in flight");
    } else if decision.pump_pulse {
        ctx.commands.pump = true;
        ctx.timers
            .arm_once(TimerId::PumpPulseEnd, PUMP_PULSE_MS, ctx.now_ms);
        ctx.pump_pulses += 1;
    } else {
        ctx.commands.pump = false;
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  MANUAL mode: the operator toggles each output directly
// ═══════════════════════════════════════════════════════════════════════════

fn manual_enter(ctx: &mut ControlContext) {
    if !ctx.cancel_poll_loop() {
        warn!("MANUAL: loop was not armed on entry");
    }
    ctx.commands.manual_buttons = true;
    ctx.commands.manual_led = true;
    info!("MANUAL: loop detached, panel toggles live");
}

fn manual_exit(ctx: &mut ControlContext) {
    ctx.commands.manual_buttons = false;
    ctx.commands.manual_led = false;
}

fn manual_input(ctx: &mut ControlContext, input: ControlInput) -> Option<ControlMode> {
    match input {
        ControlInput::Panel(PanelInput::Override) => return Some(ControlMode::Automatic),
        ControlInput::Panel(PanelInput::Fan) => toggle(ctx, Actuator::Fan),
        ControlInput::Panel(PanelInput::Relay) => toggle(ctx, Actuator::Relay),
        ControlInput::Panel(PanelInput::Pump) => toggle(ctx, Actuator::Pump),
        ControlInput::PollDue => warn!("MANUAL: stray loop firing ignored"),
        ControlInput::PumpPulseElapsed => warn!("MANUAL: stray pulse end ignored"),
    }
    None
}

fn toggle(ctx: &mut ControlContext, actuator: Actuator) {
    let on = ctx.commands.toggle(actuator);
    info!("MANUAL: {:?} -> {}", actuator, if on { "on" } else { "off" });
}
