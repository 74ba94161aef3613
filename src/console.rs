//! Line-oriented serial menu.
//!
//! The console is a two-state machine: it either waits for a menu choice
//! or, after choices 2–5, for the new value of one threshold.  Each call
//! to [`Console::handle_line`] consumes one complete line and writes its
//! reply to any [`core::fmt::Write`] sink.  Threshold changes go through
//! [`AppService::handle_command`], never straight into the store.
//!
//! ```text
//!   ┌──────────┐  "2".."5"   ┌───────────────┐
//!   │ AwaitMenu│────────────▶│ AwaitValue(f) │
//!   │          │◀────────────│               │
//!   └──────────┘  any value  └───────────────┘
//! ```
//!
//! Blank lines are ignored in both states.

use core::fmt::Write;

use crate::app::commands::AppCommand;
use crate::app::ports::{EventSink, SensorPort};
use crate::app::service::AppService;
use crate::config::ThresholdConfig;
use crate::error::{CommandError, Error};
use crate::fsm::context::SensorReading;

const MSG_INVALID: &str = "That is not a valid input";
const MSG_OUT_OF_RANGE: &str = "Please enter a number between 1 and 7";

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ReadSensors = 1,
    PollTime = 2,
    FanThreshold = 3,
    RelayThreshold = 4,
    PumpThreshold = 5,
    PrintThresholds = 6,
    PrintStatus = 7,
}

impl MenuChoice {
    pub fn from_number(n: i32) -> Option<Self> {
        match n {
            1 => Some(Self::ReadSensors),
            2 => Some(Self::PollTime),
            3 => Some(Self::FanThreshold),
            4 => Some(Self::RelayThreshold),
            5 => Some(Self::PumpThreshold),
            6 => Some(Self::PrintThresholds),
            7 => Some(Self::PrintStatus),
            _ => None,
        }
    }

    /// The threshold this choice edits, if any.
    fn field(self) -> Option<ThresholdField> {
        match self {
            Self::PollTime => Some(ThresholdField::PollInterval),
            Self::FanThreshold => Some(ThresholdField::Fan),
            Self::RelayThreshold => Some(ThresholdField::Relay),
            Self::PumpThreshold => Some(ThresholdField::Pump),
            _ => None,
        }
    }
}

/// A threshold editable from the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdField {
    PollInterval,
    Fan,
    Relay,
    Pump,
}

impl ThresholdField {
    fn prompt(self) -> &'static str {
        match self {
            Self::PollInterval => "Enter a new poll time in seconds:",
            Self::Fan => "Enter a new fan threshold in degrees celsius:",
            Self::Relay => "Enter a new relay threshold in degrees celsius:",
            Self::Pump => "Enter a new pump threshold as a real number between 0 and 1:",
        }
    }

    fn command(self, value: f32) -> AppCommand {
        match self {
            Self::PollInterval => AppCommand::SetPollInterval(value),
            Self::Fan => AppCommand::SetFanThreshold(value),
            Self::Relay => AppCommand::SetRelayThreshold(value),
            Self::Pump => AppCommand::SetPumpThreshold(value),
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a menu line: one integer in 1..=7, surrounding whitespace allowed.
pub fn parse_choice(line: &str) -> Result<MenuChoice, CommandError> {
    let n: i32 = line.trim().parse().map_err(|_| CommandError::NotANumber)?;
    MenuChoice::from_number(n).ok_or(CommandError::UnknownChoice(n))
}

/// Parse a threshold value line as `f32`.
pub fn parse_value(line: &str) -> Result<f32, CommandError> {
    line.trim().parse().map_err(|_| CommandError::NotANumber)
}

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Console {
    pending: Option<ThresholdField>,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// The field whose value the next line will be read as, if any.
    pub fn awaiting_value(&self) -> Option<ThresholdField> {
        self.pending
    }

    /// Startup banner, current parameters and the menu.
    pub fn write_banner(&self, app: &AppService, out: &mut impl Write) -> Result<(), Error> {
        writeln!(out)?;
        writeln!(out, "System Started")?;
        write_thresholds(out, &app.thresholds())?;
        write_menu(out)?;
        Ok(())
    }

    /// Consume one input line.
    ///
    /// A rejected line is answered on `out` and also returned as
    /// `Err(Error::Command(..))`; the console is ready for the next line
    /// either way.
    pub fn handle_line(
        &mut self,
        line: &str,
        now_ms: u64,
        app: &mut AppService,
        hw: &mut impl SensorPort,
        sink: &mut impl EventSink,
        out: &mut impl Write,
    ) -> Result<(), Error> {
        if line.trim().is_empty() {
            return Ok(());
        }

        if let Some(field) = self.pending.take() {
            let outcome = parse_value(line).and_then(|value| {
                app.handle_command(field.command(value), now_ms, sink)
                    .map_err(CommandError::from)
            });
            if outcome.is_err() {
                writeln!(out, "{MSG_INVALID}")?;
            }
            write_menu(out)?;
            return outcome.map_err(Error::from);
        }

        let choice = match parse_choice(line) {
            Ok(choice) => choice,
            Err(e) => {
                let msg = match e {
                    CommandError::UnknownChoice(_) => MSG_OUT_OF_RANGE,
                    _ => MSG_INVALID,
                };
                writeln!(out, "{msg}")?;
                write_menu(out)?;
                return Err(e.into());
            }
        };

        if let Some(field) = choice.field() {
            writeln!(out)?;
            writeln!(out, "{}", field.prompt())?;
            self.pending = Some(field);
            return Ok(());
        }

        match choice {
            MenuChoice::ReadSensors => write_reading(out, &app.read_sensors(hw))?,
            MenuChoice::PrintThresholds => write_thresholds(out, &app.thresholds())?,
            MenuChoice::PrintStatus => match serde_json::to_string(&app.status()) {
                Ok(json) => writeln!(out, "{json}")?,
                Err(e) => {
                    log::warn!("console: status serialisation failed: {}", e);
                    writeln!(out, "status unavailable")?;
                }
            },
            _ => {}
        }
        write_menu(out)?;
        Ok(())
    }
}

fn write_menu(out: &mut impl Write) -> core::fmt::Result {
    writeln!(out)?;
    writeln!(out, "Welcome to the main menu for the automatic greenhouse")?;
    writeln!(out, "1) Read Sensor Inputs")?;
    writeln!(out, "2) Change Poll Time")?;
    writeln!(out, "3) Change Fan Threshold")?;
    writeln!(out, "4) Change Relay Threshold")?;
    writeln!(out, "5) Change Pump Threshold")?;
    writeln!(out, "6) Print Current Thresholds and Poll Time")?;
    writeln!(out, "7) Print Status as JSON")
}

fn write_thresholds(out: &mut impl Write, t: &ThresholdConfig) -> core::fmt::Result {
    writeln!(out)?;
    writeln!(out, "Fan Threshold: {:.2} degrees celsius", t.fan_on_at_or_above_c)?;
    writeln!(out, "Relay Threshold: {:.2} degrees celsius", t.relay_on_at_or_below_c)?;
    writeln!(
        out,
        "Pump Threshold: {:.2}% moisture content",
        t.pump_on_at_or_below * 100.0
    )?;
    writeln!(out, "Poll Time: {:.2} seconds", t.poll_interval_secs)
}

fn write_reading(out: &mut impl Write, r: &SensorReading) -> core::fmt::Result {
    writeln!(out)?;
    writeln!(out, "Start Sensor Reading")?;
    writeln!(out, "Degrees Celsius {:.2}", r.temperature_c)?;
    writeln!(out, "Moisture Value {:.4}", r.moisture)
}
