//! Error types for the greenhouse firmware.
//!
//! The only failure the controller models is bad operator input at the
//! serial console: a value that does not parse, or one the threshold store
//! refuses. Sensor reads and actuator writes are treated as infallible.
//! All variants are `Copy` so they can be returned from setters and
//! reported without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Threshold validation
// ---------------------------------------------------------------------------

/// A threshold setter refused the value; the previous value is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Poll interval must be a finite number of seconds greater than zero.
    PollIntervalNotPositive(f32),
    /// Pump threshold must be a moisture fraction within `0.0..=1.0`.
    PumpThresholdOutOfRange(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PollIntervalNotPositive(v) => {
                write!(f, "poll interval must be > 0 s (got {v})")
            }
            Self::PumpThresholdOutOfRange(v) => {
                write!(f, "pump threshold must be within 0..=1 (got {v})")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Console input
// ---------------------------------------------------------------------------

/// Errors raised while interpreting a console line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CommandError {
    /// The line was not a single number of the expected kind.
    NotANumber,
    /// A menu choice outside the listed options.
    UnknownChoice(i32),
    /// The number parsed but the threshold store rejected it.
    Rejected(ConfigError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber => write!(f, "not a number"),
            Self::UnknownChoice(n) => write!(f, "unknown menu choice {n}"),
            Self::Rejected(e) => write!(f, "rejected: {e}"),
        }
    }
}

impl From<ConfigError> for CommandError {
    fn from(e: ConfigError) -> Self {
        Self::Rejected(e)
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for CommandError {}

// ---------------------------------------------------------------------------
// Crate error
// ---------------------------------------------------------------------------

/// Top-level error for console line handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    Config(ConfigError),
    Command(CommandError),
    /// The console output sink refused a write.
    Output,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Output => write!(f, "console write failed"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Self::Output
    }
}
