//! Inbound commands to the application service.
//!
//! These represent threshold changes requested over the serial console
//! that the [`AppService`](super::service::AppService) validates and
//! applies.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// New poll interval in seconds.  Must be finite and positive; an
    /// accepted value re-arms the automatic loop.
    SetPollInterval(f32),

    /// Fan runs at or above this temperature (°C).  Any value accepted.
    SetFanThreshold(f32),

    /// Heating relay closes at or below this temperature (°C).  Any value
    /// accepted.
    SetRelayThreshold(f32),

    /// Pump pulses at or below this moisture fraction.  Must lie in
    /// 0.0–1.0.
    SetPumpThreshold(f32),
}
