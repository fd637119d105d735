//! Error Types.
//!
//! Three families of failure exist in the harness. Protocol violations are
//! detected by the monitor and are fatal to a run. Harness errors cover the
//! plumbing around a run (configuration, I/O, malformed jobs, timeouts).
//! Control errors come from register accesses on the control plane.
//!
//! Transfer-level faults such as `SLVERR` responses or watchdog aborts are
//! *not* errors here; they are ordinary values reported in completions.

use thiserror::Error;

use crate::soc::signals::{AddrPayload, Channel, WriteData};

/// A breach of the handshake-stability or burst-length contract by the
/// requester, as observed by the protocol monitor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// An address channel changed its payload while valid was held and
    /// ready had not yet been granted.
    #[error("AXI violation: {channel} channel unstable while waiting for ready: {previous} -> {current}")]
    UnstableAddress {
        channel: Channel,
        previous: AddrPayload,
        current: AddrPayload,
    },

    /// The write-data channel changed data, strobe or last while stalled.
    #[error("AXI violation: W channel unstable while waiting for ready: {previous} -> {current}")]
    UnstableWriteData {
        previous: WriteData,
        current: WriteData,
    },

    /// `WLAST` was asserted before the declared number of beats.
    #[error("AXI violation: WLAST asserted at beat {beat} but burst declares {declared} beats")]
    EarlyLast { beat: u32, declared: u32 },

    /// The declared final beat was accepted without `WLAST`.
    #[error("AXI violation: WLAST not asserted on beat {beat} of a {declared}-beat burst")]
    MissingLast { beat: u32, declared: u32 },

    /// A second write address was accepted while a burst was still being
    /// counted. This is a limitation of the monitor, not of the protocol.
    #[error("monitor limitation: only one outstanding write burst is tracked (new burst declares {declared} beats)")]
    OutstandingWriteLimit { declared: u32 },
}

/// Errors raised by the harness around a simulation run.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),

    #[error("invalid burst at {addr:#x}: {reason}")]
    InvalidBurst { addr: u64, reason: String },

    #[error("simulation did not settle within {ticks} ticks")]
    Timeout { ticks: u64 },

    #[error("scenario failed: {0}")]
    ScenarioFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the control-plane driver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("register access at offset {offset:#x} returned SLVERR")]
    SlaveError { offset: u32 },

    #[error("status did not report Done or Error after {polls} polls")]
    PollTimeout { polls: u32 },

    #[error("register readback mismatch at {offset:#x}: wrote {written:#x}, read {read:#x}")]
    ReadbackMismatch { offset: u32, written: u32, read: u32 },

    #[error("register access at offset {offset:#x} returned OKAY, expected SLVERR")]
    UnexpectedOkay { offset: u32 },
}
