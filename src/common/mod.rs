//! Common types used throughout the bus-functional model.
//!
//! This module provides the protocol constants, response codes and error
//! types that are shared by the channel handlers, the monitor, the requester
//! and the control-plane helpers.

/// Protocol-wide constants (beat width, burst limits, response encodings).
pub mod constants;

/// Response codes and transfer direction definitions.
pub mod data;

/// Error types for protocol violations and harness failures.
pub mod error;

pub use constants::{BEAT_BYTES, MAX_BURST_BEATS, STRB_ALL};
pub use data::{Direction, Resp};
pub use error::{ControlError, HarnessError, ProtocolViolation};
