//! Response Codes and Transfer Direction.
//!
//! These small value types travel on the signal bus and inside requester
//! completions. The response encoding matches the two-bit `xRESP` field of
//! the AXI4 read-data and write-response channels.

use std::fmt;

use super::constants::{RESP_OKAY, RESP_SLVERR};

/// Response code driven on the read-data and write-response channels.
///
/// Only the two codes the memory model can produce are represented; any
/// other encoding is rejected by [`Resp::from_bits`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Resp {
    /// Normal access success.
    #[default]
    Okay,

    /// Slave error. The access reached the slave but failed.
    SlvErr,
}

impl Resp {
    /// Returns the two-bit wire encoding of the response.
    pub fn bits(self) -> u8 {
        match self {
            Resp::Okay => RESP_OKAY,
            Resp::SlvErr => RESP_SLVERR,
        }
    }

    /// Decodes a wire response, returning `None` for unsupported encodings.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            RESP_OKAY => Some(Resp::Okay),
            RESP_SLVERR => Some(Resp::SlvErr),
            _ => None,
        }
    }

    /// Returns `true` for any non-success response.
    pub fn is_error(self) -> bool {
        self != Resp::Okay
    }
}

impl fmt::Display for Resp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resp::Okay => write!(f, "OKAY"),
            Resp::SlvErr => write!(f, "SLVERR"),
        }
    }
}

/// Direction of a burst as seen from the requester.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Memory to requester (AR + R channels).
    Read,

    /// Requester to memory (AW + W + B channels).
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Read => write!(f, "RD"),
            Direction::Write => write!(f, "WR"),
        }
    }
}
