//! Protocol constants.
//!
//! The modelled data bus is 128 bits wide, so every beat carries 16 bytes and
//! the write strobe has one bit per byte lane.

/// Number of bytes carried by one data beat.
pub const BEAT_BYTES: usize = 16;

/// Maximum number of beats in one INCR burst (`AxLEN` is 8 bits).
pub const MAX_BURST_BEATS: usize = 256;

/// Write strobe with every byte lane enabled.
pub const STRB_ALL: u16 = 0xFFFF;

/// Size of the address window a single burst must not cross.
pub const BOUNDARY_4K: u64 = 0x1000;

/// Encoded `OKAY` response.
pub const RESP_OKAY: u8 = 0;

/// Encoded `SLVERR` response.
pub const RESP_SLVERR: u8 = 2;
