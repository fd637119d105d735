//! Error-code oracle.
//!
//! Predicts the error code a conforming engine reports for a programmed
//! transfer. Checks are applied in a fixed order and the first failing one
//! wins: source alignment, destination alignment, length alignment, zero
//! length, maximum length, source 4K crossing, destination 4K crossing.

use crate::common::constants::{BEAT_BYTES, BOUNDARY_4K};
use crate::control::regs::ErrorCode;

/// Largest transfer the engine accepts, in bytes.
pub const MAX_TRANSFER_BYTES: u64 = 4096;

fn crosses_4k(addr: u64, len: u64) -> bool {
    (addr % BOUNDARY_4K) + len > BOUNDARY_4K
}

/// Returns the error code expected for a transfer of `len` bytes.
pub fn expected_error(src: u64, dst: u64, len: u64) -> ErrorCode {
    let align = BEAT_BYTES as u64;
    if src % align != 0 {
        ErrorCode::SrcMisaligned
    } else if dst % align != 0 {
        ErrorCode::DstMisaligned
    } else if len % align != 0 {
        ErrorCode::LenMisaligned
    } else if len == 0 {
        ErrorCode::ZeroLength
    } else if len > MAX_TRANSFER_BYTES {
        ErrorCode::LengthTooLarge
    } else if crosses_4k(src, len) {
        ErrorCode::Src4KCross
    } else if crosses_4k(dst, len) {
        ErrorCode::Dst4KCross
    } else {
        ErrorCode::None
    }
}
