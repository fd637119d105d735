//! Control-plane register map.
//!
//! Offsets, bit layouts and error codes of the DMA engine's register
//! interface. The layout is fixed by the engine:
//!
//! | Offset | Register | Notes                                   |
//! |--------|----------|-----------------------------------------|
//! | `0x04` | CTRL     | bit0 Start, bit1 InterruptEnable        |
//! | `0x08` | STATUS   | bit0 Done, bit1 Busy, bit2 Error, [7:4] |
//! | `0x0C` | SRC      | source byte address                     |
//! | `0x10` | DST      | destination byte address                |
//! | `0x14` | LEN      | transfer length in bytes                |

use std::fmt;

pub const REG_CTRL: u32 = 0x04;
pub const REG_STATUS: u32 = 0x08;
pub const REG_SRC: u32 = 0x0C;
pub const REG_DST: u32 = 0x10;
pub const REG_LEN: u32 = 0x14;

pub const CTRL_START: u32 = 1 << 0;
pub const CTRL_INT_EN: u32 = 1 << 1;

pub const STATUS_DONE: u32 = 1 << 0;
pub const STATUS_BUSY: u32 = 1 << 1;
pub const STATUS_ERROR: u32 = 1 << 2;
pub const STATUS_CODE_SHIFT: u32 = 4;
pub const STATUS_CODE_MASK: u32 = 0xF << STATUS_CODE_SHIFT;

/// STATUS bits cleared by writing 1.
pub const STATUS_W1C: u32 = STATUS_DONE | STATUS_ERROR;

/// Error code reported in `STATUS[7:4]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    #[default]
    None = 0x0,
    SrcMisaligned = 0x1,
    DstMisaligned = 0x2,
    LenMisaligned = 0x3,
    ZeroLength = 0x4,
    Src4KCross = 0x5,
    Dst4KCross = 0x6,
    LengthTooLarge = 0x7,
    SrcTimeout = 0x8,
    DstTimeout = 0x9,
    BusResponseError = 0xF,
}

impl ErrorCode {
    /// Short mnemonic used in status dumps.
    pub fn name(self) -> &'static str {
        match self {
            ErrorCode::None => "NONE",
            ErrorCode::SrcMisaligned => "ALIGN_SRC",
            ErrorCode::DstMisaligned => "ALIGN_DST",
            ErrorCode::LenMisaligned => "ALIGN_LEN",
            ErrorCode::ZeroLength => "ZERO_LEN",
            ErrorCode::Src4KCross => "4K_SRC",
            ErrorCode::Dst4KCross => "4K_DST",
            ErrorCode::LengthTooLarge => "LEN_LARGE",
            ErrorCode::SrcTimeout => "TIMEOUT_SRC",
            ErrorCode::DstTimeout => "TIMEOUT_DST",
            ErrorCode::BusResponseError => "AXI_RESP",
        }
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ErrorCode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, u8> {
        Ok(match value {
            0x0 => ErrorCode::None,
            0x1 => ErrorCode::SrcMisaligned,
            0x2 => ErrorCode::DstMisaligned,
            0x3 => ErrorCode::LenMisaligned,
            0x4 => ErrorCode::ZeroLength,
            0x5 => ErrorCode::Src4KCross,
            0x6 => ErrorCode::Dst4KCross,
            0x7 => ErrorCode::LengthTooLarge,
            0x8 => ErrorCode::SrcTimeout,
            0x9 => ErrorCode::DstTimeout,
            0xF => ErrorCode::BusResponseError,
            other => return Err(other),
        })
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded CTRL register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Ctrl {
    pub start: bool,
    pub interrupt_enable: bool,
}

impl Ctrl {
    pub fn from_bits(bits: u32) -> Self {
        Self {
            start: bits & CTRL_START != 0,
            interrupt_enable: bits & CTRL_INT_EN != 0,
        }
    }

    pub fn bits(self) -> u32 {
        (self.start as u32) | (self.interrupt_enable as u32) << 1
    }
}

/// Decoded STATUS register.
///
/// `code` is `None` when the raw field holds an encoding outside the
/// defined set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Status {
    pub done: bool,
    pub busy: bool,
    pub error: bool,
    pub code: Option<ErrorCode>,
}

impl Status {
    pub fn from_bits(bits: u32) -> Self {
        let raw = ((bits & STATUS_CODE_MASK) >> STATUS_CODE_SHIFT) as u8;
        Self {
            done: bits & STATUS_DONE != 0,
            busy: bits & STATUS_BUSY != 0,
            error: bits & STATUS_ERROR != 0,
            code: ErrorCode::try_from(raw).ok(),
        }
    }

    pub fn bits(self) -> u32 {
        let code = self.code.unwrap_or_default().bits() as u32;
        (self.done as u32)
            | (self.busy as u32) << 1
            | (self.error as u32) << 2
            | code << STATUS_CODE_SHIFT
    }

    /// Returns `true` once the engine has finished, successfully or not.
    pub fn finished(self) -> bool {
        self.done || self.error
    }
}

/// Renders a raw STATUS value, e.g. `Done=1 Busy=0 Err=0 Code=NONE`.
pub fn decode_status(bits: u32) -> String {
    let raw = (bits & STATUS_CODE_MASK) >> STATUS_CODE_SHIFT;
    let code = match ErrorCode::try_from(raw as u8) {
        Ok(code) => code.name().to_string(),
        Err(_) => format!("UNKNOWN({:X})", raw),
    };
    format!(
        "Done={} Busy={} Err={} Code={}",
        bits & STATUS_DONE,
        (bits & STATUS_BUSY) >> 1,
        (bits & STATUS_ERROR) >> 2,
        code
    )
}
