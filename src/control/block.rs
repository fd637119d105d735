//! Register Block.
//!
//! The register-decode layer of the control-plane contract. It holds the
//! programmed transfer, reports status and answers `SLVERR` for any offset
//! outside the map. An engine model (or a test) posts results through
//! [`RegisterBlock::complete`].

use tracing::{debug, warn};

use crate::common::data::Resp;
use crate::control::driver::RegisterPort;
use crate::control::regs::{
    Ctrl, ErrorCode, Status, REG_CTRL, REG_DST, REG_LEN, REG_SRC, REG_STATUS, STATUS_DONE,
    STATUS_ERROR,
};

/// A transfer latched by a Start write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    pub src: u32,
    pub dst: u32,
    pub len: u32,
}

/// Control-plane register file.
#[derive(Clone, Debug, Default)]
pub struct RegisterBlock {
    src: u32,
    dst: u32,
    len: u32,
    interrupt_enable: bool,
    status: Status,
    started: Option<TransferRequest>,
}

impl RegisterBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles a register write.
    ///
    /// A Start request is ignored while the engine is busy or while Done or
    /// Error is still pending.
    pub fn write_reg(&mut self, offset: u32, value: u32) -> Resp {
        match offset {
            REG_CTRL => {
                let ctrl = Ctrl::from_bits(value);
                self.interrupt_enable = ctrl.interrupt_enable;
                if ctrl.start {
                    if self.status.busy || self.status.finished() {
                        debug!("start ignored: {:?}", self.status);
                    } else {
                        self.status.busy = true;
                        self.started = Some(TransferRequest {
                            src: self.src,
                            dst: self.dst,
                            len: self.len,
                        });
                    }
                }
            }
            REG_STATUS => {
                if value & STATUS_DONE != 0 {
                    self.status.done = false;
                }
                if value & STATUS_ERROR != 0 {
                    self.status.error = false;
                    self.status.code = Some(ErrorCode::None);
                }
            }
            REG_SRC => self.src = value,
            REG_DST => self.dst = value,
            REG_LEN => self.len = value,
            _ => {
                warn!("write to unmapped register {:#x}", offset);
                return Resp::SlvErr;
            }
        }
        Resp::Okay
    }

    /// Handles a register read. Unmapped offsets read as zero with `SLVERR`.
    pub fn read_reg(&self, offset: u32) -> (u32, Resp) {
        let value = match offset {
            REG_CTRL => Ctrl {
                start: false,
                interrupt_enable: self.interrupt_enable,
            }
            .bits(),
            REG_STATUS => self.status.bits(),
            REG_SRC => self.src,
            REG_DST => self.dst,
            REG_LEN => self.len,
            _ => {
                warn!("read from unmapped register {:#x}", offset);
                return (0, Resp::SlvErr);
            }
        };
        (value, Resp::Okay)
    }

    /// Takes the transfer latched by the last accepted Start.
    pub fn take_start(&mut self) -> Option<TransferRequest> {
        self.started.take()
    }

    /// Posts the end of a transfer. `ErrorCode::None` sets Done; anything
    /// else sets Error and the code.
    pub fn complete(&mut self, code: ErrorCode) {
        self.status.busy = false;
        if code == ErrorCode::None {
            self.status.done = true;
        } else {
            self.status.error = true;
        }
        self.status.code = Some(code);
    }

    /// Returns every register to its power-on value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_busy(&mut self, busy: bool) {
        self.status.busy = busy;
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Interrupt line: Done or Error while InterruptEnable is set.
    pub fn interrupt_pending(&self) -> bool {
        self.interrupt_enable && self.status.finished()
    }
}

impl RegisterPort for RegisterBlock {
    fn write(&mut self, offset: u32, value: u32) -> Resp {
        self.write_reg(offset, value)
    }

    fn read(&mut self, offset: u32) -> (u32, Resp) {
        self.read_reg(offset)
    }
}
