//! Control-Plane Driver.
//!
//! Issues register accesses through a [`RegisterPort`] to program a
//! transfer, start it and poll for its completion. Any `SLVERR` on an access
//! that should succeed is reported as [`ControlError::SlaveError`].

use tracing::info;

use crate::common::data::Resp;
use crate::common::error::ControlError;
use crate::control::regs::{
    decode_status, Ctrl, Status, REG_CTRL, REG_DST, REG_LEN, REG_SRC, REG_STATUS, STATUS_W1C,
};

/// A single-beat register access path.
pub trait RegisterPort {
    /// Writes `value` at `offset` and returns the write response.
    fn write(&mut self, offset: u32, value: u32) -> Resp;

    /// Reads `offset`, returning the data and the read response.
    fn read(&mut self, offset: u32) -> (u32, Resp);

    /// Called between status polls. Ports backed by a clocked model advance
    /// time here.
    fn idle(&mut self) {}
}

/// Register-level driver for the DMA engine.
pub struct ControlPlaneDriver<P: RegisterPort> {
    port: P,
}

impl<P: RegisterPort> ControlPlaneDriver<P> {
    pub fn new(port: P) -> Self {
        Self { port }
    }

    pub fn write_reg(&mut self, offset: u32, value: u32) -> Result<(), ControlError> {
        match self.port.write(offset, value) {
            Resp::Okay => Ok(()),
            Resp::SlvErr => Err(ControlError::SlaveError { offset }),
        }
    }

    pub fn read_reg(&mut self, offset: u32) -> Result<u32, ControlError> {
        match self.port.read(offset) {
            (value, Resp::Okay) => Ok(value),
            (_, Resp::SlvErr) => Err(ControlError::SlaveError { offset }),
        }
    }

    /// Writes to an offset that must be rejected.
    pub fn expect_write_error(&mut self, offset: u32, value: u32) -> Result<(), ControlError> {
        match self.port.write(offset, value) {
            Resp::SlvErr => Ok(()),
            Resp::Okay => Err(ControlError::UnexpectedOkay { offset }),
        }
    }

    /// Reads an offset that must be rejected.
    pub fn expect_read_error(&mut self, offset: u32) -> Result<(), ControlError> {
        match self.port.read(offset) {
            (_, Resp::SlvErr) => Ok(()),
            (_, Resp::Okay) => Err(ControlError::UnexpectedOkay { offset }),
        }
    }

    /// Programs SRC, DST and LEN, then reads LEN back.
    pub fn program(&mut self, src: u32, dst: u32, len: u32) -> Result<(), ControlError> {
        info!("[DMA] program src={:#x} dst={:#x} len={}", src, dst, len);
        self.write_reg(REG_SRC, src)?;
        self.write_reg(REG_DST, dst)?;
        self.write_reg(REG_LEN, len)?;
        let read = self.read_reg(REG_LEN)?;
        if read != len {
            return Err(ControlError::ReadbackMismatch {
                offset: REG_LEN,
                written: len,
                read,
            });
        }
        Ok(())
    }

    pub fn start(&mut self, interrupt_enable: bool) -> Result<(), ControlError> {
        let ctrl = Ctrl {
            start: true,
            interrupt_enable,
        };
        self.write_reg(REG_CTRL, ctrl.bits())
    }

    /// Polls STATUS until Done or Error is set.
    ///
    /// # Returns
    ///
    /// The final status, or `PollTimeout` after `max_polls` reads.
    pub fn wait_done(&mut self, max_polls: u32) -> Result<Status, ControlError> {
        for _ in 0..max_polls {
            let bits = self.read_reg(REG_STATUS)?;
            let status = Status::from_bits(bits);
            if status.finished() {
                info!("[DMA] completed | Status: {}", decode_status(bits));
                return Ok(status);
            }
            self.port.idle();
        }
        Err(ControlError::PollTimeout { polls: max_polls })
    }

    /// Clears Done and Error (write-1-to-clear).
    pub fn clear_status(&mut self) -> Result<(), ControlError> {
        self.write_reg(REG_STATUS, STATUS_W1C)
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn into_inner(self) -> P {
        self.port
    }
}
