//! Integration tests for the control-plane register contract.

use axi_dma_bfm::common::{ControlError, Resp};
use axi_dma_bfm::control::block::TransferRequest;
use axi_dma_bfm::control::oracle::expected_error;
use axi_dma_bfm::control::regs::{
    Ctrl, REG_CTRL, REG_DST, REG_LEN, REG_SRC, REG_STATUS, STATUS_BUSY, STATUS_DONE,
    STATUS_ERROR,
};
use axi_dma_bfm::control::{
    decode_status, ControlPlaneDriver, ErrorCode, RegisterBlock, RegisterPort, Status,
};

/// A port whose LEN register drops the low bit.
struct LossyPort {
    inner: RegisterBlock,
}

impl RegisterPort for LossyPort {
    fn write(&mut self, offset: u32, value: u32) -> Resp {
        let value = if offset == REG_LEN { value & !1 } else { value };
        self.inner.write_reg(offset, value)
    }

    fn read(&mut self, offset: u32) -> (u32, Resp) {
        self.inner.read_reg(offset)
    }
}

/// A port that finishes the started transfer after a few polls.
struct SlowEngine {
    regs: RegisterBlock,
    polls: u32,
    finish_after: u32,
    code: ErrorCode,
}

impl RegisterPort for SlowEngine {
    fn write(&mut self, offset: u32, value: u32) -> Resp {
        self.regs.write_reg(offset, value)
    }

    fn read(&mut self, offset: u32) -> (u32, Resp) {
        self.regs.read_reg(offset)
    }

    fn idle(&mut self) {
        self.polls += 1;
        if self.polls == self.finish_after && self.regs.take_start().is_some() {
            self.regs.complete(self.code);
        }
    }
}

/// Tests the human-readable status rendering.
#[test]
fn test_decode_status() {
    assert_eq!(decode_status(0x1), "Done=1 Busy=0 Err=0 Code=NONE");
    assert_eq!(decode_status(0x2), "Done=0 Busy=1 Err=0 Code=NONE");
    assert_eq!(decode_status(0x56), "Done=0 Busy=1 Err=1 Code=4K_SRC");
    assert_eq!(decode_status(0xF4), "Done=0 Busy=0 Err=1 Code=AXI_RESP");
    assert_eq!(decode_status(0xA4), "Done=0 Busy=0 Err=1 Code=UNKNOWN(A)");
}

/// Tests error-code decoding, including undefined encodings.
#[test]
fn test_error_code_decoding() {
    assert_eq!(ErrorCode::try_from(0x0), Ok(ErrorCode::None));
    assert_eq!(ErrorCode::try_from(0x7), Ok(ErrorCode::LengthTooLarge));
    assert_eq!(ErrorCode::try_from(0x9), Ok(ErrorCode::DstTimeout));
    assert_eq!(ErrorCode::try_from(0xF), Ok(ErrorCode::BusResponseError));
    assert_eq!(ErrorCode::try_from(0xA), Err(0xA));
    assert_eq!(ErrorCode::SrcTimeout.bits(), 0x8);
    assert_eq!(ErrorCode::Dst4KCross.to_string(), "4K_DST");
}

/// Tests the CTRL and STATUS bit layouts.
#[test]
fn test_register_layouts() {
    let ctrl = Ctrl {
        start: true,
        interrupt_enable: true,
    };
    assert_eq!(ctrl.bits(), 0x3);
    assert_eq!(
        Ctrl::from_bits(0x2),
        Ctrl {
            start: false,
            interrupt_enable: true,
        }
    );

    let status = Status::from_bits(0x34);
    assert!(status.error);
    assert!(!status.done);
    assert_eq!(status.code, Some(ErrorCode::LenMisaligned));
    assert_eq!(status.bits(), 0x34);
    assert!(status.finished());

    assert_eq!(Status::from_bits(0xB0).code, None);
}

/// Tests that Start latches the programmed transfer and sets Busy.
#[test]
fn test_block_start_latches_transfer() {
    let mut block = RegisterBlock::new();
    assert_eq!(block.write_reg(REG_SRC, 0x1000), Resp::Okay);
    assert_eq!(block.write_reg(REG_DST, 0x2000), Resp::Okay);
    assert_eq!(block.write_reg(REG_LEN, 256), Resp::Okay);
    assert_eq!(block.write_reg(REG_CTRL, 0x1), Resp::Okay);

    assert!(block.status().busy);
    assert_eq!(
        block.take_start(),
        Some(TransferRequest {
            src: 0x1000,
            dst: 0x2000,
            len: 256,
        })
    );
    assert_eq!(block.take_start(), None);
    assert_eq!(block.read_reg(REG_CTRL), (0, Resp::Okay));
}

/// Tests that Start is ignored while busy or while a result is pending.
#[test]
fn test_block_start_blocked() {
    let mut block = RegisterBlock::new();
    block.write_reg(REG_CTRL, 0x1);
    block.take_start();
    block.write_reg(REG_CTRL, 0x1);
    assert_eq!(block.take_start(), None);

    block.complete(ErrorCode::None);
    block.write_reg(REG_CTRL, 0x1);
    assert_eq!(block.take_start(), None);

    block.write_reg(REG_STATUS, STATUS_DONE);
    block.write_reg(REG_CTRL, 0x1);
    assert!(block.take_start().is_some());
}

/// Tests write-one-to-clear on STATUS.
#[test]
fn test_block_status_w1c() {
    let mut block = RegisterBlock::new();
    block.complete(ErrorCode::Dst4KCross);
    let (bits, resp) = block.read_reg(REG_STATUS);
    assert_eq!(resp, Resp::Okay);
    assert_eq!(bits, STATUS_ERROR | 0x60);

    block.set_busy(true);
    block.write_reg(REG_STATUS, STATUS_BUSY);
    assert!(block.status().error);
    assert!(block.status().busy);

    block.write_reg(REG_STATUS, STATUS_ERROR);
    assert_eq!(block.read_reg(REG_STATUS).0, STATUS_BUSY);
}

/// Tests the interrupt line.
#[test]
fn test_block_interrupt() {
    let mut block = RegisterBlock::new();
    block.write_reg(REG_CTRL, 0x1);
    block.complete(ErrorCode::None);
    assert!(!block.interrupt_pending());

    block.write_reg(REG_CTRL, 0x2);
    assert!(block.interrupt_pending());
    block.write_reg(REG_STATUS, STATUS_DONE);
    assert!(!block.interrupt_pending());
}

/// Tests that unmapped offsets answer SLVERR.
#[test]
fn test_block_unmapped_offsets() {
    let mut block = RegisterBlock::new();
    assert_eq!(block.write_reg(0x00, 1), Resp::SlvErr);
    assert_eq!(block.write_reg(0x44, 1), Resp::SlvErr);
    assert_eq!(block.read_reg(0x18), (0, Resp::SlvErr));
    assert_eq!(block.read_reg(REG_SRC), (0, Resp::Okay));
}

/// Tests that reset restores power-on values.
#[test]
fn test_block_reset() {
    let mut block = RegisterBlock::new();
    block.write_reg(REG_SRC, 0x1234);
    block.write_reg(REG_CTRL, 0x3);
    block.complete(ErrorCode::BusResponseError);
    block.reset();
    assert_eq!(block.read_reg(REG_SRC), (0, Resp::Okay));
    assert_eq!(block.read_reg(REG_STATUS), (0, Resp::Okay));
    assert_eq!(block.take_start(), None);
    assert!(!block.interrupt_pending());
}

/// Tests programming and polling a transfer that completes.
#[test]
fn test_driver_program_and_wait() {
    let mut driver = ControlPlaneDriver::new(SlowEngine {
        regs: RegisterBlock::new(),
        polls: 0,
        finish_after: 3,
        code: ErrorCode::None,
    });
    driver.program(0x1000, 0x2000, 64).unwrap();
    driver.start(false).unwrap();

    let status = driver.wait_done(10).unwrap();
    assert!(status.done);
    assert_eq!(status.code, Some(ErrorCode::None));
    assert_eq!(driver.port().polls, 3);

    driver.clear_status().unwrap();
    let bits = driver.read_reg(REG_STATUS).unwrap();
    assert_eq!(bits, 0);
}

/// Tests that an engine error is reported through the status.
#[test]
fn test_driver_reports_engine_error() {
    let mut driver = ControlPlaneDriver::new(SlowEngine {
        regs: RegisterBlock::new(),
        polls: 0,
        finish_after: 1,
        code: ErrorCode::SrcTimeout,
    });
    driver.program(0x1000, 0x2000, 64).unwrap();
    driver.start(true).unwrap();

    let status = driver.wait_done(5).unwrap();
    assert!(status.error);
    assert_eq!(status.code, Some(ErrorCode::SrcTimeout));
    assert!(driver.port().regs.interrupt_pending());
}

/// Tests the poll limit.
#[test]
fn test_driver_poll_timeout() {
    let mut driver = ControlPlaneDriver::new(RegisterBlock::new());
    driver.start(false).unwrap();
    assert_eq!(
        driver.wait_done(4),
        Err(ControlError::PollTimeout { polls: 4 })
    );
}

/// Tests that a LEN readback mismatch is detected.
#[test]
fn test_driver_readback_mismatch() {
    let mut driver = ControlPlaneDriver::new(LossyPort {
        inner: RegisterBlock::new(),
    });
    assert_eq!(
        driver.program(0x1000, 0x2000, 33),
        Err(ControlError::ReadbackMismatch {
            offset: REG_LEN,
            written: 33,
            read: 32,
        })
    );
    driver.program(0x1000, 0x2000, 32).unwrap();
}

/// Tests the expected-rejection helpers.
#[test]
fn test_driver_expect_errors() {
    let mut driver = ControlPlaneDriver::new(RegisterBlock::new());
    driver.expect_write_error(0x20, 0xFFFF_FFFF).unwrap();
    driver.expect_read_error(0x20).unwrap();
    assert_eq!(
        driver.expect_read_error(REG_DST),
        Err(ControlError::UnexpectedOkay { offset: REG_DST })
    );
    assert_eq!(
        driver.write_reg(0x30, 0),
        Err(ControlError::SlaveError { offset: 0x30 })
    );
}

/// Tests the oracle's check order on representative transfers.
#[test]
fn test_oracle_expected_errors() {
    assert_eq!(expected_error(0x1000, 0x2000, 64), ErrorCode::None);
    assert_eq!(expected_error(0x1000, 0x2000, 4096), ErrorCode::None);
    assert_eq!(expected_error(0x1000, 0x2000, 0), ErrorCode::ZeroLength);
    assert_eq!(expected_error(0x1000, 0x2000, 4112), ErrorCode::LengthTooLarge);
    assert_eq!(expected_error(0x1001, 0x2000, 64), ErrorCode::SrcMisaligned);
    assert_eq!(expected_error(0x1000, 0x2001, 64), ErrorCode::DstMisaligned);
    assert_eq!(expected_error(0x1000, 0x2000, 15), ErrorCode::LenMisaligned);
    assert_eq!(expected_error(0xFF0, 0x2000, 32), ErrorCode::Src4KCross);
    assert_eq!(expected_error(0x2000, 0xFF0, 32), ErrorCode::Dst4KCross);
    assert_eq!(expected_error(0x1001, 0x2001, 3), ErrorCode::SrcMisaligned);
    assert_eq!(expected_error(0xFF0, 0xFF0, 8192), ErrorCode::LengthTooLarge);
}
