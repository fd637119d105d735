//! Control-plane contract model.
//!
//! The DMA engine is programmed through a small register interface. This
//! module describes that interface and drives it; the engine itself is not
//! modelled.

/// Register-decode model of the engine's register file.
pub mod block;

/// Register-level driver.
pub mod driver;

/// Expected error codes for programmed transfers.
pub mod oracle;

/// Register offsets, bit layouts and error codes.
pub mod regs;

pub use block::RegisterBlock;
pub use driver::{ControlPlaneDriver, RegisterPort};
pub use regs::{decode_status, ErrorCode, Status};
