//! Response-side channel handlers.
//!
//! The read and write handlers are independent state machines. Each observes
//! the same per-tick [`SignalBus`](crate::soc::signals::SignalBus) snapshot
//! and drives a disjoint set of slave lines.

/// Read-address and read-data channel handler.
pub mod read;

/// Write-address, write-data and write-response channel handler.
pub mod write;

pub use read::ReadChannelHandler;
pub use write::WriteChannelHandler;
