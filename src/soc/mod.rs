//! Memory-side AXI4 endpoint.
//!
//! This module contains the bus-functional model and everything it is built
//! from:
//!
//! * **Signals**: per-tick snapshot of every AXI4 line.
//! * **Memory**: sparse backing store and the timing/fault policy.
//! * **Channels**: read and write channel handler state machines.
//! * **Monitor**: passive protocol invariant checker.
//! * **Bfm**: the scheduler that ties them together.

/// Bus-functional model scheduler.
pub mod bfm;

/// Read and write channel handlers.
pub mod channels;

/// Sparse memory store and timing policy.
pub mod memory;

/// Protocol invariant monitor.
pub mod monitor;

/// AXI4 signal bus definitions.
pub mod signals;

/// Channel handler interface.
pub mod traits;

pub use self::bfm::Bfm;
pub use self::monitor::ProtocolMonitor;
pub use self::signals::SignalBus;
