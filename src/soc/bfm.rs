//! Bus-Functional Model.
//!
//! This module defines the `Bfm` structure, the container for the memory-side
//! endpoint: memory store, timing policy, the two channel handlers and the
//! protocol monitor. It is advanced once per rising edge by [`Bfm::tick`].

#[cfg(feature = "always-trace")]
use tracing::trace;

use crate::common::error::ProtocolViolation;
use crate::config::BfmConfig;
use crate::soc::channels::{ReadChannelHandler, WriteChannelHandler};
use crate::soc::memory::controller::TimingPolicy;
use crate::soc::memory::SparseMemory;
use crate::soc::monitor::ProtocolMonitor;
use crate::soc::signals::{SignalBus, SlaveSignals};
use crate::soc::traits::{ChannelHandler, ChannelState, HandlerContext};
use crate::stats::BfmStats;

/// Memory-side AXI4 endpoint.
///
/// Owns every resource the handlers share and lends them out one tick at a
/// time, so the handlers never hold references across ticks.
pub struct Bfm {
    memory: SparseMemory,
    policy: TimingPolicy,
    read: ReadChannelHandler,
    write: WriteChannelHandler,
    monitor: ProtocolMonitor,
    driven: SlaveSignals,
    stats: BfmStats,
}

impl Bfm {
    /// Creates a BFM with empty memory and the configured timing policy.
    ///
    /// # Arguments
    ///
    /// * `config` - The `[bfm]` table: delay injection switch, seed and bounds.
    ///
    /// # Returns
    ///
    /// A new `Bfm` with both handlers Idle and every output deasserted.
    pub fn new(config: &BfmConfig) -> Self {
        Self {
            memory: SparseMemory::new(),
            policy: TimingPolicy::from_config(config),
            read: ReadChannelHandler::new(),
            write: WriteChannelHandler::new(),
            monitor: ProtocolMonitor::new(),
            driven: SlaveSignals::default(),
            stats: BfmStats::default(),
        }
    }

    /// Advances the model by one tick.
    ///
    /// The monitor checks the snapshot first; a violation aborts the tick
    /// before any handler runs. Otherwise both handlers advance against the
    /// same snapshot and their outputs are merged into the lines driven
    /// until the next edge.
    ///
    /// # Arguments
    ///
    /// * `bus` - Snapshot of the current edge. `bus.slave` must be what this
    ///   model returned on the previous tick.
    pub fn tick(&mut self, bus: &SignalBus) -> Result<&SlaveSignals, ProtocolViolation> {
        #[cfg(feature = "always-trace")]
        trace!(tick = self.stats.ticks, ?bus, "bus snapshot");

        self.stats.ticks += 1;
        if bus.reset {
            self.stats.reset_ticks += 1;
        }

        self.monitor.observe(bus)?;

        let mut ctx = HandlerContext {
            memory: &mut self.memory,
            policy: &mut self.policy,
            stats: &mut self.stats,
        };
        let (_, read) = self.read.advance(bus, &mut ctx);
        let (_, write) = self.write.advance(bus, &mut ctx);

        self.driven = SlaveSignals::merge(read, write);
        Ok(&self.driven)
    }

    /// Returns the lines driven since the last tick.
    pub fn driven(&self) -> &SlaveSignals {
        &self.driven
    }

    /// Returns `true` when both handlers are Idle.
    pub fn is_idle(&self) -> bool {
        self.read.is_idle() && self.write.is_idle()
    }

    pub fn read_state(&self) -> ChannelState {
        self.read.state()
    }

    pub fn write_state(&self) -> ChannelState {
        self.write.state()
    }

    pub fn read_handler(&self) -> &ReadChannelHandler {
        &self.read
    }

    pub fn write_handler(&self) -> &WriteChannelHandler {
        &self.write
    }

    pub fn memory(&self) -> &SparseMemory {
        &self.memory
    }

    /// Mutable access for preloading and clearing the store between transfers.
    pub fn memory_mut(&mut self) -> &mut SparseMemory {
        &mut self.memory
    }

    pub fn policy(&self) -> &TimingPolicy {
        &self.policy
    }

    /// Mutable access to the timing and fault knobs.
    pub fn policy_mut(&mut self) -> &mut TimingPolicy {
        &mut self.policy
    }

    pub fn monitor(&self) -> &ProtocolMonitor {
        &self.monitor
    }

    pub fn stats(&self) -> &BfmStats {
        &self.stats
    }
}

impl Default for Bfm {
    fn default() -> Self {
        Self::new(&BfmConfig::default())
    }
}
