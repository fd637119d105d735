//! Channel Handler Interfaces.
//!
//! This module defines the common interface implemented by the read and write
//! channel handlers. Each handler is an explicit state machine advanced once
//! per tick by the scheduler; it never blocks and never yields mid-tick.

use crate::soc::memory::controller::TimingPolicy;
use crate::soc::memory::SparseMemory;
use crate::soc::signals::SignalBus;
use crate::stats::BfmStats;

/// Coarse lifecycle state of a channel handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChannelState {
    /// No burst in flight.
    #[default]
    Idle,
    /// Address-valid observed; the handshake has not been granted yet.
    AwaitingAddressHandshake,
    /// Burst descriptor captured; data beats are being transferred.
    InDataPhase,
    /// All write beats collected; the write response is pending (write only).
    AwaitingResponseHandshake,
}

/// Resources lent to a handler for the duration of one tick.
pub struct HandlerContext<'a> {
    pub memory: &'a mut SparseMemory,
    pub policy: &'a mut TimingPolicy,
    pub stats: &'a mut BfmStats,
}

/// A response-side channel handler.
///
/// Handlers own only their burst state. Memory, the timing policy and the
/// statistics are owned by the scheduler and lent through a
/// [`HandlerContext`].
pub trait ChannelHandler {
    /// Lines this handler drives.
    type Drive: Default;

    /// Advances the handler by one tick.
    ///
    /// # Arguments
    ///
    /// * `bus` - The signal snapshot of the current rising edge.
    /// * `ctx` - Memory, policy and statistics for this tick.
    ///
    /// # Returns
    ///
    /// The state after the transition and the lines to drive until the
    /// next edge.
    fn advance(
        &mut self,
        bus: &SignalBus,
        ctx: &mut HandlerContext<'_>,
    ) -> (ChannelState, Self::Drive);

    /// Returns the current coarse state.
    fn state(&self) -> ChannelState;

    /// Abandons any burst in flight and returns to Idle.
    ///
    /// # Returns
    ///
    /// `true` if a burst was abandoned.
    fn reset(&mut self) -> bool;

    /// Returns `true` when no burst is in flight.
    fn is_idle(&self) -> bool {
        self.state() == ChannelState::Idle
    }
}
