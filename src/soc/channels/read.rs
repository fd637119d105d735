//! Read Channel Handler.
//!
//! Emulates the memory side of an AXI4 burst read. An address handshake on AR
//! is followed by one R beat per declared beat, each beat assembled from the
//! memory store at `base + beat * BEAT_BYTES`.
//!
//! Timing knobs are taken from the timing policy. A forced stall holds the
//! address handshake off and is the only place a requester abort is tolerated.
//! Random delays may precede the address grant and every data beat, and a
//! forced error turns every beat's response into `SLVERR`.

use tracing::{info, warn};

use crate::soc::memory::controller::{Handshake, Stall};
use crate::soc::signals::{BurstDescriptor, ReadData, ReadDataChannel, ReadDrive, SignalBus};
use crate::soc::traits::{ChannelHandler, ChannelState, HandlerContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Address-valid seen; ready withheld. `remaining == None` never expires.
    AddressHold {
        remaining: Option<u32>,
        forced: bool,
    },
    /// ARREADY driven for exactly this tick.
    AddressGrant,
    BeatDelay {
        burst: BurstDescriptor,
        beat: u32,
        remaining: u32,
    },
    /// RVALID driven with a latched beat until RREADY.
    BeatValid {
        burst: BurstDescriptor,
        beat: u32,
        data: ReadData,
    },
}

/// State machine for the AR and R channels.
#[derive(Clone, Debug)]
pub struct ReadChannelHandler {
    phase: Phase,
}

impl Default for ReadChannelHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadChannelHandler {
    /// Creates a handler in the Idle state.
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    /// Returns the descriptor of the burst in its data phase, if any.
    pub fn current_burst(&self) -> Option<BurstDescriptor> {
        match self.phase {
            Phase::BeatDelay { burst, .. } | Phase::BeatValid { burst, .. } => Some(burst),
            _ => None,
        }
    }

    /// Returns the index of the beat currently being delayed or presented.
    pub fn beat_index(&self) -> Option<u32> {
        match self.phase {
            Phase::BeatDelay { beat, .. } | Phase::BeatValid { beat, .. } => Some(beat),
            _ => None,
        }
    }

    fn begin_address(ctx: &mut HandlerContext<'_>) -> Phase {
        match ctx.policy.stall() {
            Stall::Indefinite => {
                info!("[AXI-RD] holding address handshake indefinitely");
                Phase::AddressHold {
                    remaining: None,
                    forced: true,
                }
            }
            Stall::Ticks(ticks) if ticks > 0 => {
                info!(ticks, "[AXI-RD] holding address handshake");
                Phase::AddressHold {
                    remaining: Some(ticks),
                    forced: true,
                }
            }
            _ => match ctx.policy.handshake_delay(Handshake::ReadAddress) {
                0 => Phase::AddressGrant,
                ticks => Phase::AddressHold {
                    remaining: Some(ticks),
                    forced: false,
                },
            },
        }
    }

    fn begin_beat(burst: BurstDescriptor, beat: u32, ctx: &mut HandlerContext<'_>) -> Phase {
        match ctx.policy.handshake_delay(Handshake::ReadData) {
            0 => Phase::BeatValid {
                burst,
                beat,
                data: Self::assemble(burst, beat, ctx),
            },
            remaining => Phase::BeatDelay {
                burst,
                beat,
                remaining,
            },
        }
    }

    fn assemble(burst: BurstDescriptor, beat: u32, ctx: &HandlerContext<'_>) -> ReadData {
        ReadData {
            data: ctx.memory.read_beat(burst.beat_addr(beat)),
            last: burst.is_last(beat),
            resp: ctx.policy.read_response(),
            id: burst.id,
        }
    }

    fn drive(&self) -> ReadDrive {
        match self.phase {
            Phase::AddressGrant => ReadDrive {
                ar_ready: true,
                ..ReadDrive::default()
            },
            Phase::BeatValid { data, .. } => ReadDrive {
                ar_ready: false,
                r: ReadDataChannel {
                    valid: true,
                    payload: data,
                },
            },
            _ => ReadDrive::default(),
        }
    }
}

impl ChannelHandler for ReadChannelHandler {
    type Drive = ReadDrive;

    fn advance(
        &mut self,
        bus: &SignalBus,
        ctx: &mut HandlerContext<'_>,
    ) -> (ChannelState, ReadDrive) {
        if bus.reset {
            if self.reset() {
                ctx.stats.abandoned_bursts += 1;
            }
            return (ChannelState::Idle, ReadDrive::default());
        }

        let ar = &bus.master.ar;
        self.phase = match self.phase {
            Phase::Idle if ar.valid => Self::begin_address(ctx),
            Phase::Idle => Phase::Idle,

            Phase::AddressHold { forced, .. } if !ar.valid => {
                if forced {
                    ctx.stats.requester_aborts += 1;
                    warn!("[AXI-RD] requester withdrew ARVALID during forced stall");
                }
                Phase::Idle
            }
            Phase::AddressHold { remaining, forced } => {
                if forced {
                    ctx.stats.stall_ticks += 1;
                } else {
                    ctx.stats.delay_ticks += 1;
                }
                match remaining {
                    None => Phase::AddressHold {
                        remaining: None,
                        forced,
                    },
                    Some(n) if n <= 1 => Phase::AddressGrant,
                    Some(n) => Phase::AddressHold {
                        remaining: Some(n - 1),
                        forced,
                    },
                }
            }

            Phase::AddressGrant if ar.valid => {
                let burst = BurstDescriptor::capture(&ar.payload);
                info!(
                    "[AXI-RD] addr={:#x} beats={} id={}",
                    burst.base, burst.beats, burst.id
                );
                ctx.stats.read_bursts += 1;
                Self::begin_beat(burst, 0, ctx)
            }
            Phase::AddressGrant => Phase::Idle,

            Phase::BeatDelay {
                burst,
                beat,
                remaining,
            } => {
                ctx.stats.delay_ticks += 1;
                if remaining <= 1 {
                    Phase::BeatValid {
                        burst,
                        beat,
                        data: Self::assemble(burst, beat, ctx),
                    }
                } else {
                    Phase::BeatDelay {
                        burst,
                        beat,
                        remaining: remaining - 1,
                    }
                }
            }

            Phase::BeatValid { burst, beat, data } if bus.master.r_ready => {
                ctx.stats.read_beats += 1;
                if data.resp.is_error() {
                    ctx.stats.error_responses += 1;
                }
                if burst.is_last(beat) {
                    Phase::Idle
                } else {
                    Self::begin_beat(burst, beat + 1, ctx)
                }
            }
            waiting @ Phase::BeatValid { .. } => waiting,
        };

        (self.state(), self.drive())
    }

    fn state(&self) -> ChannelState {
        match self.phase {
            Phase::Idle => ChannelState::Idle,
            Phase::AddressHold { .. } | Phase::AddressGrant => {
                ChannelState::AwaitingAddressHandshake
            }
            Phase::BeatDelay { .. } | Phase::BeatValid { .. } => ChannelState::InDataPhase,
        }
    }

    fn reset(&mut self) -> bool {
        let abandoned = self.current_burst();
        self.phase = Phase::Idle;
        if let Some(burst) = abandoned {
            warn!(
                "[AXI-RD] burst at {:#x} abandoned on reset ({} beats declared)",
                burst.base, burst.beats
            );
        }
        abandoned.is_some()
    }
}
