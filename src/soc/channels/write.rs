//! Write Channel Handler.
//!
//! Emulates the memory side of an AXI4 burst write: an AW handshake, exactly
//! the declared number of W beats (each applied to memory through its byte
//! strobe), then a single B response.
//!
//! The handler counts beats against the declared length and ignores `WLAST`;
//! checking `WLAST` against the length is the monitor's job.

use tracing::{info, warn};

use crate::common::data::Resp;
use crate::soc::memory::controller::Handshake;
use crate::soc::signals::{BurstDescriptor, SignalBus, WriteDrive, WriteRespChannel};
use crate::soc::traits::{ChannelHandler, ChannelState, HandlerContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    AddressHold {
        remaining: u32,
    },
    /// AWREADY driven for exactly this tick.
    AddressGrant,
    /// Waiting for WVALID on beat `beat`.
    DataWait {
        burst: BurstDescriptor,
        beat: u32,
    },
    DataHold {
        burst: BurstDescriptor,
        beat: u32,
        remaining: u32,
    },
    /// WREADY driven for exactly this tick.
    DataGrant {
        burst: BurstDescriptor,
        beat: u32,
    },
    ResponseHold {
        burst: BurstDescriptor,
        remaining: u32,
    },
    /// BVALID driven until BREADY.
    ResponseValid {
        burst: BurstDescriptor,
        resp: Resp,
    },
}

/// State machine for the AW, W and B channels.
#[derive(Clone, Debug)]
pub struct WriteChannelHandler {
    phase: Phase,
}

impl Default for WriteChannelHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteChannelHandler {
    /// Creates a handler in the Idle state.
    pub fn new() -> Self {
        Self { phase: Phase::Idle }
    }

    /// Returns the descriptor of the burst past its address phase, if any.
    pub fn current_burst(&self) -> Option<BurstDescriptor> {
        match self.phase {
            Phase::DataWait { burst, .. }
            | Phase::DataHold { burst, .. }
            | Phase::DataGrant { burst, .. }
            | Phase::ResponseHold { burst, .. }
            | Phase::ResponseValid { burst, .. } => Some(burst),
            _ => None,
        }
    }

    /// Returns the number of beats accepted so far in the current burst.
    pub fn beats_accepted(&self) -> Option<u32> {
        match self.phase {
            Phase::DataWait { beat, .. }
            | Phase::DataHold { beat, .. }
            | Phase::DataGrant { beat, .. } => Some(beat),
            Phase::ResponseHold { burst, .. } | Phase::ResponseValid { burst, .. } => {
                Some(burst.beats)
            }
            _ => None,
        }
    }

    fn begin_response(burst: BurstDescriptor, ctx: &mut HandlerContext<'_>) -> Phase {
        match ctx.policy.handshake_delay(Handshake::WriteResponse) {
            0 => Phase::ResponseValid {
                burst,
                resp: ctx.policy.write_response(),
            },
            remaining => Phase::ResponseHold { burst, remaining },
        }
    }

    fn drive(&self) -> WriteDrive {
        match self.phase {
            Phase::AddressGrant => WriteDrive {
                aw_ready: true,
                ..WriteDrive::default()
            },
            Phase::DataGrant { .. } => WriteDrive {
                w_ready: true,
                ..WriteDrive::default()
            },
            Phase::ResponseValid { burst, resp } => WriteDrive {
                b: WriteRespChannel {
                    valid: true,
                    resp,
                    id: burst.id,
                },
                ..WriteDrive::default()
            },
            _ => WriteDrive::default(),
        }
    }
}

impl ChannelHandler for WriteChannelHandler {
    type Drive = WriteDrive;

    fn advance(
        &mut self,
        bus: &SignalBus,
        ctx: &mut HandlerContext<'_>,
    ) -> (ChannelState, WriteDrive) {
        if bus.reset {
            if self.reset() {
                ctx.stats.abandoned_bursts += 1;
            }
            return (ChannelState::Idle, WriteDrive::default());
        }

        let aw = &bus.master.aw;
        let w = &bus.master.w;
        self.phase = match self.phase {
            Phase::Idle if aw.valid => match ctx.policy.handshake_delay(Handshake::WriteAddress) {
                0 => Phase::AddressGrant,
                remaining => Phase::AddressHold { remaining },
            },
            Phase::Idle => Phase::Idle,

            Phase::AddressHold { .. } if !aw.valid => Phase::Idle,
            Phase::AddressHold { remaining } => {
                ctx.stats.delay_ticks += 1;
                if remaining <= 1 {
                    Phase::AddressGrant
                } else {
                    Phase::AddressHold {
                        remaining: remaining - 1,
                    }
                }
            }

            Phase::AddressGrant if aw.valid => {
                let burst = BurstDescriptor::capture(&aw.payload);
                info!(
                    "[AXI-WR] addr={:#x} beats={} id={}",
                    burst.base, burst.beats, burst.id
                );
                ctx.stats.write_bursts += 1;
                Phase::DataWait { burst, beat: 0 }
            }
            Phase::AddressGrant => Phase::Idle,

            Phase::DataWait { burst, beat } if w.valid => {
                match ctx.policy.handshake_delay(Handshake::WriteData) {
                    0 => Phase::DataGrant { burst, beat },
                    remaining => Phase::DataHold {
                        burst,
                        beat,
                        remaining,
                    },
                }
            }
            waiting @ Phase::DataWait { .. } => waiting,

            Phase::DataHold {
                burst,
                beat,
                remaining,
            } => {
                ctx.stats.delay_ticks += 1;
                if remaining <= 1 {
                    Phase::DataGrant { burst, beat }
                } else {
                    Phase::DataHold {
                        burst,
                        beat,
                        remaining: remaining - 1,
                    }
                }
            }

            Phase::DataGrant { burst, beat } if w.valid => {
                let stored = ctx.memory.write_beat(burst.beat_addr(beat), &w.payload);
                ctx.stats.write_beats += 1;
                ctx.stats.bytes_written += stored as u64;
                if burst.is_last(beat) {
                    Self::begin_response(burst, ctx)
                } else {
                    Phase::DataWait {
                        burst,
                        beat: beat + 1,
                    }
                }
            }
            Phase::DataGrant { burst, beat } => Phase::DataWait { burst, beat },

            Phase::ResponseHold { burst, remaining } => {
                ctx.stats.delay_ticks += 1;
                if remaining <= 1 {
                    Phase::ResponseValid {
                        burst,
                        resp: ctx.policy.write_response(),
                    }
                } else {
                    Phase::ResponseHold {
                        burst,
                        remaining: remaining - 1,
                    }
                }
            }

            Phase::ResponseValid { resp, .. } if bus.master.b_ready => {
                if resp.is_error() {
                    ctx.stats.error_responses += 1;
                }
                Phase::Idle
            }
            waiting @ Phase::ResponseValid { .. } => waiting,
        };

        (self.state(), self.drive())
    }

    fn state(&self) -> ChannelState {
        match self.phase {
            Phase::Idle => ChannelState::Idle,
            Phase::AddressHold { .. } | Phase::AddressGrant => {
                ChannelState::AwaitingAddressHandshake
            }
            Phase::DataWait { .. } | Phase::DataHold { .. } | Phase::DataGrant { .. } => {
                ChannelState::InDataPhase
            }
            Phase::ResponseHold { .. } | Phase::ResponseValid { .. } => {
                ChannelState::AwaitingResponseHandshake
            }
        }
    }

    fn reset(&mut self) -> bool {
        let abandoned = self.current_burst();
        let accepted = self.beats_accepted().unwrap_or(0);
        self.phase = Phase::Idle;
        if let Some(burst) = abandoned {
            warn!(
                "[AXI-WR] burst at {:#x} abandoned on reset after {}/{} beats",
                burst.base, accepted, burst.beats
            );
        }
        abandoned.is_some()
    }
}
