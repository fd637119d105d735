//! Protocol Invariant Monitor.
//!
//! A passive observer of every requester-driven channel. It enforces two
//! contracts on the requester:
//!
//! 1. **Stability**: while an AR, AW or W valid is asserted and ready has not
//!    been granted, the payload must not change from one tick to the next.
//! 2. **Burst length**: after an AW handshake, `WLAST` must be asserted on
//!    exactly the declared final beat.
//!
//! Burst-length tracking supports a single outstanding write burst. A second
//! AW handshake while a burst is still being counted is reported as
//! [`ProtocolViolation::OutstandingWriteLimit`]; it is a monitor limitation
//! rather than an AXI4 rule.
//!
//! The monitor never writes to the bus, the memory store or the policy.

use tracing::error;

use crate::common::error::ProtocolViolation;
use crate::soc::signals::{AddrChannel, AddrPayload, Channel, SignalBus, WriteData};

/// Write burst currently being counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct WriteTracker {
    declared: u32,
    accepted: u32,
}

/// Passive checker of the requester-side handshake contracts.
#[derive(Clone, Debug, Default)]
pub struct ProtocolMonitor {
    prev_ar: Option<AddrPayload>,
    prev_aw: Option<AddrPayload>,
    prev_w: Option<WriteData>,
    write: Option<WriteTracker>,

    ticks_observed: u64,
    handshakes_checked: u64,
    write_bursts_verified: u64,
}

impl ProtocolMonitor {
    /// Creates a monitor with empty snapshots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks one tick's snapshot.
    ///
    /// # Returns
    ///
    /// `Err` on the first violation found in this tick. The caller should
    /// treat it as fatal; the monitor state after an error is unspecified.
    pub fn observe(&mut self, bus: &SignalBus) -> Result<(), ProtocolViolation> {
        self.ticks_observed += 1;
        if bus.reset {
            self.reset();
            return Ok(());
        }

        let result = self.check(bus);
        if let Err(violation) = &result {
            error!("{}", violation);
        }
        result
    }

    fn check(&mut self, bus: &SignalBus) -> Result<(), ProtocolViolation> {
        self.prev_aw = Self::check_address(
            Channel::WriteAddress,
            &bus.master.aw,
            self.prev_aw,
            bus.slave.aw_ready,
        )?;
        if bus.aw_handshake() {
            self.handshakes_checked += 1;
            self.open_write_burst(bus.master.aw.payload.beats())?;
        }

        self.prev_w = self.check_write_data(bus)?;
        if bus.w_handshake() {
            self.handshakes_checked += 1;
            self.count_write_beat(bus.master.w.payload.last)?;
        }

        self.prev_ar = Self::check_address(
            Channel::ReadAddress,
            &bus.master.ar,
            self.prev_ar,
            bus.slave.ar_ready,
        )?;
        if bus.ar_handshake() {
            self.handshakes_checked += 1;
        }
        Ok(())
    }

    /// Returns the payload to remember for the next tick.
    fn check_address(
        channel: Channel,
        ch: &AddrChannel,
        prev: Option<AddrPayload>,
        ready: bool,
    ) -> Result<Option<AddrPayload>, ProtocolViolation> {
        if !ch.valid {
            return Ok(None);
        }
        if let Some(previous) = prev {
            if previous != ch.payload {
                return Err(ProtocolViolation::UnstableAddress {
                    channel,
                    previous,
                    current: ch.payload,
                });
            }
        }
        Ok(if ready { None } else { Some(ch.payload) })
    }

    fn check_write_data(&self, bus: &SignalBus) -> Result<Option<WriteData>, ProtocolViolation> {
        let w = &bus.master.w;
        if !w.valid {
            return Ok(None);
        }
        if let Some(previous) = self.prev_w {
            if previous != w.payload {
                return Err(ProtocolViolation::UnstableWriteData {
                    previous,
                    current: w.payload,
                });
            }
        }
        Ok(if bus.slave.w_ready {
            None
        } else {
            Some(w.payload)
        })
    }

    fn open_write_burst(&mut self, declared: u32) -> Result<(), ProtocolViolation> {
        if self.write.is_some() {
            return Err(ProtocolViolation::OutstandingWriteLimit { declared });
        }
        self.write = Some(WriteTracker {
            declared,
            accepted: 0,
        });
        Ok(())
    }

    fn count_write_beat(&mut self, last: bool) -> Result<(), ProtocolViolation> {
        // Beats with no tracked burst are not counted.
        let Some(tracker) = self.write.as_mut() else {
            return Ok(());
        };
        tracker.accepted += 1;
        let (beat, declared) = (tracker.accepted, tracker.declared);

        if last {
            if beat != declared {
                return Err(ProtocolViolation::EarlyLast { beat, declared });
            }
            self.write = None;
            self.write_bursts_verified += 1;
        } else if beat >= declared {
            return Err(ProtocolViolation::MissingLast { beat, declared });
        }
        Ok(())
    }

    /// Clears every snapshot and the burst tracker. Counters are kept.
    pub fn reset(&mut self) {
        self.prev_ar = None;
        self.prev_aw = None;
        self.prev_w = None;
        self.write = None;
    }

    /// Returns `true` while a write burst is being counted.
    pub fn write_burst_open(&self) -> bool {
        self.write.is_some()
    }

    /// Returns the number of write beats counted for the open burst.
    pub fn write_beats_seen(&self) -> Option<u32> {
        self.write.map(|t| t.accepted)
    }

    /// Returns the number of ticks observed, including reset ticks.
    pub fn ticks_observed(&self) -> u64 {
        self.ticks_observed
    }

    /// Returns the number of AR, AW and W handshakes checked.
    pub fn handshakes_checked(&self) -> u64 {
        self.handshakes_checked
    }

    /// Returns the number of write bursts whose `WLAST` placement was verified.
    pub fn write_bursts_verified(&self) -> u64 {
        self.write_bursts_verified
    }
}
