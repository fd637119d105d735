//! AXI4 signal bus.
//!
//! This module defines the per-tick snapshot of every signal line between the
//! requester (the system under test) and the memory-side bus-functional model.
//! Lines are grouped by their single driver: [`MasterSignals`] are written only
//! by the requester and [`SlaveSignals`] only by the BFM. A [`SignalBus`] is
//! the value both sides observe on one rising edge.

use std::fmt;

use crate::common::constants::{BEAT_BYTES, MAX_BURST_BEATS};
use crate::common::data::Resp;

/// Identifies one of the five AXI4 channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Read address (AR).
    ReadAddress,
    /// Read data (R).
    ReadData,
    /// Write address (AW).
    WriteAddress,
    /// Write data (W).
    WriteData,
    /// Write response (B).
    WriteResponse,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Channel::ReadAddress => "AR",
            Channel::ReadData => "R",
            Channel::WriteAddress => "AW",
            Channel::WriteData => "W",
            Channel::WriteResponse => "B",
        };
        f.write_str(name)
    }
}

/// Payload of an address channel (AR or AW).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AddrPayload {
    /// Byte address of the first beat.
    pub addr: u64,
    /// Raw `AxLEN` field: number of beats minus one.
    pub len: u8,
    /// Transaction id (`AxID`).
    pub id: u8,
}

impl AddrPayload {
    /// Builds a payload for a burst of `beats` beats.
    ///
    /// `beats` must be in `1..=MAX_BURST_BEATS`; callers validate burst
    /// length before building the payload. Debug builds panic on anything
    /// else, release builds clamp into the legal range.
    pub fn new(addr: u64, beats: u32, id: u8) -> Self {
        debug_assert!(
            (1..=MAX_BURST_BEATS as u32).contains(&beats),
            "burst of {} beats outside 1..={}",
            beats,
            MAX_BURST_BEATS
        );
        Self {
            addr,
            len: beats.saturating_sub(1).min(u8::MAX as u32) as u8,
            id,
        }
    }

    /// Returns the declared number of beats.
    pub fn beats(&self) -> u32 {
        self.len as u32 + 1
    }
}

impl fmt::Display for AddrPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(addr={:#x}, len={}, id={})", self.addr, self.len, self.id)
    }
}

/// An address channel: valid line plus payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AddrChannel {
    pub valid: bool,
    pub payload: AddrPayload,
}

/// Payload of the write-data channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WriteData {
    /// Little-endian data word; byte lane `n` is bits `8n..8n+8`.
    pub data: u128,
    /// Byte-lane write strobe, one bit per lane.
    pub strb: u16,
    /// Final beat of the burst (`WLAST`).
    pub last: bool,
}

impl WriteData {
    /// Returns the byte carried on `lane`.
    pub fn lane(&self, lane: usize) -> u8 {
        (self.data >> (lane * 8)) as u8
    }

    /// Returns `true` when the strobe enables `lane`.
    pub fn lane_enabled(&self, lane: usize) -> bool {
        lane < BEAT_BYTES && (self.strb >> lane) & 1 == 1
    }
}

impl fmt::Display for WriteData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(data={:#034x}, strb={:#06x}, last={})",
            self.data, self.strb, self.last as u8
        )
    }
}

/// The write-data channel: valid line plus payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteDataChannel {
    pub valid: bool,
    pub payload: WriteData,
}

/// Payload of the read-data channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadData {
    pub data: u128,
    /// Final beat of the burst (`RLAST`).
    pub last: bool,
    pub resp: Resp,
    /// Transaction id echoed from the address phase (`RID`).
    pub id: u8,
}

/// The read-data channel: valid line plus payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadDataChannel {
    pub valid: bool,
    pub payload: ReadData,
}

/// The write-response channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteRespChannel {
    pub valid: bool,
    pub resp: Resp,
    /// Transaction id echoed from the address phase (`BID`).
    pub id: u8,
}

/// Every line driven by the requester.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MasterSignals {
    pub ar: AddrChannel,
    pub r_ready: bool,
    pub aw: AddrChannel,
    pub w: WriteDataChannel,
    pub b_ready: bool,
}

/// Lines driven by the read channel handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadDrive {
    pub ar_ready: bool,
    pub r: ReadDataChannel,
}

/// Lines driven by the write channel handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteDrive {
    pub aw_ready: bool,
    pub w_ready: bool,
    pub b: WriteRespChannel,
}

/// Every line driven by the bus-functional model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SlaveSignals {
    pub ar_ready: bool,
    pub r: ReadDataChannel,
    pub aw_ready: bool,
    pub w_ready: bool,
    pub b: WriteRespChannel,
}

impl SlaveSignals {
    /// Combines the outputs of the two channel handlers.
    ///
    /// The handlers drive disjoint lines, so merging never overwrites.
    pub fn merge(read: ReadDrive, write: WriteDrive) -> Self {
        Self {
            ar_ready: read.ar_ready,
            r: read.r,
            aw_ready: write.aw_ready,
            w_ready: write.w_ready,
            b: write.b,
        }
    }

    /// Returns `true` when no valid or ready line is asserted.
    pub fn is_quiet(&self) -> bool {
        !self.ar_ready && !self.r.valid && !self.aw_ready && !self.w_ready && !self.b.valid
    }
}

/// One rising-edge snapshot of the whole interface.
///
/// `reset` is modelled active-high. The hardware net is the active-low
/// `rst_n`, so `reset == !rst_n`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SignalBus {
    pub reset: bool,
    pub master: MasterSignals,
    pub slave: SlaveSignals,
}

impl SignalBus {
    /// Returns `true` when the read-address handshake completes this tick.
    pub fn ar_handshake(&self) -> bool {
        self.master.ar.valid && self.slave.ar_ready
    }

    /// Returns `true` when a read-data beat is accepted this tick.
    pub fn r_handshake(&self) -> bool {
        self.slave.r.valid && self.master.r_ready
    }

    /// Returns `true` when the write-address handshake completes this tick.
    pub fn aw_handshake(&self) -> bool {
        self.master.aw.valid && self.slave.aw_ready
    }

    /// Returns `true` when a write-data beat is accepted this tick.
    pub fn w_handshake(&self) -> bool {
        self.master.w.valid && self.slave.w_ready
    }

    /// Returns `true` when the write response is accepted this tick.
    pub fn b_handshake(&self) -> bool {
        self.slave.b.valid && self.master.b_ready
    }
}

/// Address phase captured at handshake time.
///
/// Immutable for the life of the burst it describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BurstDescriptor {
    pub base: u64,
    pub beats: u32,
    pub id: u8,
}

impl BurstDescriptor {
    /// Captures a descriptor from an address-channel payload.
    pub fn capture(payload: &AddrPayload) -> Self {
        Self {
            base: payload.addr,
            beats: payload.beats(),
            id: payload.id,
        }
    }

    /// Returns the byte address of the first lane of beat `index`.
    pub fn beat_addr(&self, index: u32) -> u64 {
        self.base.wrapping_add(index as u64 * BEAT_BYTES as u64)
    }

    /// Returns `true` when `index` is the final beat of the burst.
    pub fn is_last(&self, index: u32) -> bool {
        index + 1 == self.beats
    }
}
