//! Sparse Memory Store.
//!
//! Byte-addressable backing store behind the bus-functional model. Only bytes
//! that have been written occupy space; every other address reads as zero.
//! Beats are assembled and applied in little-endian lane order, lane `n`
//! mapping to `addr + n`.

use std::collections::HashMap;

use crate::common::constants::BEAT_BYTES;
use crate::soc::signals::WriteData;

/// Timing and fault-injection policy consulted by the channel handlers.
pub mod controller;

/// A byte that differs between two regions of memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mismatch {
    /// Offset from the start of the compared regions.
    pub offset: u64,
    pub expected: u8,
    pub actual: u8,
}

/// Sparse byte-addressable memory; absent entries read as zero.
#[derive(Clone, Debug, Default)]
pub struct SparseMemory {
    bytes: HashMap<u64, u8>,
}

impl SparseMemory {
    /// Creates an empty memory in which every address reads as zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a single byte.
    pub fn read_byte(&self, addr: u64) -> u8 {
        self.bytes.get(&addr).copied().unwrap_or(0)
    }

    /// Writes a single byte.
    pub fn write_byte(&mut self, addr: u64, val: u8) {
        self.bytes.insert(addr, val);
    }

    /// Reads `len` consecutive bytes starting at `addr`.
    pub fn read_bytes(&self, addr: u64, len: usize) -> Vec<u8> {
        (0..len as u64)
            .map(|i| self.read_byte(addr.wrapping_add(i)))
            .collect()
    }

    /// Writes a slice of bytes starting at `addr`.
    pub fn write_bytes(&mut self, addr: u64, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            self.write_byte(addr.wrapping_add(i as u64), *byte);
        }
    }

    /// Assembles one data beat from the 16 bytes starting at `addr`.
    pub fn read_beat(&self, addr: u64) -> u128 {
        (0..BEAT_BYTES).fold(0u128, |word, lane| {
            word | (self.read_byte(addr.wrapping_add(lane as u64)) as u128) << (lane * 8)
        })
    }

    /// Applies one write beat at `addr`, honouring the byte-lane strobe.
    ///
    /// # Returns
    ///
    /// The number of bytes actually stored.
    pub fn write_beat(&mut self, addr: u64, beat: &WriteData) -> usize {
        let mut stored = 0;
        for lane in 0..BEAT_BYTES {
            if beat.lane_enabled(lane) {
                self.write_byte(addr.wrapping_add(lane as u64), beat.lane(lane));
                stored += 1;
            }
        }
        stored
    }

    /// Returns the number of bytes that have been written at least once.
    pub fn populated(&self) -> usize {
        self.bytes.len()
    }

    /// Forgets every written byte.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Compares `len` bytes at `dst` against the same span at `src`.
    ///
    /// Used to verify a DMA copy: `src` holds the expected bytes.
    pub fn compare(&self, src: u64, dst: u64, len: usize) -> Vec<Mismatch> {
        (0..len as u64)
            .filter_map(|i| {
                let expected = self.read_byte(src.wrapping_add(i));
                let actual = self.read_byte(dst.wrapping_add(i));
                (expected != actual).then_some(Mismatch {
                    offset: i,
                    expected,
                    actual,
                })
            })
            .collect()
    }

    /// Renders `len` bytes at `addr` as hex dump lines of 16 bytes each.
    pub fn hex_dump(&self, addr: u64, len: usize) -> Vec<String> {
        let bytes = self.read_bytes(addr, len);
        bytes
            .chunks(BEAT_BYTES)
            .enumerate()
            .map(|(i, chunk)| {
                let hex: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
                format!(
                    "{:04X}: {}",
                    addr.wrapping_add((i * BEAT_BYTES) as u64),
                    hex.join(" ")
                )
            })
            .collect()
    }
}
