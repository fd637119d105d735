//! Burst Requester.
//!
//! A tick-driven AXI4 master that stands in for the DMA engine in self-tests.
//! It executes queued jobs one at a time, drives the master-side lines and
//! reports one [`Completion`] per job.
//!
//! Besides well-behaved traffic it can:
//! * abort an address phase after a watchdog threshold,
//! * throttle `RREADY`/`BREADY` to model back-pressure, and
//! * break the handshake contracts on purpose so the monitor can be tested.

use std::collections::VecDeque;
use std::mem;

use tracing::{debug, warn};

use crate::common::constants::{BEAT_BYTES, MAX_BURST_BEATS};
use crate::common::data::{Direction, Resp};
use crate::common::error::HarnessError;
use crate::soc::signals::{
    AddrChannel, AddrPayload, MasterSignals, SignalBus, WriteData, WriteDataChannel,
};

/// A transfer request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Job {
    /// Write `data` starting at `addr`.
    Write { addr: u64, data: Vec<u8>, id: u8 },
    /// Read `len` bytes starting at `addr`.
    Read { addr: u64, len: usize, id: u8 },
}

impl Job {
    pub fn direction(&self) -> Direction {
        match self {
            Job::Write { .. } => Direction::Write,
            Job::Read { .. } => Direction::Read,
        }
    }

    pub fn addr(&self) -> u64 {
        match self {
            Job::Write { addr, .. } | Job::Read { addr, .. } => *addr,
        }
    }

    /// Returns the transfer length in bytes.
    pub fn len(&self) -> usize {
        match self {
            Job::Write { data, .. } => data.len(),
            Job::Read { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of beats needed to carry the job.
    pub fn beats(&self) -> usize {
        self.len().div_ceil(BEAT_BYTES)
    }

    fn validate(&self) -> Result<(), HarnessError> {
        let reason = if self.is_empty() {
            Some("zero-length transfer".to_string())
        } else if self.beats() > MAX_BURST_BEATS {
            Some(format!(
                "{} beats exceed the {}-beat burst limit",
                self.beats(),
                MAX_BURST_BEATS
            ))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(HarnessError::InvalidBurst {
                addr: self.addr(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// How a job ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionStatus {
    /// Every response was `OKAY`.
    Okay,
    /// At least one response was `SLVERR`.
    SlaveError,
    /// The watchdog withdrew the address request.
    TimedOut,
    /// Reset was asserted while the job was in flight.
    Abandoned,
}

/// Result of one job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completion {
    pub direction: Direction,
    pub addr: u64,
    pub id: u8,
    /// Bytes read (reads only; truncated to the requested length).
    pub data: Vec<u8>,
    /// One entry per read beat, or the single write response.
    pub responses: Vec<Resp>,
    pub status: CompletionStatus,
}

impl Completion {
    pub fn is_okay(&self) -> bool {
        self.status == CompletionStatus::Okay
    }
}

/// A deliberate protocol breach applied to the next job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Misbehaviour {
    /// Change the address payload while waiting for address ready.
    UnstableAddress,
    /// Change the data payload while waiting for write ready.
    UnstableWriteData,
    /// Assert `WLAST` on the given zero-based beat.
    EarlyLast { beat: u32 },
    /// Never assert `WLAST`.
    MissingLast,
}

/// A job in flight.
#[derive(Clone, Debug)]
struct Transfer {
    job: Job,
    beats: u32,
    misbehaviour: Option<Misbehaviour>,
    perturbed: bool,
    collected: Vec<u8>,
    responses: Vec<Resp>,
}

impl Transfer {
    fn new(job: Job, misbehaviour: Option<Misbehaviour>) -> Self {
        let beats = job.beats() as u32;
        Self {
            job,
            beats,
            misbehaviour,
            perturbed: false,
            collected: Vec::new(),
            responses: Vec::new(),
        }
    }

    fn id(&self) -> u8 {
        match self.job {
            Job::Write { id, .. } | Job::Read { id, .. } => id,
        }
    }

    fn address(&self) -> AddrPayload {
        let mut payload = AddrPayload::new(self.job.addr(), self.beats, self.id());
        if self.perturbed && self.misbehaviour == Some(Misbehaviour::UnstableAddress) {
            payload.addr = payload.addr.wrapping_add(BEAT_BYTES as u64);
        }
        payload
    }

    fn write_beat(&self, beat: u32) -> WriteData {
        let Job::Write { data, .. } = &self.job else {
            return WriteData::default();
        };
        let start = beat as usize * BEAT_BYTES;
        let mut word = 0u128;
        let mut strb = 0u16;
        for (lane, byte) in data.iter().skip(start).take(BEAT_BYTES).enumerate() {
            word |= (*byte as u128) << (lane * 8);
            strb |= 1 << lane;
        }
        let last = match self.misbehaviour {
            Some(Misbehaviour::EarlyLast { beat: early }) => beat == early,
            Some(Misbehaviour::MissingLast) => false,
            _ => beat + 1 == self.beats,
        };
        if self.perturbed && self.misbehaviour == Some(Misbehaviour::UnstableWriteData) {
            word = !word;
        }
        WriteData {
            data: word,
            strb,
            last,
        }
    }

    fn should_perturb(&self, misbehaviour: Misbehaviour) -> bool {
        !self.perturbed && self.misbehaviour == Some(misbehaviour)
    }

    fn complete(self, status: CompletionStatus) -> Completion {
        let id = self.id();
        let mut data = self.collected;
        data.truncate(self.job.len());
        Completion {
            direction: self.job.direction(),
            addr: self.job.addr(),
            id,
            data,
            responses: self.responses,
            status,
        }
    }

    fn finish(self) -> Completion {
        let status = if self.responses.iter().any(|r| r.is_error()) {
            CompletionStatus::SlaveError
        } else {
            CompletionStatus::Okay
        };
        self.complete(status)
    }
}

#[derive(Debug, Default)]
enum Phase {
    #[default]
    Idle,
    Address {
        transfer: Transfer,
        waited: u64,
    },
    WriteData {
        transfer: Transfer,
        beat: u32,
    },
    WriteResponse {
        transfer: Transfer,
    },
    ReadData {
        transfer: Transfer,
    },
}

/// Single-outstanding AXI4 master.
#[derive(Debug)]
pub struct BurstRequester {
    queue: VecDeque<Job>,
    phase: Phase,
    outputs: MasterSignals,
    completions: Vec<Completion>,
    pending_misbehaviour: Option<Misbehaviour>,
    watchdog: Option<u64>,
    ready_every: u64,
    ticks: u64,
    in_reset: bool,
}

impl Default for BurstRequester {
    fn default() -> Self {
        Self::new()
    }
}

impl BurstRequester {
    /// Creates an idle requester with no watchdog and no back-pressure.
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            phase: Phase::Idle,
            outputs: MasterSignals::default(),
            completions: Vec::new(),
            pending_misbehaviour: None,
            watchdog: None,
            ready_every: 1,
            ticks: 0,
            in_reset: false,
        }
    }

    /// Sets the address-phase abort threshold in ticks. `None` waits forever.
    pub fn set_watchdog(&mut self, ticks: Option<u64>) {
        self.watchdog = ticks;
    }

    pub fn watchdog(&self) -> Option<u64> {
        self.watchdog
    }

    /// Asserts `RREADY`/`BREADY` only on every `n`-th tick (`0` and `1`
    /// mean always).
    pub fn ready_every(&mut self, n: u64) {
        self.ready_every = n.max(1);
    }

    /// Arms a protocol breach for the next job that starts.
    pub fn inject(&mut self, misbehaviour: Misbehaviour) {
        self.pending_misbehaviour = Some(misbehaviour);
    }

    /// Queues a job. It starts immediately if the requester is idle.
    pub fn submit(&mut self, job: Job) -> Result<(), HarnessError> {
        job.validate()?;
        debug!(
            direction = %job.direction(),
            addr = job.addr(),
            len = job.len(),
            "queued job"
        );
        self.queue.push_back(job);
        self.launch_next();
        self.outputs = self.drive();
        Ok(())
    }

    /// Lines to present on the next edge.
    pub fn outputs(&self) -> &MasterSignals {
        &self.outputs
    }

    /// Returns `true` when no job is in flight or queued.
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle) && self.queue.is_empty()
    }

    /// Returns the number of queued jobs not yet started.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Drains the completions collected so far.
    pub fn take_completions(&mut self) -> Vec<Completion> {
        mem::take(&mut self.completions)
    }

    /// Observes one edge and computes the lines for the next one.
    pub fn tick(&mut self, bus: &SignalBus) {
        self.ticks += 1;
        if bus.reset {
            self.in_reset = true;
            if let Some(transfer) = self.abandon() {
                warn!(
                    addr = transfer.job.addr(),
                    "[REQ] {} job abandoned on reset",
                    transfer.job.direction()
                );
                self.completions
                    .push(transfer.complete(CompletionStatus::Abandoned));
            }
            self.outputs = MasterSignals::default();
            return;
        }
        self.in_reset = false;

        self.phase = match mem::take(&mut self.phase) {
            Phase::Idle => Phase::Idle,
            Phase::Address { transfer, waited } => self.address_phase(bus, transfer, waited),
            Phase::WriteData { mut transfer, beat } => {
                if bus.w_handshake() {
                    if beat + 1 == transfer.beats {
                        Phase::WriteResponse { transfer }
                    } else {
                        Phase::WriteData {
                            transfer,
                            beat: beat + 1,
                        }
                    }
                } else {
                    if bus.master.w.valid
                        && transfer.should_perturb(Misbehaviour::UnstableWriteData)
                    {
                        transfer.perturbed = true;
                    }
                    Phase::WriteData { transfer, beat }
                }
            }
            Phase::WriteResponse { mut transfer } => {
                if bus.b_handshake() {
                    transfer.responses.push(bus.slave.b.resp);
                    self.completions.push(transfer.finish());
                    Phase::Idle
                } else {
                    Phase::WriteResponse { transfer }
                }
            }
            Phase::ReadData { mut transfer } => {
                if bus.r_handshake() {
                    let beat = bus.slave.r.payload;
                    transfer.collected.extend_from_slice(&beat.data.to_le_bytes());
                    transfer.responses.push(beat.resp);
                    if transfer.responses.len() as u32 == transfer.beats {
                        self.completions.push(transfer.finish());
                        Phase::Idle
                    } else {
                        Phase::ReadData { transfer }
                    }
                } else {
                    Phase::ReadData { transfer }
                }
            }
        };

        self.launch_next();
        self.outputs = self.drive();
    }

    fn address_phase(&mut self, bus: &SignalBus, mut transfer: Transfer, waited: u64) -> Phase {
        let granted = match transfer.job.direction() {
            Direction::Read => bus.ar_handshake(),
            Direction::Write => bus.aw_handshake(),
        };
        if granted {
            return match transfer.job.direction() {
                Direction::Read => Phase::ReadData { transfer },
                Direction::Write => Phase::WriteData { transfer, beat: 0 },
            };
        }

        let waited = waited + 1;
        if let Some(limit) = self.watchdog {
            if waited >= limit {
                warn!(
                    addr = transfer.job.addr(),
                    waited, "[REQ] watchdog expired; withdrawing address request"
                );
                self.completions
                    .push(transfer.complete(CompletionStatus::TimedOut));
                return Phase::Idle;
            }
        }
        if transfer.should_perturb(Misbehaviour::UnstableAddress) {
            transfer.perturbed = true;
        }
        Phase::Address { transfer, waited }
    }

    fn launch_next(&mut self) {
        if self.in_reset || !matches!(self.phase, Phase::Idle) {
            return;
        }
        if let Some(job) = self.queue.pop_front() {
            let transfer = Transfer::new(job, self.pending_misbehaviour.take());
            self.phase = Phase::Address {
                transfer,
                waited: 0,
            };
        }
    }

    fn abandon(&mut self) -> Option<Transfer> {
        match mem::take(&mut self.phase) {
            Phase::Idle => None,
            Phase::Address { transfer, .. }
            | Phase::WriteData { transfer, .. }
            | Phase::WriteResponse { transfer }
            | Phase::ReadData { transfer } => Some(transfer),
        }
    }

    fn ready_now(&self) -> bool {
        self.ticks % self.ready_every == 0
    }

    fn drive(&self) -> MasterSignals {
        let mut out = MasterSignals::default();
        match &self.phase {
            Phase::Idle => {}
            Phase::Address { transfer, .. } => {
                let channel = AddrChannel {
                    valid: true,
                    payload: transfer.address(),
                };
                match transfer.job.direction() {
                    Direction::Read => out.ar = channel,
                    Direction::Write => out.aw = channel,
                }
            }
            Phase::WriteData { transfer, beat } => {
                out.w = WriteDataChannel {
                    valid: true,
                    payload: transfer.write_beat(*beat),
                };
            }
            Phase::WriteResponse { .. } => out.b_ready = self.ready_now(),
            Phase::ReadData { .. } => out.r_ready = self.ready_now(),
        }
        out
    }
}
