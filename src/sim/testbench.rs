//! Testbench Scheduler.
//!
//! Wires a [`BurstRequester`] to a [`Bfm`] on a single time axis. Every
//! [`Testbench::step`] builds one signal snapshot from the lines both sides
//! drove on the previous tick, lets the BFM (monitor, then handlers) and the
//! requester react to it, and advances time by one tick.

use tracing::info;

use crate::common::error::HarnessError;
use crate::config::Config;
use crate::sim::requester::{BurstRequester, Completion, Job};
use crate::soc::bfm::Bfm;
use crate::soc::memory::SparseMemory;
use crate::soc::signals::SignalBus;

/// A requester and a memory-side BFM sharing one clock and reset.
pub struct Testbench {
    bfm: Bfm,
    requester: BurstRequester,
    reset: bool,
    time: u64,
    max_ticks: u64,
}

impl Testbench {
    /// Creates a testbench from the `[bfm]` and `[sim]` tables.
    pub fn new(config: &Config) -> Self {
        Self {
            bfm: Bfm::new(&config.bfm),
            requester: BurstRequester::new(),
            reset: false,
            time: 0,
            max_ticks: config.sim.max_ticks,
        }
    }

    /// Returns the snapshot the next step will present.
    pub fn snapshot(&self) -> SignalBus {
        SignalBus {
            reset: self.reset,
            master: *self.requester.outputs(),
            slave: *self.bfm.driven(),
        }
    }

    /// Advances the whole bench by one tick.
    ///
    /// # Returns
    ///
    /// The snapshot that was observed, or the protocol violation the monitor
    /// raised on it.
    pub fn step(&mut self) -> Result<SignalBus, HarnessError> {
        let bus = self.snapshot();
        self.bfm.tick(&bus)?;
        self.requester.tick(&bus);
        self.time += 1;
        Ok(bus)
    }

    /// Advances the bench by `ticks` ticks.
    pub fn run_for(&mut self, ticks: u64) -> Result<(), HarnessError> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    /// Steps until the requester has no work and both handlers are Idle.
    ///
    /// # Returns
    ///
    /// The number of ticks taken, or `HarnessError::Timeout` once the
    /// configured `max_ticks` elapse.
    pub fn run_until_idle(&mut self) -> Result<u64, HarnessError> {
        let start = self.time;
        while !self.is_idle() {
            if self.time - start >= self.max_ticks {
                return Err(HarnessError::Timeout {
                    ticks: self.max_ticks,
                });
            }
            self.step()?;
        }
        Ok(self.time - start)
    }

    /// Returns `true` when nothing is queued or in flight on either side.
    pub fn is_idle(&self) -> bool {
        self.requester.is_idle() && self.bfm.is_idle()
    }

    /// Runs one job to completion.
    pub fn run_job(&mut self, job: Job) -> Result<Completion, HarnessError> {
        self.requester.submit(job)?;
        self.run_until_idle()?;
        self.requester
            .take_completions()
            .pop()
            .ok_or_else(|| HarnessError::ScenarioFailed("job produced no completion".into()))
    }

    /// Writes `data` at `addr` as one burst and waits for the response.
    pub fn write(&mut self, addr: u64, data: &[u8]) -> Result<Completion, HarnessError> {
        self.run_job(Job::Write {
            addr,
            data: data.to_vec(),
            id: 0,
        })
    }

    /// Reads `len` bytes at `addr` as one burst.
    pub fn read(&mut self, addr: u64, len: usize) -> Result<Completion, HarnessError> {
        self.run_job(Job::Read { addr, len, id: 0 })
    }

    /// Holds reset for `ticks` ticks, then releases it.
    pub fn pulse_reset(&mut self, ticks: u64) -> Result<(), HarnessError> {
        info!(ticks, "asserting reset");
        self.reset = true;
        let result = self.run_for(ticks.max(1));
        self.reset = false;
        result
    }

    /// Drives the reset level for subsequent steps.
    pub fn set_reset(&mut self, asserted: bool) {
        self.reset = asserted;
    }

    /// Writes `data` directly into the memory store.
    pub fn preload(&mut self, addr: u64, data: &[u8]) {
        self.bfm.memory_mut().write_bytes(addr, data);
    }

    /// Returns `true` when the `len` bytes at `addr` equal `expected`.
    pub fn verify(&self, addr: u64, expected: &[u8]) -> bool {
        self.bfm.memory().read_bytes(addr, expected.len()) == expected
    }

    pub fn memory(&self) -> &SparseMemory {
        self.bfm.memory()
    }

    pub fn bfm(&self) -> &Bfm {
        &self.bfm
    }

    pub fn bfm_mut(&mut self) -> &mut Bfm {
        &mut self.bfm
    }

    pub fn requester(&self) -> &BurstRequester {
        &self.requester
    }

    pub fn requester_mut(&mut self) -> &mut BurstRequester {
        &mut self.requester
    }

    /// Returns the number of ticks elapsed.
    pub fn time(&self) -> u64 {
        self.time
    }
}

impl Default for Testbench {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
