//! Timing and Fault Policy.
//!
//! This module defines the `DelaySource` trait and the `TimingPolicy` that the
//! channel handlers consult every time they are about to grant a handshake.
//! A delay source answers "how many extra ticks before this handshake"; the
//! policy layers the fault knobs on top of it (forced address stalls and
//! forced `SLVERR` responses).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::common::data::Resp;
use crate::config::BfmConfig;

/// The handshake a delay is requested for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handshake {
    ReadAddress,
    ReadData,
    WriteAddress,
    WriteData,
    WriteResponse,
}

impl Handshake {
    /// Address and write-data grants are only delayed on a fraction of
    /// handshakes; read-data and write-response delays are always drawn.
    fn is_gated(self) -> bool {
        matches!(
            self,
            Handshake::ReadAddress | Handshake::WriteAddress | Handshake::WriteData
        )
    }
}

/// Trait for sources of per-handshake extra delay.
pub trait DelaySource {
    /// Returns the number of extra ticks to wait before granting `handshake`.
    fn delay(&mut self, handshake: Handshake) -> u32;
}

/// A delay source with a fixed delay per handshake class.
///
/// Used where a test needs an exact, reproducible number of stall ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FixedDelay {
    /// Ticks before AR/AW ready.
    pub address: u32,
    /// Ticks before each R beat is presented or each W beat is accepted.
    pub data: u32,
    /// Ticks before the B response is presented.
    pub response: u32,
}

impl FixedDelay {
    /// Creates a source that delays only the address handshakes.
    pub fn address(ticks: u32) -> Self {
        Self {
            address: ticks,
            ..Self::default()
        }
    }
}

impl DelaySource for FixedDelay {
    fn delay(&mut self, handshake: Handshake) -> u32 {
        match handshake {
            Handshake::ReadAddress | Handshake::WriteAddress => self.address,
            Handshake::ReadData | Handshake::WriteData => self.data,
            Handshake::WriteResponse => self.response,
        }
    }
}

/// A seeded random delay source.
///
/// Gated handshakes are delayed with probability `probability`; a delayed (or
/// ungated) handshake waits a uniform `0..=max` ticks. Two sources built with
/// the same parameters produce the same sequence.
pub struct RandomDelay {
    rng: StdRng,
    probability: f64,
    max: u32,
}

impl RandomDelay {
    /// Creates a random source.
    ///
    /// # Arguments
    ///
    /// * `seed` - Seed for the generator.
    /// * `probability` - Chance that a gated handshake is delayed at all (clamped to `0.0..=1.0`).
    /// * `max` - Inclusive upper bound on a single delay.
    pub fn new(seed: u64, probability: f64, max: u32) -> Self {
        let probability = if probability.is_finite() {
            probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            rng: StdRng::seed_from_u64(seed),
            probability,
            max,
        }
    }
}

impl DelaySource for RandomDelay {
    fn delay(&mut self, handshake: Handshake) -> u32 {
        if handshake.is_gated() && !self.rng.gen_bool(self.probability) {
            return 0;
        }
        self.rng.gen_range(0..=self.max)
    }
}

/// Forced hold-off applied to read-address handshakes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stall {
    /// Address handshakes are granted normally.
    #[default]
    None,
    /// Every read-address handshake is held off for this many ticks.
    Ticks(u32),
    /// Read-address handshakes are never granted.
    Indefinite,
}

impl Stall {
    /// Returns `true` when a hold-off is in force.
    pub fn is_active(self) -> bool {
        !matches!(self, Stall::None | Stall::Ticks(0))
    }
}

/// Mutable timing and fault knobs shared by the two channel handlers.
///
/// The test driver changes the knobs between transfers; the handlers read
/// them each time they are about to grant a handshake.
pub struct TimingPolicy {
    source: Box<dyn DelaySource>,
    delays_enabled: bool,
    stall: Stall,
    force_read_error: bool,
    force_write_error: bool,
}

impl TimingPolicy {
    /// Creates a policy with a seeded random source, delays disabled and no
    /// faults armed.
    pub fn new(seed: u64, probability: f64, max_delay: u32) -> Self {
        Self {
            source: Box::new(RandomDelay::new(seed, probability, max_delay)),
            delays_enabled: false,
            stall: Stall::None,
            force_read_error: false,
            force_write_error: false,
        }
    }

    /// Creates a policy from the `[bfm]` configuration table.
    pub fn from_config(config: &BfmConfig) -> Self {
        let mut policy = Self::new(
            config.seed,
            config.delay_probability,
            config.max_random_delay,
        );
        policy.delays_enabled = config.random_delays;
        policy
    }

    /// Enables or disables delay injection without replacing the source.
    pub fn set_random_delays(&mut self, enabled: bool) {
        self.delays_enabled = enabled;
    }

    /// Returns `true` when delay injection is enabled.
    pub fn random_delays(&self) -> bool {
        self.delays_enabled
    }

    /// Installs a new delay source and enables delay injection.
    pub fn set_delay_source(&mut self, source: Box<dyn DelaySource>) {
        self.source = source;
        self.delays_enabled = true;
    }

    /// Arms (or with [`Stall::None`], disarms) the read-address hold-off.
    pub fn set_stall(&mut self, stall: Stall) {
        self.stall = stall;
    }

    /// Returns the armed read-address hold-off.
    pub fn stall(&self) -> Stall {
        self.stall
    }

    /// Forces every read-data beat to answer `SLVERR`.
    pub fn set_force_read_error(&mut self, enabled: bool) {
        self.force_read_error = enabled;
    }

    /// Forces every write response to answer `SLVERR`.
    pub fn set_force_write_error(&mut self, enabled: bool) {
        self.force_write_error = enabled;
    }

    /// Disarms every fault knob. Delay injection is left as configured.
    pub fn clear_faults(&mut self) {
        self.stall = Stall::None;
        self.force_read_error = false;
        self.force_write_error = false;
    }

    /// Returns the extra ticks to wait before granting `handshake`.
    ///
    /// A read address under a forced stall draws no random delay; the stall
    /// itself is applied by the read handler.
    pub fn handshake_delay(&mut self, handshake: Handshake) -> u32 {
        if !self.delays_enabled {
            return 0;
        }
        if handshake == Handshake::ReadAddress && self.stall.is_active() {
            return 0;
        }
        let ticks = self.source.delay(handshake);
        if ticks > 0 {
            debug!(?handshake, ticks, "injecting handshake delay");
        }
        ticks
    }

    /// Response code for the next read-data beat.
    pub fn read_response(&self) -> Resp {
        if self.force_read_error {
            Resp::SlvErr
        } else {
            Resp::Okay
        }
    }

    /// Response code for the next write response.
    pub fn write_response(&self) -> Resp {
        if self.force_write_error {
            Resp::SlvErr
        } else {
            Resp::Okay
        }
    }
}

impl Default for TimingPolicy {
    fn default() -> Self {
        Self::from_config(&BfmConfig::default())
    }
}
