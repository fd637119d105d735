use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::common::error::HarnessError;

const DEFAULT_SEED: u64 = 0x5EED;
const DEFAULT_DELAY_PROBABILITY: f64 = 0.3;
const DEFAULT_MAX_RANDOM_DELAY: u32 = 5;

const MAX_TICKS: u64 = 200_000;
const WATCHDOG_TICKS: u64 = 1000;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub bfm: BfmConfig,

    #[serde(default)]
    pub sim: SimConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, HarnessError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, HarnessError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BfmConfig {
    #[serde(default)]
    pub random_delays: bool,

    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_delay_probability")]
    pub delay_probability: f64,

    #[serde(default = "default_max_random_delay")]
    pub max_random_delay: u32,
}

impl Default for BfmConfig {
    fn default() -> Self {
        Self {
            random_delays: false,
            seed: DEFAULT_SEED,
            delay_probability: DEFAULT_DELAY_PROBABILITY,
            max_random_delay: DEFAULT_MAX_RANDOM_DELAY,
        }
    }
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_delay_probability() -> f64 {
    DEFAULT_DELAY_PROBABILITY
}

fn default_max_random_delay() -> u32 {
    DEFAULT_MAX_RANDOM_DELAY
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimConfig {
    /// Upper bound on ticks for any single `run_until_idle`.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,

    /// Requester abort threshold used by the watchdog scenario.
    #[serde(default = "default_watchdog_ticks")]
    pub watchdog_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_ticks: MAX_TICKS,
            watchdog_ticks: WATCHDOG_TICKS,
        }
    }
}

fn default_max_ticks() -> u64 {
    MAX_TICKS
}

fn default_watchdog_ticks() -> u64 {
    WATCHDOG_TICKS
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
