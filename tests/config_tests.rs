//! Integration tests for configuration loading.

use axi_dma_bfm::common::HarnessError;
use axi_dma_bfm::config::Config;

/// Tests that an empty document yields the defaults.
#[test]
fn test_empty_config_defaults() {
    let config = Config::from_toml_str("").unwrap();
    assert!(!config.bfm.random_delays);
    assert_eq!(config.bfm.seed, 0x5EED);
    assert_eq!(config.bfm.delay_probability, 0.3);
    assert_eq!(config.bfm.max_random_delay, 5);
    assert_eq!(config.sim.max_ticks, 200_000);
    assert_eq!(config.sim.watchdog_ticks, 1000);
    assert_eq!(config.logging.level, "info");
}

/// Tests that a partial table keeps defaults for the omitted keys.
#[test]
fn test_partial_table() {
    let config = Config::from_toml_str(
        r#"
        [bfm]
        random_delays = true
        seed = 0x1234

        [logging]
        level = "debug"
        "#,
    )
    .unwrap();
    assert!(config.bfm.random_delays);
    assert_eq!(config.bfm.seed, 0x1234);
    assert_eq!(config.bfm.max_random_delay, 5);
    assert_eq!(config.sim.max_ticks, 200_000);
    assert_eq!(config.logging.level, "debug");
}

/// Tests that malformed TOML is reported as a configuration error.
#[test]
fn test_invalid_toml() {
    let err = Config::from_toml_str("[bfm\nseed = ").unwrap_err();
    assert!(matches!(err, HarnessError::Config(_)));

    let err = Config::from_toml_str("[sim]\nmax_ticks = \"lots\"").unwrap_err();
    assert!(matches!(err, HarnessError::Config(_)));
}

/// Tests that a missing file is reported as an I/O error.
#[test]
fn test_missing_file() {
    let err = Config::load("/nonexistent/axi_dma_bfm.toml").unwrap_err();
    assert!(matches!(err, HarnessError::Io(_)));
}

/// Tests that the shipped configuration matches the built-in defaults.
#[test]
fn test_shipped_default_config() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/default.toml");
    let config = Config::load(path).unwrap();
    let defaults = Config::default();
    assert_eq!(config.bfm.seed, defaults.bfm.seed);
    assert_eq!(config.bfm.random_delays, defaults.bfm.random_delays);
    assert_eq!(config.sim.max_ticks, defaults.sim.max_ticks);
    assert_eq!(config.sim.watchdog_ticks, defaults.sim.watchdog_ticks);
    assert_eq!(config.logging.level, defaults.logging.level);
}
