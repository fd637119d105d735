//! AXI4 DMA Verification Harness CLI.
//!
//! The main executable for the harness. It handles command-line argument
//! parsing, configuration and logging setup, and runs the built-in
//! self-check scenarios against the bus-functional model.
//!
//! # Usage
//!
//! * `--list` prints the available scenarios.
//! * `--scenario <name>` (repeatable) selects scenarios; by default all run.
//! * `--seed` and `--random-delays` override the `[bfm]` table.

use std::{fs, process};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use axi_dma_bfm::config::Config;
use axi_dma_bfm::sim::scenarios::{self, Scenario, SCENARIOS};
use axi_dma_bfm::stats::BfmStats;

/// Command-line arguments for the verification harness.
#[derive(Parser, Debug)]
#[command(author, version, about = "AXI4 DMA Bus-Functional Model Harness")]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Scenario to run; may be repeated.
    #[arg(short, long)]
    scenario: Vec<String>,

    /// Seed for the random delay source (decimal or 0x-prefixed hex).
    #[arg(long, value_parser = parse_u64)]
    seed: Option<u64>,

    /// Enable random handshake delays.
    #[arg(long)]
    random_delays: bool,

    /// Write aggregated statistics as JSON to this path.
    #[arg(long)]
    stats_json: Option<String>,

    /// List scenarios and exit.
    #[arg(long)]
    list: bool,
}

fn parse_u64(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{}': {}", s, e))
}

fn load_config(args: &Args) -> Config {
    let mut config = match &args.config {
        Some(path) => Config::load(path).unwrap_or_else(|e| {
            eprintln!("\n[!] FATAL: Could not load config '{}': {}", path, e);
            process::exit(1);
        }),
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config.bfm.seed = seed;
    }
    if args.random_delays {
        config.bfm.random_delays = true;
    }
    config
}

fn select(names: &[String]) -> Vec<&'static Scenario> {
    if names.is_empty() {
        return SCENARIOS.iter().collect();
    }
    names
        .iter()
        .map(|name| {
            scenarios::find(name).unwrap_or_else(|| {
                eprintln!("Error: unknown scenario '{}' (see --list)", name);
                process::exit(1);
            })
        })
        .collect()
}

/// Main entry point for the harness.
///
/// # Behavior
///
/// 1. **Configuration**: Parses arguments, loads the TOML file and applies
///    the CLI overrides.
/// 2. **Logging**: Installs a `tracing` subscriber filtered by `RUST_LOG`
///    or the configured level.
/// 3. **Scenarios**: Runs each selected scenario and logs PASS or FAIL.
/// 4. **Teardown**: Prints the aggregated statistics, optionally writes them
///    as JSON, and exits with code 1 if any scenario failed.
fn main() {
    let args = Args::parse();

    if args.list {
        for s in SCENARIOS {
            println!("{:<24} {}", s.name, s.description);
        }
        return;
    }

    let config = load_config(&args);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "harness configuration: seed={:#x} random_delays={}",
        config.bfm.seed, config.bfm.random_delays
    );

    let mut total = BfmStats::default();
    let mut failed = 0usize;
    let selected = select(&args.scenario);
    for scenario in &selected {
        info!("[{}] {}", scenario.name, scenario.description);
        match (scenario.run)(&config) {
            Ok(stats) => {
                info!("[{}] PASS ({} ticks)", scenario.name, stats.ticks);
                total.accumulate(&stats);
            }
            Err(e) => {
                error!("[{}] FAIL: {}", scenario.name, e);
                failed += 1;
            }
        }
    }

    total.print();
    println!(
        "\n[*] {} passed, {} failed",
        selected.len() - failed,
        failed
    );

    if let Some(path) = &args.stats_json {
        let written = serde_json::to_string_pretty(&total)
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(path, json).map_err(|e| e.to_string()));
        if let Err(e) = written {
            eprintln!("[!] Could not write statistics to '{}': {}", path, e);
            process::exit(1);
        }
    }

    if failed > 0 {
        process::exit(1);
    }
}
