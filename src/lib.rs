//! AXI4 DMA Verification Harness Library.
//!
//! This crate implements a cycle-level bus-functional model (BFM) of the
//! memory side of an AXI4 interface, used to verify a DMA engine that is
//! otherwise treated as a black box.
//!
//! # Architecture
//!
//! * **Memory**: sparse byte-addressable store; unwritten bytes read as zero.
//! * **Channels**: independent read and write handler state machines, each
//!   advanced once per tick against a shared signal snapshot.
//! * **Monitor**: passive checker of handshake stability and `WLAST`
//!   placement on the requester side.
//! * **Policy**: seeded random delays, forced address stalls and forced
//!   `SLVERR` responses.
//!
//! # Modules
//!
//! * `common`: Shared constants, response codes and error types.
//! * `config`: Configuration loading and parsing.
//! * `control`: Control-plane register contract and driver.
//! * `sim`: Requester, testbench and built-in scenarios.
//! * `soc`: The bus-functional model.
//! * `stats`: Statistics collection.

/// Shared constants, response codes and error types.
///
/// Provides the beat geometry, the `OKAY`/`SLVERR` encodings and the three
/// error families (protocol violations, harness errors, control errors).
pub mod common;

/// Configuration system for the BFM, the simulation limits and logging.
///
/// Loads and parses TOML configuration files; every field has a default.
pub mod config;

/// Control-plane register contract.
///
/// Register offsets and bit layouts, a register-decode model, a driver
/// that programs and polls transfers, and an error-code oracle.
pub mod control;

/// Simulation harness.
///
/// A tick-driven AXI4 requester, the testbench that clocks it against the
/// BFM, and the named self-check scenarios.
pub mod sim;

/// The memory-side bus-functional model.
///
/// Signal bus definitions, memory store, timing policy, channel handlers,
/// protocol monitor and the per-tick scheduler.
pub mod soc;

/// Statistics collection and reporting.
pub mod stats;
