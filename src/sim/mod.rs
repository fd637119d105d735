//! Simulation harness: the requester, the testbench and the built-in
//! scenarios.

/// Memory image loading.
pub mod loader;

/// Tick-driven AXI4 master used to exercise the model.
pub mod requester;

/// Built-in self-check scenarios.
pub mod scenarios;

/// Requester and BFM on a shared clock.
pub mod testbench;

pub use requester::{BurstRequester, Completion, CompletionStatus, Job, Misbehaviour};
pub use testbench::Testbench;
