//! Test module organization.
//!
//! This module organizes all integration tests for the AXI4 bus-functional
//! model harness.


/// Configuration parsing tests.
mod config_tests;

/// Control-plane register model, driver and oracle tests.
mod control_tests;






/// Write channel handler state machine tests.
mod write_channel_tests;
