//! Bus-functional model statistics collection and reporting.
//!
//! Tracks burst and beat counts, injected delay and stall ticks, error
//! responses and reset fallout for one harness run.

use std::time::Instant;

use serde::Serialize;

/// Statistics structure tracking everything the BFM counts while it runs.
///
/// Counters are updated by the scheduler and the channel handlers. The
/// structure serializes to JSON for the `--stats-json` report.
#[derive(Clone, Debug, Serialize)]
pub struct BfmStats {
    #[serde(skip)]
    start_time: Instant,
    pub ticks: u64,
    pub reset_ticks: u64,

    pub read_bursts: u64,
    pub write_bursts: u64,
    pub read_beats: u64,
    pub write_beats: u64,
    pub bytes_written: u64,

    pub delay_ticks: u64,
    pub stall_ticks: u64,

    pub error_responses: u64,
    pub abandoned_bursts: u64,
    pub requester_aborts: u64,
}

impl Default for BfmStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            ticks: 0,
            reset_ticks: 0,
            read_bursts: 0,
            write_bursts: 0,
            read_beats: 0,
            write_beats: 0,
            bytes_written: 0,
            delay_ticks: 0,
            stall_ticks: 0,
            error_responses: 0,
            abandoned_bursts: 0,
            requester_aborts: 0,
        }
    }
}

impl BfmStats {
    /// Returns the total number of completed data beats in both directions.
    pub fn total_beats(&self) -> u64 {
        self.read_beats + self.write_beats
    }

    /// Adds every counter of `other` into `self`.
    ///
    /// Used by the CLI to aggregate the per-scenario reports.
    pub fn accumulate(&mut self, other: &BfmStats) {
        self.ticks += other.ticks;
        self.reset_ticks += other.reset_ticks;
        self.read_bursts += other.read_bursts;
        self.write_bursts += other.write_bursts;
        self.read_beats += other.read_beats;
        self.write_beats += other.write_beats;
        self.bytes_written += other.bytes_written;
        self.delay_ticks += other.delay_ticks;
        self.stall_ticks += other.stall_ticks;
        self.error_responses += other.error_responses;
        self.abandoned_bursts += other.abandoned_bursts;
        self.requester_aborts += other.requester_aborts;
    }

    /// Prints a formatted summary of the collected statistics.
    ///
    /// Displays the bus activity, the share of ticks spent in injected
    /// delays and the fault counters in a human-readable format.
    pub fn print(&self) {
        let seconds = self.start_time.elapsed().as_secs_f64();
        let ticks = if self.ticks == 0 { 1 } else { self.ticks };
        let beats_per_tick = self.total_beats() as f64 / ticks as f64;
        let khz = if seconds > 0.0 {
            (self.ticks as f64 / seconds) / 1000.0
        } else {
            0.0
        };

        println!("\n==========================================================");
        println!("AXI4 BUS-FUNCTIONAL MODEL STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", seconds);
        println!("sim_ticks                {}", self.ticks);
        println!("sim_freq                 {:.2} kHz", khz);
        println!("reset_ticks              {}", self.reset_ticks);
        println!("beats_per_tick           {:.4}", beats_per_tick);

        println!("\nBUS ACTIVITY");
        println!("----------------------------------------------------------");
        println!("  read.bursts            {}", self.read_bursts);
        println!("  read.beats             {}", self.read_beats);
        println!("  write.bursts           {}", self.write_bursts);
        println!("  write.beats            {}", self.write_beats);
        println!("  write.bytes            {}", self.bytes_written);

        println!("\nTIMING");
        println!("----------------------------------------------------------");
        println!(
            "  delay.ticks            {:<10} ({:.2}%)",
            self.delay_ticks,
            (self.delay_ticks as f64 / ticks as f64) * 100.0
        );
        println!(
            "  stall.ticks            {:<10} ({:.2}%)",
            self.stall_ticks,
            (self.stall_ticks as f64 / ticks as f64) * 100.0
        );

        println!("\nFAULTS");
        println!("----------------------------------------------------------");
        println!("  error.responses        {}", self.error_responses);
        println!("  abandoned.bursts       {}", self.abandoned_bursts);
        println!("  requester.aborts       {}", self.requester_aborts);
        println!("==========================================================");
    }
}
