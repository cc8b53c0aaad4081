//! Simulation statistics collection and reporting.
//!
//! This module tracks how far a run has progressed. It provides:
//! 1. **Edges:** Total `step()` evaluations and full clock ticks.
//! 2. **Reset:** Ticks spent with reset asserted.
//! 3. **Rate:** Host time and derived simulated clock frequency.

use std::time::Instant;

/// Run statistics for one sequencer.
#[derive(Clone, Debug)]
pub struct SimStats {
    start_time: Instant,
    /// Total `step()` evaluations of the circuit model.
    pub steps: u64,
    /// Total full clock ticks (low phase plus high phase).
    pub ticks: u64,
    /// Ticks performed with `rst` asserted.
    pub reset_ticks: u64,
}

impl Default for SimStats {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            steps: 0,
            ticks: 0,
            reset_ticks: 0,
        }
    }
}

impl SimStats {
    /// Returns host seconds elapsed since the statistics were created.
    pub fn host_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }

    /// Returns the simulated clock rate in kHz (ticks per host second).
    pub fn tick_rate_khz(&self) -> f64 {
        let seconds = self.host_seconds();
        if seconds <= 0.0 {
            return 0.0;
        }
        (self.ticks as f64 / seconds) / 1000.0
    }

    /// Prints the statistics summary to stdout.
    pub fn print(&self) {
        println!("\n==========================================================");
        println!("SOC SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", self.host_seconds());
        println!("sim_steps                {}", self.steps);
        println!("sim_ticks                {}", self.ticks);
        println!("sim_reset_ticks          {}", self.reset_ticks);
        println!("sim_freq                 {:.2} kHz", self.tick_rate_khz());
        println!("----------------------------------------------------------");
    }
}
