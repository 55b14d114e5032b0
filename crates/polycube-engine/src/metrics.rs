//! Summary metrics for a completed run.

use std::time::Duration;

/// Counters collected by one [`GrowthPool`](crate::GrowthPool) run.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    /// Keys emitted at the output length.
    pub total: u64,
    /// Seeds handed to workers.
    pub seeds_consumed: u64,
    /// Seeds read from a source and dropped for having the wrong length.
    pub seeds_rejected: u64,
    /// Output batches written to the sink, the final partial batch included.
    pub flushes: u64,
    /// Wall-clock time from spawning the workers to the final flush.
    pub elapsed: Duration,
    /// Worker threads used.
    pub threads: usize,
}

impl RunReport {
    /// Emitted keys per second of wall-clock time, or 0 for an
    /// instantaneous run.
    pub fn keys_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.total as f64 / secs
        } else {
            0.0
        }
    }
}
