//! Remaining-time estimates.
//!
//! Estimates are advisory. They scale elapsed time by the fraction of seeds
//! handed out so far, so they are only as good as the declared seed count
//! and the assumption that every seed costs about the same.

use std::fmt;
use std::time::{Duration, Instant};

/// Minimum spacing between two estimates.
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(1);

/// One progress estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSnapshot {
    /// Seeds handed out so far.
    pub consumed: u64,
    /// Seeds expected in total.
    pub total: u64,
    /// Time since the estimator was created.
    pub elapsed: Duration,
    /// Projected time until the last seed is handed out.
    pub remaining: Duration,
}

impl ProgressSnapshot {
    /// Percentage of seeds handed out, capped at 100.
    pub fn percent(&self) -> f64 {
        (100.0 * self.consumed as f64 / self.total as f64).min(100.0)
    }
}

impl fmt::Display for ProgressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2}% ({}/{}) remaining: {}s",
            self.percent(),
            self.consumed,
            self.total,
            self.remaining.as_secs()
        )
    }
}

/// Produces at most one [`ProgressSnapshot`] per interval.
#[derive(Clone, Debug)]
pub struct ProgressEstimator {
    total: u64,
    interval: Duration,
    start: Instant,
    last_report: Instant,
}

impl ProgressEstimator {
    /// An estimator for `total` seeds reporting every [`PROGRESS_INTERVAL`].
    pub fn new(total: u64) -> Self {
        Self::with_interval(total, PROGRESS_INTERVAL, Instant::now())
    }

    /// An estimator starting at `start` with a custom interval.
    pub fn with_interval(total: u64, interval: Duration, start: Instant) -> Self {
        Self {
            total,
            interval,
            start,
            last_report: start,
        }
    }

    /// Observe `consumed` seeds now.
    pub fn observe(&mut self, consumed: u64) -> Option<ProgressSnapshot> {
        self.observe_at(Instant::now(), consumed)
    }

    /// Observe `consumed` seeds at `now`.
    ///
    /// Returns `None` until an interval has passed since the last estimate,
    /// and always when nothing is known about the total.
    pub fn observe_at(&mut self, now: Instant, consumed: u64) -> Option<ProgressSnapshot> {
        if self.total == 0 || consumed == 0 {
            return None;
        }
        if now.saturating_duration_since(self.last_report) < self.interval {
            return None;
        }
        self.last_report = now;
        let elapsed = now.saturating_duration_since(self.start);
        let projected = elapsed.mul_f64(self.total as f64 / consumed as f64);
        Some(ProgressSnapshot {
            consumed,
            total: self.total,
            elapsed,
            remaining: projected.saturating_sub(elapsed),
        })
    }
}
