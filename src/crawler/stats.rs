//! Run-wide counters and the final run summary
//!
//! Workers mutate counters append-style with atomic increments; the
//! coordinator's reporter reads them periodically. No counter requires
//! cross-field atomicity, so plain relaxed atomics suffice.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Process-wide counters for the duration of one run
#[derive(Debug)]
pub struct RunStats {
    started: Instant,
    started_at: DateTime<Utc>,

    pub targets_completed: AtomicU64,
    pub targets_failed: AtomicU64,
    pub records_produced: AtomicU64,
    pub process_errors: AtomicU64,
    pub retries: AtomicU64,
    pub bytes_fetched: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            started_at: Utc::now(),
            targets_completed: AtomicU64::new(0),
            targets_failed: AtomicU64::new(0),
            records_produced: AtomicU64::new(0),
            process_errors: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            bytes_fetched: AtomicU64::new(0),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Point-in-time copy of all counters, for the progress reporter
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            targets_completed: self.targets_completed.load(Ordering::Relaxed),
            targets_failed: self.targets_failed.load(Ordering::Relaxed),
            records_produced: self.records_produced.load(Ordering::Relaxed),
            process_errors: self.process_errors.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            bytes_fetched: self.bytes_fetched.load(Ordering::Relaxed),
            elapsed: self.elapsed(),
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

/// A consistent-enough view of the counters at one moment
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub targets_completed: u64,
    pub targets_failed: u64,
    pub records_produced: u64,
    pub process_errors: u64,
    pub retries: u64,
    pub bytes_fetched: u64,
    pub elapsed: Duration,
}

impl StatsSnapshot {
    /// Completed targets per minute since run start
    pub fn pages_per_minute(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.targets_completed as f64 / secs * 60.0
        } else {
            0.0
        }
    }
}

/// Final summary returned by the coordinator when a run ends
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub targets_completed: u64,
    pub targets_failed: u64,
    pub records_produced: u64,
    pub duration: Duration,

    /// Nonzero only when the run was cancelled before draining the queue
    pub queue_remaining_at_exit: usize,
}
