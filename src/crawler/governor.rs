//! Rate governor: bounded concurrency plus politeness jitter
//!
//! Two independent brakes on fetch pressure:
//!
//! - a counting permit pool of size `max_concurrent`, acquired before every
//!   fetch and released on every exit path via the permit's drop guard,
//! - a per-worker politeness pause drawn uniformly from
//!   `[delay_min, delay_max]` before each fetch.
//!
//! The pause is per-connection politeness, not a global throttle: with N
//! workers the effective minimum page interval is `delay_min / N` in the
//! worst case, which is intentional.

use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

pub struct RateGovernor {
    permits: Arc<Semaphore>,
    delay_min: Duration,
    delay_max: Duration,
}

impl RateGovernor {
    pub fn new(max_concurrent: usize, delay_min: Duration, delay_max: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_concurrent)),
            delay_min,
            delay_max,
        }
    }

    /// Acquires a fetch permit; released when the returned guard drops
    ///
    /// `None` only when the pool has been closed for shutdown.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        Arc::clone(&self.permits).acquire_owned().await.ok()
    }

    /// Sleeps for a jittered politeness interval
    pub async fn politeness_pause(&self) {
        let pause = self.jitter();
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }

    /// Stops handing out permits; pending `acquire` calls return `None`
    pub fn shutdown(&self) {
        self.permits.close();
    }

    /// Permits currently available, for reporting
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    fn jitter(&self) -> Duration {
        if self.delay_max <= self.delay_min {
            return self.delay_min;
        }
        let span_ms = (self.delay_max - self.delay_min).as_millis() as u64;
        let extra = rand::rng().random_range(0..=span_ms);
        self.delay_min + Duration::from_millis(extra)
    }
}
