//! Retry policy: target disposition after a fetch failure
//!
//! Only fetch failures reach this policy. Processing failures are handled
//! by the worker directly and never retried.

use crate::crawler::CrawlTarget;

/// How far retried targets are demoted so fresh work is served first
const DEMOTION_STEP: u32 = 1;

/// What to do with a target after a fetch failure
#[derive(Debug)]
pub enum Disposition {
    /// Resubmit via `Frontier::resubmit` with the attempt count bumped
    Retry(CrawlTarget),

    /// Out of retries; count as a permanent failure and emit no further
    /// attempt
    Abandon(CrawlTarget),
}

/// Decides whether a failed target is re-queued
///
/// A target with `attempt = a` and configured `max_retries = m` is retried
/// while `a < m`, so a target whose fetcher always fails is attempted
/// exactly `m + 1` times total. No backoff is imposed beyond the rate
/// governor's standard per-fetch jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn decide(&self, mut target: CrawlTarget) -> Disposition {
        if target.attempt < self.max_retries {
            target.attempt += 1;
            target.priority = target.priority.saturating_add(DEMOTION_STEP);
            Disposition::Retry(target)
        } else {
            Disposition::Abandon(target)
        }
    }
}
