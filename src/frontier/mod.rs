//! Deduplicating priority frontier with in-flight tracking
//!
//! The frontier is the single shared structure every worker drains and
//! refills. It owns three pieces of state behind one lock:
//!
//! - the queue of pending targets, ordered by priority then arrival,
//! - the set of normalized-URL keys ever admitted (deduplication),
//! - the set of targets currently handed to a worker (in-flight).
//!
//! Quiescence — queue empty and nothing in flight — is the sole
//! termination condition for the worker pool. Checking queue emptiness
//! alone would be wrong: an in-flight target may still enqueue children.

use crate::crawler::CrawlTarget;
use crate::url::{frontier_key, normalize_url};
use crate::UrlError;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

/// Cap on how long an idle worker waits before re-checking the frontier.
/// Wakeups normally arrive via the notifier well before this expires.
const IDLE_WAIT: Duration = Duration::from_millis(500);

/// A queued target tagged with its arrival sequence number
#[derive(Debug)]
struct QueuedEntry {
    target: CrawlTarget,
    seq: u64,
}

// BinaryHeap is a max-heap, so comparisons are reversed: lower priority
// values pop first, and within a priority lower sequence numbers (earlier
// arrivals) pop first.
impl Ord for QueuedEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .target
            .priority
            .cmp(&self.target.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedEntry {
    fn eq(&self, other: &Self) -> bool {
        self.target.priority == other.target.priority && self.seq == other.seq
    }
}

impl Eq for QueuedEntry {}

#[derive(Debug, Default)]
struct FrontierInner {
    queue: BinaryHeap<QueuedEntry>,
    seen: HashSet<String>,
    // Counted, not a set: a resubmitted target can briefly be held by two
    // workers at once (the retrier's acknowledge racing the next holder),
    // and quiescence must not trigger until both are done.
    in_flight: HashMap<String, u32>,
    next_seq: u64,
}

/// Deduplicating work queue of pending fetch targets
///
/// All operations are atomic with respect to each other; a `next()` and a
/// `submit()` racing on the same normalized key cannot both succeed.
#[derive(Debug, Default)]
pub struct Frontier {
    inner: Mutex<FrontierInner>,
    wake: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submits a target, deduplicating on its normalized URL key
    ///
    /// Returns `Ok(false)` when the key has already been admitted in this
    /// run — the expected steady state once a crawl has visited most of a
    /// site, not an error. A key stays known even after its target
    /// completes or fails terminally, so a URL is never re-admitted.
    ///
    /// Returns `Err` only when the URL itself cannot be normalized.
    pub fn submit(&self, target: CrawlTarget) -> Result<bool, UrlError> {
        let normalized = normalize_url(&target.url)?;
        let key = frontier_key(&normalized);

        let mut inner = self.inner.lock().unwrap();
        if !inner.seen.insert(key) {
            return Ok(false);
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.queue.push(QueuedEntry { target, seq });
        drop(inner);

        self.wake.notify_one();
        Ok(true)
    }

    /// Re-enqueues a target whose key is already known (retry path)
    ///
    /// Bypasses the duplicate check: a retried target re-enters the queue,
    /// it does not register a new key.
    pub fn resubmit(&self, target: CrawlTarget) {
        let mut inner = self.inner.lock().unwrap();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.queue.push(QueuedEntry { target, seq });
        drop(inner);

        self.wake.notify_one();
    }

    /// Removes and returns the highest-priority queued target, marking it
    /// in-flight
    ///
    /// `None` means the queue is momentarily empty; callers must consult
    /// [`Frontier::is_quiescent`] to distinguish "work still in flight
    /// elsewhere" from "truly done".
    pub fn next(&self) -> Option<CrawlTarget> {
        let mut inner = self.inner.lock().unwrap();
        let entry = inner.queue.pop()?;
        *inner
            .in_flight
            .entry(entry.target.url.clone())
            .or_insert(0) += 1;
        Some(entry.target)
    }

    /// Marks a previously dequeued target as no longer in-flight
    ///
    /// Must be called exactly once per `next()` result, after the retry
    /// policy has decided the target's fate, regardless of outcome.
    pub fn acknowledge(&self, url: &str) {
        let mut inner = self.inner.lock().unwrap();
        match inner.in_flight.get_mut(url) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                inner.in_flight.remove(url);
            }
            None => {
                tracing::warn!(url, "acknowledge for a target that was not in flight");
            }
        }
        let quiescent = inner.queue.is_empty() && inner.in_flight.is_empty();
        drop(inner);

        // The last acknowledgement must wake every idle worker so they can
        // observe quiescence and exit.
        if quiescent {
            self.wake.notify_waiters();
        }
    }

    /// True iff the queue is empty and no target is in flight
    pub fn is_quiescent(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.queue.is_empty() && inner.in_flight.is_empty()
    }

    /// Number of queued (not in-flight) targets, for reporting only
    pub fn queued_len(&self) -> usize {
        self.inner.lock().unwrap().queue.len()
    }

    /// Number of targets currently handed to workers, for reporting only
    pub fn in_flight_len(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .in_flight
            .values()
            .map(|n| *n as usize)
            .sum()
    }

    /// Parks the caller until new work may be available
    ///
    /// Returns on a submit/acknowledge notification or after a short fixed
    /// interval, whichever comes first. The interval bounds the window in
    /// which a notification sent between the caller's last `next()` and
    /// this wait could be missed.
    pub async fn wait_for_work(&self) {
        tokio::select! {
            _ = self.wake.notified() => {}
            _ = tokio::time::sleep(IDLE_WAIT) => {}
        }
    }

    /// Wakes every parked worker; used when cancelling a run
    pub fn wake_all(&self) {
        self.wake.notify_waiters();
    }
}
