//! Worker: one concurrent execution unit of the crawl pipeline
//!
//! Each worker loops over the per-iteration contract: pull a target from
//! the frontier, acquire a governor permit, pause politely, fetch, process,
//! fan records out to the sinks, submit discovered children, acknowledge
//! the target. Fetch failures go to the retry policy; processing failures
//! are logged and counted but never retried, since reprocessing identical
//! content would fail identically.
//!
//! A worker exits when the frontier is quiescent or the run is cancelled.
//! Per-target errors never unwind past an iteration boundary.

use crate::crawler::retry::Disposition;
use crate::crawler::{
    CrawlTarget, Fetcher, PageProcessor, ProcessOutcome, RateGovernor, RetryPolicy, RunStats,
};
use crate::frontier::Frontier;
use crate::output::SinkSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Everything a worker shares with its siblings
pub(crate) struct WorkerContext {
    pub frontier: Arc<Frontier>,
    pub governor: Arc<RateGovernor>,
    pub fetcher: Arc<dyn Fetcher>,
    pub processor: Arc<dyn PageProcessor>,
    pub sinks: Arc<Mutex<SinkSet>>,
    pub retry: RetryPolicy,
    pub stats: Arc<RunStats>,
    pub max_depth: Option<u32>,
    pub cancelled: Arc<AtomicBool>,
}

/// Drives one worker until quiescence or cancellation
pub(crate) async fn run_worker(id: usize, ctx: Arc<WorkerContext>) {
    loop {
        if ctx.cancelled.load(Ordering::Relaxed) {
            tracing::debug!(worker = id, "worker stopping on cancellation");
            break;
        }

        let Some(target) = ctx.frontier.next() else {
            if ctx.frontier.is_quiescent() {
                break;
            }
            // Empty but work is in flight elsewhere; its children may yet
            // land in the queue.
            ctx.frontier.wait_for_work().await;
            continue;
        };

        crawl_one(id, &ctx, target).await;
    }
    tracing::debug!(worker = id, "worker done");
}

/// Runs one target through fetch, process and dispatch
///
/// Acknowledges the target exactly once on every path, after the retry
/// policy has decided its fate.
async fn crawl_one(id: usize, ctx: &Arc<WorkerContext>, target: CrawlTarget) {
    let url = target.url.clone();

    let Some(_permit) = ctx.governor.acquire().await else {
        // Permit pool closed mid-wait: the run is shutting down. Put the
        // target back untouched so a cancelled run reports it as queued.
        ctx.frontier.resubmit(target);
        ctx.frontier.acknowledge(&url);
        return;
    };

    ctx.governor.politeness_pause().await;

    tracing::debug!(worker = id, url = %url, kind = %target.kind, attempt = target.attempt, "fetching");

    match ctx.fetcher.fetch(&url).await {
        Ok(content) => {
            ctx.stats
                .bytes_fetched
                .fetch_add(content.body.len() as u64, Ordering::Relaxed);

            match ctx.processor.process(&content, &target).await {
                Ok(outcome) => {
                    dispatch(ctx, &target, outcome);
                    ctx.stats.targets_completed.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    // The page fetched fine; the content itself is the
                    // problem. Not resubmitted.
                    tracing::warn!(worker = id, url = %url, error = %e, "processing failed");
                    ctx.stats.process_errors.fetch_add(1, Ordering::Relaxed);
                    ctx.stats.targets_failed.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        Err(e) => match ctx.retry.decide(target) {
            Disposition::Retry(retried) => {
                tracing::debug!(
                    worker = id,
                    url = %url,
                    error = %e,
                    attempt = retried.attempt,
                    "fetch failed, requeueing"
                );
                ctx.stats.retries.fetch_add(1, Ordering::Relaxed);
                ctx.frontier.resubmit(retried);
            }
            Disposition::Abandon(abandoned) => {
                tracing::warn!(
                    worker = id,
                    url = %url,
                    error = %e,
                    attempts = abandoned.attempt + 1,
                    "fetch failed, out of retries"
                );
                ctx.stats.targets_failed.fetch_add(1, Ordering::Relaxed);
            }
        },
    }

    ctx.frontier.acknowledge(&url);
}

/// Fans records out to the sinks and submits discovered children
fn dispatch(ctx: &Arc<WorkerContext>, parent: &CrawlTarget, outcome: ProcessOutcome) {
    if !outcome.records.is_empty() {
        let saved = {
            let mut sinks = ctx.sinks.lock().unwrap();
            let mut result = Ok(());
            for record in &outcome.records {
                if let Err(e) = sinks.save(record) {
                    result = Err(e);
                    break;
                }
            }
            result
        };

        match saved {
            Ok(()) => {
                ctx.stats
                    .records_produced
                    .fetch_add(outcome.records.len() as u64, Ordering::Relaxed);
            }
            Err(e) => {
                // Only the fail-fast policy surfaces an error here; it ends
                // the run.
                tracing::error!(url = %parent.url, error = %e, "sink failure, cancelling run");
                ctx.cancelled.store(true, Ordering::Relaxed);
                ctx.frontier.wake_all();
            }
        }
    }

    for child in outcome.discovered {
        if let Some(max) = ctx.max_depth {
            if child.depth > max {
                tracing::trace!(url = %child.url, depth = child.depth, "skipping, over depth limit");
                continue;
            }
        }
        match ctx.frontier.submit(child) {
            Ok(true) => {}
            Ok(false) => {
                // Duplicate; the expected steady state late in a crawl.
            }
            Err(e) => {
                tracing::debug!(parent = %parent.url, error = %e, "dropping unparseable discovered URL");
            }
        }
    }
}
