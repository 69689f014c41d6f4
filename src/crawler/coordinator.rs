//! Run coordinator: end-to-end lifecycle of one crawl run
//!
//! The coordinator seeds the frontier, launches the worker pool and a
//! periodic progress reporter, waits for quiescence, then closes the sinks
//! and the fetcher and returns a final summary.

use crate::config::RunOptions;
use crate::crawler::worker::{run_worker, WorkerContext};
use crate::crawler::{
    CrawlTarget, Fetcher, PageProcessor, RateGovernor, RetryPolicy, RunStats, RunSummary,
};
use crate::frontier::Frontier;
use crate::output::SinkSet;
use crate::SkeinError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Handle for cancelling a running crawl from outside (e.g. a signal
/// handler)
///
/// Cancellation is cooperative: workers stop taking new targets after
/// their current iteration, and in-flight fetches complete or fail
/// naturally rather than being aborted.
#[derive(Clone)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
    frontier: Arc<Frontier>,
    governor: Arc<RateGovernor>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.governor.shutdown();
        self.frontier.wake_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Owns one crawl run
pub struct Coordinator {
    options: RunOptions,
    frontier: Arc<Frontier>,
    governor: Arc<RateGovernor>,
    fetcher: Arc<dyn Fetcher>,
    processor: Arc<dyn PageProcessor>,
    sinks: Arc<Mutex<SinkSet>>,
    stats: Arc<RunStats>,
    cancelled: Arc<AtomicBool>,
}

impl Coordinator {
    /// Creates a coordinator, validating the run options up front
    ///
    /// Configuration errors are fatal here, before any worker launches.
    pub fn new(
        options: RunOptions,
        fetcher: Arc<dyn Fetcher>,
        processor: Arc<dyn PageProcessor>,
        sinks: SinkSet,
    ) -> Result<Self, SkeinError> {
        options.validate()?;

        let governor = Arc::new(RateGovernor::new(
            options.max_concurrent,
            options.delay_min,
            options.delay_max,
        ));

        Ok(Self {
            options,
            frontier: Arc::new(Frontier::new()),
            governor,
            fetcher,
            processor,
            sinks: Arc::new(Mutex::new(sinks)),
            stats: Arc::new(RunStats::new()),
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns a handle that can cancel this run from another task
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            cancelled: Arc::clone(&self.cancelled),
            frontier: Arc::clone(&self.frontier),
            governor: Arc::clone(&self.governor),
        }
    }

    /// Runs the crawl to quiescence (or cancellation) and returns a summary
    pub async fn run(&mut self, seeds: Vec<CrawlTarget>) -> Result<RunSummary, SkeinError> {
        let total = seeds.len();
        let mut unique = 0usize;
        for seed in seeds {
            let url = seed.url.clone();
            match self.frontier.submit(seed) {
                Ok(true) => unique += 1,
                Ok(false) => tracing::debug!(url = %url, "duplicate seed skipped"),
                Err(e) => {
                    return Err(crate::ConfigError::InvalidUrl(format!(
                        "seed '{}': {}",
                        url, e
                    ))
                    .into())
                }
            }
        }
        tracing::info!(
            seeds = total,
            unique,
            workers = self.options.max_concurrent,
            "starting crawl"
        );

        let ctx = Arc::new(WorkerContext {
            frontier: Arc::clone(&self.frontier),
            governor: Arc::clone(&self.governor),
            fetcher: Arc::clone(&self.fetcher),
            processor: Arc::clone(&self.processor),
            sinks: Arc::clone(&self.sinks),
            retry: RetryPolicy::new(self.options.max_retries),
            stats: Arc::clone(&self.stats),
            max_depth: self.options.max_depth,
            cancelled: Arc::clone(&self.cancelled),
        });

        let workers: Vec<_> = (0..self.options.max_concurrent)
            .map(|id| tokio::spawn(run_worker(id, Arc::clone(&ctx))))
            .collect();

        let reporter = self.spawn_reporter();

        let mut join_error = None;
        for worker in workers {
            if let Err(e) = worker.await {
                join_error = Some(e);
            }
        }
        reporter.abort();

        self.close_collaborators().await;

        if let Some(e) = join_error {
            return Err(e.into());
        }

        let snapshot = self.stats.snapshot();
        let summary = RunSummary {
            targets_completed: snapshot.targets_completed,
            targets_failed: snapshot.targets_failed,
            records_produced: snapshot.records_produced,
            duration: self.stats.elapsed(),
            queue_remaining_at_exit: self.frontier.queued_len(),
        };

        tracing::info!(
            completed = summary.targets_completed,
            failed = summary.targets_failed,
            records = summary.records_produced,
            duration_secs = summary.duration.as_secs_f64(),
            queue_remaining = summary.queue_remaining_at_exit,
            "crawl finished"
        );

        Ok(summary)
    }

    /// Spawns the periodic progress reporter; aborted once workers finish
    fn spawn_reporter(&self) -> tokio::task::JoinHandle<()> {
        let stats = Arc::clone(&self.stats);
        let frontier = Arc::clone(&self.frontier);
        let period = self.options.report_interval;

        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            loop {
                ticker.tick().await;
                let snap = stats.snapshot();
                tracing::info!(
                    completed = snap.targets_completed,
                    failed = snap.targets_failed,
                    records = snap.records_produced,
                    retries = snap.retries,
                    queued = frontier.queued_len(),
                    in_flight = frontier.in_flight_len(),
                    pages_per_minute = format!("{:.1}", snap.pages_per_minute()),
                    "crawl progress"
                );
            }
        })
    }

    /// Closes sinks and the fetcher after the pool has fully drained
    ///
    /// Sink close failures are logged, never fatal: the run's work is
    /// already done by the time we get here.
    async fn close_collaborators(&self) {
        {
            let mut sinks = self.sinks.lock().unwrap();
            if let Err(e) = sinks.close_all() {
                tracing::warn!(error = %e, "sink close failed");
            }
            let lost = sinks.records_lost();
            if lost > 0 {
                tracing::warn!(records_lost = lost, "records lost to sink failures");
            }
        }
        self.fetcher.close().await;
    }
}
