//! End-to-end pipeline tests with stub collaborators
//!
//! These drive the full coordinator/worker/frontier stack with scripted
//! fetchers and processors to pin down the engine's observable behavior:
//! dedup, retry bounds, fan-out completeness, priority ordering and
//! race-free completion under concurrency.

use async_trait::async_trait;
use serde_json::{json, Value};
use skein::config::RunOptions;
use skein::crawler::{
    Coordinator, CrawlTarget, FetchError, FetchedContent, Fetcher, PageProcessor, ProcessError,
    ProcessOutcome, TargetKind,
};
use skein::output::{Sink, SinkError, SinkFailurePolicy, SinkSet};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Fetcher that fails each URL a scripted number of times, then succeeds,
/// recording every attempt in order
struct ScriptedFetcher {
    fail_counts: HashMap<String, u32>,
    attempts: Arc<Mutex<HashMap<String, u32>>>,
    fetch_order: Arc<Mutex<Vec<String>>>,
    latency: Duration,
}

impl ScriptedFetcher {
    fn reliable() -> Self {
        Self {
            fail_counts: HashMap::new(),
            attempts: Arc::new(Mutex::new(HashMap::new())),
            fetch_order: Arc::new(Mutex::new(Vec::new())),
            latency: Duration::ZERO,
        }
    }

    fn failing(url: &str, times: u32) -> Self {
        let mut fetcher = Self::reliable();
        fetcher.fail_counts.insert(url.to_string(), times);
        fetcher
    }

    fn attempts_for(&self, url: &str) -> u32 {
        *self.attempts.lock().unwrap().get(url).unwrap_or(&0)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let entry = attempts.entry(url.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };
        self.fetch_order.lock().unwrap().push(url.to_string());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let budget = self.fail_counts.get(url).copied().unwrap_or(0);
        if attempt <= budget {
            return Err(FetchError::HttpStatus(503));
        }

        Ok(FetchedContent {
            final_url: url.to_string(),
            status: 200,
            content_type: Some("text/html".to_string()),
            body: format!("<html><body>{}</body></html>", url),
        })
    }
}

/// Processor that returns a fixed number of records per page and counts
/// invocations per URL
struct CountingProcessor {
    records_per_page: usize,
    invocations: Arc<Mutex<HashMap<String, u32>>>,
}

impl CountingProcessor {
    fn new(records_per_page: usize) -> Self {
        Self {
            records_per_page,
            invocations: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl PageProcessor for CountingProcessor {
    async fn process(
        &self,
        content: &FetchedContent,
        _target: &CrawlTarget,
    ) -> Result<ProcessOutcome, ProcessError> {
        *self
            .invocations
            .lock()
            .unwrap()
            .entry(content.final_url.clone())
            .or_insert(0) += 1;

        let records = (0..self.records_per_page)
            .map(|i| json!({ "url": content.final_url, "n": i }))
            .collect();
        Ok(ProcessOutcome {
            records,
            discovered: vec![],
        })
    }
}

/// Sink that accumulates records into shared memory
struct MemorySink {
    records: Arc<Mutex<Vec<Value>>>,
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn save(&mut self, record: &Value) -> Result<(), SinkError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

fn fast_options(max_concurrent: usize, max_retries: u32) -> RunOptions {
    RunOptions {
        max_concurrent,
        delay_min: Duration::ZERO,
        delay_max: Duration::ZERO,
        max_retries,
        ..RunOptions::default()
    }
}

fn seed(url: &str) -> CrawlTarget {
    CrawlTarget::seed(url, TargetKind::Listing)
}

#[tokio::test]
async fn no_lost_records_fan_out_completeness() {
    let first = Arc::new(Mutex::new(Vec::new()));
    let second = Arc::new(Mutex::new(Vec::new()));
    let mut sinks = SinkSet::new(SinkFailurePolicy::BestEffort);
    sinks.push(Box::new(MemorySink {
        records: Arc::clone(&first),
    }));
    sinks.push(Box::new(MemorySink {
        records: Arc::clone(&second),
    }));

    let mut coordinator = Coordinator::new(
        fast_options(2, 0),
        Arc::new(ScriptedFetcher::reliable()),
        Arc::new(CountingProcessor::new(4)),
        sinks,
    )
    .unwrap();

    let summary = coordinator
        .run(vec![seed("https://example.com/only")])
        .await
        .unwrap();

    assert_eq!(summary.targets_completed, 1);
    assert_eq!(summary.records_produced, 4);
    assert_eq!(first.lock().unwrap().len(), 4);
    assert_eq!(second.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn concurrency_safety_500_targets_no_duplicates() {
    let processor = Arc::new(CountingProcessor::new(1));
    let invocations = Arc::clone(&processor.invocations);

    let mut coordinator = Coordinator::new(
        fast_options(8, 0),
        Arc::new(ScriptedFetcher::reliable()),
        processor,
        SinkSet::new(SinkFailurePolicy::BestEffort),
    )
    .unwrap();

    let seeds: Vec<CrawlTarget> = (0..500)
        .map(|i| seed(&format!("https://example.com/page/{}", i)))
        .collect();

    let summary = coordinator.run(seeds).await.unwrap();

    assert_eq!(summary.targets_completed, 500);
    assert_eq!(summary.targets_failed, 0);
    assert_eq!(summary.queue_remaining_at_exit, 0);

    let invocations = invocations.lock().unwrap();
    assert_eq!(invocations.len(), 500);
    for (url, count) in invocations.iter() {
        assert_eq!(*count, 1, "URL {} was processed {} times", url, count);
    }
}

#[tokio::test]
async fn retry_bound_is_max_retries_plus_one() {
    let url = "https://example.com/always-down";
    let fetcher = Arc::new(ScriptedFetcher::failing(url, u32::MAX));

    let mut coordinator = Coordinator::new(
        fast_options(2, 3),
        fetcher.clone() as Arc<dyn Fetcher>,
        Arc::new(CountingProcessor::new(1)),
        SinkSet::new(SinkFailurePolicy::BestEffort),
    )
    .unwrap();

    let summary = coordinator.run(vec![seed(url)]).await.unwrap();

    assert_eq!(fetcher.attempts_for(url), 4);
    assert_eq!(summary.targets_completed, 0);
    assert_eq!(summary.targets_failed, 1);
    assert_eq!(summary.records_produced, 0);
}

#[tokio::test]
async fn scenario_one_flaky_target_among_three() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let mut sinks = SinkSet::new(SinkFailurePolicy::BestEffort);
    sinks.push(Box::new(MemorySink {
        records: Arc::clone(&received),
    }));

    let b = "https://example.com/b";
    let fetcher = Arc::new(ScriptedFetcher::failing(b, 2));

    let mut coordinator = Coordinator::new(
        fast_options(2, 1),
        fetcher.clone() as Arc<dyn Fetcher>,
        Arc::new(CountingProcessor::new(1)),
        sinks,
    )
    .unwrap();

    let seeds = vec![
        seed("https://example.com/a"),
        seed(b),
        seed("https://example.com/c"),
    ];
    let summary = coordinator.run(seeds).await.unwrap();

    assert_eq!(summary.targets_completed, 2);
    assert_eq!(summary.targets_failed, 1);
    // B exhausted its retry budget: initial attempt plus one retry.
    assert_eq!(fetcher.attempts_for(b), 2);

    let records = received.lock().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r["url"] != b));
}

#[tokio::test]
async fn priority_ordering_with_single_worker() {
    let fetcher = Arc::new(ScriptedFetcher::reliable());
    let order = Arc::clone(&fetcher.fetch_order);

    let mut coordinator = Coordinator::new(
        fast_options(1, 0),
        fetcher.clone() as Arc<dyn Fetcher>,
        Arc::new(CountingProcessor::new(0)),
        SinkSet::new(SinkFailurePolicy::BestEffort),
    )
    .unwrap();

    let seeds = vec![
        seed("https://example.com/x").with_priority(2),
        seed("https://example.com/y").with_priority(1),
    ];
    coordinator.run(seeds).await.unwrap();

    let order = order.lock().unwrap();
    assert_eq!(
        order.as_slice(),
        ["https://example.com/y", "https://example.com/x"]
    );
}

#[tokio::test]
async fn processing_errors_are_not_retried() {
    struct BrokenProcessor;

    #[async_trait]
    impl PageProcessor for BrokenProcessor {
        async fn process(
            &self,
            _content: &FetchedContent,
            _target: &CrawlTarget,
        ) -> Result<ProcessOutcome, ProcessError> {
            Err(ProcessError::Parse("garbage markup".to_string()))
        }
    }

    let url = "https://example.com/mangled";
    let fetcher = Arc::new(ScriptedFetcher::reliable());

    let mut coordinator = Coordinator::new(
        fast_options(2, 3),
        fetcher.clone() as Arc<dyn Fetcher>,
        Arc::new(BrokenProcessor),
        SinkSet::new(SinkFailurePolicy::BestEffort),
    )
    .unwrap();

    let summary = coordinator.run(vec![seed(url)]).await.unwrap();

    // The fetch succeeded once; the parse failure must not trigger a
    // refetch even with retry budget left.
    assert_eq!(fetcher.attempts_for(url), 1);
    assert_eq!(summary.targets_completed, 0);
    assert_eq!(summary.targets_failed, 1);
}

#[tokio::test]
async fn discovered_children_are_crawled_and_depth_limited() {
    /// Discovers one child per page until the chain gets deep enough
    struct ChainProcessor;

    #[async_trait]
    impl PageProcessor for ChainProcessor {
        async fn process(
            &self,
            content: &FetchedContent,
            target: &CrawlTarget,
        ) -> Result<ProcessOutcome, ProcessError> {
            let child_url = format!("{}/d", content.final_url);
            Ok(ProcessOutcome {
                records: vec![json!({ "url": content.final_url, "depth": target.depth })],
                discovered: vec![target.child(child_url, TargetKind::Detail)],
            })
        }
    }

    let options = RunOptions {
        max_depth: Some(2),
        ..fast_options(2, 0)
    };
    let mut coordinator = Coordinator::new(
        options,
        Arc::new(ScriptedFetcher::reliable()),
        Arc::new(ChainProcessor),
        SinkSet::new(SinkFailurePolicy::BestEffort),
    )
    .unwrap();

    let summary = coordinator
        .run(vec![seed("https://example.com/root")])
        .await
        .unwrap();

    // Depths 0, 1 and 2 complete; the depth-3 child is never admitted.
    assert_eq!(summary.targets_completed, 3);
    assert_eq!(summary.queue_remaining_at_exit, 0);
}

#[tokio::test]
async fn duplicate_discoveries_complete_once() {
    /// Every page claims to discover the same two siblings
    struct GossipProcessor;

    #[async_trait]
    impl PageProcessor for GossipProcessor {
        async fn process(
            &self,
            _content: &FetchedContent,
            target: &CrawlTarget,
        ) -> Result<ProcessOutcome, ProcessError> {
            Ok(ProcessOutcome {
                records: vec![],
                discovered: vec![
                    target.child("https://example.com/s1", TargetKind::Detail),
                    target.child("https://example.com/s2/", TargetKind::Detail),
                ],
            })
        }
    }

    let mut coordinator = Coordinator::new(
        fast_options(4, 0),
        Arc::new(ScriptedFetcher::reliable()),
        Arc::new(GossipProcessor),
        SinkSet::new(SinkFailurePolicy::BestEffort),
    )
    .unwrap();

    let seeds = vec![
        seed("https://example.com/p1"),
        seed("https://example.com/p2"),
        seed("https://example.com/p3"),
    ];
    let summary = coordinator.run(seeds).await.unwrap();

    // 3 seeds + 2 unique siblings, however many times they were discovered.
    assert_eq!(summary.targets_completed, 5);
}

#[tokio::test]
async fn cancellation_stops_taking_new_targets() {
    let fetcher = Arc::new(ScriptedFetcher {
        fail_counts: HashMap::new(),
        attempts: Arc::new(Mutex::new(HashMap::new())),
        fetch_order: Arc::new(Mutex::new(Vec::new())),
        latency: Duration::from_millis(30),
    });

    let mut coordinator = Coordinator::new(
        fast_options(1, 0),
        fetcher,
        Arc::new(CountingProcessor::new(0)),
        SinkSet::new(SinkFailurePolicy::BestEffort),
    )
    .unwrap();

    let cancel = coordinator.cancel_handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let seeds: Vec<CrawlTarget> = (0..200)
        .map(|i| seed(&format!("https://example.com/slow/{}", i)))
        .collect();
    let summary = coordinator.run(seeds).await.unwrap();

    assert!(summary.targets_completed < 200);
    assert!(summary.queue_remaining_at_exit > 0);
}
