//! Crawl pipeline: targets, collaborator contracts, governor, workers,
//! retry policy and the run coordinator

mod coordinator;
mod fetcher;
mod governor;
mod parser;
mod retry;
mod stats;
mod target;
mod traits;
mod worker;

pub use coordinator::{CancelHandle, Coordinator};
pub use fetcher::HttpFetcher;
pub use governor::RateGovernor;
pub use parser::LinkExtractor;
pub use retry::{Disposition, RetryPolicy};
pub use stats::{RunStats, RunSummary, StatsSnapshot};
pub use target::{CrawlTarget, TargetContext, TargetKind};
pub use traits::{FetchError, FetchedContent, Fetcher, PageProcessor, ProcessError, ProcessOutcome};
