//! Contracts between the orchestration engine and its collaborators
//!
//! The engine drives a [`Fetcher`] and a [`PageProcessor`] but knows nothing
//! about transports or markup. Both report failure as values, never by
//! panicking: per-target errors are contained within the worker pool and
//! surfaced as counters plus log entries.

use crate::crawler::CrawlTarget;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Why a fetch failed
///
/// All variants are retryable under the baseline policy; distinguishing
/// subclasses for a differentiated retry policy is a documented extension.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Why processing failed; never retried, since reprocessing the same
/// content would reproduce the same error
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("parse failure: {0}")]
    Parse(String),
}

/// Raw content returned by a fetcher
#[derive(Debug, Clone)]
pub struct FetchedContent {
    /// URL after any redirects
    pub final_url: String,

    /// HTTP status code (0 for non-HTTP transports)
    pub status: u16,

    /// Content-Type header, if any
    pub content_type: Option<String>,

    /// Response body
    pub body: String,
}

/// What a processor produced from one page
#[derive(Debug, Default)]
pub struct ProcessOutcome {
    /// Opaque records, forwarded verbatim to every configured sink
    pub records: Vec<Value>,

    /// Newly discovered targets to submit back to the frontier
    pub discovered: Vec<CrawlTarget>,
}

/// Retrieves raw content for a URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedContent, FetchError>;

    /// Releases transport resources at run end; default is a no-op
    async fn close(&self) {}
}

/// Turns raw content into records and discovered targets
#[async_trait]
pub trait PageProcessor: Send + Sync {
    async fn process(
        &self,
        content: &FetchedContent,
        target: &CrawlTarget,
    ) -> Result<ProcessOutcome, ProcessError>;
}
