//! Skein: a bounded-concurrency crawl orchestration engine
//!
//! This crate turns a set of seed targets into a deduplicated, retryable
//! fetch-and-process pipeline. Site-specific parsing, output formatting and
//! transport details live behind three seams: a [`crawler::Fetcher`], a
//! [`crawler::PageProcessor`] and one or more [`output::Sink`]s. The engine
//! itself owns the frontier queue, the rate governor, the worker pool, the
//! retry policy and the run coordinator.

pub mod config;
pub mod crawler;
pub mod frontier;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Skein operations
#[derive(Debug, Error)]
pub enum SkeinError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Sink error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Worker task panicked: {0}")]
    WorkerPanic(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors; always fatal before any worker launches
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Skein operations
pub type Result<T> = std::result::Result<T, SkeinError>;

// Re-export commonly used types
pub use config::{Config, RunOptions};
pub use crawler::{Coordinator, CrawlTarget, Fetcher, PageProcessor, RunSummary, TargetKind};
pub use frontier::Frontier;
pub use output::{Sink, SinkFailurePolicy, SinkSet};
pub use url::{frontier_key, normalize_url};
