use crate::output::SinkFailurePolicy;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure, loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,

    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,

    pub output: OutputConfig,

    #[serde(rename = "seed", default)]
    pub seeds: Vec<SeedEntry>,
}

/// Crawl engine knobs
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of simultaneously in-flight fetches (worker count)
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: u32,

    /// Lower bound of the politeness pause before each fetch
    #[serde(rename = "delay-min-ms")]
    pub delay_min_ms: u64,

    /// Upper bound of the politeness pause before each fetch
    #[serde(rename = "delay-max-ms")]
    pub delay_max_ms: u64,

    /// Retry budget per target; a target is attempted at most
    /// `max-retries + 1` times
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Depth limit from seeds; absent means unlimited
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    /// Interval between progress log lines
    #[serde(rename = "report-interval-secs", default = "default_report_interval")]
    pub report_interval_secs: u64,

    /// Per-request timeout for the HTTP fetcher
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_report_interval() -> u64 {
    10
}

fn default_fetch_timeout() -> u64 {
    30
}

impl CrawlerConfig {
    /// Converts file-level settings into engine run options
    pub fn to_options(&self) -> RunOptions {
        RunOptions {
            max_concurrent: self.max_concurrent as usize,
            delay_min: Duration::from_millis(self.delay_min_ms),
            delay_max: Duration::from_millis(self.delay_max_ms),
            max_retries: self.max_retries,
            max_depth: self.max_depth,
            report_interval: Duration::from_secs(self.report_interval_secs),
        }
    }
}

/// User agent identification for the HTTP fetcher
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler, appended to the UA string
    #[serde(rename = "contact-url", default)]
    pub contact_url: String,
}

fn default_crawler_name() -> String {
    "Skein".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: String::new(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the full user agent string
    pub fn to_user_agent(&self) -> String {
        if self.contact_url.is_empty() {
            format!("{}/{}", self.crawler_name, self.crawler_version)
        } else {
            format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, self.contact_url
            )
        }
    }
}

/// Where produced records go
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to a JSON Lines file; omit to disable the JSONL sink
    #[serde(rename = "jsonl-path")]
    pub jsonl_path: Option<String>,

    /// Path to a SQLite database; omit to disable the SQLite sink
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,

    /// Policy when a sink write fails
    #[serde(rename = "on-sink-error", default)]
    pub on_sink_error: SinkFailurePolicy,
}

/// One seed target as written in the config file
#[derive(Debug, Clone, Deserialize)]
pub struct SeedEntry {
    pub url: String,

    /// Target class, e.g. "listing" or "detail"
    #[serde(default = "default_seed_kind")]
    pub kind: String,

    /// Lower value is served first
    #[serde(default)]
    pub priority: u32,

    /// Opaque context carried to the processor and to child targets
    #[serde(default)]
    pub context: serde_json::Map<String, serde_json::Value>,
}

fn default_seed_kind() -> String {
    "listing".to_string()
}

/// Engine-facing run options, independent of the config file format
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_concurrent: usize,
    pub delay_min: Duration,
    pub delay_max: Duration,
    pub max_retries: u32,
    pub max_depth: Option<u32>,
    pub report_interval: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            delay_min: Duration::from_millis(500),
            delay_max: Duration::from_millis(1500),
            max_retries: 3,
            max_depth: None,
            report_interval: Duration::from_secs(10),
        }
    }
}

impl RunOptions {
    /// Checks the invariants that must hold before any worker launches
    pub fn validate(&self) -> Result<(), crate::ConfigError> {
        if self.max_concurrent == 0 {
            return Err(crate::ConfigError::Validation(
                "max-concurrent must be greater than 0".to_string(),
            ));
        }
        if self.delay_min > self.delay_max {
            return Err(crate::ConfigError::Validation(format!(
                "delay-min ({:?}) must not exceed delay-max ({:?})",
                self.delay_min, self.delay_max
            )));
        }
        if self.report_interval.is_zero() {
            return Err(crate::ConfigError::Validation(
                "report-interval-secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
