//! Configuration loading and validation
//!
//! Settings live in a TOML file with kebab-case keys. Loading validates
//! everything up front; configuration errors are the only errors that
//! terminate a run before it starts.

mod types;
mod validation;

pub use types::{Config, CrawlerConfig, OutputConfig, RunOptions, SeedEntry, UserAgentConfig};
pub use validation::validate;

use crate::crawler::{CrawlTarget, TargetKind};
use crate::ConfigError;
use std::path::Path;

/// Loads and validates a configuration file
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    validate(&config)?;
    Ok(config)
}

impl Config {
    /// Converts the `[[seed]]` entries into crawl targets
    pub fn seed_targets(&self) -> Vec<CrawlTarget> {
        self.seeds
            .iter()
            .map(|seed| {
                CrawlTarget::seed(&seed.url, TargetKind::from(seed.kind.as_str()))
                    .with_priority(seed.priority)
                    .with_context(seed.context.clone())
            })
            .collect()
    }
}
