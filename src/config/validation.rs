use crate::config::types::{Config, OutputConfig, SeedEntry};
use crate::url::normalize_url;
use crate::ConfigError;

/// Validates the entire configuration
///
/// All checks here are fatal at run start, before any worker launches.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    config.crawler.to_options().validate()?;

    if config.crawler.max_concurrent > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent must be at most 100, got {}",
            config.crawler.max_concurrent
        )));
    }

    validate_output(&config.output)?;
    validate_seeds(&config.seeds)?;
    Ok(())
}

/// At least one sink must be configured, otherwise every record produced
/// by the run would be dropped on the floor
fn validate_output(output: &OutputConfig) -> Result<(), ConfigError> {
    if output.jsonl_path.is_none() && output.database_path.is_none() {
        return Err(ConfigError::Validation(
            "output must configure at least one of jsonl-path or database-path".to_string(),
        ));
    }
    if let Some(path) = &output.jsonl_path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "jsonl-path cannot be empty".to_string(),
            ));
        }
    }
    if let Some(path) = &output.database_path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "database-path cannot be empty".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_seeds(seeds: &[SeedEntry]) -> Result<(), ConfigError> {
    if seeds.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[seed]] entry is required".to_string(),
        ));
    }
    for seed in seeds {
        normalize_url(&seed.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("seed '{}': {}", seed.url, e)))?;
    }
    Ok(())
}
