//! Skein command-line entry point
//!
//! Runs a crawl described by a TOML config file, using the built-in HTTP
//! fetcher and link-extraction processor. Library users with site-specific
//! processors drive [`skein::Coordinator`] directly instead.

use anyhow::Context;
use clap::Parser;
use skein::config::load_config;
use skein::crawler::{Coordinator, HttpFetcher, LinkExtractor};
use skein::output::{JsonlSink, SinkSet, SqliteSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Skein: a bounded-concurrency crawl engine
#[derive(Parser, Debug)]
#[command(name = "skein")]
#[command(version)]
#[command(about = "A bounded-concurrency crawl engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    let fetcher = Arc::new(HttpFetcher::new(
        &config.user_agent.to_user_agent(),
        Duration::from_secs(config.crawler.fetch_timeout_secs),
    )?);
    let processor = Arc::new(LinkExtractor::new());

    let mut sinks = SinkSet::new(config.output.on_sink_error);
    if let Some(path) = &config.output.jsonl_path {
        sinks.push(Box::new(JsonlSink::create(Path::new(path))?));
    }
    if let Some(path) = &config.output.database_path {
        sinks.push(Box::new(SqliteSink::open(Path::new(path))?));
    }

    let mut coordinator =
        Coordinator::new(config.crawler.to_options(), fetcher, processor, sinks)?;

    // Ctrl-C stops workers after their current iteration; in-flight fetches
    // finish naturally.
    let cancel = coordinator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, finishing in-flight work");
            cancel.cancel();
        }
    });

    let summary = coordinator.run(config.seed_targets()).await?;

    println!("\n=== Crawl Complete ===");
    println!("Targets completed: {}", summary.targets_completed);
    println!("Targets failed:    {}", summary.targets_failed);
    println!("Records produced:  {}", summary.records_produced);
    println!("Duration:          {:.1}s", summary.duration.as_secs_f64());
    if summary.queue_remaining_at_exit > 0 {
        println!(
            "Left in queue:     {} (run was interrupted)",
            summary.queue_remaining_at_exit
        );
    }

    Ok(())
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("skein=info,warn"),
            1 => EnvFilter::new("skein=debug,info"),
            2 => EnvFilter::new("skein=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Prints the effective configuration without starting a crawl
fn print_dry_run(config: &skein::Config) {
    println!("=== Skein Dry Run ===\n");

    println!("Crawler:");
    println!("  Max concurrent:  {}", config.crawler.max_concurrent);
    println!(
        "  Politeness:      {}..{}ms",
        config.crawler.delay_min_ms, config.crawler.delay_max_ms
    );
    println!("  Max retries:     {}", config.crawler.max_retries);
    match config.crawler.max_depth {
        Some(depth) => println!("  Max depth:       {}", depth),
        None => println!("  Max depth:       unlimited"),
    }

    println!("\nUser agent: {}", config.user_agent.to_user_agent());

    println!("\nOutput:");
    if let Some(path) = &config.output.jsonl_path {
        println!("  JSONL:   {}", path);
    }
    if let Some(path) = &config.output.database_path {
        println!("  SQLite:  {}", path);
    }
    println!("  On sink error: {:?}", config.output.on_sink_error);

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - [{}] {} (priority {})", seed.kind, seed.url, seed.priority);
    }

    println!("\n✓ Configuration is valid");
}
