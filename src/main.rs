//! Sumi-Spider main entry point
//!
//! This is the command-line interface for the Sumi-Spider crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use sumi_spider::config::{load_config_or_default, validate};
use sumi_spider::crawler::{crawl, validate_max_depth};
use sumi_spider::output::{print_summary, CrawlSummary};
use tracing_subscriber::EnvFilter;

/// Sumi-Spider: a bounded-depth concurrent web crawler
///
/// Starting from a single address, Sumi-Spider fetches pages breadth-first
/// with a pool of workers, following `<a href="...">` links until the maximum
/// depth is reached, there is nothing left to fetch, or Ctrl-C is pressed.
#[derive(Parser, Debug)]
#[command(name = "sumi-spider")]
#[command(version)]
#[command(about = "A bounded-depth concurrent web crawler", long_about = None)]
struct Cli {
    /// Address to start crawling from
    #[arg(value_name = "STARTING-ADDRESS")]
    start: String,

    /// Maximum number of link hops from the starting address
    #[arg(value_name = "MAX-DEPTH", allow_negative_numbers = true)]
    max_depth: i64,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Number of concurrent workers (overrides the config file)
    #[arg(short, long)]
    workers: Option<u32>,

    /// File receiving fetch failures and rejected links (overrides the config file)
    #[arg(long, value_name = "FILE")]
    error_log: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let quiet = cli.quiet;
    match run(cli).await {
        Ok(summary) => {
            if !quiet {
                println!();
                print_summary(&summary);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_spider=info,warn"),
            1 => EnvFilter::new("sumi_spider=debug,info"),
            2 => EnvFilter::new("sumi_spider=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads configuration, applies command-line overrides, and runs the crawl
async fn run(cli: Cli) -> anyhow::Result<CrawlSummary> {
    // Reject a bad depth before touching anything else
    validate_max_depth(cli.max_depth)?;

    let mut config = load_config_or_default(cli.config.as_deref()).with_context(|| {
        match &cli.config {
            Some(path) => format!("Failed to load configuration from {}", path.display()),
            None => "Invalid default configuration".to_string(),
        }
    })?;

    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(path) = &cli.error_log {
        config.output.error_log_path = path.display().to_string();
    }
    validate(&config).context("Invalid command-line overrides")?;

    tracing::debug!("Configuration: {:?}", config);

    let summary = crawl(&config, &cli.start, cli.max_depth)
        .await
        .with_context(|| format!("Crawl of {} failed", cli.start))?;

    Ok(summary)
}
