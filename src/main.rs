//! Card-Harvester main entry point
//!
//! This is the command-line interface for the Card-Harvester result collector.

use anyhow::Context;
use card_harvester::config::{read_config, validate, Config};
use card_harvester::harvest::{build_requests, harvest};
use card_harvester::output::{generate_markdown_report, print_report, print_statistics};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Card-Harvester: collect identifiers from rendered search results
///
/// Card-Harvester renders a batch of paginated search-result pages in
/// headless Chromium, retries pages that fail to render, and prints the
/// deduplicated `name: identifier` pairs it found.
#[derive(Parser, Debug)]
#[command(name = "card-harvester")]
#[command(version)]
#[command(about = "Collect identifiers from rendered search results", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show which pages would be fetched without fetching
    #[arg(long)]
    dry_run: bool,

    /// Override the number of pages to fetch
    #[arg(long, value_name = "N")]
    pages: Option<u32>,

    /// Override the number of pages fetched at once
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headed: bool,

    /// Print run statistics after the results
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    handle_harvest(&config, cli.stats).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("card_harvester=info,warn"),
            1 => EnvFilter::new("card_harvester=debug,info"),
            2 => EnvFilter::new("card_harvester=trace,debug"),
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

/// Loads the configuration, applies command-line overrides, then validates
///
/// Overrides go in before validation, so a flag can replace an out-of-range
/// value from the file.
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = read_config(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    apply_overrides(&mut config, cli);
    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Applies command-line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(pages) = cli.pages {
        config.harvest.num_pages = pages;
    }
    if let Some(concurrency) = cli.concurrency {
        config.harvest.concurrency_limit = concurrency;
    }
    if cli.headed {
        config.harvest.headless = false;
    }
}

/// Handles the --dry-run mode: shows the configuration and planned pages
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Card-Harvester Dry Run ===\n");

    println!("Harvest Configuration:");
    println!("  Pages: {}", config.harvest.num_pages);
    println!("  Concurrency limit: {}", config.harvest.concurrency_limit);
    println!("  Max retries: {}", config.harvest.max_retries);
    println!(
        "  Validation timeout: {}ms",
        config.harvest.validation_timeout_ms
    );
    println!("  Backoff delay: {}ms", config.harvest.backoff_delay_ms);
    println!(
        "  Minimum results per page: {}",
        config.harvest.min_result_threshold
    );
    match config.harvest.attempt_deadline_ms {
        Some(ms) => println!("  Attempt deadline: {}ms", ms),
        None => println!("  Attempt deadline: none"),
    }
    println!("  Headless: {}", config.harvest.headless);

    println!("\nTarget:");
    println!("  Result cards: {}", config.target.result_selector);
    println!(
        "  Identifier: {} [{}]",
        config.target.identifier_selector, config.target.identifier_attribute
    );
    println!("  Name: {}", config.target.name_selector);

    let requests = build_requests(config)?;
    println!("\nPages ({}):", requests.len());
    for request in &requests {
        println!("  {}. {}", request.index, request.url);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: &Config, show_stats: bool) -> anyhow::Result<()> {
    let report = match harvest(config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    println!();
    print_report(&report.result);

    if show_stats {
        println!();
        print_statistics(&report.stats);
    }

    if let Some(path) = &config.output.report_path {
        generate_markdown_report(&report, Path::new(path))
            .with_context(|| format!("failed to write report to {}", path))?;
        tracing::info!("Report written to: {}", path);
    }

    Ok(())
}
