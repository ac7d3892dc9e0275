//! Stockpile main entry point
//!
//! This is the command-line interface for the Stockpile product crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use stockpile::config::load_config_with_hash;
use stockpile::crawler::crawl;
use tracing_subscriber::EnvFilter;

/// Stockpile: an incremental product-catalog crawler
///
/// Stockpile walks a product sitemap one page at a time, extracts product
/// attributes, and grows a JSON snapshot across runs. URLs that already
/// have a record are never fetched again.
#[derive(Parser, Debug)]
#[command(name = "stockpile")]
#[command(version = "1.0.0")]
#[command(about = "An incremental product-catalog crawler", long_about = None)]
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

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the dataset snapshot and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config);
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("stockpile=info,warn"),
            1 => EnvFilter::new("stockpile=debug,info"),
            2 => EnvFilter::new("stockpile=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &stockpile::config::Config) {
    println!("=== Stockpile Dry Run ===\n");

    println!("Sitemap:");
    println!("  Location: {}", config.sitemap.location);

    println!("\nCrawler Configuration:");
    println!("  Accept quota: {}", config.crawler.accept_quota);
    println!(
        "  Low-yield threshold: {}",
        config.crawler.low_yield_threshold
    );
    println!(
        "  Pre-fetch delay: {}ms + [0,{}ms) jitter",
        config.crawler.pre_fetch_delay_ms, config.crawler.pre_fetch_jitter_ms
    );
    println!(
        "  Post-accept delay: {}ms",
        config.crawler.post_accept_delay_ms
    );
    println!("  Error cool-down: {}ms", config.crawler.error_cooldown_ms);
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Dataset: {}", config.output.dataset_path);

    println!("\nSelectors:");
    println!("  Price: {}", config.selectors.price);
    match &config.selectors.name {
        Some(name) => println!("  Name: {}", name),
        None => println!("  Name: <title> tag"),
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl up to {} new products from {}",
        config.crawler.accept_quota, config.sitemap.location
    );
}

/// Handles the --stats mode: shows statistics from the dataset snapshot
fn handle_stats(config: &stockpile::config::Config) {
    use stockpile::dataset::JsonStore;
    use stockpile::output::{load_statistics, print_statistics};

    println!("Dataset: {}\n", config.output.dataset_path);

    let store = JsonStore::new(&config.output.dataset_path);
    let dataset = store.load();

    let stats = load_statistics(&dataset);
    print_statistics(&stats);
}

/// Handles the main crawl operation
async fn handle_crawl(config: stockpile::config::Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl (sitemap: {}, quota: {})",
        config.sitemap.location,
        config.crawler.accept_quota
    );

    match crawl(config).await {
        Ok(report) => {
            tracing::info!(
                "Crawl completed: {} accepted, {} fetch failures, {} skipped, {} total records",
                report.accepted,
                report.fetch_failures,
                report.skipped_no_product,
                report.dataset_len
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
