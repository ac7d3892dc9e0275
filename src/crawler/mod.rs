//! Crawler module
//!
//! This module contains the run orchestration and its two halves:
//! - HTTP fetching behind the [`PageFetcher`] seam
//! - The incremental crawl controller
//!
//! URLs are processed strictly sequentially; the crawl is paced, bounded by
//! an accept quota, and idempotent across runs.

mod controller;
mod fetcher;

pub use controller::{Controller, RunReport};
pub use fetcher::{build_http_client, FetchOutcome, PageFetcher, ReqwestFetcher};

use crate::config::Config;
use crate::dataset::JsonStore;
use crate::extract::DomExtractor;
use crate::sitemap;
use crate::StockpileError;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Runs a complete crawl operation
///
/// 1. Build the shared HTTP client (held for the whole run, released when
///    this scope unwinds on any path)
/// 2. Fetch and parse the sitemap (failure here is fatal and nothing is
///    written)
/// 3. Load the prior dataset snapshot (empty when there is none)
/// 4. Run the controller over the pending URLs
/// 5. Persist the grown dataset exactly once
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(RunReport)` - Counters for the completed run
/// * `Err(StockpileError)` - Sitemap acquisition or final persist failed
pub async fn crawl(config: Config) -> Result<RunReport, StockpileError> {
    let client = build_http_client(&config.user_agent, config.crawler.fetch_timeout_secs)?;

    let entries = sitemap::fetch_sitemap(&client, &config.sitemap.location).await?;

    let store = JsonStore::new(&config.output.dataset_path);
    let mut dataset = store.load();

    let extractor = DomExtractor::new(&config.selectors)?;
    let mut controller = Controller::new(
        config.crawler.clone(),
        ReqwestFetcher::new(client),
        extractor,
        StdRng::from_os_rng(),
    );

    let report = controller.run(&entries, &mut dataset).await;

    store.save(&dataset)?;

    tracing::info!(
        accepted = report.accepted,
        total = report.dataset_len,
        path = %store.path().display(),
        "Crawl completed"
    );

    Ok(report)
}
