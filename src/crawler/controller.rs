//! Incremental crawl controller
//!
//! The controller owns the per-run state machine:
//! - Diff the sitemap against the loaded dataset to get the worklist
//! - Walk the worklist front-to-back under the accept quota
//! - Pace every fetch with a randomized delay
//! - Admit candidates, assign ids, synthesize stock
//! - Contain every per-item failure at the item boundary
//!
//! Re-running over the controller's own output crawls nothing: a URL that
//! produced a record is excluded by the diff on every future run, so the
//! dataset only grows.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{FetchOutcome, PageFetcher};
use crate::dataset::{Dataset, ProductRecord};
use crate::extract::{Extractor, ProductCandidate};
use crate::StockpileError;
use chrono::Utc;
use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Maximum stock value synthesized for a record
const STOCK_MAX: u32 = 500;

/// What happened to a single worklist item
enum ItemOutcome {
    /// A candidate passed extraction (admission still pending)
    Extracted(ProductCandidate),

    /// HTTP or network failure; the URL stays eligible for future runs
    FetchFailed,

    /// The page held no admissible product
    NoProduct,
}

/// Counters describing one crawl run
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Worklist size after diffing the sitemap against the dataset
    pub pending: usize,

    /// Records accepted this run
    pub accepted: u32,

    /// Items dropped on HTTP/network failure
    pub fetch_failures: u32,

    /// Items fetched fine but holding no admissible product
    pub skipped_no_product: u32,

    /// Items that hit the unexpected-error path
    pub item_errors: u32,

    /// Dataset size after the run
    pub dataset_len: usize,
}

/// Drives one bounded, sequential crawl over the pending sitemap entries
///
/// The controller threads all mutable run state explicitly: the fetch
/// capability, the extractor, and the randomness source are injected so
/// tests can script every one of them.
pub struct Controller<F, X, R> {
    config: CrawlerConfig,
    fetcher: F,
    extractor: X,
    rng: R,
}

impl<F: PageFetcher, X: Extractor, R: Rng> Controller<F, X, R> {
    pub fn new(config: CrawlerConfig, fetcher: F, extractor: X, rng: R) -> Self {
        Self {
            config,
            fetcher,
            extractor,
            rng,
        }
    }

    /// Runs the crawl, appending accepted records to `dataset`
    ///
    /// Processes pending URLs strictly one at a time, in sitemap order,
    /// until the accept quota is reached or the worklist is exhausted.
    /// Failed items do not count against the quota and never consume an id.
    pub async fn run(
        &mut self,
        sitemap: &[crate::sitemap::SitemapEntry],
        dataset: &mut Dataset,
    ) -> RunReport {
        let mut known: HashSet<String> = dataset.known_urls();

        // Diff: only URLs without a record are worth visiting
        let worklist: Vec<&str> = sitemap
            .iter()
            .map(|e| e.location.as_str())
            .filter(|loc| !known.contains(*loc))
            .collect();

        tracing::info!(
            sitemap = sitemap.len(),
            known = dataset.len(),
            pending = worklist.len(),
            quota = self.config.accept_quota,
            "Crawl worklist computed"
        );

        let mut report = RunReport {
            pending: worklist.len(),
            ..RunReport::default()
        };
        let mut next_id = dataset.next_id();

        for location in worklist {
            if report.accepted >= self.config.accept_quota {
                tracing::info!(accepted = report.accepted, "Accept quota reached");
                break;
            }

            // A sitemap can list the same URL twice; the first accepted
            // record wins
            if known.contains(location) {
                continue;
            }

            match self.process_item(location).await {
                Ok(ItemOutcome::Extracted(candidate)) => {
                    // Admission gate: both name and price must be present
                    if candidate.name.is_empty() || candidate.price.is_empty() {
                        tracing::info!(url = location, "No price or name, skipping");
                        report.skipped_no_product += 1;
                        continue;
                    }

                    let record = self.admit(location, next_id, candidate);
                    tracing::info!(
                        id = record.id,
                        url = location,
                        name = %record.name,
                        price = %record.price,
                        stock = record.stock,
                        "Accepted product"
                    );

                    known.insert(location.to_string());
                    dataset.push(record);
                    next_id += 1;
                    report.accepted += 1;

                    self.pause(self.config.post_accept_delay_ms).await;
                }
                Ok(ItemOutcome::NoProduct) => {
                    tracing::info!(url = location, "No product data, skipping");
                    report.skipped_no_product += 1;
                }
                Ok(ItemOutcome::FetchFailed) => {
                    report.fetch_failures += 1;
                }
                Err(e) => {
                    tracing::warn!(url = location, error = %e, "Failed to crawl item");
                    report.item_errors += 1;
                    self.pause(self.config.error_cooldown_ms).await;
                }
            }
        }

        report.dataset_len = dataset.len();

        tracing::info!(
            accepted = report.accepted,
            fetch_failures = report.fetch_failures,
            skipped = report.skipped_no_product,
            item_errors = report.item_errors,
            total = report.dataset_len,
            "Crawl loop finished"
        );

        if report.accepted < self.config.low_yield_threshold {
            tracing::warn!(
                accepted = report.accepted,
                threshold = self.config.low_yield_threshold,
                "Low yield this run; more source URLs are needed"
            );
        }

        report
    }

    /// Fetches and extracts a single URL
    ///
    /// HTTP and network failures come back as outcomes; any `Err` is the
    /// unexpected path the caller answers with the extended cool-down.
    async fn process_item(&mut self, location: &str) -> Result<ItemOutcome, StockpileError> {
        tracing::info!(url = location, "Crawling");

        // Randomized pacing so request timing carries no uniform signature
        let jitter = if self.config.pre_fetch_jitter_ms > 0 {
            self.rng.random_range(0..self.config.pre_fetch_jitter_ms)
        } else {
            0
        };
        self.pause(self.config.pre_fetch_delay_ms + jitter).await;

        let body = match self.fetcher.fetch(location).await? {
            FetchOutcome::Success { body, .. } => body,
            FetchOutcome::HttpFailure {
                status,
                status_text,
            } => {
                tracing::warn!(url = location, status, status_text = %status_text, "HTTP failure");
                return Ok(ItemOutcome::FetchFailed);
            }
            FetchOutcome::NetworkFailure { reason, timed_out } => {
                tracing::warn!(url = location, reason = %reason, timed_out, "Network failure");
                return Ok(ItemOutcome::FetchFailed);
            }
        };

        let page_url = Url::parse(location)?;
        match self.extractor.extract(&page_url, &body, &mut self.rng) {
            Some(candidate) => Ok(ItemOutcome::Extracted(candidate)),
            None => Ok(ItemOutcome::NoProduct),
        }
    }

    /// Builds the permanent record for an admitted candidate
    fn admit(&mut self, location: &str, id: u64, candidate: ProductCandidate) -> ProductRecord {
        ProductRecord {
            id,
            url: location.to_string(),
            name: candidate.name,
            price: candidate.price,
            description: candidate.description,
            category: candidate.category,
            image: candidate.image,
            rating: candidate.rating,
            review_count: candidate.review_count,
            brand_name: candidate.brand_name,
            // Real inventory is unavailable, so stock is synthesized
            stock: self.rng.random_range(1..=STOCK_MAX),
            crawled_at: Utc::now(),
        }
    }

    async fn pause(&self, ms: u64) {
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}
