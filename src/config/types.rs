use serde::Deserialize;

/// Main configuration structure for Stockpile
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub sitemap: SitemapConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub selectors: SelectorsConfig,
}

/// Sitemap source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SitemapConfig {
    /// Where the sitemap lives: an http(s) URL or a file:// reference
    pub location: String,
}

/// Crawler pacing and quota configuration
///
/// Every knob defaults to the production value; tests dial the delays down
/// to near zero.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of records accepted in a single run
    #[serde(rename = "accept-quota", default = "default_accept_quota")]
    pub accept_quota: u32,

    /// Below this many accepted records, the run logs a low-yield diagnostic
    #[serde(rename = "low-yield-threshold", default = "default_low_yield")]
    pub low_yield_threshold: u32,

    /// Base delay before every page fetch (milliseconds)
    #[serde(rename = "pre-fetch-delay-ms", default = "default_pre_fetch_delay")]
    pub pre_fetch_delay_ms: u64,

    /// Random jitter added on top of the base delay, in [0, jitter) ms
    #[serde(rename = "pre-fetch-jitter-ms", default = "default_pre_fetch_jitter")]
    pub pre_fetch_jitter_ms: u64,

    /// Fixed pause after each accepted record (milliseconds)
    #[serde(rename = "post-accept-delay-ms", default = "default_post_accept_delay")]
    pub post_accept_delay_ms: u64,

    /// Cool-down after an unexpected per-item error (milliseconds)
    #[serde(rename = "error-cooldown-ms", default = "default_error_cooldown")]
    pub error_cooldown_ms: u64,

    /// Whole-request deadline for a single page fetch (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
}

fn default_accept_quota() -> u32 {
    60
}

fn default_low_yield() -> u32 {
    20
}

fn default_pre_fetch_delay() -> u64 {
    2000
}

fn default_pre_fetch_jitter() -> u64 {
    2000
}

fn default_post_accept_delay() -> u64 {
    1000
}

fn default_error_cooldown() -> u64 {
    5000
}

fn default_fetch_timeout() -> u64 {
    60
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            accept_quota: default_accept_quota(),
            low_yield_threshold: default_low_yield(),
            pre_fetch_delay_ms: default_pre_fetch_delay(),
            pre_fetch_jitter_ms: default_pre_fetch_jitter(),
            post_accept_delay_ms: default_post_accept_delay(),
            error_cooldown_ms: default_error_cooldown(),
            fetch_timeout_secs: default_fetch_timeout(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON dataset snapshot
    #[serde(rename = "dataset-path")]
    pub dataset_path: String,
}

/// CSS selectors describing where product attributes live on a page
///
/// Only `price` is mandatory; every other attribute falls back to the
/// page title, a sentinel value, or a synthesized value when its selector
/// is absent or matches nothing.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorsConfig {
    /// Selector for the product name; when absent the <title> tag is used
    #[serde(default)]
    pub name: Option<String>,

    /// Suffix stripped from a title-derived name (e.g. a site slogan)
    #[serde(rename = "title-suffix", default)]
    pub title_suffix: Option<String>,

    /// Selector for the price element
    pub price: String,

    /// Currency symbol preserved when cleaning the price text
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub rating: Option<String>,

    #[serde(rename = "review-count", default)]
    pub review_count: Option<String>,

    #[serde(default)]
    pub brand: Option<String>,
}

fn default_currency() -> String {
    "₫".to_string()
}
