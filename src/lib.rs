//! Stockpile: an incremental product-catalog crawler
//!
//! This crate implements a single-site crawler that walks a product sitemap,
//! extracts structured product attributes from each page, and grows a JSON
//! snapshot across runs without ever re-crawling a URL that already produced
//! a record.

pub mod config;
pub mod crawler;
pub mod dataset;
pub mod extract;
pub mod output;
pub mod sitemap;

use thiserror::Error;

/// Main error type for Stockpile operations
///
/// Only sitemap acquisition and the final snapshot write are allowed to
/// terminate a run; everything that happens while processing a single page
/// is contained at the item boundary by the controller.
#[derive(Debug, Error)]
pub enum StockpileError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sitemap fetch failed for {location}: {reason}")]
    SitemapFetch { location: String, reason: String },

    #[error("Sitemap parse error: {0}")]
    SitemapParse(String),

    #[error("Failed to persist dataset to {path}: {source}")]
    Persist {
        path: String,
        source: std::io::Error,
    },

    #[error("Page error for {url}: {reason}")]
    Page { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Result type alias for Stockpile operations
pub type Result<T> = std::result::Result<T, StockpileError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use dataset::{Dataset, FieldValue, ProductRecord};
pub use sitemap::SitemapEntry;
