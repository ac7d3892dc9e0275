//! Sitemap source
//!
//! This module obtains the list of candidate product pages for a run:
//! - Remote sitemaps are fetched over HTTP with the shared client
//! - Local sitemaps (file:// references) are read straight from disk
//! - The XML is parsed into entries preserving document order
//!
//! A sitemap that cannot be obtained or parsed is fatal to the whole run;
//! there is nothing to diff the dataset against without it.

mod parser;

pub use parser::parse_sitemap;

use crate::StockpileError;
use reqwest::Client;

/// One `<url>` entry from the sitemap
///
/// Produced fresh each run and never persisted; `last_modified` carries the
/// raw `<lastmod>` text when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    /// Absolute page URL from `<loc>`
    pub location: String,

    /// Raw `<lastmod>` value, if the entry had one
    pub last_modified: Option<String>,
}

/// Fetches and parses the sitemap at the configured location
///
/// # Arguments
///
/// * `client` - The shared HTTP client (unused for file:// locations)
/// * `location` - An http(s) URL or a file:// reference
///
/// # Returns
///
/// * `Ok(Vec<SitemapEntry>)` - Entries in document order
/// * `Err(StockpileError::SitemapFetch)` - Network/HTTP failure or unreadable file
/// * `Err(StockpileError::SitemapParse)` - The content is not well-formed XML
pub async fn fetch_sitemap(
    client: &Client,
    location: &str,
) -> Result<Vec<SitemapEntry>, StockpileError> {
    let content = if let Some(path) = location.strip_prefix("file://") {
        tracing::debug!(path, "Reading local sitemap");
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StockpileError::SitemapFetch {
                location: location.to_string(),
                reason: e.to_string(),
            })?
    } else {
        tracing::debug!(url = location, "Fetching remote sitemap");
        let response =
            client
                .get(location)
                .send()
                .await
                .map_err(|e| StockpileError::SitemapFetch {
                    location: location.to_string(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StockpileError::SitemapFetch {
                location: location.to_string(),
                reason: format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                ),
            });
        }

        response
            .text()
            .await
            .map_err(|e| StockpileError::SitemapFetch {
                location: location.to_string(),
                reason: e.to_string(),
            })?
    };

    let entries = parse_sitemap(&content)?;
    tracing::info!(count = entries.len(), location, "Sitemap loaded");
    Ok(entries)
}
