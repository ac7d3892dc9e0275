//! HTTP fetcher implementation
//!
//! This module handles the page-fetch side of the crawl:
//! - Building the HTTP client with the crawler's user agent string
//! - Fetching product pages and classifying the result
//!
//! Everything that can go wrong talking to the site is folded into
//! [`FetchOutcome`]; the `Err` channel of [`PageFetcher::fetch`] is reserved
//! for failures outside the normal HTTP conversation.

use crate::config::UserAgentConfig;
use crate::StockpileError;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;

/// Result of fetching one product page
#[derive(Debug)]
pub enum FetchOutcome {
    /// The page came back with a success status
    Success {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The server answered with a non-success status
    HttpFailure {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        status_text: String,
    },

    /// The request never produced a usable response
    NetworkFailure {
        /// Error description
        reason: String,
        /// Whether the request deadline was hit
        timed_out: bool,
    },
}

/// Page-fetch capability the controller runs against
///
/// The production implementation wraps a shared reqwest [`Client`]; tests
/// substitute scripted outcomes. Implementations report HTTP and network
/// failures through [`FetchOutcome`], not `Err`.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchOutcome, StockpileError>>;
}

/// Builds the HTTP client shared by the sitemap fetch and all page fetches
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout_secs` - Whole-request deadline for a single fetch
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout_secs: u64,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Production fetcher backed by reqwest
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl PageFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, StockpileError> {
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();

                if !status.is_success() {
                    return Ok(FetchOutcome::HttpFailure {
                        status: status.as_u16(),
                        status_text: status.canonical_reason().unwrap_or("").to_string(),
                    });
                }

                match response.text().await {
                    Ok(body) => Ok(FetchOutcome::Success {
                        status: status.as_u16(),
                        body,
                    }),
                    Err(e) => Ok(FetchOutcome::NetworkFailure {
                        timed_out: e.is_timeout(),
                        reason: e.to_string(),
                    }),
                }
            }
            Err(e) => Ok(FetchOutcome::NetworkFailure {
                timed_out: e.is_timeout(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let config = create_test_config();
        let client = build_http_client(&config, 60);
        assert!(client.is_ok());
    }
}
