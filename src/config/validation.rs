use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, SelectorsConfig, SitemapConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_sitemap_config(&config.sitemap)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_selectors_config(&config.selectors)?;
    Ok(())
}

/// Validates the sitemap location
///
/// Accepts http(s) URLs for remote sitemaps and file:// references for
/// sitemaps already on disk.
fn validate_sitemap_config(config: &SitemapConfig) -> Result<(), ConfigError> {
    if config.location.is_empty() {
        return Err(ConfigError::Validation(
            "sitemap location cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(&config.location)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid sitemap location: {}", e)))?;

    match url.scheme() {
        "http" | "https" | "file" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "Sitemap location must use http, https, or file scheme, got '{}'",
            other
        ))),
    }
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.accept_quota < 1 {
        return Err(ConfigError::Validation(format!(
            "accept_quota must be >= 1, got {}",
            config.accept_quota
        )));
    }

    if config.fetch_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch_timeout_secs must be >= 1, got {}",
            config.fetch_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    // Validate contact URL
    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    // Validate contact email (basic validation)
    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.dataset_path.is_empty() {
        return Err(ConfigError::Validation(
            "dataset_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every configured selector actually parses
fn validate_selectors_config(config: &SelectorsConfig) -> Result<(), ConfigError> {
    if config.price.is_empty() {
        return Err(ConfigError::Validation(
            "price selector cannot be empty".to_string(),
        ));
    }

    let all = [
        Some(&config.price),
        config.name.as_ref(),
        config.description.as_ref(),
        config.category.as_ref(),
        config.image.as_ref(),
        config.rating.as_ref(),
        config.review_count.as_ref(),
        config.brand.as_ref(),
    ];

    for selector in all.into_iter().flatten() {
        Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
            selector: selector.clone(),
            message: e.to_string(),
        })?;
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    // Domain part should contain at least one dot
    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_selectors() -> SelectorsConfig {
        SelectorsConfig {
            name: None,
            title_suffix: None,
            price: "span.price".to_string(),
            currency: "₫".to_string(),
            description: None,
            category: None,
            image: None,
            rating: None,
            review_count: None,
            brand: None,
        }
    }

    #[test]
    fn test_validate_sitemap_location() {
        let remote = SitemapConfig {
            location: "https://shop.example.com/sitemap.xml".to_string(),
        };
        assert!(validate_sitemap_config(&remote).is_ok());

        let local = SitemapConfig {
            location: "file:///var/data/sitemap.xml".to_string(),
        };
        assert!(validate_sitemap_config(&local).is_ok());

        let empty = SitemapConfig {
            location: String::new(),
        };
        assert!(validate_sitemap_config(&empty).is_err());

        let ftp = SitemapConfig {
            location: "ftp://shop.example.com/sitemap.xml".to_string(),
        };
        assert!(validate_sitemap_config(&ftp).is_err());
    }

    #[test]
    fn test_validate_selectors() {
        assert!(validate_selectors_config(&base_selectors()).is_ok());

        let mut bad = base_selectors();
        bad.price = "span..".to_string();
        assert!(validate_selectors_config(&bad).is_err());

        let mut bad_optional = base_selectors();
        bad_optional.image = Some("img[".to_string());
        assert!(validate_selectors_config(&bad_optional).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }
}
