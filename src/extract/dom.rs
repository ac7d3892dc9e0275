//! CSS-selector-driven extraction
//!
//! Product pages are site-specific; the selectors that locate each attribute
//! come from configuration so the rest of the crawler never depends on real
//! page structure. Selectors are compiled once at construction.

use crate::config::SelectorsConfig;
use crate::dataset::FieldValue;
use crate::extract::{Extractor, ProductCandidate, NOT_FOUND};
use crate::ConfigError;
use rand::Rng;
use scraper::{Html, Selector};
use url::Url;

/// Maximum characters kept from a product description
const DESCRIPTION_MAX_CHARS: usize = 300;

/// Maximum characters kept from a category path
const CATEGORY_MAX_CHARS: usize = 200;

/// Extractor that reads product attributes out of the rendered DOM
pub struct DomExtractor {
    name: Option<Selector>,
    title: Selector,
    title_suffix: Option<String>,
    price: Selector,
    currency: String,
    description: Option<Selector>,
    category: Option<Selector>,
    image: Option<Selector>,
    rating: Option<Selector>,
    review_count: Option<Selector>,
    brand: Option<Selector>,
}

impl DomExtractor {
    /// Compiles the configured selectors
    ///
    /// # Returns
    ///
    /// * `Ok(DomExtractor)` - All selectors parsed
    /// * `Err(ConfigError::InvalidSelector)` - A selector is malformed
    pub fn new(config: &SelectorsConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            name: config.name.as_deref().map(compile).transpose()?,
            // The <title> tag is the fallback name source
            title: compile("title")?,
            title_suffix: config.title_suffix.clone(),
            price: compile(&config.price)?,
            currency: config.currency.clone(),
            description: config.description.as_deref().map(compile).transpose()?,
            category: config.category.as_deref().map(compile).transpose()?,
            image: config.image.as_deref().map(compile).transpose()?,
            rating: config.rating.as_deref().map(compile).transpose()?,
            review_count: config.review_count.as_deref().map(compile).transpose()?,
            brand: config.brand.as_deref().map(compile).transpose()?,
        })
    }

    fn extract_name(&self, document: &Html) -> Option<String> {
        let raw = match &self.name {
            Some(selector) => first_text(document, selector),
            None => first_text(document, &self.title),
        }?;

        let name = match &self.title_suffix {
            Some(suffix) => raw.strip_suffix(suffix.as_str()).unwrap_or(&raw).trim(),
            None => raw.trim(),
        };

        if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        }
    }

    fn extract_price(&self, document: &Html) -> String {
        first_text(document, &self.price)
            .map(|raw| {
                raw.chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.' || self.currency.contains(*c))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn extract_image(&self, document: &Html, page_url: &Url) -> String {
        let Some(selector) = &self.image else {
            return NOT_FOUND.to_string();
        };

        let src = document
            .select(selector)
            .next()
            .and_then(|el| el.value().attr("src"))
            .map(str::trim)
            .filter(|s| !s.is_empty());

        match src {
            // Relative references resolve against the page they came from
            Some(src) => match Url::parse(src) {
                Ok(absolute) => absolute.to_string(),
                Err(_) => page_url
                    .join(src)
                    .map(|u| u.to_string())
                    .unwrap_or_else(|_| NOT_FOUND.to_string()),
            },
            None => NOT_FOUND.to_string(),
        }
    }
}

impl Extractor for DomExtractor {
    fn extract<R: Rng>(
        &self,
        page_url: &Url,
        body: &str,
        rng: &mut R,
    ) -> Option<ProductCandidate> {
        let document = Html::parse_document(body);

        // No name means no usable product on this page
        let name = self.extract_name(&document)?;

        let price = self.extract_price(&document);

        let description = self
            .description
            .as_ref()
            .and_then(|s| first_text(&document, s))
            .map(|raw| truncate_chars(&collapse_whitespace(&raw), DESCRIPTION_MAX_CHARS))
            .unwrap_or_default();

        let category = self
            .category
            .as_ref()
            .and_then(|s| first_text(&document, s))
            .map(|raw| truncate_chars(&collapse_whitespace(&raw), CATEGORY_MAX_CHARS))
            .unwrap_or_else(|| NOT_FOUND.to_string());

        let image = self.extract_image(&document, page_url);

        let rating = self
            .rating
            .as_ref()
            .and_then(|s| first_text(&document, s))
            .map(FieldValue::Text)
            .unwrap_or_else(|| FieldValue::Number(rng.random_range(1..=4)));

        let review_count = self
            .review_count
            .as_ref()
            .and_then(|s| first_text(&document, s))
            .map(FieldValue::Text)
            .unwrap_or_else(|| FieldValue::Number(rng.random_range(1..=100)));

        let brand_name = self
            .brand
            .as_ref()
            .and_then(|s| first_text(&document, s))
            .unwrap_or_else(|| NOT_FOUND.to_string());

        Some(ProductCandidate {
            name,
            price,
            description,
            category,
            image,
            rating,
            review_count,
            brand_name,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Text content of the first element matching the selector, trimmed
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Char-boundary-safe truncation
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
