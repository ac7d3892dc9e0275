//! Product extraction
//!
//! The controller treats extraction as an opaque collaborator: given a
//! fetched page it either produces a candidate record or nothing. Any field
//! of a candidate may be a fallback or synthesized value; only the name and
//! price decide whether the candidate is admitted to the dataset.

mod dom;

pub use dom::DomExtractor;

use crate::dataset::FieldValue;
use rand::Rng;
use url::Url;

/// Sentinel for attributes the page did not expose
pub const NOT_FOUND: &str = "Not found";

/// A product parsed out of one page, before admission
///
/// Carries everything except the fields the controller owns: id, stock,
/// crawl timestamp, and the page URL itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCandidate {
    pub name: String,
    pub price: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub rating: FieldValue,
    pub review_count: FieldValue,
    pub brand_name: String,
}

/// Turns a fetched page into a product candidate
///
/// Implementations may synthesize missing cosmetic fields (rating, review
/// count) from the provided randomness source; the injected `Rng` keeps
/// tests deterministic. Returning `None` means the page holds no usable
/// product and the caller must skip it.
pub trait Extractor {
    fn extract<R: Rng>(&self, page_url: &Url, body: &str, rng: &mut R)
        -> Option<ProductCandidate>;
}
