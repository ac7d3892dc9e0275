//! Dataset model and snapshot persistence
//!
//! The dataset is the crawler's only durable state: an ordered collection of
//! product records, insertion order = crawl order. It is loaded once at the
//! start of a run, grown in memory, and written back exactly once at the end.

mod store;

pub use store::JsonStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A scraped attribute that may be either text or a synthesized number
///
/// Ratings and review counts are copied verbatim when the page exposes them
/// and synthesized as integers when it does not, so the snapshot holds a mix
/// of both shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(u64),
    Text(String),
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// One product in the persisted dataset
///
/// Field names are serialized in camelCase to match the snapshot schema.
/// `id` is unique and monotonically increasing across the whole collection;
/// `url` is unique; a URL is never crawled twice once it has a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: u64,
    pub url: String,
    pub name: String,
    pub price: String,
    pub description: String,
    pub category: String,
    pub image: String,
    pub rating: FieldValue,
    pub review_count: FieldValue,
    pub brand_name: String,
    pub stock: u32,
    pub crawled_at: DateTime<Utc>,
}

/// The ordered collection of product records
///
/// Prior records are preserved verbatim; a run only ever appends.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<ProductRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ProductRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The id the next accepted record will receive
    ///
    /// `max(existing ids) + 1`, or 1 for an empty dataset. Ids are never
    /// reused even when earlier records are sparse.
    pub fn next_id(&self) -> u64 {
        self.records.iter().map(|r| r.id).max().map_or(1, |m| m + 1)
    }

    /// All URLs that already have a record, for diffing against the sitemap
    pub fn known_urls(&self) -> HashSet<String> {
        self.records.iter().map(|r| r.url.clone()).collect()
    }

    pub fn push(&mut self, record: ProductRecord) {
        self.records.push(record);
    }
}
