//! Statistics generation from the dataset snapshot
//!
//! This module provides functionality for summarizing and displaying the
//! persisted dataset without running a crawl.

use crate::dataset::Dataset;
use std::collections::HashMap;

/// Dataset statistics summary
#[derive(Debug, Clone)]
pub struct DatasetStatistics {
    /// Total number of records in the snapshot
    pub total_records: usize,

    /// Highest id in use (0 when empty)
    pub max_id: u64,

    /// Record counts per category
    pub records_by_category: HashMap<String, usize>,

    /// Number of distinct brands (sentinel values excluded)
    pub unique_brands: usize,

    /// Timestamp of the most recent crawl, if any
    pub last_crawled_at: Option<String>,
}

/// Computes statistics over a loaded dataset
pub fn load_statistics(dataset: &Dataset) -> DatasetStatistics {
    let mut records_by_category: HashMap<String, usize> = HashMap::new();
    for record in dataset.records() {
        *records_by_category
            .entry(record.category.clone())
            .or_insert(0) += 1;
    }

    let unique_brands = dataset
        .records()
        .iter()
        .map(|r| r.brand_name.as_str())
        .filter(|b| *b != crate::extract::NOT_FOUND)
        .collect::<std::collections::HashSet<_>>()
        .len();

    let last_crawled_at = dataset
        .records()
        .iter()
        .map(|r| r.crawled_at)
        .max()
        .map(|t| t.to_rfc3339());

    DatasetStatistics {
        total_records: dataset.len(),
        max_id: dataset.records().iter().map(|r| r.id).max().unwrap_or(0),
        records_by_category,
        unique_brands,
        last_crawled_at,
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", stats.total_records);
    println!("  Highest id: {}", stats.max_id);
    println!("  Unique brands: {}", stats.unique_brands);
    if let Some(last) = &stats.last_crawled_at {
        println!("  Last crawled: {}", last);
    }
    println!();

    if !stats.records_by_category.is_empty() {
        println!("Records by Category:");
        // Sort categories by count (descending)
        let mut category_counts: Vec<_> = stats.records_by_category.iter().collect();
        category_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (category, count) in category_counts {
            let percentage = if stats.total_records > 0 {
                (*count as f64 / stats.total_records as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", category, count, percentage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{FieldValue, ProductRecord};
    use chrono::{TimeZone, Utc};

    fn record(id: u64, category: &str, brand: &str) -> ProductRecord {
        ProductRecord {
            id,
            url: format!("https://shop.example.com/{}", id),
            name: "Item".to_string(),
            price: "100".to_string(),
            description: String::new(),
            category: category.to_string(),
            image: "Not found".to_string(),
            rating: FieldValue::Number(3),
            review_count: FieldValue::Number(1),
            brand_name: brand.to_string(),
            stock: 1,
            crawled_at: Utc.with_ymd_and_hms(2024, 11, id as u32 % 28 + 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_statistics_over_empty_dataset() {
        let stats = load_statistics(&Dataset::new());
        assert_eq!(stats.total_records, 0);
        assert_eq!(stats.max_id, 0);
        assert!(stats.last_crawled_at.is_none());
    }

    #[test]
    fn test_statistics_counts_and_max_id() {
        let dataset = Dataset::from_records(vec![
            record(1, "Thermometers", "Omron"),
            record(2, "Thermometers", "Microlife"),
            record(7, "Masks", "Not found"),
        ]);

        let stats = load_statistics(&dataset);
        assert_eq!(stats.total_records, 3);
        assert_eq!(stats.max_id, 7);
        assert_eq!(stats.records_by_category.get("Thermometers"), Some(&2));
        assert_eq!(stats.records_by_category.get("Masks"), Some(&1));
        // The sentinel brand is not a brand
        assert_eq!(stats.unique_brands, 2);
    }
}
