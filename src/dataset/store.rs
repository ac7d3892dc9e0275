use crate::dataset::{Dataset, ProductRecord};
use crate::StockpileError;
use std::path::{Path, PathBuf};

/// Snapshot store backed by a single pretty-printed JSON file
///
/// The snapshot is an array of product records, read once at the start of a
/// run and fully rewritten at the end. Loading fails soft: a missing or
/// unreadable snapshot means an empty dataset, not an error. Saving goes
/// through a sibling temp file and a rename so a failed write cannot
/// truncate an existing good snapshot.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the prior snapshot, or an empty dataset when there is none
    pub fn load(&self) -> Dataset {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => {
                tracing::info!(
                    path = %self.path.display(),
                    "No existing dataset snapshot, starting fresh"
                );
                return Dataset::new();
            }
        };

        match serde_json::from_str::<Vec<ProductRecord>>(&content) {
            Ok(records) => {
                tracing::info!(
                    path = %self.path.display(),
                    count = records.len(),
                    "Loaded existing dataset snapshot"
                );
                Dataset::from_records(records)
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Dataset snapshot is unreadable, starting fresh"
                );
                Dataset::new()
            }
        }
    }

    /// Writes the full dataset back to disk
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Snapshot replaced on disk
    /// * `Err(StockpileError::Persist)` - Serialization or write failure
    pub fn save(&self, dataset: &Dataset) -> Result<(), StockpileError> {
        let json = serde_json::to_string_pretty(dataset.records()).map_err(|e| {
            StockpileError::Persist {
                path: self.path.display().to_string(),
                source: std::io::Error::other(e),
            }
        })?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| StockpileError::Persist {
            path: self.path.display().to_string(),
            source: e,
        })?;

        std::fs::rename(&tmp, &self.path).map_err(|e| StockpileError::Persist {
            path: self.path.display().to_string(),
            source: e,
        })?;

        tracing::info!(
            path = %self.path.display(),
            count = dataset.len(),
            "Dataset snapshot written"
        );
        Ok(())
    }
}
