//! Configuration types for ReportDB.
//!
//! The [`Config`] struct controls database behavior including:
//! - Similarity threshold for duplicate suppression
//! - Table file names inside the data directory
//! - Durability of table saves
//!
//! # Example
//! ```rust
//! use reportdb::{Config, SyncMode};
//!
//! // Use defaults (0.7 threshold, bugs.csv / features.csv, fsync on save)
//! let config = Config::default();
//!
//! // Stricter duplicate detection, faster saves
//! let config = Config {
//!     similarity_threshold: 0.9,
//!     sync_mode: SyncMode::Fast,
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::similarity::DEFAULT_SIMILARITY_THRESHOLD;
use crate::storage::schema::MAX_TEXT_SIZE;

/// Database configuration options.
///
/// All fields have sensible defaults. Use struct update syntax to override
/// specific settings.
#[derive(Clone, Debug)]
pub struct Config {
    /// Minimum overlap ratio at which an existing record counts as a duplicate.
    ///
    /// Must be in `(0.0, 1.0]`. Default: 0.7
    pub similarity_threshold: f64,

    /// Durability mode for table saves.
    pub sync_mode: SyncMode,

    /// File name of the bugs table, relative to the data directory.
    pub bugs_file: String,

    /// File name of the features table, relative to the data directory.
    pub features_file: String,

    /// Maximum size in bytes of each submitted text field.
    pub max_text_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            sync_mode: SyncMode::Normal,
            bugs_file: "bugs.csv".to_string(),
            features_file: "features.csv".to_string(),
            max_text_size: MAX_TEXT_SIZE,
        }
    }
}

impl Config {
    /// Creates a new Config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the configuration.
    ///
    /// Called automatically by `ReportDB::open()`.
    ///
    /// # Errors
    /// Returns `ValidationError` if:
    /// - `similarity_threshold` is not in `(0.0, 1.0]`
    /// - `max_text_size` is 0
    /// - a table file name is empty, contains a path separator, or both
    ///   tables share one file
    pub fn validate(&self) -> Result<(), ValidationError> {
        // NaN fails the range check too
        if !(self.similarity_threshold > 0.0 && self.similarity_threshold <= 1.0) {
            return Err(ValidationError::invalid_field(
                "similarity_threshold",
                format!("must be in (0.0, 1.0], got {}", self.similarity_threshold),
            ));
        }

        if self.max_text_size == 0 {
            return Err(ValidationError::invalid_field(
                "max_text_size",
                "must be greater than 0",
            ));
        }

        validate_file_name("bugs_file", &self.bugs_file)?;
        validate_file_name("features_file", &self.features_file)?;

        if self.bugs_file == self.features_file {
            return Err(ValidationError::invalid_field(
                "features_file",
                "must differ from bugs_file",
            ));
        }

        Ok(())
    }
}

fn validate_file_name(field: &str, name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::required_field(field));
    }
    let mut components = Path::new(name).components();
    let is_plain = matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    );
    if !is_plain {
        return Err(ValidationError::invalid_field(
            field,
            format!("must be a plain file name, got {:?}", name),
        ));
    }
    Ok(())
}

/// Durability mode for table saves.
///
/// Every save writes a temporary file and renames it over the table, so a
/// reader never sees a partial table in either mode. The mode only decides
/// whether the data and the rename are forced to disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    /// `fsync` the temporary file before renaming it into place, then the
    /// directory holding it.
    #[default]
    Normal,

    /// Skip both `fsync` calls (faster, a power loss may lose the latest save).
    ///
    /// Use for tests and development.
    Fast,
}

impl SyncMode {
    /// Returns true if saves skip the `fsync`.
    pub fn is_fast(&self) -> bool {
        matches!(self, Self::Fast)
    }
}
