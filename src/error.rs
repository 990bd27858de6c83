//! Error types for ReportDB.
//!
//! ReportDB uses a hierarchical error system:
//! - `ReportDBError` is the top-level error returned by all public APIs
//! - Specific error types (`StorageError`, `ValidationError`) provide detail
//!
//! Two outcomes are deliberately *not* errors: a create that finds similar
//! records returns [`CreateResult::Duplicate`](crate::CreateResult::Duplicate),
//! and an upvote on an unknown id returns `Ok(false)`.
//!
//! # Error Handling Pattern
//! ```rust,ignore
//! use reportdb::{ReportDB, Config, Result};
//!
//! fn example() -> Result<()> {
//!     let db = ReportDB::open("./data", Config::default())?;
//!     // ... operations that may fail ...
//!     db.close()?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ReportDB operations.
pub type Result<T> = std::result::Result<T, ReportDBError>;

/// Top-level error enum for all ReportDB operations.
///
/// This is the only error type returned by public APIs.
/// Use pattern matching to handle specific error cases.
#[derive(Debug, Error)]
pub enum ReportDBError {
    /// Storage layer error (I/O, unparseable table, locking).
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration error.
    #[error("Configuration error: {reason}")]
    Config {
        /// Description of what's wrong with the configuration.
        reason: String,
    },

    /// General I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportDBError {
    /// Creates a configuration error with the given reason.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Returns true if this is a validation error.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a storage or raw I/O error.
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Io(_))
    }

    /// Returns true if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

/// Storage-related errors.
///
/// These errors indicate the persisted table or its directory cannot be
/// used. None of them are retried internally.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A cell could not be parsed as its column's type.
    #[error("Table corrupted: {0}")]
    Corrupted(String),

    /// The first row of a table file is absent or does not name the schema's columns.
    #[error("Missing or invalid header in {}", path.display())]
    MissingHeader {
        /// Table file that was read.
        path: PathBuf,
    },

    /// A row has a different number of fields than the header.
    #[error("Column count mismatch in {} at row {row}: expected {expected}, found {found}", path.display())]
    ColumnMismatch {
        /// Table file that was read.
        path: PathBuf,
        /// 1-based data row number (the header is row 0).
        row: usize,
        /// Number of columns in the schema.
        expected: usize,
        /// Number of fields found in the row.
        found: usize,
    },

    /// Error reported by the CSV reader or writer.
    #[error("CSV error: {0}")]
    Csv(String),

    /// Serialization/deserialization error (metadata file).
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The data directory is held by another writer.
    #[error("Database is locked by another writer")]
    DatabaseLocked,

    /// Metadata schema version doesn't match this build.
    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch {
        /// Expected schema version.
        expected: u32,
        /// Actual schema version found on disk.
        found: u32,
    },

    /// The table's largest id is `u64::MAX`; no further record can be added.
    #[error("Record id space exhausted")]
    IdSpaceExhausted,

    /// A table lock was poisoned by a panic in another operation.
    #[error("Table lock poisoned: {0}")]
    Poisoned(String),
}

impl StorageError {
    /// Creates a corruption error with the given message.
    pub fn corrupted(msg: impl Into<String>) -> Self {
        Self::Corrupted(msg.into())
    }

    /// Creates a poisoned-lock error naming the table.
    pub fn poisoned(table: impl Into<String>) -> Self {
        Self::Poisoned(table.into())
    }
}

impl From<csv::Error> for StorageError {
    fn from(err: csv::Error) -> Self {
        StorageError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

// Also allow direct conversion to ReportDBError for convenience
impl From<csv::Error> for ReportDBError {
    fn from(err: csv::Error) -> Self {
        ReportDBError::Storage(StorageError::from(err))
    }
}

impl From<serde_json::Error> for ReportDBError {
    fn from(err: serde_json::Error) -> Self {
        ReportDBError::Storage(StorageError::from(err))
    }
}

/// Validation errors for input data.
///
/// These errors indicate problems with data provided by the caller.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A field has an invalid value.
    #[error("Invalid field '{field}': {reason}")]
    InvalidField {
        /// Name of the invalid field.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },

    /// Text exceeds maximum allowed size.
    #[error("Field '{field}' too large: {size} bytes (max: {max} bytes)")]
    ContentTooLarge {
        /// Name of the oversized field.
        field: String,
        /// Actual size in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        max: usize,
    },

    /// A required field is missing or empty.
    #[error("Required field missing: {field}")]
    RequiredField {
        /// Name of the missing field.
        field: String,
    },

    /// A record identifier could not be parsed.
    #[error("Invalid record id: {0:?}")]
    InvalidId(String),
}

impl ValidationError {
    /// Creates an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a content too large error.
    pub fn content_too_large(field: impl Into<String>, size: usize, max: usize) -> Self {
        Self::ContentTooLarge {
            field: field.into(),
            size,
            max,
        }
    }

    /// Creates a required field error.
    pub fn required_field(field: impl Into<String>) -> Self {
        Self::RequiredField {
            field: field.into(),
        }
    }

    /// Creates an invalid id error.
    pub fn invalid_id(raw: impl Into<String>) -> Self {
        Self::InvalidId(raw.into())
    }
}
