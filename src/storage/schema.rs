//! Table layout definitions and versioning.
//!
//! Each record kind is persisted as one CSV table with a fixed header row.
//! All column lists are compile-time constants to ensure consistency.
//!
//! # Table Layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │ bugs.csv                                                              │
//! │   id,user_id,username,description,steps,created_at,status,upvotes     │
//! │   1,u1,alice,crash on save,open save menu,2024-05-01T09:30:00.250Z,…  │
//! └───────────────────────────────────────────────────────────────────────┘
//!
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │ features.csv                                                          │
//! │   id,user_id,username,feature,reason,created_at,status,upvotes        │
//! └───────────────────────────────────────────────────────────────────────┘
//!
//! ┌───────────────────────────────────────────────────────────────────────┐
//! │ reportdb.meta.json                                                    │
//! │   { "schema_version": 1, "created_at": …, "last_opened_at": … }       │
//! └───────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Schema Versioning
//!
//! The schema version is stored in the metadata file. Opening a directory
//! written with a different version fails; there is no migration.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::record::{Record, RecordStatus};
use crate::types::{RecordId, RecordKind, Timestamp};

/// Current schema version.
///
/// Increment this when making breaking changes to the table layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Maximum size of a submitted text field in bytes (4 KB).
pub const MAX_TEXT_SIZE: usize = 4 * 1024;

/// Number of columns in every table.
pub const COLUMN_COUNT: usize = 8;

/// Column order of the bugs table.
pub const BUG_COLUMNS: [&str; COLUMN_COUNT] = [
    "id",
    "user_id",
    "username",
    "description",
    "steps",
    "created_at",
    "status",
    "upvotes",
];

/// Column order of the features table.
pub const FEATURE_COLUMNS: [&str; COLUMN_COUNT] = [
    "id",
    "user_id",
    "username",
    "feature",
    "reason",
    "created_at",
    "status",
    "upvotes",
];

// Column positions shared by both layouts
const COL_ID: usize = 0;
const COL_USER_ID: usize = 1;
const COL_USERNAME: usize = 2;
const COL_PRIMARY: usize = 3;
const COL_SECONDARY: usize = 4;
const COL_CREATED_AT: usize = 5;
const COL_STATUS: usize = 6;
const COL_UPVOTES: usize = 7;

// ============================================================================
// Table Schema
// ============================================================================

/// Declared layout of one table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableSchema {
    kind: RecordKind,
    columns: &'static [&'static str; COLUMN_COUNT],
}

impl TableSchema {
    /// Returns the layout for `kind`.
    pub const fn for_kind(kind: RecordKind) -> Self {
        let columns = match kind {
            RecordKind::Bug => &BUG_COLUMNS,
            RecordKind::Feature => &FEATURE_COLUMNS,
        };
        Self { kind, columns }
    }

    /// Record kind stored in this table.
    #[inline]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Column names in file order.
    #[inline]
    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    /// Name of the primary text column (`description` or `feature`).
    #[inline]
    pub fn primary_column(&self) -> &'static str {
        self.columns[COL_PRIMARY]
    }

    /// Name of the secondary text column (`steps` or `reason`).
    #[inline]
    pub fn secondary_column(&self) -> &'static str {
        self.columns[COL_SECONDARY]
    }

    /// Returns true if `header` names exactly this schema's columns, in order.
    pub fn matches_header<'a>(&self, header: impl IntoIterator<Item = &'a str>) -> bool {
        header.into_iter().eq(self.columns.iter().copied())
    }

    /// Encodes a record as one row of cells, in column order.
    pub fn encode_row(&self, record: &Record) -> [String; COLUMN_COUNT] {
        [
            record.id.to_string(),
            record.user_id.clone(),
            record.username.clone(),
            record.primary.clone(),
            record.secondary.clone(),
            record.created_at.to_string(),
            record.status.to_string(),
            record.upvotes.to_string(),
        ]
    }

    /// Decodes one row of cells into a record.
    ///
    /// `row` is the 1-based data row number, used in error messages.
    /// The caller has already checked the cell count.
    pub fn decode_row(&self, row: usize, cells: &[&str]) -> Result<Record, StorageError> {
        if cells.len() != COLUMN_COUNT {
            return Err(StorageError::corrupted(format!(
                "row {}: expected {} cells, got {}",
                row,
                COLUMN_COUNT,
                cells.len()
            )));
        }

        let id = match cells[COL_ID].parse::<u64>() {
            Ok(v) if v > 0 => RecordId(v),
            _ => {
                return Err(StorageError::corrupted(format!(
                    "row {}: invalid id {:?}",
                    row, cells[COL_ID]
                )))
            }
        };

        let created_at = Timestamp::parse(cells[COL_CREATED_AT]).ok_or_else(|| {
            StorageError::corrupted(format!(
                "row {}: invalid created_at {:?}",
                row, cells[COL_CREATED_AT]
            ))
        })?;

        // Rows written before the counter existed carry an empty cell
        let upvotes = match cells[COL_UPVOTES] {
            "" => 0,
            raw => raw.parse::<u64>().map_err(|_| {
                StorageError::corrupted(format!("row {}: invalid upvotes {:?}", row, raw))
            })?,
        };

        Ok(Record {
            id,
            kind: self.kind,
            user_id: cells[COL_USER_ID].to_string(),
            username: cells[COL_USERNAME].to_string(),
            primary: cells[COL_PRIMARY].to_string(),
            secondary: cells[COL_SECONDARY].to_string(),
            created_at,
            status: RecordStatus::from(cells[COL_STATUS]),
            upvotes,
        })
    }
}

/// Returns the identifier for the next record appended to `records`.
///
/// `1` for an empty table, otherwise one past the largest id. Gaps are
/// never filled.
///
/// # Errors
///
/// Returns [`StorageError::IdSpaceExhausted`] when the largest id is already
/// `u64::MAX`.
pub fn next_id(records: &[Record]) -> Result<RecordId, StorageError> {
    match records.iter().map(|r| r.id).max() {
        None => Ok(RecordId::FIRST),
        Some(max) => max.checked_next().ok_or(StorageError::IdSpaceExhausted),
    }
}

// ============================================================================
// Database Metadata
// ============================================================================

/// Database metadata stored next to the tables.
///
/// Serialized as JSON so it can be inspected by hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseMetadata {
    /// Schema version for compatibility checking.
    pub schema_version: u32,

    /// Timestamp when the data directory was first opened.
    pub created_at: Timestamp,

    /// Last time the database was opened (updated on each open).
    pub last_opened_at: Timestamp,
}

impl DatabaseMetadata {
    /// Creates new metadata for a fresh data directory.
    pub fn new() -> Self {
        let now = Timestamp::now();
        Self {
            schema_version: SCHEMA_VERSION,
            created_at: now,
            last_opened_at: now,
        }
    }

    /// Updates the last_opened_at timestamp.
    pub fn touch(&mut self) {
        self.last_opened_at = Timestamp::now();
    }

    /// Checks if this metadata is compatible with the current schema.
    pub fn is_compatible(&self) -> bool {
        self.schema_version == SCHEMA_VERSION
    }
}

impl Default for DatabaseMetadata {
    fn default() -> Self {
        Self::new()
    }
}
