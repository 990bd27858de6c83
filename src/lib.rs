//! # ReportDB
//!
//! Embedded storage for user-submitted bug reports and feature requests.
//!
//! ReportDB keeps each kind of record in its own CSV table, suppresses new
//! submissions whose text overlaps an existing one, and lets users upvote
//! what is already there instead of filing it again.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reportdb::{Config, ReportDB, RecordId};
//!
//! // Open or create a data directory
//! let db = ReportDB::open("./data", Config::default())?;
//!
//! // Submit a bug report
//! let result = db.create_bug("u1", "alice", "crash on save", "open the save menu")?;
//! if result.is_duplicate() {
//!     // Point the user at the existing reports instead
//!     for bug in result.similar_entries() {
//!         println!("#{}: {}", bug.id, bug.primary);
//!     }
//! }
//!
//! // Upvote an existing feature request
//! db.upvote_feature(RecordId::new(3))?;
//!
//! db.close()?;
//! # Ok::<(), reportdb::ReportDBError>(())
//! ```
//!
//! ## Key Concepts
//!
//! ### Record
//!
//! A **record** is one bug report or feature request. It contains:
//! - An integer id, unique within its table
//! - Submitter identity (user id and display name)
//! - Two text fields (description/steps for bugs, feature/reason for features)
//! - Creation time, status and an upvote counter
//!
//! ### Similarity
//!
//! Two texts are **similar** when the fraction of the candidate's
//! whitespace-separated words found in the existing text, divided by the
//! longer word count, reaches the configured threshold (0.7 by default).
//! See [`similarity`].
//!
//! ### Tables
//!
//! Each table is a UTF-8 CSV file with a fixed header. Every mutation
//! rewrites the whole file atomically. See [`storage`].
//!
//! ## Thread Safety
//!
//! `ReportDB` is `Send + Sync` and can be shared across threads using `Arc`.
//! Each table serializes its own load-modify-save cycles, and a lock file
//! keeps a second process from opening the same directory.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

// ============================================================================
// Module declarations
// ============================================================================

mod config;
mod db;
mod error;
mod types;

pub mod similarity;
pub mod storage;

// Domain modules
mod record;

// ============================================================================
// Public API re-exports
// ============================================================================

// Main database interface
pub use db::ReportDB;

// Configuration
pub use config::{Config, SyncMode};

// Error handling
pub use error::{ReportDBError, Result, StorageError, ValidationError};

// Core types
pub use types::{RecordId, RecordKind, Timestamp};

// Domain types
pub use record::{CreateResult, NewRecord, Record, RecordStatus, Repository, TextField};

// Storage (for advanced users)
pub use storage::{CsvTable, DatabaseMetadata, MemoryTable, TableStore};

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Convenient imports for common ReportDB usage.
///
/// ```rust
/// use reportdb::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{Config, SyncMode};
    pub use crate::db::ReportDB;
    pub use crate::error::{ReportDBError, Result};
    pub use crate::record::{CreateResult, NewRecord, Record, RecordStatus};
    pub use crate::types::{RecordId, RecordKind, Timestamp};
}
