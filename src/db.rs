//! ReportDB main struct and lifecycle operations.
//!
//! The [`ReportDB`] struct is the primary interface for interacting with
//! the database. It provides methods for:
//!
//! - Opening and closing a data directory
//! - Creating bug reports and feature requests with duplicate suppression
//! - Listing and upvoting existing records
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use reportdb::{Config, CreateResult, ReportDB};
//!
//! let db = ReportDB::open("./data", Config::default())?;
//!
//! match db.create_bug("u1", "alice", "crash on save", "open the save menu")? {
//!     CreateResult::Created { id } => println!("stored bug #{}", id),
//!     CreateResult::Duplicate { similar_entries } => {
//!         for bug in similar_entries {
//!             println!("similar: #{} ({} upvotes)", bug.id, bug.upvotes);
//!         }
//!     }
//! }
//!
//! db.close()?;
//! # Ok::<(), reportdb::ReportDBError>(())
//! ```
//!
//! # Thread Safety
//!
//! `ReportDB` is `Send + Sync` and can be shared across threads using `Arc`.
//! Operations on the same table run one at a time; operations on the bugs
//! table never wait for the features table and vice versa.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reportdb::{Config, ReportDB, RecordId};
//!
//! let db = Arc::new(ReportDB::open("./data", Config::default())?);
//!
//! let db_clone = Arc::clone(&db);
//! std::thread::spawn(move || {
//!     db_clone.upvote_bug(RecordId::new(1))
//! });
//! ```

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::config::Config;
use crate::error::{ReportDBError, Result};
use crate::record::{CreateResult, NewRecord, Record, Repository};
use crate::storage::{open_table, DataDir, DatabaseMetadata};
use crate::types::{RecordId, RecordKind};

/// The main ReportDB database handle.
///
/// This is the primary interface for all database operations. Create an
/// instance with [`ReportDB::open()`] and close it with [`ReportDB::close()`].
///
/// # Ownership
///
/// `ReportDB` owns the data directory lock and both repositories. When you
/// call `close()`, the database is consumed and the lock is released.
#[derive(Debug)]
pub struct ReportDB {
    /// Locked data directory (paths, metadata).
    data_dir: DataDir,

    /// Bug reports table.
    bugs: Repository,

    /// Feature requests table.
    features: Repository,

    /// Configuration used to open this database.
    config: Config,
}

impl ReportDB {
    /// Opens or creates a ReportDB data directory at the specified path.
    ///
    /// The directory and both table files are created if absent. Table
    /// paths are resolved once here and handed to the repositories.
    ///
    /// # Arguments
    ///
    /// * `path` - Data directory (created if it doesn't exist)
    /// * `config` - Configuration options for the database
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration is invalid (see [`Config::validate`])
    /// - A table file name is taken by a directory ([`ReportDBError::Config`])
    /// - The directory is locked by another `ReportDB`
    /// - The metadata file is corrupted or from another schema version
    /// - A table file cannot be created
    #[instrument(skip(path, config), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        // Validate configuration first
        config.validate().map_err(ReportDBError::from)?;

        info!("Opening ReportDB");

        let data_dir = DataDir::open(&path, config.sync_mode)?;

        let bugs = Repository::with_config(
            open_table(
                table_path(&data_dir, "bugs_file", &config.bugs_file)?,
                RecordKind::Bug,
                config.sync_mode,
            )?,
            &config,
        );
        let features = Repository::with_config(
            open_table(
                table_path(&data_dir, "features_file", &config.features_file)?,
                RecordKind::Feature,
                config.sync_mode,
            )?,
            &config,
        );

        info!(
            threshold = config.similarity_threshold,
            sync_mode = ?config.sync_mode,
            "ReportDB opened successfully"
        );

        Ok(Self {
            data_dir,
            bugs,
            features,
            config,
        })
    }

    /// Closes the database and releases the data directory lock.
    ///
    /// Every save is already on disk when its operation returns, so there
    /// is nothing to flush.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock cannot be released.
    #[instrument(skip(self))]
    pub fn close(self) -> Result<()> {
        info!("Closing ReportDB");

        self.data_dir.close()?;

        info!("ReportDB closed successfully");
        Ok(())
    }

    /// Returns a reference to the database configuration.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the database metadata.
    #[inline]
    pub fn metadata(&self) -> &DatabaseMetadata {
        self.data_dir.metadata()
    }

    /// Returns the data directory path.
    #[inline]
    pub fn data_dir(&self) -> &Path {
        self.data_dir.root()
    }

    /// Returns the repository for `kind`.
    #[inline]
    pub fn repository(&self, kind: RecordKind) -> &Repository {
        match kind {
            RecordKind::Bug => &self.bugs,
            RecordKind::Feature => &self.features,
        }
    }

    // =========================================================================
    // Bug reports
    // =========================================================================

    /// Stores a bug report unless a similar one exists.
    ///
    /// See [`Repository::create`].
    pub fn create_bug(
        &self,
        user_id: impl Into<String>,
        username: impl Into<String>,
        description: impl Into<String>,
        steps: impl Into<String>,
    ) -> Result<CreateResult> {
        self.bugs
            .create(NewRecord::new(user_id, username, description, steps))
    }

    /// Returns every bug report, oldest first.
    pub fn list_bugs(&self) -> Result<Vec<Record>> {
        self.bugs.list_all()
    }

    /// Returns one bug report by id.
    pub fn get_bug(&self, id: RecordId) -> Result<Option<Record>> {
        self.bugs.get(id)
    }

    /// Adds one upvote to a bug report. Returns `false` if it doesn't exist.
    pub fn upvote_bug(&self, id: RecordId) -> Result<bool> {
        self.bugs.upvote(id)
    }

    // =========================================================================
    // Feature requests
    // =========================================================================

    /// Stores a feature request unless a similar one exists.
    ///
    /// See [`Repository::create`].
    pub fn create_feature(
        &self,
        user_id: impl Into<String>,
        username: impl Into<String>,
        feature: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<CreateResult> {
        self.features
            .create(NewRecord::new(user_id, username, feature, reason))
    }

    /// Returns every feature request, oldest first.
    pub fn list_features(&self) -> Result<Vec<Record>> {
        self.features.list_all()
    }

    /// Returns one feature request by id.
    pub fn get_feature(&self, id: RecordId) -> Result<Option<Record>> {
        self.features.get(id)
    }

    /// Adds one upvote to a feature request. Returns `false` if it doesn't exist.
    pub fn upvote_feature(&self, id: RecordId) -> Result<bool> {
        self.features.upvote(id)
    }
}

/// Resolves a configured table file, rejecting names taken by a directory.
fn table_path(data_dir: &DataDir, field: &str, file_name: &str) -> Result<PathBuf> {
    let path = data_dir.table_path(file_name);
    if path.is_dir() {
        return Err(ReportDBError::config(format!(
            "{} {:?} names a directory, not a table file",
            field, file_name
        )));
    }
    Ok(path)
}

// ReportDB is auto Send + Sync: DataDir holds a File and PathBuf, and each
// Repository wraps its store in a Mutex.
