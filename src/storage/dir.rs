//! Data directory handle.
//!
//! A data directory holds both table files plus two bookkeeping files:
//!
//! - `reportdb.lock`: exclusive advisory lock held while a [`DataDir`] is
//!   alive, so only one writer (in any process) uses the directory
//! - `reportdb.meta.json`: [`DatabaseMetadata`], checked on every open

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::{debug, info, instrument, warn};

use super::schema::{DatabaseMetadata, SCHEMA_VERSION};
use super::write_atomic;
use crate::config::SyncMode;
use crate::error::{ReportDBError, Result, StorageError};

/// Name of the lock file inside the data directory.
pub const LOCK_FILE: &str = "reportdb.lock";

/// Name of the metadata file inside the data directory.
pub const METADATA_FILE: &str = "reportdb.meta.json";

/// An opened, exclusively locked data directory.
///
/// The lock is released when the handle is closed or dropped.
#[derive(Debug)]
pub struct DataDir {
    /// Directory containing the tables.
    root: PathBuf,

    /// Open lock file; the advisory lock lives as long as this handle.
    lock: File,

    /// Metadata as written by this open.
    metadata: DatabaseMetadata,
}

impl DataDir {
    /// Opens (creating if needed) the data directory at `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - Another handle holds the directory lock ([`StorageError::DatabaseLocked`])
    /// - The metadata file is unreadable or from another schema version
    #[instrument(skip(root, sync_mode), fields(path = %root.as_ref().display()))]
    pub fn open(root: impl AsRef<Path>, sync_mode: SyncMode) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let lock = Self::acquire_lock(&root)?;
        let metadata = Self::refresh_metadata(&root, sync_mode)?;

        debug!(
            schema_version = metadata.schema_version,
            "Data directory opened"
        );
        Ok(Self {
            root,
            lock,
            metadata,
        })
    }

    fn acquire_lock(root: &Path) -> Result<File> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(root.join(LOCK_FILE))?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(file),
            Err(err) if err.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                warn!("Data directory is locked by another writer");
                Err(StorageError::DatabaseLocked.into())
            }
            Err(err) => Err(ReportDBError::Io(err)),
        }
    }

    /// Reads, validates and re-stamps the metadata file, or creates it.
    fn refresh_metadata(root: &Path, sync_mode: SyncMode) -> Result<DatabaseMetadata> {
        let path = root.join(METADATA_FILE);

        let metadata = if path.exists() {
            let bytes = fs::read(&path)?;
            let mut metadata: DatabaseMetadata = serde_json::from_slice(&bytes).map_err(|e| {
                StorageError::corrupted(format!("Invalid metadata format: {}", e))
            })?;

            if !metadata.is_compatible() {
                warn!(
                    expected = SCHEMA_VERSION,
                    found = metadata.schema_version,
                    "Schema version mismatch"
                );
                return Err(StorageError::SchemaVersionMismatch {
                    expected: SCHEMA_VERSION,
                    found: metadata.schema_version,
                }
                .into());
            }

            metadata.touch();
            metadata
        } else {
            info!("Initializing new data directory");
            DatabaseMetadata::new()
        };

        let bytes = serde_json::to_vec_pretty(&metadata)?;
        write_atomic(&path, &bytes, sync_mode)?;
        Ok(metadata)
    }

    /// Returns the directory path.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the metadata recorded by this open.
    #[inline]
    pub fn metadata(&self) -> &DatabaseMetadata {
        &self.metadata
    }

    /// Resolves a table file name inside the directory.
    pub fn table_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// Releases the directory lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the operating system refuses the unlock.
    pub fn close(self) -> Result<()> {
        // Fully qualified: std's inherent File::unlock would shadow the trait method
        FileExt::unlock(&self.lock)?;
        Ok(())
    }
}
