//! Storage layer abstractions for ReportDB.
//!
//! This module provides a trait-based abstraction over table storage,
//! allowing different backends to be used (CSV files, in-memory for tests
//! and embedding).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Repository                             │
//! │                         │                                   │
//! │                         ▼                                   │
//! │              ┌─────────────────────┐                        │
//! │              │     TableStore      │  ← Trait               │
//! │              └─────────────────────┘                        │
//! │                    ▲         ▲                              │
//! │                    │         │                              │
//! │         ┌─────────┴─┐   ┌───┴─────────┐                     │
//! │         │ CsvTable  │   │ MemoryTable │                     │
//! │         └───────────┘   └─────────────┘                     │
//! │           (files)          (in-process)                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A table store only loads and saves whole snapshots. It performs no
//! locking; the repository owning it runs every load-mutate-save cycle
//! inside its own critical section.

pub mod csv;
pub mod dir;
pub mod memory;
pub mod schema;

pub use self::csv::CsvTable;
pub use dir::DataDir;
pub use memory::MemoryTable;
pub use schema::{next_id, DatabaseMetadata, TableSchema, SCHEMA_VERSION};

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::config::SyncMode;
use crate::error::Result;
use crate::record::Record;
use crate::types::RecordKind;

/// Storage backend for one table.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so repositories can be shared
/// across threads. Callers serialize load/save cycles themselves.
pub trait TableStore: Send + Sync + std::fmt::Debug {
    /// Returns the table's column layout.
    fn schema(&self) -> &TableSchema;

    /// Reads the full table in storage order.
    ///
    /// An absent table is first created empty.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the table is unreadable or does not match
    /// the schema (missing header, wrong column count, unparseable cell).
    fn load(&self) -> Result<Vec<Record>>;

    /// Replaces the full table with `records`, in the given order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the snapshot cannot be written. The
    /// previous snapshot is left in place.
    fn save(&self, records: &[Record]) -> Result<()>;

    /// Returns the path to the table file, if applicable.
    fn path(&self) -> Option<&Path>;
}

/// Opens a CSV table store at the given path.
///
/// This is a convenience function that creates a [`CsvTable`] instance.
///
/// # Errors
///
/// Returns an error if the file is absent and cannot be created.
pub fn open_table(
    path: impl AsRef<Path>,
    kind: RecordKind,
    sync_mode: SyncMode,
) -> Result<Box<dyn TableStore>> {
    let table = CsvTable::open(path, kind, sync_mode)?;
    Ok(Box::new(table))
}

/// Replaces `path` with `bytes` through a sibling temporary file and a rename.
///
/// Outside [`SyncMode::Fast`] the temporary file is synced before the rename
/// and the parent directory after it.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8], sync_mode: SyncMode) -> Result<()> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("table");
    let tmp = path.with_file_name(format!(".{}.tmp-{}", name, std::process::id()));

    let written = (|| -> std::io::Result<()> {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        if !sync_mode.is_fast() {
            file.sync_all()?;
        }
        drop(file);
        fs::rename(&tmp, path)
    })();

    if let Err(err) = written {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }

    if !sync_mode.is_fast() {
        sync_parent_dir(path)?;
    }
    Ok(())
}

/// Flushes the directory entry of `path` so a completed rename survives a crash.
fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        File::open(parent)?.sync_all()?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bugs.csv");

        let table = open_table(&path, RecordKind::Bug, SyncMode::Fast).unwrap();

        assert_eq!(table.schema().kind(), RecordKind::Bug);
        assert_eq!(table.path(), Some(path.as_path()));
        assert!(table.load().unwrap().is_empty());
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");

        write_atomic(&path, b"first", SyncMode::Normal).unwrap();
        write_atomic(&path, b"second", SyncMode::Fast).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn test_sync_parent_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, b"x").unwrap();

        sync_parent_dir(&path).unwrap();
        // Bare file name resolves against the working directory
        sync_parent_dir(Path::new("data.txt")).unwrap();
    }

    #[test]
    fn test_write_atomic_normal_mode_in_nested_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        let path = nested.join("bugs.csv");

        write_atomic(&path, b"header\n", SyncMode::Normal).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"header\n");
        assert_eq!(std::fs::read_dir(&nested).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_missing_directory_fails_cleanly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("data.txt");

        let err = write_atomic(&path, b"x", SyncMode::Fast).unwrap_err();
        assert!(err.is_storage());
        assert!(!path.exists());
    }

    #[test]
    fn test_table_stores_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CsvTable>();
        assert_send_sync::<MemoryTable>();
    }
}
