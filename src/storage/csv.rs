//! CSV table backend.
//!
//! This module provides the primary storage backend for ReportDB: one table
//! per file, a header row naming the schema's columns, then one row per
//! record. Cells are quoted per RFC 4180 when needed, so commas, quotes and
//! newlines in user text are stored verbatim.
//!
//! # Write Path
//!
//! Every save rewrites the whole table:
//!
//! ```text
//! records ──encode──▶ buffer ──write──▶ .bugs.csv.tmp-<pid> ──fsync──▶ rename ──▶ bugs.csv
//! ```
//!
//! The rename replaces the file in one step, so a concurrent reader (or a
//! process restarted after a crash) sees either the previous snapshot or the
//! new one.

use std::path::{Path, PathBuf};

use ::csv::{ReaderBuilder, Terminator, WriterBuilder};
use tracing::{debug, instrument};

use super::schema::{TableSchema, COLUMN_COUNT};
use super::{write_atomic, TableStore};
use crate::config::SyncMode;
use crate::error::{Result, StorageError};
use crate::record::Record;
use crate::types::RecordKind;

/// A table persisted as a CSV file.
///
/// `CsvTable` does no locking of its own; the owning
/// [`Repository`](crate::Repository) serializes access.
#[derive(Debug)]
pub struct CsvTable {
    /// Path to the table file.
    path: PathBuf,

    /// Column layout for this table's kind.
    schema: TableSchema,

    /// Whether saves are forced to disk.
    sync_mode: SyncMode,
}

impl CsvTable {
    /// Opens the table at `path`, creating it with only a header if absent.
    ///
    /// The contents are not parsed until the first [`load`](TableStore::load).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    #[instrument(skip(path, sync_mode), fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>, kind: RecordKind, sync_mode: SyncMode) -> Result<Self> {
        let table = Self {
            path: path.as_ref().to_path_buf(),
            schema: TableSchema::for_kind(kind),
            sync_mode,
        };
        table.ensure_initialized()?;
        Ok(table)
    }

    /// Writes an empty table (header only) if the file does not exist.
    fn ensure_initialized(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        self.write_snapshot(&[])?;
        debug!(path = %self.path.display(), kind = %self.schema.kind(), "Table initialized");
        Ok(())
    }

    fn write_snapshot(&self, records: &[Record]) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(self.schema.columns())?;
        for record in records {
            writer.write_record(&self.schema.encode_row(record))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| StorageError::Csv(e.to_string()))?;

        write_atomic(&self.path, &bytes, self.sync_mode)
    }
}

impl TableStore for CsvTable {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn load(&self) -> Result<Vec<Record>> {
        self.ensure_initialized()?;

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;
        let mut rows = reader.records();

        let header = match rows.next() {
            Some(row) => row?,
            None => {
                return Err(StorageError::MissingHeader {
                    path: self.path.clone(),
                }
                .into())
            }
        };
        if !self.schema.matches_header(header.iter()) {
            return Err(StorageError::MissingHeader {
                path: self.path.clone(),
            }
            .into());
        }

        let mut records = Vec::new();
        for (index, row) in rows.enumerate() {
            let row = row?;
            let row_number = index + 1;

            if row.len() != COLUMN_COUNT {
                return Err(StorageError::ColumnMismatch {
                    path: self.path.clone(),
                    row: row_number,
                    expected: COLUMN_COUNT,
                    found: row.len(),
                }
                .into());
            }

            let cells: Vec<&str> = row.iter().collect();
            records.push(self.schema.decode_row(row_number, &cells)?);
        }

        Ok(records)
    }

    fn save(&self, records: &[Record]) -> Result<()> {
        self.write_snapshot(records)?;
        debug!(path = %self.path.display(), rows = records.len(), "Table saved");
        Ok(())
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordStatus;
    use crate::types::{RecordId, Timestamp};
    use tempfile::tempdir;

    fn record(id: u64, primary: &str, secondary: &str) -> Record {
        Record {
            id: RecordId(id),
            kind: RecordKind::Bug,
            user_id: format!("u{}", id),
            username: "alice".into(),
            primary: primary.into(),
            secondary: secondary.into(),
            created_at: Timestamp::from_millis(1_700_000_000_000 + id as i64),
            status: RecordStatus::Open,
            upvotes: id,
        }
    }

    #[test]
    fn test_open_creates_header_only_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bugs.csv");

        let table = CsvTable::open(&path, RecordKind::Bug, SyncMode::Fast).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "id,user_id,username,description,steps,created_at,status,upvotes\n"
        );
        assert!(table.load().unwrap().is_empty());
    }

    #[test]
    fn test_open_keeps_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("features.csv");
        let content = "id,user_id,username,feature,reason,created_at,status,upvotes\n\
                       1,u1,bob,dark mode,eyes,2024-01-01T00:00:00.000Z,pending,2\n";
        std::fs::write(&path, content).unwrap();

        let table = CsvTable::open(&path, RecordKind::Feature, SyncMode::Fast).unwrap();
        let records = table.load().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].primary, "dark mode");
        assert_eq!(records[0].upvotes, 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_save_load_roundtrip_with_separators() {
        let dir = tempdir().unwrap();
        let table = CsvTable::open(dir.path().join("bugs.csv"), RecordKind::Bug, SyncMode::Normal)
            .unwrap();

        let records = vec![
            record(1, "crash, then hang", "say \"hi\"\nthen save"),
            record(2, "plain", ""),
        ];
        table.save(&records).unwrap();

        assert_eq!(table.load().unwrap(), records);
    }

    #[test]
    fn test_save_is_full_replace() {
        let dir = tempdir().unwrap();
        let table =
            CsvTable::open(dir.path().join("bugs.csv"), RecordKind::Bug, SyncMode::Fast).unwrap();

        table
            .save(&[record(1, "a", "b"), record(2, "c", "d")])
            .unwrap();
        table.save(&[record(2, "c", "d")]).unwrap();

        let ids: Vec<_> = table.load().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RecordId(2)]);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let table =
            CsvTable::open(dir.path().join("bugs.csv"), RecordKind::Bug, SyncMode::Fast).unwrap();
        table.save(&[record(1, "a", "b")]).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["bugs.csv".to_string()]);
    }

    #[test]
    fn test_load_reinitializes_deleted_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bugs.csv");
        let table = CsvTable::open(&path, RecordKind::Bug, SyncMode::Fast).unwrap();

        std::fs::remove_file(&path).unwrap();

        assert!(table.load().unwrap().is_empty());
        assert!(path.exists());
    }

    #[test]
    fn test_load_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bugs.csv");
        std::fs::write(
            &path,
            "id,user_id,username,description,steps,created_at,status,upvotes\n\
             \n\
             1,u1,alice,d,s,2024-01-01T00:00:00.000Z,open,0\n\
             \n",
        )
        .unwrap();

        let table = CsvTable::open(&path, RecordKind::Bug, SyncMode::Fast).unwrap();
        assert_eq!(table.load().unwrap().len(), 1);
    }

    #[test]
    fn test_load_empty_file_is_missing_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bugs.csv");
        std::fs::write(&path, "").unwrap();

        let table = CsvTable::open(&path, RecordKind::Bug, SyncMode::Fast).unwrap();
        let err = table.load().unwrap_err();
        assert!(matches!(
            err,
            crate::ReportDBError::Storage(StorageError::MissingHeader { .. })
        ));
    }

    #[test]
    fn test_load_wrong_kind_header_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bugs.csv");
        CsvTable::open(&path, RecordKind::Feature, SyncMode::Fast).unwrap();

        let table = CsvTable::open(&path, RecordKind::Bug, SyncMode::Fast).unwrap();
        assert!(table.load().unwrap_err().is_storage());
    }

    #[test]
    fn test_load_column_mismatch_reports_row() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bugs.csv");
        std::fs::write(
            &path,
            "id,user_id,username,description,steps,created_at,status,upvotes\n\
             1,u1,alice,d,s,2024-01-01T00:00:00.000Z,open,0\n\
             2,u2,bob,d,s,2024-01-01T00:00:00.000Z,open\n",
        )
        .unwrap();

        let table = CsvTable::open(&path, RecordKind::Bug, SyncMode::Fast).unwrap();
        match table.load().unwrap_err() {
            crate::ReportDBError::Storage(StorageError::ColumnMismatch {
                row,
                expected,
                found,
                ..
            }) => {
                assert_eq!(row, 2);
                assert_eq!(expected, 8);
                assert_eq!(found, 7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_reads_legacy_substituted_text_verbatim() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bugs.csv");
        std::fs::write(
            &path,
            "id,user_id,username,description,steps,created_at,status,upvotes\n\
             1,u1,alice,crash; then hang,open; save,2024-01-01T00:00:00.000Z,open,1\n",
        )
        .unwrap();

        let table = CsvTable::open(&path, RecordKind::Bug, SyncMode::Fast).unwrap();
        let records = table.load().unwrap();
        assert_eq!(records[0].primary, "crash; then hang");
    }
}
