//! In-memory table backend.
//!
//! Holds the snapshot in a `RwLock<Vec<Record>>`. Useful for tests and for
//! embedding the repository where nothing needs to outlive the process.

use std::path::Path;
use std::sync::RwLock;

use super::schema::TableSchema;
use super::TableStore;
use crate::error::{Result, StorageError};
use crate::record::Record;
use crate::types::RecordKind;

/// A table kept entirely in memory.
#[derive(Debug)]
pub struct MemoryTable {
    schema: TableSchema,
    rows: RwLock<Vec<Record>>,
}

impl MemoryTable {
    /// Creates an empty table of `kind`.
    pub fn new(kind: RecordKind) -> Self {
        Self::with_records(kind, Vec::new())
    }

    /// Creates a table pre-filled with `records`.
    pub fn with_records(kind: RecordKind, records: Vec<Record>) -> Self {
        Self {
            schema: TableSchema::for_kind(kind),
            rows: RwLock::new(records),
        }
    }
}

impl TableStore for MemoryTable {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    fn load(&self) -> Result<Vec<Record>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StorageError::poisoned(self.schema.kind().as_str()))?;
        Ok(rows.clone())
    }

    fn save(&self, records: &[Record]) -> Result<()> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| StorageError::poisoned(self.schema.kind().as_str()))?;
        *rows = records.to_vec();
        Ok(())
    }

    fn path(&self) -> Option<&Path> {
        None
    }
}
