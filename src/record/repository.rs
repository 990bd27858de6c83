//! Per-table create-with-dedup and upvote operations.

use std::sync::Mutex;

use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::{Result, StorageError};
use crate::record::types::{CreateResult, NewRecord, Record, TextField};
use crate::record::validation::validate_new_record;
use crate::similarity::find_similar;
use crate::storage::{next_id, TableSchema, TableStore};
use crate::types::{RecordId, RecordKind};

/// Record repository for one table.
///
/// Every operation runs its whole load-mutate-save cycle while holding the
/// repository's mutex, so two operations on the same table never interleave
/// and no update is lost. Repositories for different tables are independent.
///
/// # Example
///
/// ```rust
/// use reportdb::{CreateResult, MemoryTable, NewRecord, RecordKind, Repository};
///
/// let bugs = Repository::new(Box::new(MemoryTable::new(RecordKind::Bug)), 0.7, 4096);
///
/// let first = bugs.create(NewRecord::new("u1", "alice", "crash on save", "open save menu"))?;
/// assert_eq!(first.created_id().map(|id| id.get()), Some(1));
///
/// let again = bugs.create(NewRecord::new("u2", "bob", "Crash on save", "press ctrl-s"))?;
/// assert!(again.is_duplicate());
/// # Ok::<(), reportdb::ReportDBError>(())
/// ```
#[derive(Debug)]
pub struct Repository {
    /// Layout of the underlying table (copied out so validation needs no lock).
    schema: TableSchema,

    /// Table storage; the mutex is the table's critical section.
    store: Mutex<Box<dyn TableStore>>,

    /// Minimum overlap ratio for duplicate suppression.
    threshold: f64,

    /// Maximum size of each text field in bytes.
    max_text_size: usize,
}

impl Repository {
    /// Creates a repository over `store`.
    ///
    /// The record kind is taken from the store's schema.
    pub fn new(store: Box<dyn TableStore>, threshold: f64, max_text_size: usize) -> Self {
        Self {
            schema: *store.schema(),
            store: Mutex::new(store),
            threshold,
            max_text_size,
        }
    }

    /// Creates a repository over `store` using the limits in `config`.
    pub fn with_config(store: Box<dyn TableStore>, config: &Config) -> Self {
        Self::new(store, config.similarity_threshold, config.max_text_size)
    }

    /// Record kind stored by this repository.
    #[inline]
    pub fn kind(&self) -> RecordKind {
        self.schema.kind()
    }

    /// Column layout of the underlying table.
    #[inline]
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Duplicate-suppression threshold in use.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Runs `f` inside the table's critical section.
    fn with_store<T>(&self, f: impl FnOnce(&dyn TableStore) -> Result<T>) -> Result<T> {
        let store = self
            .store
            .lock()
            .map_err(|_| StorageError::poisoned(self.kind().as_str()))?;
        f(store.as_ref())
    }

    /// Stores `new` unless an existing record is similar to it.
    ///
    /// Similarity is checked on the primary text. When any record scores at
    /// or above the threshold, nothing is written and the similar records
    /// are returned. Otherwise the record is appended with the next id, the
    /// current time, the kind's default status and zero upvotes.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input (before the table is read)
    /// and a storage error if the table cannot be loaded or saved, or if no
    /// id is left to allocate.
    #[instrument(skip(self, new), fields(kind = %self.kind(), user_id = %new.user_id))]
    pub fn create(&self, new: NewRecord) -> Result<CreateResult> {
        validate_new_record(&new, &self.schema, self.max_text_size)?;

        self.with_store(|store| {
            let mut records = store.load()?;

            let similar_entries: Vec<Record> =
                find_similar(&records, &new.primary, TextField::Primary, self.threshold)
                    .into_iter()
                    .cloned()
                    .collect();
            if !similar_entries.is_empty() {
                debug!(
                    matches = similar_entries.len(),
                    "Similar records found, submission discarded"
                );
                return Ok(CreateResult::Duplicate { similar_entries });
            }

            let id = next_id(&records)?;
            records.push(new.into_record(id, self.kind()));
            store.save(&records)?;

            debug!(id = %id, "Record created");
            Ok(CreateResult::Created { id })
        })
    }

    /// Returns every record in storage order (oldest first).
    pub fn list_all(&self) -> Result<Vec<Record>> {
        self.with_store(|store| store.load())
    }

    /// Returns the record with `id`, if any.
    pub fn get(&self, id: RecordId) -> Result<Option<Record>> {
        self.with_store(|store| Ok(store.load()?.into_iter().find(|r| r.id == id)))
    }

    /// Adds one upvote to the record with `id`.
    ///
    /// Returns `false` without writing when no record has that id.
    #[instrument(skip(self), fields(kind = %self.kind()))]
    pub fn upvote(&self, id: RecordId) -> Result<bool> {
        self.with_store(|store| {
            let mut records = store.load()?;

            let Some(record) = records.iter_mut().find(|r| r.id == id) else {
                debug!("Upvote target not found");
                return Ok(false);
            };
            record.upvotes = record.upvotes.saturating_add(1);
            let upvotes = record.upvotes;

            store.save(&records)?;
            debug!(upvotes, "Upvote recorded");
            Ok(true)
        })
    }
}
