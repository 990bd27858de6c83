//! Type definitions for records.
//!
//! A **record** is one bug report or feature request. Both kinds share the
//! same shape; only the column names of the two text fields differ
//! (`description`/`steps` for bugs, `feature`/`reason` for features).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{RecordId, RecordKind, Timestamp};

// ============================================================================
// RecordStatus
// ============================================================================

/// Lifecycle tag of a record.
///
/// New bugs start `open` and new features `pending`. Tooling outside this
/// crate may write other tags; those are kept verbatim so a load/save cycle
/// never rewrites them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RecordStatus {
    /// Default status of a new bug.
    Open,
    /// Default status of a new feature request.
    Pending,
    /// Any other tag found in the table.
    Other(String),
}

impl RecordStatus {
    /// Returns the tag as stored in the table.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::Pending => "pending",
            Self::Other(tag) => tag,
        }
    }

    /// Status given to newly created records of `kind`.
    pub fn default_for(kind: RecordKind) -> Self {
        match kind {
            RecordKind::Bug => Self::Open,
            RecordKind::Feature => Self::Pending,
        }
    }
}

impl From<String> for RecordStatus {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "open" => Self::Open,
            "pending" => Self::Pending,
            _ => Self::Other(tag),
        }
    }
}

impl From<&str> for RecordStatus {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<RecordStatus> for String {
    fn from(status: RecordStatus) -> Self {
        match status {
            RecordStatus::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Record
// ============================================================================

/// Selects one of a record's two free-text fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextField {
    /// `description` for bugs, `feature` for features. Used for duplicate checks.
    Primary,
    /// `steps` for bugs, `reason` for features.
    Secondary,
}

/// A stored bug report or feature request.
///
/// Everything except `upvotes` is fixed once the record is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Identifier, unique within the record's table.
    pub id: RecordId,

    /// Which table the record belongs to.
    pub kind: RecordKind,

    /// Opaque identifier of the submitter.
    pub user_id: String,

    /// Display name of the submitter at submission time.
    pub username: String,

    /// Bug description or requested feature.
    pub primary: String,

    /// Steps to reproduce or reason for the request.
    pub secondary: String,

    /// When the record was created.
    pub created_at: Timestamp,

    /// Lifecycle tag.
    pub status: RecordStatus,

    /// Number of upvotes received.
    pub upvotes: u64,
}

impl Record {
    /// Returns the selected text field.
    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Primary => &self.primary,
            TextField::Secondary => &self.secondary,
        }
    }
}

// ============================================================================
// NewRecord
// ============================================================================

/// Input for creating a record.
///
/// The id, timestamp, status and upvote count are assigned by the repository.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewRecord {
    /// Opaque identifier of the submitter.
    pub user_id: String,

    /// Display name of the submitter.
    pub username: String,

    /// Bug description or requested feature.
    pub primary: String,

    /// Steps to reproduce or reason for the request.
    pub secondary: String,
}

impl NewRecord {
    /// Creates a submission from its four caller-supplied fields.
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        primary: impl Into<String>,
        secondary: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    /// Builds the stored record for this submission.
    pub(crate) fn into_record(self, id: RecordId, kind: RecordKind) -> Record {
        Record {
            id,
            kind,
            user_id: self.user_id,
            username: self.username,
            primary: self.primary,
            secondary: self.secondary,
            created_at: Timestamp::now(),
            status: RecordStatus::default_for(kind),
            upvotes: 0,
        }
    }
}

// ============================================================================
// CreateResult
// ============================================================================

/// Outcome of a create call.
///
/// A duplicate is a successful outcome, not an error: nothing was written
/// and the caller is shown the records it resembles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CreateResult {
    /// Similar records exist; the submission was discarded.
    Duplicate {
        /// The similar records, unmodified, in table order.
        similar_entries: Vec<Record>,
    },
    /// The submission was stored under a new id.
    Created {
        /// Identifier of the new record.
        id: RecordId,
    },
}

impl CreateResult {
    /// Returns true if the submission was rejected as a duplicate.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    /// Returns the new id if a record was created.
    pub fn created_id(&self) -> Option<RecordId> {
        match self {
            Self::Created { id } => Some(*id),
            Self::Duplicate { .. } => None,
        }
    }

    /// Returns the similar records if the submission was a duplicate.
    pub fn similar_entries(&self) -> &[Record] {
        match self {
            Self::Duplicate { similar_entries } => similar_entries,
            Self::Created { .. } => &[],
        }
    }
}
