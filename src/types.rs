//! Core type definitions for ReportDB identifiers, timestamps and kinds.
//!
//! Record identifiers are plain positive integers allocated per table as
//! `max(id) + 1`. They are compared numerically everywhere, including when a
//! caller hands one in as text.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Record identifier, unique within one table.
///
/// # Example
/// ```
/// use reportdb::RecordId;
///
/// let id: RecordId = "12".parse().unwrap();
/// assert_eq!(id, RecordId::new(12));
/// assert_eq!(id.to_string(), "12");
/// ```
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    /// The first identifier allocated in an empty table.
    pub const FIRST: RecordId = RecordId(1);

    /// Wraps a raw identifier value.
    #[inline]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier value.
    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Returns the identifier that follows this one, or `None` at `u64::MAX`.
    #[inline]
    pub const fn checked_next(&self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = ValidationError;

    /// Parses a decimal identifier. Leading zeros are accepted ("007" is 7);
    /// signs, whitespace and zero are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::invalid_id(s));
        }
        match s.parse::<u64>() {
            Ok(0) | Err(_) => Err(ValidationError::invalid_id(s)),
            Ok(v) => Ok(Self(v)),
        }
    }
}

/// UTC instant with millisecond precision.
///
/// The text form is ISO-8601 with milliseconds and a `Z` suffix
/// (`2024-05-01T09:30:00.250Z`), which is what the table files store.
/// Formatting a parsed value reproduces the original text exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment, truncated to milliseconds.
    pub fn now() -> Self {
        Self::from_millis(Utc::now().timestamp_millis())
    }

    /// Creates a timestamp from Unix milliseconds.
    ///
    /// Out-of-range values clamp to the Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        let dt = Utc
            .timestamp_millis_opt(millis)
            .single()
            .unwrap_or_default();
        Self(dt)
    }

    /// Returns the timestamp as Unix milliseconds.
    #[inline]
    pub fn as_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Returns the underlying chrono value.
    #[inline]
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Parses the canonical text form produced by `Display`.
    ///
    /// Anything else (another offset, more or fewer fractional digits) is
    /// rejected, so a parsed value always formats back to the same bytes.
    pub fn parse(s: &str) -> Option<Self> {
        let dt = DateTime::parse_from_rfc3339(s).ok()?;
        let ts = Self::from_millis(dt.with_timezone(&Utc).timestamp_millis());
        (ts.to_string() == s).then_some(ts)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// The two kinds of record, each persisted in its own table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// Bug report: `description` + `steps`, created `open`.
    Bug,
    /// Feature request: `feature` + `reason`, created `pending`.
    Feature,
}

impl RecordKind {
    /// Short lowercase name used in logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
