//! Input validation for new records.
//!
//! Runs before the table is loaded, so a rejected submission never takes the
//! table lock.

use crate::error::{ReportDBError, ValidationError};
use crate::record::types::NewRecord;
use crate::storage::schema::TableSchema;

/// Validates a [`NewRecord`] before storage.
///
/// # Rules
///
/// | Field | Constraint |
/// |-------|------------|
/// | `user_id` | Non-empty |
/// | `username` | Non-empty |
/// | primary text | Max `max_text_size` bytes (may be empty) |
/// | secondary text | Max `max_text_size` bytes (may be empty) |
///
/// Errors name the fields by their column names in `schema`.
pub(crate) fn validate_new_record(
    record: &NewRecord,
    schema: &TableSchema,
    max_text_size: usize,
) -> Result<(), ReportDBError> {
    if record.user_id.is_empty() {
        return Err(ValidationError::required_field("user_id").into());
    }

    if record.username.is_empty() {
        return Err(ValidationError::required_field("username").into());
    }

    for (field, text) in [
        (schema.primary_column(), &record.primary),
        (schema.secondary_column(), &record.secondary),
    ] {
        if text.len() > max_text_size {
            return Err(ValidationError::content_too_large(field, text.len(), max_text_size).into());
        }
    }

    Ok(())
}
