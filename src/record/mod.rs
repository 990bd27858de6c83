//! Record management module.
//!
//! A **record** is the core data type in ReportDB: one bug report or feature
//! request with an integer id, two free-text fields, a status and an upvote
//! counter.
//!
//! # Operations
//!
//! All record operations are available on [`Repository`], one per table,
//! and through the [`ReportDB`](crate::ReportDB) facade:
//!
//! - [`create(new)`](Repository::create) - store unless a similar record exists
//! - [`list_all()`](Repository::list_all) - every record, oldest first
//! - [`get(id)`](Repository::get) - one record by id
//! - [`upvote(id)`](Repository::upvote) - add one upvote

mod repository;
pub mod types;
mod validation;

pub use repository::Repository;
pub use types::{CreateResult, NewRecord, Record, RecordStatus, TextField};
