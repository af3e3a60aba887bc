//! Storage traits and error types
//!
//! This module defines the trait interface for result repositories and
//! associated error types.

use crate::record::{NewResult, ResultRecord};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Write conflict: {0}")]
    Conflict(String),

    #[error("No result found with ID {0}")]
    NotFound(i64),

    #[error("Corrupt {column} column: {message}")]
    Codec {
        column: &'static str,
        message: String,
    },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(rusqlite::ErrorCode::ConstraintViolation) => Self::Conflict(err.to_string()),
            _ => Self::Unavailable(err.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for scrape result repositories
///
/// Implementations must be safe to share between concurrent scrapes; every
/// method takes `&self` and serializes access internally.
pub trait ResultRepository: Send + Sync {
    // ===== Writes =====

    /// Persists a new result and returns it with its assigned id and timestamp
    ///
    /// Either the full row is committed or nothing is.
    fn save(&self, result: &NewResult) -> StorageResult<ResultRecord>;

    /// Deletes a result by id
    ///
    /// Returns `StorageError::NotFound` if no such result exists.
    fn delete_by_id(&self, id: i64) -> StorageResult<()>;

    // ===== Reads =====

    /// Lists all results, most recent first
    fn list(&self) -> StorageResult<Vec<ResultRecord>>;

    /// Gets a result by id, `None` if it was never saved or has been deleted
    fn get_by_id(&self, id: i64) -> StorageResult<Option<ResultRecord>>;

    /// Lists results for an exact requested URL, most recent first
    fn list_by_url(&self, url: &str) -> StorageResult<Vec<ResultRecord>>;

    /// Lists results with the given HTTP status, most recent first
    fn list_by_status(&self, status_code: u16) -> StorageResult<Vec<ResultRecord>>;

    // ===== Statistics =====

    /// Counts stored results
    fn count(&self) -> StorageResult<u64>;

    /// Counts stored results per HTTP status code
    fn status_breakdown(&self) -> StorageResult<BTreeMap<u16, u64>>;
}
