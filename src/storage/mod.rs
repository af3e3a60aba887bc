//! Storage module for persisting scrape results
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Saving, listing, fetching and deleting scrape results
//! - Encoding of the composite `links`, `images` and `headers` columns

pub mod codec;
mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteRepository;
pub use traits::{ResultRepository, StorageError, StorageResult};

use std::path::Path;

/// Opens the result store, creating its parent directory if needed
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteRepository)` - Successfully opened repository
/// * `Err(StorageError)` - Failed to create the directory or open the database
pub fn open_repository(path: &Path) -> StorageResult<SqliteRepository> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| {
            StorageError::Unavailable(format!(
                "failed to create data directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
    }

    SqliteRepository::open(path)
}
