//! Local key/value persistence.
//!
//! Seen-state lives in a flat string namespace, the same shape as browser
//! local storage. Two backings implement [`KeyValueStore`]:
//!
//! ```text
//! SqliteStore   ~/.onboard/seen.sqlite, one `entries(key, value)` table
//! MemoryStore   process-local, for tests and dry runs
//! ```

mod memory;
mod sqlite;

use std::io;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// A string-to-string store.
///
/// Methods take `&self`; implementations that mutate in memory use interior
/// mutability.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Returns whether it existed.
    fn remove(&self, key: &str) -> Result<bool>;

    /// Every key starting with `prefix`, sorted.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Removes every key starting with `prefix`. Returns how many went.
    fn remove_prefix(&self, prefix: &str) -> Result<usize> {
        let keys = self.keys_with_prefix(prefix)?;
        let mut removed = 0;
        for key in keys {
            if self.remove(&key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
