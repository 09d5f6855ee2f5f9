//! `SQLite`-backed store: a single `entries` table.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension};

use super::{KeyValueStore, Result};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS entries (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`.
    ///
    /// Parent directories are created if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Self::init(Connection::open(path)?)
    }

    /// A store that lives only as long as this value.
    pub fn in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Returns the default database path: `~/.onboard/seen.sqlite`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".onboard").join("seen.sqlite"))
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM entries WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM entries WHERE key = ?1", [key])?;
        Ok(rows > 0)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT key FROM entries WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key",
        )?;
        let keys = stmt
            .query_map([prefix], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(keys)
    }

    fn remove_prefix(&self, prefix: &str) -> Result<usize> {
        let rows = self.conn.execute(
            "DELETE FROM entries WHERE substr(key, 1, length(?1)) = ?1",
            [prefix],
        )?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn test_store() -> (TempDir, SqliteStore) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path().join("nested").join("seen.sqlite")).unwrap();
        (dir, store)
    }

    #[test]
    fn set_get_overwrite() {
        let (_dir, store) = test_store();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seen.sqlite");
        SqliteStore::open(&path).unwrap().set("k", "v").unwrap();

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn prefix_operations_ignore_like_wildcards() {
        let (_dir, store) = test_store();
        store.set("ns:a_1", "x").unwrap();
        store.set("ns:a%2", "y").unwrap();
        store.set("nsXa_1", "z").unwrap();
        store.set("other", "w").unwrap();

        assert_eq!(store.keys_with_prefix("ns:a_").unwrap(), ["ns:a_1"]);
        assert_eq!(store.keys_with_prefix("ns:").unwrap(), ["ns:a%2", "ns:a_1"]);
        assert_eq!(store.remove_prefix("ns:").unwrap(), 2);
        assert_eq!(store.keys_with_prefix("").unwrap(), ["nsXa_1", "other"]);
    }

    #[test]
    fn remove_reports_existence() {
        let store = SqliteStore::in_memory().unwrap();
        store.set("k", "v").unwrap();
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
    }
}
