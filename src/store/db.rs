//! SQLite-backed key-value storage
//!
//! Manages the `~/.questlog/state.db` database with automatic schema migration.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use super::{KeyValueStore, Result};

/// Key-value store persisted in a single SQLite table
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the state database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // CLI invocations may overlap with a long-running focus timer
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    #[cfg(test)]
    fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        self.run_migrations()
    }

    /// Run any pending migrations
    fn run_migrations(&self) -> Result<()> {
        let version: i32 = self
            .conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))
            .unwrap_or(0);

        // Migration 2: track write time per key
        if version < 2 {
            let has_updated_at: bool = self
                .conn
                .prepare("SELECT COUNT(*) FROM pragma_table_info('kv_store') WHERE name = 'updated_at'")
                .and_then(|mut s| s.query_row([], |r| r.get::<_, i32>(0)))
                .map(|c| c > 0)
                .unwrap_or(false);

            if !has_updated_at {
                self.conn
                    .execute_batch("ALTER TABLE kv_store ADD COLUMN updated_at INTEGER;")?;
            }
            self.conn
                .execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        Ok(())
    }

    #[cfg(test)]
    fn key_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM kv_store", [], |r| r.get(0))?;
        Ok(count as usize)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |r| r.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3
            "#,
            (key, value, now),
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        Ok(())
    }
}

/// SQL schema for the state database
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_and_init() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("state.db");
        let store = SqliteStore::open(&db_path).unwrap();

        let mut stmt = store
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table'")
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"kv_store".to_string()));
        assert!(tables.contains(&"schema_version".to_string()));
    }

    #[test]
    fn test_set_get_remove() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("gems").unwrap(), None);

        store.set("gems", "40").unwrap();
        store.set("gems", "60").unwrap();
        assert_eq!(store.get("gems").unwrap().as_deref(), Some("60"));
        assert_eq!(store.key_count().unwrap(), 1);

        store.remove("gems").unwrap();
        assert_eq!(store.get("gems").unwrap(), None);
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("state.db");
        {
            let mut store = SqliteStore::open(&db_path).unwrap();
            store.set("crate_test_mode", "true").unwrap();
        }
        let store = SqliteStore::open(&db_path).unwrap();
        assert_eq!(store.get("crate_test_mode").unwrap().as_deref(), Some("true"));
    }
}
