//! SQLite-backed store.
//!
//! One `kv` table; the quota is enforced here since SQLite has none.

use super::{check_quota, entry_size, KvStore};
use crate::error::SimResult;
use rusqlite::{params, Connection, OptionalExtension};

pub struct SqliteKv {
    conn:     Connection,
    capacity: usize,
}

impl SqliteKv {
    /// Open (or create) the store at `path` and apply migrations.
    pub fn open(path: &str, capacity: usize) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only matters for real files; in-memory ignores it.
        if let Err(e) = conn.execute_batch("PRAGMA journal_mode=WAL;") {
            log::warn!("could not enable WAL on {path}, using the default journal: {e}");
        }
        let store = Self { conn, capacity };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory(capacity: usize) -> SimResult<Self> {
        let store = Self { conn: Connection::open_in_memory()?, capacity };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> SimResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_kv.sql"))?;
        Ok(())
    }

    fn existing_size(&self, key: &str) -> SimResult<Option<usize>> {
        let size = self
            .conn
            .query_row(
                "SELECT length(CAST(value AS BLOB)) FROM kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(size.map(|s| key.len() + usize::try_from(s).unwrap_or(0)))
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> SimResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> SimResult<()> {
        let used = self.used_bytes()?;
        check_quota(key, value, used, self.existing_size(key)?, self.capacity)?;
        let now = chrono::Utc::now().timestamp_millis();
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        log::trace!("kv set {key} ({} bytes)", entry_size(key, value));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> SimResult<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn keys(&self) -> SimResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key ASC")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn capacity_bytes(&self) -> usize {
        self.capacity
    }

    fn used_bytes(&self) -> SimResult<usize> {
        let used: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0) FROM kv",
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(used).unwrap_or(0))
    }
}
