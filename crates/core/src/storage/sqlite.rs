//! SQLite-backed durable slots

use std::path::Path;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::instrument;

use super::migrations;
use super::traits::KeyValueStore;
use crate::error::Result;

/// Durable slot store. Survives restarts of the application.
pub struct SqliteSlot {
    conn: Connection,
}

impl SqliteSlot {
    /// Open or create the slot database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let slot = Self { conn };
        slot.init()?;
        Ok(slot)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let slot = Self { conn };
        slot.init()?;
        Ok(slot)
    }

    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        migrations::get_current_version(&self.conn).unwrap_or(0)
    }
}

impl KeyValueStore for SqliteSlot {
    #[instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv_slots (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv_slots WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Single-statement conditional write, atomic across connections
    #[instrument(skip(self, expected, new))]
    fn compare_and_swap(&self, key: &str, expected: Option<&str>, new: &str) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let changed = match expected {
            Some(expected) => self.conn.execute(
                "UPDATE kv_slots SET value = ?1, updated_at = ?2 WHERE key = ?3 AND value = ?4",
                params![new, now, key, expected],
            )?,
            None => self.conn.execute(
                "INSERT INTO kv_slots (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO NOTHING",
                params![key, new, now],
            )?,
        };
        Ok(changed == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let slot = SqliteSlot::open_in_memory().unwrap();
        assert_eq!(slot.get("k").unwrap(), None);

        slot.set("k", "one").unwrap();
        slot.set("k", "two").unwrap();
        assert_eq!(slot.get("k").unwrap().as_deref(), Some("two"));

        slot.remove("k").unwrap();
        assert_eq!(slot.get("k").unwrap(), None);
        slot.remove("k").unwrap();
    }

    #[test]
    fn test_compare_and_swap() {
        let slot = SqliteSlot::open_in_memory().unwrap();

        assert!(slot.compare_and_swap("k", None, "a").unwrap());
        assert!(!slot.compare_and_swap("k", None, "b").unwrap());
        assert!(!slot.compare_and_swap("k", Some("stale"), "b").unwrap());
        assert!(slot.compare_and_swap("k", Some("a"), "b").unwrap());
        assert_eq!(slot.get("k").unwrap().as_deref(), Some("b"));
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slots.db");

        {
            let slot = SqliteSlot::open(&path).unwrap();
            slot.set("studymitra_users", "[]").unwrap();
        }

        let slot = SqliteSlot::open(&path).unwrap();
        assert_eq!(slot.schema_version(), 1);
        assert_eq!(slot.get("studymitra_users").unwrap().as_deref(), Some("[]"));
    }
}
