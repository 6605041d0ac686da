use rusqlite::{Connection, OptionalExtension};

use crate::error::StorageError;
use crate::traits::{EntryRecord, Storage};

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_schema(&conn)?;
        tracing::debug!(path, "opened sqlite storage");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl Storage for SqliteStorage {
    fn get_entry(&self, key: &str) -> Result<Option<EntryRecord>, StorageError> {
        let record = self
            .conn
            .query_row(
                "SELECT key, value, updated_at FROM entries WHERE key = ?1",
                rusqlite::params![key],
                |row| {
                    Ok(EntryRecord {
                        key: row.get(0)?,
                        value: row.get(1)?,
                        updated_at: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn put_entry(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO entries (key, value, updated_at)
             VALUES (?1, ?2, CAST(unixepoch('now','subsec') * 1000 AS INTEGER))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            rusqlite::params![key, value],
        )?;
        tracing::debug!(key, bytes = value.len(), "stored entry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_as_none() -> Result<(), StorageError> {
        let storage = SqliteStorage::open_in_memory()?;
        assert_eq!(storage.get("nope")?, None);
        Ok(())
    }

    #[test]
    fn put_then_get() -> Result<(), StorageError> {
        let mut storage = SqliteStorage::open_in_memory()?;
        storage.put_entry("projects", "[]")?;
        let entry = storage.get_entry("projects")?.ok_or_else(|| StorageError::NotFound("projects".into()))?;
        assert_eq!(entry.value, "[]");
        assert!(entry.updated_at > 0);
        Ok(())
    }

    #[test]
    fn put_overwrites() -> Result<(), StorageError> {
        let mut storage = SqliteStorage::open_in_memory()?;
        storage.put_entry("prefs", "{\"pinnedTags\":[]}")?;
        storage.put_entry("prefs", "{\"pinnedTags\":[\"noir\"]}")?;
        assert_eq!(storage.get("prefs")?.as_deref(), Some("{\"pinnedTags\":[\"noir\"]}"));
        Ok(())
    }

    #[test]
    fn entries_survive_reopen() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("state.db");
        let path = path.to_str().ok_or("non-utf8 temp path")?;
        {
            let mut storage = SqliteStorage::open(path)?;
            storage.put_entry("projects", "[{\"id\":\"p1\"}]")?;
        }
        let storage = SqliteStorage::open(path)?;
        assert_eq!(storage.get("projects")?.as_deref(), Some("[{\"id\":\"p1\"}]"));
        Ok(())
    }

    #[test]
    fn rejects_newer_schema() -> Result<(), StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_schema(&conn)?;
        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (99, 0)",
            [],
        )?;
        assert!(matches!(
            crate::schema::init_schema(&conn),
            Err(StorageError::UnsupportedSchema { found: 99, .. })
        ));
        Ok(())
    }
}
