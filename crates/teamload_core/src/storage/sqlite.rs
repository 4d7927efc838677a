//! SQLite-backed key-value storage.
//!
//! # Invariants
//! - Connections passed in must come from `db::open_db*` (migrated schema).
//! - `updated_at` is refreshed on every overwrite of a key.

use super::{KeyValueStorage, StorageError, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value storage over the `kv_entries` table.
#[derive(Clone, Copy)]
pub struct SqliteStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStorage<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

fn entry_error(key: &str, source: rusqlite::Error) -> StorageError {
    StorageError::Entry {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStorage for SqliteStorage<'_> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|err| entry_error(key, err))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn
            .execute(
                "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![key, value],
            )
            .map_err(|err| entry_error(key, err))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])
            .map_err(|err| entry_error(key, err))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteStorage;
    use crate::db::open_db_in_memory;
    use crate::storage::{KeyValueStorage, StorageError};

    #[test]
    fn set_overwrites_and_remove_deletes() {
        let conn = open_db_in_memory().unwrap();
        let storage = SqliteStorage::new(&conn);

        storage.set("k", "one").unwrap();
        storage.set("k", "two").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("two"));

        storage.remove("k").unwrap();
        assert_eq!(storage.get("k").unwrap(), None);
    }

    #[test]
    fn entry_failures_name_the_key() {
        let conn = open_db_in_memory().unwrap();
        conn.execute_batch("DROP TABLE kv_entries;").unwrap();
        let storage = SqliteStorage::new(&conn);

        let err = storage.set("resource-mgm-users-v1", "[]").unwrap_err();
        assert!(matches!(err, StorageError::Entry { ref key, .. } if key == "resource-mgm-users-v1"));
        assert!(err.to_string().contains("resource-mgm-users-v1"));
    }
}
