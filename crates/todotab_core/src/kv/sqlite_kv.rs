//! SQLite implementation of [`KeyValueStore`] over the `kv_entries` table.

use super::{KeyValueStore, KvResult};
use rusqlite::{params, Connection, OptionalExtension};

/// Key-value store owning a migrated SQLite connection.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Wraps a connection returned by [`crate::db::open_db`] or
    /// [`crate::db::open_db_in_memory`].
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns all stored keys in ascending order.
    pub fn keys(&self) -> KvResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_entries ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get_item(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> KvResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteKeyValueStore;
    use crate::db::open_db_in_memory;
    use crate::kv::KeyValueStore;

    #[test]
    fn missing_key_reads_as_none() {
        let kv = SqliteKeyValueStore::new(open_db_in_memory().unwrap());
        assert_eq!(kv.get_item("@toDos").unwrap(), None);
    }

    #[test]
    fn set_item_replaces_previous_value() {
        let kv = SqliteKeyValueStore::new(open_db_in_memory().unwrap());
        kv.set_item("@toDoTab", "work").unwrap();
        kv.set_item("@toDoTab", "travel").unwrap();
        assert_eq!(kv.get_item("@toDoTab").unwrap().as_deref(), Some("travel"));
        assert_eq!(kv.keys().unwrap(), vec!["@toDoTab".to_string()]);
    }

    #[test]
    fn remove_item_is_idempotent() {
        let kv = SqliteKeyValueStore::new(open_db_in_memory().unwrap());
        kv.set_item("k", "v").unwrap();
        kv.remove_item("k").unwrap();
        kv.remove_item("k").unwrap();
        assert_eq!(kv.get_item("k").unwrap(), None);
    }
}
