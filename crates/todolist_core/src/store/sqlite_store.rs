//! SQLite-backed key-value todo store.
//!
//! # Responsibility
//! - Persist the serialized collection under [`TODOS_KEY`] in `kv_store`.
//! - Keep SQL details inside the store boundary.
//!
//! # Invariants
//! - Writes are single-statement upserts; a failed write leaves the previous value.

use crate::db::{open_db, open_db_in_memory};
use crate::model::todo::Todo;
use crate::store::{decode_todos, encode_todos, StoreResult, TodoStore, TODOS_KEY};
use log::{debug, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Todo store persisted in a SQLite `kv_store` table.
pub struct SqliteTodoStore {
    conn: Connection,
}

impl SqliteTodoStore {
    /// Opens (or creates) the store file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a transient in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Raw stored value for `key`, if any.
    pub fn get_raw(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Overwrites the value stored under `key`.
    pub fn set_raw(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, CAST(strftime('%s', 'now') AS INTEGER) * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

impl TodoStore for SqliteTodoStore {
    fn save(&self, todos: &[Todo]) -> StoreResult<()> {
        let raw = encode_todos(todos)?;
        self.set_raw(TODOS_KEY, &raw)?;
        debug!(
            "event=store_save module=store status=ok backend=sqlite count={}",
            todos.len()
        );
        Ok(())
    }

    fn load(&self) -> StoreResult<Vec<Todo>> {
        let todos = match self.get_raw(TODOS_KEY)? {
            Some(raw) => decode_todos(&raw)?,
            None => Vec::new(),
        };
        info!(
            "event=store_load module=store status=ok backend=sqlite count={}",
            todos.len()
        );
        Ok(todos)
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteTodoStore;
    use crate::model::todo::Todo;
    use crate::store::{TodoStore, TODOS_KEY};

    #[test]
    fn load_of_fresh_store_is_empty() {
        let store = SqliteTodoStore::open_in_memory().expect("open store");
        assert!(store.load().expect("load").is_empty());
        assert_eq!(store.get_raw(TODOS_KEY).expect("raw"), None);
    }

    #[test]
    fn save_overwrites_previous_value() {
        let store = SqliteTodoStore::open_in_memory().expect("open store");
        store
            .save(&[Todo::new(1, "a").expect("valid"), Todo::new(2, "b").expect("valid")])
            .expect("first save");
        store
            .save(&[Todo::with_state(2, "b", true).expect("valid")])
            .expect("second save");

        let loaded = store.load().expect("load");
        assert_eq!(loaded, vec![Todo::with_state(2, "b", true).expect("valid")]);
    }
}
