//! Persistence port for the todo collection.
//!
//! # Responsibility
//! - Define the `TodoStore` contract used by the controller.
//! - Own the wire format: key `todos` maps to a JSON array of
//!   `{id, title, completed}` objects in collection order.
//!
//! # Invariants
//! - `save` overwrites the whole previous value.
//! - `load` of a never-written store yields an empty collection.
//! - `load` rejects persisted data that breaks model invariants.

use crate::db::DbError;
use crate::model::todo::Todo;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory_store;
pub mod sqlite_store;

/// Fixed key under which the collection is stored.
pub const TODOS_KEY: &str = "todos";

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence errors.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Serialization(serde_json::Error),
    InvalidData(String),
    /// Backend refused the operation (e.g. an injected failure).
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "todo serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todos: {message}"),
            Self::Unavailable(message) => write!(f, "todo store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) | Self::Unavailable(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for the full todo collection.
pub trait TodoStore {
    /// Replaces the stored collection with `todos`.
    fn save(&self, todos: &[Todo]) -> StoreResult<()>;
    /// Reads the stored collection, empty when nothing was saved yet.
    fn load(&self) -> StoreResult<Vec<Todo>>;
}

/// Serializes `todos` to the stored JSON array.
pub fn encode_todos(todos: &[Todo]) -> StoreResult<String> {
    serde_json::to_string(todos).map_err(StoreError::Serialization)
}

/// Parses a stored JSON array, enforcing title and id-uniqueness invariants.
pub fn decode_todos(raw: &str) -> StoreResult<Vec<Todo>> {
    let todos: Vec<Todo> = serde_json::from_str(raw).map_err(|err| {
        if err.is_data() {
            StoreError::InvalidData(err.to_string())
        } else {
            StoreError::Serialization(err)
        }
    })?;

    let mut seen = HashSet::with_capacity(todos.len());
    if let Some(duplicate) = todos.iter().find(|todo| !seen.insert(todo.id())) {
        return Err(StoreError::InvalidData(format!(
            "duplicate todo id {}",
            duplicate.id()
        )));
    }
    Ok(todos)
}

#[cfg(test)]
mod tests {
    use super::{decode_todos, encode_todos, StoreError};
    use crate::model::todo::Todo;

    #[test]
    fn encodes_wire_fields_in_collection_order() {
        let todos = vec![
            Todo::new(2, "second").expect("valid"),
            Todo::with_state(1, "first", true).expect("valid"),
        ];
        let raw = encode_todos(&todos).expect("encode");
        assert_eq!(
            raw,
            r#"[{"id":2,"title":"second","completed":false},{"id":1,"title":"first","completed":true}]"#
        );
    }

    #[test]
    fn decode_rejects_duplicate_ids() {
        let raw = r#"[{"id":1,"title":"a","completed":false},{"id":1,"title":"b","completed":true}]"#;
        let err = decode_todos(raw).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(message) if message.contains("duplicate")));
    }

    #[test]
    fn decode_rejects_blank_titles() {
        let raw = r#"[{"id":1,"title":"   ","completed":false}]"#;
        assert!(matches!(
            decode_todos(raw),
            Err(StoreError::InvalidData(_))
        ));
    }

    #[test]
    fn decode_reports_malformed_json_as_serialization_error() {
        assert!(matches!(
            decode_todos("[{"),
            Err(StoreError::Serialization(_))
        ));
    }
}
