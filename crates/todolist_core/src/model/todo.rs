//! Todo domain record.
//!
//! # Responsibility
//! - Hold id/title/completion state for one task.
//! - Normalize and validate titles at construction and on deserialize.
//!
//! # Invariants
//! - `title` is trimmed and non-empty.
//! - `id` is immutable; `title` is immutable; only `completed` flips.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Identifier of one todo. Unique among the todos held by one list.
pub type TodoId = i64;

/// Shared handle to one todo.
///
/// The controller and the item view rendering a todo hold the same handle, so
/// identity comparisons use `Rc::ptr_eq`. Only the controller mutates through it.
pub type TodoHandle = Rc<RefCell<Todo>>;

/// Validation errors for todo construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    /// Title is empty or whitespace-only.
    EmptyTitle,
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "todo title must not be empty"),
        }
    }
}

impl Error for TodoValidationError {}

/// One task of the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TodoRecord")]
pub struct Todo {
    id: TodoId,
    title: String,
    completed: bool,
}

/// Wire shape used to route deserialization through validation.
#[derive(Deserialize)]
struct TodoRecord {
    id: TodoId,
    title: String,
    completed: bool,
}

impl TryFrom<TodoRecord> for Todo {
    type Error = TodoValidationError;

    fn try_from(value: TodoRecord) -> Result<Self, Self::Error> {
        Self::with_state(value.id, value.title, value.completed)
    }
}

impl Todo {
    /// Creates an incomplete todo.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` trims to an empty string.
    pub fn new(id: TodoId, title: impl AsRef<str>) -> Result<Self, TodoValidationError> {
        Self::with_state(id, title, false)
    }

    /// Creates a todo with explicit completion state.
    ///
    /// Used when restoring a saved collection.
    pub fn with_state(
        id: TodoId,
        title: impl AsRef<str>,
        completed: bool,
    ) -> Result<Self, TodoValidationError> {
        let title = normalize_title(title.as_ref()).ok_or(TodoValidationError::EmptyTitle)?;
        Ok(Self {
            id,
            title,
            completed,
        })
    }

    pub fn id(&self) -> TodoId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Flips completion state and returns the new value.
    pub fn toggle_completed(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }

    /// Wraps this todo into a shared handle.
    pub fn into_handle(self) -> TodoHandle {
        Rc::new(RefCell::new(self))
    }
}

/// Trims surrounding whitespace, returning `None` for blank input.
pub fn normalize_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_title, Todo, TodoValidationError};

    #[test]
    fn new_trims_title_and_starts_incomplete() {
        let todo = Todo::new(7, "  Buy milk \n").expect("valid title");
        assert_eq!(todo.id(), 7);
        assert_eq!(todo.title(), "Buy milk");
        assert!(!todo.is_completed());
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(
            Todo::new(1, " \t ").unwrap_err(),
            TodoValidationError::EmptyTitle
        );
        assert_eq!(normalize_title(""), None);
    }

    #[test]
    fn toggle_flips_back_and_forth() {
        let mut todo = Todo::new(1, "a").expect("valid title");
        assert!(todo.toggle_completed());
        assert!(!todo.toggle_completed());
    }
}
