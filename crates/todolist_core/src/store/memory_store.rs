//! In-memory todo store.
//!
//! Keeps the serialized JSON exactly as a persistent backend would, so tests
//! can assert on the stored wire value. Write failures can be injected.

use crate::model::todo::Todo;
use crate::store::{decode_todos, encode_todos, StoreError, StoreResult, TodoStore};
use std::cell::{Cell, RefCell};

#[derive(Debug, Default)]
pub struct MemoryTodoStore {
    value: RefCell<Option<String>>,
    writes: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `todos`, as if saved by an earlier session.
    pub fn seeded(todos: &[Todo]) -> StoreResult<Self> {
        let store = Self::new();
        store.value.replace(Some(encode_todos(todos)?));
        Ok(store)
    }

    /// Stored JSON value, `None` until the first successful save.
    pub fn raw(&self) -> Option<String> {
        self.value.borrow().clone()
    }

    /// Number of successful saves.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Makes subsequent saves fail (or succeed again) without touching the value.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl TodoStore for MemoryTodoStore {
    fn save(&self, todos: &[Todo]) -> StoreResult<()> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        let raw = encode_todos(todos)?;
        self.value.replace(Some(raw));
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn load(&self) -> StoreResult<Vec<Todo>> {
        match self.value.borrow().as_deref() {
            Some(raw) => decode_todos(raw),
            None => Ok(Vec::new()),
        }
    }
}
