//! Core of the single-user task-list widget.
//!
//! The `TodoList` controller owns the todo collection and reconciles it with
//! per-item views through bubbling domain events, persisting after every
//! mutation. The UI tree, templates and stores here are the concrete
//! collaborators a host plugs in.

pub mod config;
pub mod controller;
pub mod db;
pub mod id_gen;
pub mod logging;
pub mod model;
pub mod store;
pub mod ui;
pub mod view;

pub use config::AppConfig;
pub use controller::todo_list::{TodoList, TodoListError};
pub use id_gen::{ClockIdGenerator, IdGenerator, SequenceIdGenerator};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::filter::Filter;
pub use model::todo::{Todo, TodoHandle, TodoId, TodoValidationError};
pub use store::memory_store::MemoryTodoStore;
pub use store::sqlite_store::SqliteTodoStore;
pub use store::{StoreError, StoreResult, TodoStore, TODOS_KEY};
pub use ui::{Document, Event, EventKind, NodeId, TemplateRegistry, UiError, UiTree};
pub use view::item_view::{ItemView, Presence, RemovalOutcome};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
