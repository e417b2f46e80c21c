//! Headless UI tree used as the host rendering surface.
//!
//! # Responsibility
//! - Hold a mountable node hierarchy (tags, attributes, classes, form state).
//! - Dispatch bubbling, optionally cancelable events through that hierarchy.
//! - Build named layout templates.
//!
//! # Invariants
//! - A node has at most one parent; re-inserting a node moves it.
//! - Event dispatch never holds a tree borrow while a listener runs.

pub mod event;
pub mod selector;
pub mod template;
pub mod tree;

pub use event::{Document, Event, EventKind};
pub use template::{TemplateRegistry, TODOLIST_LAYOUT};
pub use tree::{NodeId, UiError, UiResult, UiTree};
