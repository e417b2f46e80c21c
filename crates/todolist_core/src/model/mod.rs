//! Domain model for the task list.
//!
//! # Responsibility
//! - Define the `Todo` record shared by the controller, views and stores.
//! - Define the view-level `Filter` selection.
//!
//! # Invariants
//! - A `Todo` title is never empty after trimming.
//! - A `Todo` id is assigned once and never reassigned.

pub mod filter;
pub mod todo;
