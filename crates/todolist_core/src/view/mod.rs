//! Per-item views rendered into the list container.

pub mod item_view;
