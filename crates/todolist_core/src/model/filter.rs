//! Visibility filter applied to the rendered list.

use std::fmt::{Display, Formatter};

/// Which todos the rendered list shows. Never alters the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    ActiveOnly,
    CompletedOnly,
}

impl Filter {
    /// Parses a filter button `data-filter` value.
    ///
    /// Unknown values fall back to `All`.
    pub fn from_data_attr(value: &str) -> Self {
        match value.trim() {
            "todo" => Self::ActiveOnly,
            "done" => Self::CompletedOnly,
            _ => Self::All,
        }
    }

    /// `data-filter` value carried by the matching filter button.
    pub fn data_attr(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::ActiveOnly => "todo",
            Self::CompletedOnly => "done",
        }
    }

    pub fn hides_completed(self) -> bool {
        matches!(self, Self::ActiveOnly)
    }

    pub fn hides_active(self) -> bool {
        matches!(self, Self::CompletedOnly)
    }

    /// Returns whether a todo with the given completion state is shown.
    pub fn shows(self, completed: bool) -> bool {
        match self {
            Self::All => true,
            Self::ActiveOnly => !completed,
            Self::CompletedOnly => completed,
        }
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::All => "all",
            Self::ActiveOnly => "active",
            Self::CompletedOnly => "completed",
        };
        f.write_str(label)
    }
}
