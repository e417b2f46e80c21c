//! Runtime configuration resolved from the environment.
//!
//! Blank or missing variables fall back to defaults under the system temp
//! directory.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "TODOLIST_DB_PATH";
pub const LOG_DIR_ENV: &str = "TODOLIST_LOG_DIR";
pub const LOG_LEVEL_ENV: &str = "TODOLIST_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "todolist.sqlite3";
const DEFAULT_LOG_DIR_NAME: &str = "todolist-logs";

/// Paths and levels used to bootstrap a host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: non_blank(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_dir: non_blank(LOG_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_DIR_NAME)),
            log_level: non_blank(LOG_LEVEL_ENV)
                .unwrap_or_else(|| default_log_level().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DB_PATH_ENV, LOG_LEVEL_ENV};
    use std::path::PathBuf;

    #[test]
    fn explicit_values_win() {
        let config = AppConfig::from_lookup(|key| match key {
            DB_PATH_ENV => Some("/data/todos.sqlite3".to_string()),
            LOG_LEVEL_ENV => Some(" warn ".to_string()),
            _ => None,
        });
        assert_eq!(config.db_path, PathBuf::from("/data/todos.sqlite3"));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn blank_values_fall_back_to_temp_dir() {
        let config = AppConfig::from_lookup(|_| Some("   ".to_string()));
        assert!(config.db_path.starts_with(std::env::temp_dir()));
        assert!(config.log_dir.starts_with(std::env::temp_dir()));
        assert!(!config.log_level.is_empty());
    }
}
