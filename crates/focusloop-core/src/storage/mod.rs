mod config;
pub mod database;
pub mod documents;
pub mod memory;

pub use config::{Config, KeysConfig, LoggingConfig, StorageConfig};
pub use database::SqliteStore;
pub use documents::{
    load_settings, load_stats, load_tasks, save_settings, save_stats, save_tasks, SETTINGS_KEY,
    STATS_KEY, TASKS_KEY, UNREADABLE_SUFFIX,
};
pub use memory::MemoryStore;

use std::path::PathBuf;

use crate::error::{ConfigError, StorageError};

/// Persistence port: an unordered, last-write-wins store of JSON documents.
///
/// Each `put` replaces the whole document for its key and is atomic per
/// key. Implementations must be shareable across threads.
pub trait Store: Send + Sync {
    /// Fetch the document stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError>;

    /// Replace the document stored under `key`.
    fn put(&self, key: &str, document: &serde_json::Value) -> Result<(), StorageError>;
}

/// Returns the focusloop data directory, creating it if needed.
///
/// Resolution order:
/// 1. `FOCUSLOOP_DATA_DIR`, used verbatim
/// 2. `~/.config/focusloop-dev/` when `FOCUSLOOP_ENV=dev`
/// 3. `~/.config/focusloop/`
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("FOCUSLOOP_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FOCUSLOOP_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("focusloop-dev")
            } else {
                base_dir.join("focusloop")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
