mod backend;
mod config;
mod kv;
mod sqlite;

pub use backend::{MemoryBackend, StorageBackend};
pub use config::{Config, LoggingConfig, StorageConfig};
pub use kv::{KeyValueStore, DEFAULT_NAMESPACE};
pub use sqlite::SqliteBackend;

use std::path::PathBuf;

use crate::error::ConfigError;

/// Logical keys inside the store namespace.
pub mod keys {
    pub const TASKS: &str = "tasks";
    pub const SESSIONS: &str = "sessions";
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const USAGE_DATES: &str = "usageDates";
    pub const TIMER_SETTINGS: &str = "timerSettings";
    pub const NOTIFICATION_SETTINGS: &str = "notificationSettings";
    pub const SESSION_STATE: &str = "sessionState";
    pub const LANGUAGE: &str = "language";
    pub const DARK_MODE: &str = "darkMode";
    pub const RTL: &str = "rtl";
}

/// Returns the data directory, creating it if needed.
///
/// `POMOFOCUS_HOME` overrides the location outright. Otherwise
/// `~/.config/pomofocus[-dev]/`, with `-dev` when `POMOFOCUS_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var("POMOFOCUS_HOME") {
        Ok(home) if !home.trim().is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOFOCUS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomofocus-dev")
            } else {
                base_dir.join("pomofocus")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}

/// Open the store described by `config`.
///
/// A medium that cannot be opened yields an unavailable store rather than an
/// error, so the application still runs without persistence.
pub fn open_store(config: &Config) -> KeyValueStore {
    let namespace = config.storage.namespace.as_str();
    let path = match config.storage.path.clone() {
        Some(path) => path,
        None => match data_dir() {
            Ok(dir) => dir.join("pomofocus.db"),
            Err(e) => {
                tracing::warn!(error = %e, "cannot resolve data directory");
                return KeyValueStore::unavailable(namespace);
            }
        },
    };
    match SqliteBackend::open(&path, config.storage.quota_bytes) {
        Ok(backend) => KeyValueStore::new(backend, namespace),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot open storage");
            KeyValueStore::unavailable(namespace)
        }
    }
}
