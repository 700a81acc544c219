//! Namespaced key-value store.
//!
//! All application data lives under a fixed prefix so the medium can be
//! shared with unrelated data. Values are JSON strings. Writes that hit the
//! capacity limit run the session retention policy once and retry once.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::backend::StorageBackend;
use super::keys;
use crate::error::StorageError;
use crate::timer::SessionRecord;

pub const DEFAULT_NAMESPACE: &str = "pomofocus_";

/// Retention only kicks in once the namespace holds more keys than this.
const RETENTION_KEY_THRESHOLD: usize = 20;
/// Sessions kept after a retention pass.
const RETENTION_MAX_SESSIONS: usize = 50;

/// Cheap-to-clone handle; clones share the same medium.
#[derive(Clone)]
pub struct KeyValueStore {
    backend: Option<Rc<dyn StorageBackend>>,
    namespace: Rc<str>,
}

impl std::fmt::Debug for KeyValueStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyValueStore")
            .field("available", &self.is_available())
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl KeyValueStore {
    pub fn new(backend: impl StorageBackend + 'static, namespace: &str) -> Self {
        Self {
            backend: Some(Rc::new(backend)),
            namespace: namespace.into(),
        }
    }

    /// A store whose medium is missing or disabled. Reads are absent and
    /// writes fail with [`StorageError::Unavailable`].
    pub fn unavailable(namespace: &str) -> Self {
        warn!("local storage is unavailable; data will not be saved");
        Self {
            backend: None,
            namespace: namespace.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn qualify(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// Raw JSON string stored under `key`, or `None` when absent or unreadable.
    pub fn get(&self, key: &str) -> Option<String> {
        let backend = self.backend.as_ref()?;
        match backend.get(&self.qualify(key)) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "storage read failed");
                None
            }
        }
    }

    /// Decoded value under `key`. Malformed JSON is logged and treated as absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "ignoring malformed stored value");
                None
            }
        }
    }

    /// Store a raw JSON string.
    ///
    /// # Errors
    /// [`StorageError::Unavailable`] without a medium; [`StorageError::QuotaExceeded`]
    /// when the write still does not fit after one retention pass.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let backend = self.backend.as_ref().ok_or(StorageError::Unavailable)?;
        let qualified = self.qualify(key);
        match backend.set(&qualified, value) {
            Err(StorageError::QuotaExceeded { .. }) => {
                warn!(key, "storage quota exceeded, applying retention policy");
                self.apply_retention(&**backend);
                backend.set(&qualified, value).map_err(|e| {
                    warn!(key, error = %e, "write dropped after retention retry");
                    e
                })
            }
            other => other,
        }
    }

    /// Serialize `value` and store it under `key`.
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|e| StorageError::Serialization {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.set(key, &raw)
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let backend = self.backend.as_ref().ok_or(StorageError::Unavailable)?;
        backend.remove(&self.qualify(key))
    }

    /// Keys inside the namespace, prefix stripped.
    pub fn keys(&self) -> Vec<String> {
        let Some(backend) = self.backend.as_ref() else {
            return Vec::new();
        };
        match backend.keys() {
            Ok(all) => all
                .into_iter()
                .filter_map(|k| k.strip_prefix(&*self.namespace).map(str::to_string))
                .collect(),
            Err(e) => {
                warn!(error = %e, "failed to list storage keys");
                Vec::new()
            }
        }
    }

    /// Remove every namespaced key, leaving foreign keys untouched.
    pub fn clear(&self) -> Result<(), StorageError> {
        for key in self.keys() {
            self.remove(&key)?;
        }
        Ok(())
    }

    /// Every namespaced key with its raw value, prefix stripped.
    pub fn export_all(&self) -> BTreeMap<String, String> {
        self.keys()
            .into_iter()
            .filter_map(|k| self.get(&k).map(|v| (k, v)))
            .collect()
    }

    /// Clear the namespace, then write `data` verbatim.
    ///
    /// Not atomic: a failure part way leaves the prior data gone and only
    /// the keys written so far present.
    pub fn import_all(&self, data: &BTreeMap<String, String>) -> Result<(), StorageError> {
        self.clear()?;
        for (key, value) in data {
            self.set(key, value)?;
        }
        debug!(keys = data.len(), "import complete");
        Ok(())
    }

    /// Trim the session log to the most recent entries when the namespace is
    /// crowded. An unparseable log is dropped outright.
    fn apply_retention(&self, backend: &dyn StorageBackend) {
        let key_count = self.keys().len();
        if key_count <= RETENTION_KEY_THRESHOLD {
            debug!(key_count, "retention skipped, namespace not crowded");
            return;
        }
        let qualified = self.qualify(keys::SESSIONS);
        let Ok(Some(raw)) = backend.get(&qualified) else {
            return;
        };
        match serde_json::from_str::<Vec<SessionRecord>>(&raw) {
            Ok(mut sessions) => {
                if sessions.len() <= RETENTION_MAX_SESSIONS {
                    return;
                }
                sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                sessions.truncate(RETENTION_MAX_SESSIONS);
                match serde_json::to_string(&sessions) {
                    Ok(trimmed) => {
                        if let Err(e) = backend.set(&qualified, &trimmed) {
                            warn!(error = %e, "failed to write trimmed session log");
                        } else {
                            warn!(kept = RETENTION_MAX_SESSIONS, "session log truncated");
                        }
                    }
                    Err(e) => warn!(error = %e, "failed to encode trimmed session log"),
                }
            }
            Err(e) => {
                warn!(error = %e, "dropping unparseable session log");
                let _ = backend.remove(&qualified);
            }
        }
    }
}
