//! Product settings persisted in the key-value store.
//!
//! Timer durations live in [`crate::timer::TimerSettings`]; this module holds
//! notification switches and the scalar display preferences.

use serde::{Deserialize, Serialize};

use crate::error::{StorageError, ValidationError};
use crate::storage::{keys, KeyValueStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundType {
    #[default]
    Bell,
    Digital,
    Gentle,
}

impl std::str::FromStr for SoundType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bell" => Ok(SoundType::Bell),
            "digital" => Ok(SoundType::Digital),
            "gentle" => Ok(SoundType::Gentle),
            other => Err(ValidationError::InvalidValue {
                field: "soundType".into(),
                message: format!("expected bell, digital or gentle, got '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub sounds: bool,
    #[serde(default)]
    pub sound_type: SoundType,
}

fn default_true() -> bool {
    true
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            sounds: true,
            sound_type: SoundType::Bell,
        }
    }
}

impl NotificationSettings {
    pub fn load(store: &KeyValueStore) -> Self {
        store
            .get_json(keys::NOTIFICATION_SETTINGS)
            .unwrap_or_default()
    }

    pub fn save(&self, store: &KeyValueStore) -> Result<(), StorageError> {
        store.set_json(keys::NOTIFICATION_SETTINGS, self)
    }
}

/// Display preferences, each stored as its own scalar string key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub language: String,
    pub dark_mode: bool,
    pub rtl: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: "en".into(),
            dark_mode: false,
            rtl: false,
        }
    }
}

impl Preferences {
    pub fn load(store: &KeyValueStore) -> Self {
        let defaults = Self::default();
        Self {
            language: store
                .get_json::<String>(keys::LANGUAGE)
                .filter(|l| !l.trim().is_empty())
                .unwrap_or(defaults.language),
            dark_mode: load_flag(store, keys::DARK_MODE).unwrap_or(defaults.dark_mode),
            rtl: load_flag(store, keys::RTL).unwrap_or(defaults.rtl),
        }
    }

    pub fn save(&self, store: &KeyValueStore) -> Result<(), StorageError> {
        store.set_json(keys::LANGUAGE, &self.language)?;
        store.set_json(keys::DARK_MODE, &self.dark_mode.to_string())?;
        store.set_json(keys::RTL, &self.rtl.to_string())
    }
}

fn load_flag(store: &KeyValueStore, key: &str) -> Option<bool> {
    store.get_json::<String>(key)?.parse().ok()
}
