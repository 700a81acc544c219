use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of interval the timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Work => "work",
            SessionType::ShortBreak => "shortBreak",
            SessionType::LongBreak => "longBreak",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, SessionType::Work)
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completed session in the append-only history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "type")]
    pub session_type: SessionType,
    /// Configured length of the session in seconds.
    pub duration: u32,
    pub timestamp: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(session_type: SessionType, duration: u32, timestamp: DateTime<Utc>) -> Self {
        Self {
            session_type,
            duration,
            timestamp,
        }
    }

    pub fn is_work(&self) -> bool {
        self.session_type == SessionType::Work
    }
}
