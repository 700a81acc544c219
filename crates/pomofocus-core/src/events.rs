use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::achievements::Achievement;
use crate::timer::{SessionRecord, SessionType, TimerState};

/// Every state change in the system produces an Event.
/// Front ends render them; nothing in the core consumes them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        session_type: SessionType,
        remaining_secs: u32,
        /// True when continuing a paused countdown.
        resumed: bool,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        session_type: SessionType,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerSkipped {
        from: SessionType,
        to: SessionType,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        record: SessionRecord,
        next: SessionType,
        sessions_completed: u32,
        auto_started: bool,
    },
    StateSnapshot {
        state: TimerState,
        session_type: SessionType,
        remaining_secs: u32,
        total_secs: u32,
        /// 0.0 .. 1.0 within the current session.
        progress: f64,
        sessions_completed: u32,
        at: DateTime<Utc>,
    },
    TaskChanged {
        task_id: String,
        change: TaskChange,
        at: DateTime<Utc>,
    },
    /// Fired exactly once per achievement.
    AchievementUnlocked {
        achievement: Achievement,
        title: String,
        at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskChange {
    Added,
    Deleted,
    Completed,
    Reopened,
    PomodoroCounted,
    Edited,
}
