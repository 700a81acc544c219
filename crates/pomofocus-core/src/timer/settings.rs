use serde::{Deserialize, Serialize};

use super::session::SessionType;
use crate::error::ValidationError;

pub const WORK_MINUTES_RANGE: (u32, u32) = (1, 120);
pub const SHORT_BREAK_MINUTES_RANGE: (u32, u32) = (1, 30);
pub const LONG_BREAK_MINUTES_RANGE: (u32, u32) = (1, 60);

/// Durations (seconds) and auto-start policy, persisted as `timerSettings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub work_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_pomodoros: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            work_duration: 25 * 60,
            short_break_duration: 5 * 60,
            long_break_duration: 15 * 60,
            auto_start_breaks: false,
            auto_start_pomodoros: false,
        }
    }
}

impl TimerSettings {
    /// Build settings from user-entered minutes, rejecting out-of-range values.
    ///
    /// # Errors
    /// [`ValidationError::OutOfRange`] naming the first offending field.
    pub fn from_minutes(
        work: u32,
        short_break: u32,
        long_break: u32,
        auto_start_breaks: bool,
        auto_start_pomodoros: bool,
    ) -> Result<Self, ValidationError> {
        check_range("workDuration", work, WORK_MINUTES_RANGE)?;
        check_range("shortBreakDuration", short_break, SHORT_BREAK_MINUTES_RANGE)?;
        check_range("longBreakDuration", long_break, LONG_BREAK_MINUTES_RANGE)?;
        Ok(Self {
            work_duration: work * 60,
            short_break_duration: short_break * 60,
            long_break_duration: long_break * 60,
            auto_start_breaks,
            auto_start_pomodoros,
        })
    }

    /// Replace only the durations given (in minutes), validating just those.
    /// Durations left as `None` keep their stored seconds.
    ///
    /// # Errors
    /// [`ValidationError::OutOfRange`] naming the first offending field.
    pub fn with_minutes(
        mut self,
        work: Option<u32>,
        short_break: Option<u32>,
        long_break: Option<u32>,
    ) -> Result<Self, ValidationError> {
        if let Some(work) = work {
            check_range("workDuration", work, WORK_MINUTES_RANGE)?;
            self.work_duration = work * 60;
        }
        if let Some(short_break) = short_break {
            check_range("shortBreakDuration", short_break, SHORT_BREAK_MINUTES_RANGE)?;
            self.short_break_duration = short_break * 60;
        }
        if let Some(long_break) = long_break {
            check_range("longBreakDuration", long_break, LONG_BREAK_MINUTES_RANGE)?;
            self.long_break_duration = long_break * 60;
        }
        Ok(self)
    }

    /// Configured length of `session` in seconds.
    pub fn duration_of(&self, session: SessionType) -> u32 {
        match session {
            SessionType::Work => self.work_duration,
            SessionType::ShortBreak => self.short_break_duration,
            SessionType::LongBreak => self.long_break_duration,
        }
    }

    /// Whether finishing `completed` should immediately start the next session.
    pub fn auto_starts_after(&self, completed: SessionType) -> bool {
        if completed.is_break() {
            self.auto_start_pomodoros
        } else {
            self.auto_start_breaks
        }
    }
}

fn check_range(field: &str, value: u32, (min, max): (u32, u32)) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value: value.into(),
            min: min.into(),
            max: max.into(),
        })
    }
}
