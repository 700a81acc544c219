//! Timer engine implementation.
//!
//! A one-tick-per-second countdown state machine. The engine owns no thread:
//! it arms a [`TickSource`] and the host calls [`TimerEngine::tick`] whenever
//! that source fires.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused | Completed)
//! Paused -> Running
//! Completed -> Idle (next session preloaded, optionally auto-started)
//! ```
//!
//! Every fourth completed work session is followed by a long break.

use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::session::{SessionRecord, SessionType};
use super::settings::TimerSettings;
use super::ticker::TickSource;
use crate::clock::Clock;
use crate::events::Event;

/// Work sessions per long break.
pub const LONG_BREAK_INTERVAL: u32 = 4;

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    Completed,
}

/// Outcome of the tick that brought a session to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub record: SessionRecord,
    pub next: SessionType,
    /// Cumulative work sessions after this completion.
    pub sessions_completed: u32,
    pub auto_started: bool,
}

impl Completion {
    pub fn event(&self) -> Event {
        Event::SessionCompleted {
            record: self.record.clone(),
            next: self.next,
            sessions_completed: self.sessions_completed,
            auto_started: self.auto_started,
        }
    }
}

/// Core timer engine.
pub struct TimerEngine {
    settings: TimerSettings,
    state: TimerState,
    session_type: SessionType,
    remaining_secs: u32,
    /// Cumulative completed work sessions; drives long-break cadence.
    sessions_completed: u32,
    ticks: Box<dyn TickSource>,
    tick_interval: Duration,
    clock: Rc<dyn Clock>,
}

impl std::fmt::Debug for TimerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerEngine")
            .field("state", &self.state)
            .field("session_type", &self.session_type)
            .field("remaining_secs", &self.remaining_secs)
            .field("sessions_completed", &self.sessions_completed)
            .finish_non_exhaustive()
    }
}

impl TimerEngine {
    /// Create an idle engine with a work session loaded.
    pub fn new(
        settings: TimerSettings,
        ticks: impl TickSource + 'static,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            state: TimerState::Idle,
            session_type: SessionType::Work,
            remaining_secs: settings.work_duration,
            sessions_completed: 0,
            ticks: Box::new(ticks),
            tick_interval: DEFAULT_TICK_INTERVAL,
            clock,
        }
    }

    /// Override the real-time length of one tick. Each tick still counts
    /// down one second of session time.
    pub fn set_tick_interval(&mut self, interval: Duration) {
        self.tick_interval = interval;
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn total_secs(&self) -> u32 {
        self.settings.duration_of(self.session_type)
    }

    /// 0.0 .. 1.0 progress within current session.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        (1.0 - f64::from(self.remaining_secs) / f64::from(total)).clamp(0.0, 1.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            session_type: self.session_type,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            progress: self.progress(),
            sessions_completed: self.sessions_completed,
            at: self.clock.now_utc(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        let resumed = match self.state {
            TimerState::Running => return None,
            TimerState::Paused => true,
            TimerState::Idle | TimerState::Completed => {
                self.remaining_secs = self.total_secs();
                false
            }
        };
        self.state = TimerState::Running;
        self.ticks.arm(self.tick_interval);
        debug!(session = %self.session_type, remaining = self.remaining_secs, resumed, "timer started");
        Some(Event::TimerStarted {
            session_type: self.session_type,
            remaining_secs: self.remaining_secs,
            resumed,
            at: self.clock.now_utc(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.ticks.disarm();
        self.state = TimerState::Paused;
        debug!(remaining = self.remaining_secs, "timer paused");
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: self.clock.now_utc(),
        })
    }

    pub fn reset(&mut self) -> Event {
        self.ticks.disarm();
        self.state = TimerState::Idle;
        self.remaining_secs = self.total_secs();
        debug!(session = %self.session_type, "timer reset");
        Event::TimerReset {
            session_type: self.session_type,
            remaining_secs: self.remaining_secs,
            at: self.clock.now_utc(),
        }
    }

    /// Abandon the current session without recording or counting it.
    pub fn skip(&mut self) -> Event {
        let from = self.session_type;
        self.ticks.disarm();
        self.session_type = if from.is_break() {
            SessionType::Work
        } else {
            SessionType::ShortBreak
        };
        self.state = TimerState::Idle;
        self.remaining_secs = self.total_secs();
        debug!(%from, to = %self.session_type, "session skipped");
        Event::TimerSkipped {
            from,
            to: self.session_type,
            at: self.clock.now_utc(),
        }
    }

    /// Advance one second. Returns the completion when the session reaches zero.
    ///
    /// Ticks delivered while not running are ignored.
    pub fn tick(&mut self) -> Option<Completion> {
        if self.state != TimerState::Running || !self.ticks.is_armed() {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        self.ticks.disarm();
        self.state = TimerState::Completed;
        Some(self.complete())
    }

    /// Replace durations and auto-start policy. A running or paused
    /// countdown keeps its remaining time; an idle one picks up the new
    /// duration.
    pub fn update_settings(&mut self, settings: TimerSettings) {
        self.settings = settings;
        if self.state == TimerState::Idle {
            self.remaining_secs = self.total_secs();
        }
    }

    /// Restore the persisted cumulative work-session counter.
    pub fn set_sessions_completed(&mut self, count: u32) {
        self.sessions_completed = count;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self) -> Completion {
        let finished = self.session_type;
        let duration = self.settings.duration_of(finished);
        let record = SessionRecord::new(finished, duration, self.clock.now_utc());

        let next = if finished.is_break() {
            SessionType::Work
        } else {
            self.sessions_completed += 1;
            if self.sessions_completed % LONG_BREAK_INTERVAL == 0 {
                SessionType::LongBreak
            } else {
                SessionType::ShortBreak
            }
        };
        info!(session = %finished, %next, count = self.sessions_completed, "session completed");

        self.session_type = next;
        self.state = TimerState::Idle;
        self.remaining_secs = self.total_secs();

        let auto_started = self.settings.auto_starts_after(finished) && self.start().is_some();

        Completion {
            record,
            next,
            sessions_completed: self.sessions_completed,
            auto_started,
        }
    }
}
