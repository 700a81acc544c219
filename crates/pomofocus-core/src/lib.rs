//! # Pomofocus Core Library
//!
//! Core logic for the Pomofocus productivity timer: a Pomodoro countdown with
//! work/break cycling, a task list, focus statistics, achievements and
//! whole-store export/import. The `pomofocus` CLI is a thin front end over
//! this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: state machine driven by an injected [`TickSource`];
//!   the host calls `tick()` once per armed interval
//! - **Storage**: namespaced key-value store over SQLite (or memory), with
//!   quota-driven retention of the session log
//! - **Components**: tasks, statistics, usage streak and achievements all
//!   read and write their own keys in the shared store
//! - **App**: [`PomodoroApp`] wires the components together and queues
//!   [`Event`]s for the front end
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: countdown state machine
//! - [`KeyValueStore`]: persistence handle shared by every component
//! - [`Config`]: TOML configuration for the storage location and logging

pub mod achievements;
pub mod app;
pub mod clock;
pub mod error;
pub mod events;
pub mod export;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod tasks;
pub mod timer;

pub use achievements::{Achievement, AchievementEvaluator, AchievementStats};
pub use app::{PomodoroApp, SessionState};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, Result, StorageError, ValidationError};
pub use events::{Event, TaskChange};
pub use settings::{NotificationSettings, Preferences, SoundType};
pub use stats::{Chart, ChartView, StatisticsAggregator, Summary, UsageLog};
pub use storage::{Config, KeyValueStore, MemoryBackend, SqliteBackend, StorageBackend};
pub use tasks::{Priority, Task, TaskEdit, TaskFilter, TaskRegistry};
pub use timer::{
    IntervalTicks, ManualTicks, SessionRecord, SessionType, TickSource, TimerEngine, TimerSettings,
    TimerState,
};
