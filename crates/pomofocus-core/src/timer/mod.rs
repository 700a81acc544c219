mod engine;
mod session;
mod settings;
mod ticker;

pub use engine::{Completion, TimerEngine, TimerState, LONG_BREAK_INTERVAL};
pub use session::{SessionRecord, SessionType};
pub use settings::{
    TimerSettings, LONG_BREAK_MINUTES_RANGE, SHORT_BREAK_MINUTES_RANGE, WORK_MINUTES_RANGE,
};
pub use ticker::{IntervalTicks, ManualTicks, TickSource};
