//! Statistics module for Pomofocus
//!
//! Owns the session history and derives totals, the productivity score,
//! hourly/weekday charts, and the daily-usage streak from it.

mod aggregator;
mod charts;
mod streak;

pub use aggregator::{productivity_score, StatisticsAggregator, Summary};
pub use charts::{
    build_chart, hourly_focus_minutes, task_distribution, week_start, weekday_focus_minutes,
    Chart, ChartView, TaskDistribution,
};
pub use streak::{daily_streak, UsageLog, MAX_STREAK_DAYS};
