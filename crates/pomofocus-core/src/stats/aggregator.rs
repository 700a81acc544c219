use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::charts::{build_chart, Chart, ChartView};
use crate::clock::Clock;
use crate::error::Result;
use crate::storage::{keys, KeyValueStore};
use crate::tasks::{Task, TaskCounts};
use crate::timer::{SessionRecord, SessionType};

/// Percentage of tasks completed, rounded; zero when there are no tasks.
pub fn productivity_score(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * completed as f64 / total as f64).round() as u32
}

/// Derived totals shown on the statistics screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Completed work sessions (pomodoros).
    pub total_sessions: u64,
    pub total_focus_secs: u64,
    pub total_break_secs: u64,
    pub today_sessions: u64,
    pub today_focus_secs: u64,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub active_tasks: usize,
    pub productivity_score: u32,
}

impl Summary {
    pub fn total_focus_minutes(&self) -> u64 {
        self.total_focus_secs / 60
    }
}

/// Owner of the append-only session log.
pub struct StatisticsAggregator {
    store: KeyValueStore,
    clock: Rc<dyn Clock>,
    sessions: Vec<SessionRecord>,
    tasks: TaskCounts,
}

impl StatisticsAggregator {
    /// Load the persisted log; a missing or malformed log starts empty.
    pub fn load(store: KeyValueStore, clock: Rc<dyn Clock>, tasks: TaskCounts) -> Self {
        let sessions = store.get_json(keys::SESSIONS).unwrap_or_default();
        Self {
            store,
            clock,
            sessions,
            tasks,
        }
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    /// Append a completed session and persist the log.
    ///
    /// The record stays in memory even if the write is refused.
    pub fn log_session(&mut self, record: SessionRecord) -> Result<()> {
        debug!(session = %record.session_type, duration = record.duration, "session logged");
        self.sessions.push(record);
        self.store.set_json(keys::SESSIONS, &self.sessions)?;
        Ok(())
    }

    /// Refresh the task totals after the task list changed.
    pub fn update_task_counts(&mut self, counts: TaskCounts) {
        self.tasks = counts;
    }

    pub fn summary(&self) -> Summary {
        let today = self.clock.today();
        let mut summary = Summary {
            total_tasks: self.tasks.total,
            completed_tasks: self.tasks.completed,
            active_tasks: self.tasks.active,
            productivity_score: productivity_score(self.tasks.completed, self.tasks.total),
            ..Summary::default()
        };
        for session in &self.sessions {
            let secs = u64::from(session.duration);
            match session.session_type {
                SessionType::Work => {
                    summary.total_sessions += 1;
                    summary.total_focus_secs += secs;
                    if session.timestamp.with_timezone(&chrono::Local).date_naive() == today {
                        summary.today_sessions += 1;
                        summary.today_focus_secs += secs;
                    }
                }
                SessionType::ShortBreak | SessionType::LongBreak => {
                    summary.total_break_secs += secs;
                }
            }
        }
        summary
    }

    pub fn chart(&self, view: ChartView, tasks: &[Task]) -> Chart {
        build_chart(view, &self.sessions, tasks, self.clock.today())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::{MemoryBackend, DEFAULT_NAMESPACE};
    use chrono::{Duration, Local, TimeZone, Utc};

    fn setup() -> (StatisticsAggregator, KeyValueStore, FixedClock) {
        let store = KeyValueStore::new(MemoryBackend::new(), DEFAULT_NAMESPACE);
        let clock = FixedClock::new(Local.with_ymd_and_hms(2024, 5, 8, 16, 0, 0).unwrap());
        let agg = StatisticsAggregator::load(store.clone(), Rc::new(clock.clone()), TaskCounts::default());
        (agg, store, clock)
    }

    #[test]
    fn score_rounds_and_handles_zero() {
        assert_eq!(productivity_score(0, 0), 0);
        assert_eq!(productivity_score(1, 3), 33);
        assert_eq!(productivity_score(2, 3), 67);
        assert_eq!(productivity_score(4, 5), 80);
        assert_eq!(productivity_score(5, 5), 100);
    }

    #[test]
    fn summary_sums_only_work_as_focus() {
        let (mut agg, store, clock) = setup();
        let now = clock.now_utc();
        agg.log_session(SessionRecord::new(SessionType::Work, 1500, now)).unwrap();
        agg.log_session(SessionRecord::new(SessionType::ShortBreak, 300, now)).unwrap();
        agg.log_session(SessionRecord::new(SessionType::Work, 1500, now - Duration::days(2)))
            .unwrap();
        agg.update_task_counts(TaskCounts {
            total: 4,
            completed: 1,
            active: 3,
        });

        let s = agg.summary();
        assert_eq!(s.total_sessions, 2);
        assert_eq!(s.total_focus_secs, 3000);
        assert_eq!(s.total_focus_minutes(), 50);
        assert_eq!(s.total_break_secs, 300);
        assert_eq!(s.today_sessions, 1);
        assert_eq!(s.today_focus_secs, 1500);
        assert_eq!(s.productivity_score, 25);

        let stored: Vec<SessionRecord> = store.get_json(keys::SESSIONS).unwrap();
        assert_eq!(stored.len(), 3);
    }

    #[test]
    fn unparseable_log_loads_empty() {
        let store = KeyValueStore::new(MemoryBackend::new(), DEFAULT_NAMESPACE);
        store.set(keys::SESSIONS, "not json").unwrap();
        let agg = StatisticsAggregator::load(
            store,
            Rc::new(FixedClock::new(Local::now())),
            TaskCounts::default(),
        );
        assert!(agg.sessions().is_empty());
    }

    #[test]
    fn write_failure_keeps_record_in_memory() {
        let store = KeyValueStore::unavailable(DEFAULT_NAMESPACE);
        let mut agg = StatisticsAggregator::load(
            store,
            Rc::new(FixedClock::new(Local::now())),
            TaskCounts::default(),
        );
        assert!(agg
            .log_session(SessionRecord::new(SessionType::Work, 60, Utc::now()))
            .is_err());
        assert_eq!(agg.sessions().len(), 1);
    }

    #[test]
    fn daily_chart_uses_clock_today() {
        let (mut agg, _, clock) = setup();
        agg.log_session(SessionRecord::new(SessionType::Work, 1500, clock.now_utc()))
            .unwrap();
        let chart = agg.chart(ChartView::Daily, &[]);
        assert_eq!(chart.focus_minutes[16], 25.0);
    }
}
