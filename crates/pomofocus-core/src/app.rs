//! Application wiring.
//!
//! [`PomodoroApp`] owns one instance of every component, all sharing a
//! single [`KeyValueStore`] and [`Clock`]. It carries the control flow
//! between them:
//!
//! - a completed session is logged to statistics, and a completed work
//!   session also persists the cycle counter and re-evaluates achievements;
//! - a task mutation refreshes the task totals, and completing a task
//!   re-evaluates achievements.
//!
//! Every state change is queued as an [`Event`]; front ends drain the queue
//! after each command.

use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::achievements::{Achievement, AchievementEvaluator, AchievementStats};
use crate::clock::Clock;
use crate::error::{CoreError, Result};
use crate::events::{Event, TaskChange};
use crate::export;
use crate::settings::{NotificationSettings, Preferences};
use crate::stats::{Chart, ChartView, StatisticsAggregator, Summary, UsageLog};
use crate::storage::{keys, KeyValueStore};
use crate::tasks::{Task, TaskEdit, TaskFilter, TaskRegistry};
use crate::timer::{TickSource, TimerEngine, TimerSettings};

/// Persisted fragment of the timer; the live countdown is not restored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub sessions_completed: u32,
}

pub struct PomodoroApp {
    store: KeyValueStore,
    clock: Rc<dyn Clock>,
    timer: TimerEngine,
    tasks: TaskRegistry,
    stats: StatisticsAggregator,
    achievements: AchievementEvaluator,
    usage: UsageLog,
    events: Vec<Event>,
}

impl PomodoroApp {
    /// Load every component from `store`, mark today as a usage day and
    /// evaluate achievements against the loaded stats.
    pub fn open(store: KeyValueStore, clock: Rc<dyn Clock>, ticks: impl TickSource + 'static) -> Self {
        let settings: TimerSettings = store.get_json(keys::TIMER_SETTINGS).unwrap_or_default();
        let state: SessionState = store.get_json(keys::SESSION_STATE).unwrap_or_default();

        let mut timer = TimerEngine::new(settings, ticks, clock.clone());
        timer.set_sessions_completed(state.sessions_completed);

        let tasks = TaskRegistry::load(store.clone(), clock.clone());
        let stats = StatisticsAggregator::load(store.clone(), clock.clone(), tasks.counts());
        let achievements = AchievementEvaluator::load(store.clone());
        let mut usage = UsageLog::load(store.clone(), clock.clone());
        if let Err(e) = usage.record_today() {
            warn!(error = %e, "failed to record usage date");
        }

        let mut app = Self {
            store,
            clock,
            timer,
            tasks,
            stats,
            achievements,
            usage,
            events: Vec::new(),
        };
        app.check_achievements();
        app
    }

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn set_tick_interval(&mut self, interval: Duration) {
        self.timer.set_tick_interval(interval);
    }

    pub fn start(&mut self) {
        self.events.extend(self.timer.start());
    }

    pub fn pause(&mut self) {
        self.events.extend(self.timer.pause());
    }

    pub fn reset(&mut self) {
        let event = self.timer.reset();
        self.events.push(event);
    }

    pub fn skip(&mut self) {
        let event = self.timer.skip();
        self.events.push(event);
    }

    /// Deliver one tick from the armed tick source.
    pub fn tick(&mut self) {
        let Some(done) = self.timer.tick() else {
            return;
        };
        self.events.push(done.event());

        if let Err(e) = self.stats.log_session(done.record.clone()) {
            warn!(error = %e, "session log not saved");
        }
        if done.record.is_work() {
            let state = SessionState {
                sessions_completed: done.sessions_completed,
            };
            if let Err(e) = self.store.set_json(keys::SESSION_STATE, &state) {
                warn!(error = %e, "session counter not saved");
            }
            self.check_achievements();
        }
    }

    /// Start a fresh cycle: zero the persisted counter and reset the timer.
    pub fn reset_cycle(&mut self) -> Result<()> {
        self.timer.set_sessions_completed(0);
        let event = self.timer.reset();
        self.events.push(event);
        self.store.set_json(keys::SESSION_STATE, &SessionState::default())?;
        Ok(())
    }

    /// Restore default timer and notification settings.
    pub fn reset_settings(&mut self) -> Result<()> {
        self.update_timer_settings(TimerSettings::default())?;
        self.set_notification_settings(NotificationSettings::default())
    }

    /// Validate-then-apply: persists the settings and hot-swaps them into
    /// the engine.
    pub fn update_timer_settings(&mut self, settings: TimerSettings) -> Result<()> {
        self.timer.update_settings(settings);
        self.store.set_json(keys::TIMER_SETTINGS, &settings)?;
        Ok(())
    }

    // ── Tasks ────────────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn filter_tasks(&self, filter: TaskFilter) -> Vec<&Task> {
        self.tasks.filter(filter)
    }

    pub fn add_task(&mut self, name: &str) -> Result<Task> {
        let result = self.tasks.add(name);
        let id = match &result {
            Ok(task) => Some(task.id.clone()),
            Err(CoreError::Storage(_)) => self.tasks.tasks().first().map(|t| t.id.clone()),
            Err(_) => None,
        };
        if let Some(id) = id {
            self.after_task_change(&id, TaskChange::Added);
        }
        result
    }

    pub fn delete_task(&mut self, id: &str) -> Result<bool> {
        let existed = self.tasks.get(id).is_some();
        let result = self.tasks.delete(id);
        if existed {
            self.after_task_change(id, TaskChange::Deleted);
        }
        result
    }

    /// Flip completion; completing (not reopening) re-evaluates achievements.
    pub fn toggle_task(&mut self, id: &str) -> Result<Option<bool>> {
        let result = self.tasks.toggle_completion(id);
        let Some(completed) = self.tasks.get(id).map(|t| t.completed) else {
            return result;
        };
        let change = if completed {
            TaskChange::Completed
        } else {
            TaskChange::Reopened
        };
        self.after_task_change(id, change);
        if completed {
            self.check_achievements();
        }
        result
    }

    pub fn increment_task_pomodoro(&mut self, id: &str) -> Result<bool> {
        let before = self.tasks.get(id).map(|t| t.completed_pomodoros);
        let result = self.tasks.increment_pomodoro(id);
        let after = self.tasks.get(id).map(|t| t.completed_pomodoros);
        if before != after {
            self.after_task_change(id, TaskChange::PomodoroCounted);
        }
        result
    }

    pub fn edit_task(&mut self, id: &str, edit: TaskEdit) -> Result<bool> {
        let before = self.tasks.get(id).cloned();
        let result = self.tasks.edit(id, edit);
        if before.is_some() && self.tasks.get(id) != before.as_ref() {
            self.after_task_change(id, TaskChange::Edited);
        }
        result
    }

    fn after_task_change(&mut self, id: &str, change: TaskChange) {
        self.stats.update_task_counts(self.tasks.counts());
        self.events.push(Event::TaskChanged {
            task_id: id.to_string(),
            change,
            at: self.clock.now_utc(),
        });
    }

    // ── Statistics & achievements ───────────────────────────────────

    pub fn summary(&self) -> Summary {
        self.stats.summary()
    }

    pub fn chart(&self, view: ChartView) -> Chart {
        self.stats.chart(view, self.tasks.tasks())
    }

    pub fn streak(&self) -> u32 {
        self.usage.streak()
    }

    pub fn achievement_stats(&self) -> AchievementStats {
        let summary = self.stats.summary();
        AchievementStats {
            total_sessions: summary.total_sessions,
            completed_tasks: summary.completed_tasks,
            productivity_score: summary.productivity_score,
            daily_streak: self.usage.streak(),
        }
    }

    pub fn unlocked_achievements(&self) -> &[Achievement] {
        self.achievements.unlocked()
    }

    /// Evaluate the rules against current stats, queueing one event per
    /// newly unlocked achievement.
    pub fn check_achievements(&mut self) -> Vec<Achievement> {
        let stats = self.achievement_stats();
        let before = self.achievements.unlocked().len();
        if let Err(e) = self.achievements.check(&stats) {
            warn!(error = %e, "unlocked achievements not saved");
        }
        let newly = self.achievements.unlocked()[before..].to_vec();
        let at = self.clock.now_utc();
        for achievement in &newly {
            self.events.push(Event::AchievementUnlocked {
                achievement: *achievement,
                title: achievement.title().to_string(),
                at,
            });
        }
        newly
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub fn notification_settings(&self) -> NotificationSettings {
        NotificationSettings::load(&self.store)
    }

    pub fn set_notification_settings(&self, settings: NotificationSettings) -> Result<()> {
        settings.save(&self.store)?;
        Ok(())
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::load(&self.store)
    }

    pub fn set_preferences(&self, prefs: &Preferences) -> Result<()> {
        prefs.save(&self.store)?;
        Ok(())
    }

    // ── Export / import ─────────────────────────────────────────────

    pub fn export_json(&self) -> Result<String> {
        export::export_json(&self.store)
    }

    pub fn sessions_csv(&self) -> Result<String> {
        export::sessions_csv(self.stats.sessions())
    }

    /// Replace all stored data and reload every component from it.
    ///
    /// The timer is reset to an idle session with the imported settings.
    pub fn import_json(&mut self, json: &str) -> Result<usize> {
        let result = export::import_json(&self.store, json);
        if !matches!(result, Err(CoreError::Import(_))) {
            self.reload();
        }
        let count = result?;
        info!(keys = count, "data imported");
        Ok(count)
    }

    fn reload(&mut self) {
        let settings: TimerSettings = self.store.get_json(keys::TIMER_SETTINGS).unwrap_or_default();
        let state: SessionState = self.store.get_json(keys::SESSION_STATE).unwrap_or_default();
        self.timer.update_settings(settings);
        self.timer.set_sessions_completed(state.sessions_completed);
        let event = self.timer.reset();
        self.events.push(event);

        self.tasks = TaskRegistry::load(self.store.clone(), self.clock.clone());
        self.stats = StatisticsAggregator::load(self.store.clone(), self.clock.clone(), self.tasks.counts());
        self.achievements = AchievementEvaluator::load(self.store.clone());
        self.usage = UsageLog::load(self.store.clone(), self.clock.clone());
        self.check_achievements();
    }
}
