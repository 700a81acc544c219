//! Achievement rules and the monotonic unlocked set.
//!
//! Rules are pure predicates over an [`AchievementStats`] snapshot. Once an
//! achievement is unlocked it stays unlocked, even if the stat it was
//! earned on later drops.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;
use crate::storage::{keys, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Achievement {
    FirstPomodoro,
    FocusNovice,
    FocusMaster,
    TaskMaster,
    ProductivityChampion,
    DailyStreak,
}

impl Achievement {
    /// Evaluation order.
    pub const ALL: [Achievement; 6] = [
        Achievement::FirstPomodoro,
        Achievement::FocusNovice,
        Achievement::FocusMaster,
        Achievement::TaskMaster,
        Achievement::ProductivityChampion,
        Achievement::DailyStreak,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Achievement::FirstPomodoro => "firstPomodoro",
            Achievement::FocusNovice => "focusNovice",
            Achievement::FocusMaster => "focusMaster",
            Achievement::TaskMaster => "taskMaster",
            Achievement::ProductivityChampion => "productivityChampion",
            Achievement::DailyStreak => "dailyStreak",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::FirstPomodoro => "First Pomodoro",
            Achievement::FocusNovice => "Focus Novice",
            Achievement::FocusMaster => "Focus Master",
            Achievement::TaskMaster => "Task Master",
            Achievement::ProductivityChampion => "Productivity Champion",
            Achievement::DailyStreak => "Daily Streak",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::FirstPomodoro => "Complete your first pomodoro",
            Achievement::FocusNovice => "Complete 10 pomodoros",
            Achievement::FocusMaster => "Complete 50 pomodoros",
            Achievement::TaskMaster => "Complete 20 tasks",
            Achievement::ProductivityChampion => "Reach a productivity score of 80%",
            Achievement::DailyStreak => "Use the timer 5 days in a row",
        }
    }

    pub fn is_met(&self, stats: &AchievementStats) -> bool {
        match self {
            Achievement::FirstPomodoro => stats.total_sessions >= 1,
            Achievement::FocusNovice => stats.total_sessions >= 10,
            Achievement::FocusMaster => stats.total_sessions >= 50,
            Achievement::TaskMaster => stats.completed_tasks >= 20,
            Achievement::ProductivityChampion => stats.productivity_score >= 80,
            Achievement::DailyStreak => stats.daily_streak >= 5,
        }
    }
}

/// Snapshot the rules are evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementStats {
    pub total_sessions: u64,
    pub completed_tasks: usize,
    pub productivity_score: u32,
    pub daily_streak: u32,
}

pub struct AchievementEvaluator {
    store: KeyValueStore,
    unlocked: Vec<Achievement>,
}

impl AchievementEvaluator {
    pub fn load(store: KeyValueStore) -> Self {
        // Unknown ids from other versions are skipped rather than failing the set.
        let raw: Vec<serde_json::Value> = store.get_json(keys::ACHIEVEMENTS).unwrap_or_default();
        let mut unlocked = Vec::new();
        for value in raw {
            match serde_json::from_value::<Achievement>(value.clone()) {
                Ok(a) if !unlocked.contains(&a) => unlocked.push(a),
                Ok(_) => {}
                Err(_) => warn!(%value, "ignoring unknown achievement id"),
            }
        }
        Self { store, unlocked }
    }

    pub fn unlocked(&self) -> &[Achievement] {
        &self.unlocked
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }

    /// Evaluate every locked rule in order and unlock those now met.
    ///
    /// Returns the newly unlocked achievements, each reported exactly once
    /// over the evaluator's lifetime. The unlocked set is kept in memory even
    /// if persisting it fails.
    pub fn check(&mut self, stats: &AchievementStats) -> Result<Vec<Achievement>> {
        let newly: Vec<Achievement> = Achievement::ALL
            .into_iter()
            .filter(|a| !self.unlocked.contains(a) && a.is_met(stats))
            .collect();
        if newly.is_empty() {
            return Ok(newly);
        }
        for a in &newly {
            info!(achievement = a.id(), "achievement unlocked");
        }
        self.unlocked.extend(newly.iter().copied());
        self.store.set_json(keys::ACHIEVEMENTS, &self.unlocked)?;
        Ok(newly)
    }
}
