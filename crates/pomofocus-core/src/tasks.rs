//! Task list with per-task pomodoro counters.
//!
//! The list is kept most-recent-first, which is both the persisted and the
//! displayed order. Every mutation rewrites the whole list under `tasks`.

use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{Result, ValidationError};
use crate::storage::{keys, KeyValueStore};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl std::str::FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(ValidationError::InvalidValue {
                field: "priority".into(),
                message: format!("expected low, medium or high, got '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "default_estimate")]
    pub estimated_pomodoros: u32,
    /// Never exceeds `estimated_pomodoros`.
    #[serde(default)]
    pub completed_pomodoros: u32,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

fn default_estimate() -> u32 {
    1
}

impl Task {
    fn new(name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            completed: false,
            estimated_pomodoros: default_estimate(),
            completed_pomodoros: 0,
            priority: Priority::default(),
            notes: String::new(),
            created_at,
            completed_at: None,
        }
    }
}

/// Fields replaced wholesale by [`TaskRegistry::edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEdit {
    pub name: String,
    pub estimated_pomodoros: u32,
    pub priority: Priority,
    pub notes: String,
}

impl TaskEdit {
    /// Current values of `task`, ready to be modified.
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            estimated_pomodoros: task.estimated_pomodoros,
            priority: task.priority,
            notes: task.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => !task.completed,
            TaskFilter::Completed => task.completed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
}

pub struct TaskRegistry {
    store: KeyValueStore,
    clock: Rc<dyn Clock>,
    tasks: Vec<Task>,
}

impl TaskRegistry {
    /// Load the persisted list; a missing or malformed list starts empty.
    ///
    /// Counters are re-clamped on load, so imported or hand-edited data
    /// cannot break `completed_pomodoros <= estimated_pomodoros`.
    pub fn load(store: KeyValueStore, clock: Rc<dyn Clock>) -> Self {
        let mut tasks: Vec<Task> = store.get_json(keys::TASKS).unwrap_or_default();
        for task in &mut tasks {
            task.estimated_pomodoros = task.estimated_pomodoros.max(1);
            task.completed_pomodoros = task.completed_pomodoros.min(task.estimated_pomodoros);
        }
        Self {
            store,
            clock,
            tasks,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Projection in storage order; never reorders the list.
    pub fn filter(&self, filter: TaskFilter) -> Vec<&Task> {
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    pub fn counts(&self) -> TaskCounts {
        let completed = self.tasks.iter().filter(|t| t.completed).count();
        TaskCounts {
            total: self.tasks.len(),
            completed,
            active: self.tasks.len() - completed,
        }
    }

    /// Create a task with defaults and put it first.
    ///
    /// # Errors
    /// [`ValidationError::EmptyName`] for a blank name, or the storage error
    /// if the list could not be saved (the task is kept in memory).
    pub fn add(&mut self, name: &str) -> Result<Task> {
        let name = validate_name(name)?;
        let task = Task::new(name, self.clock.now_utc());
        debug!(id = %task.id, "task added");
        self.tasks.insert(0, task.clone());
        self.persist()?;
        Ok(task)
    }

    /// Remove the task. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Ok(false);
        }
        debug!(id, "task deleted");
        self.persist()?;
        Ok(true)
    }

    /// Flip completion. Returns the new `completed` value, `None` if absent.
    pub fn toggle_completion(&mut self, id: &str) -> Result<Option<bool>> {
        let now = self.clock.now_utc();
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        task.completed = !task.completed;
        task.completed_at = task.completed.then_some(now);
        let completed = task.completed;
        debug!(id, completed, "task toggled");
        self.persist()?;
        Ok(Some(completed))
    }

    /// Count one pomodoro against the task, capped at its estimate.
    /// Returns whether the counter moved.
    pub fn increment_pomodoro(&mut self, id: &str) -> Result<bool> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        if task.completed_pomodoros >= task.estimated_pomodoros {
            return Ok(false);
        }
        task.completed_pomodoros += 1;
        self.persist()?;
        Ok(true)
    }

    /// Overwrite the editable fields. Returns whether the task exists.
    ///
    /// # Errors
    /// Rejects a blank name or an estimate below one before touching the task.
    pub fn edit(&mut self, id: &str, edit: TaskEdit) -> Result<bool> {
        let name = validate_name(&edit.name)?;
        if edit.estimated_pomodoros < 1 {
            return Err(ValidationError::OutOfRange {
                field: "estimatedPomodoros".into(),
                value: edit.estimated_pomodoros.into(),
                min: 1,
                max: i64::from(u32::MAX),
            }
            .into());
        }
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(false);
        };
        task.name = name;
        task.estimated_pomodoros = edit.estimated_pomodoros;
        task.priority = edit.priority;
        task.notes = edit.notes;
        task.completed_pomodoros = task.completed_pomodoros.min(task.estimated_pomodoros);
        self.persist()?;
        Ok(true)
    }

    fn persist(&self) -> Result<()> {
        self.store.set_json(keys::TASKS, &self.tasks)?;
        Ok(())
    }
}

fn validate_name(name: &str) -> std::result::Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::CoreError;
    use crate::storage::{MemoryBackend, DEFAULT_NAMESPACE};
    use chrono::{Local, TimeZone};
    use proptest::prelude::*;

    fn registry() -> (TaskRegistry, KeyValueStore) {
        let store = KeyValueStore::new(MemoryBackend::new(), DEFAULT_NAMESPACE);
        let clock = FixedClock::new(Local.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).unwrap());
        (TaskRegistry::load(store.clone(), Rc::new(clock)), store)
    }

    #[test]
    fn load_reclamps_out_of_range_counters() {
        let (mut reg, store) = registry();
        reg.add("over").unwrap();
        reg.add("zero").unwrap();
        let mut raw: serde_json::Value = store.get_json(keys::TASKS).unwrap();
        raw[0]["estimatedPomodoros"] = 0.into();
        raw[0]["completedPomodoros"] = 2.into();
        raw[1]["estimatedPomodoros"] = 3.into();
        raw[1]["completedPomodoros"] = 7.into();
        store.set_json(keys::TASKS, &raw).unwrap();

        let clock = FixedClock::new(Local.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap());
        let reloaded = TaskRegistry::load(store, Rc::new(clock));
        let zero = &reloaded.tasks()[0];
        assert_eq!((zero.estimated_pomodoros, zero.completed_pomodoros), (1, 1));
        let over = &reloaded.tasks()[1];
        assert_eq!((over.estimated_pomodoros, over.completed_pomodoros), (3, 3));
    }

    #[test]
    fn add_uses_defaults_and_prepends() {
        let (mut reg, store) = registry();
        let first = reg.add("Write report").unwrap();
        let second = reg.add("  Review PR  ").unwrap();
        assert_eq!(second.name, "Review PR");
        assert_eq!(first.estimated_pomodoros, 1);
        assert_eq!(first.priority, Priority::Medium);
        assert!(!first.completed);
        assert_eq!(reg.tasks()[0].id, second.id);

        let stored: Vec<Task> = store.get_json(keys::TASKS).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].id, second.id);
    }

    #[test]
    fn add_rejects_blank_name() {
        let (mut reg, store) = registry();
        let err = reg.add("   ").unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::EmptyName)));
        assert!(reg.tasks().is_empty());
        assert!(store.get(keys::TASKS).is_none());
    }

    #[test]
    fn delete_missing_is_noop() {
        let (mut reg, _) = registry();
        reg.add("a").unwrap();
        assert!(!reg.delete("missing").unwrap());
        assert_eq!(reg.tasks().len(), 1);
    }

    #[test]
    fn toggle_sets_and_clears_completed_at() {
        let (mut reg, _) = registry();
        let id = reg.add("a").unwrap().id;
        assert_eq!(reg.toggle_completion(&id).unwrap(), Some(true));
        assert!(reg.get(&id).unwrap().completed_at.is_some());
        assert_eq!(reg.toggle_completion(&id).unwrap(), Some(false));
        assert!(reg.get(&id).unwrap().completed_at.is_none());
        assert_eq!(reg.toggle_completion("nope").unwrap(), None);
    }

    #[test]
    fn filter_keeps_storage_order() {
        let (mut reg, _) = registry();
        let a = reg.add("a").unwrap().id;
        let b = reg.add("b").unwrap().id;
        let c = reg.add("c").unwrap().id;
        reg.toggle_completion(&b).unwrap();

        let active: Vec<_> = reg.filter(TaskFilter::Active).iter().map(|t| t.id.clone()).collect();
        assert_eq!(active, vec![c.clone(), a.clone()]);
        let done: Vec<_> = reg.filter(TaskFilter::Completed).iter().map(|t| t.id.clone()).collect();
        assert_eq!(done, vec![b]);
        assert_eq!(reg.filter(TaskFilter::All).len(), 3);
        assert_eq!(
            reg.counts(),
            TaskCounts {
                total: 3,
                completed: 1,
                active: 2
            }
        );
    }

    #[test]
    fn edit_validates_before_mutating() {
        let (mut reg, _) = registry();
        let task = reg.add("a").unwrap();
        let mut edit = TaskEdit::from_task(&task);
        edit.estimated_pomodoros = 0;
        assert!(reg.edit(&task.id, edit).is_err());
        assert_eq!(reg.get(&task.id).unwrap(), &task);
    }

    #[test]
    fn reload_restores_list() {
        let (mut reg, store) = registry();
        reg.add("persisted").unwrap();
        let clock = FixedClock::new(Local::now());
        let reloaded = TaskRegistry::load(store, Rc::new(clock));
        assert_eq!(reloaded.tasks(), reg.tasks());
    }

    #[test]
    fn malformed_list_starts_empty() {
        let (_, store) = registry();
        store.set(keys::TASKS, "[{\"broken\":").unwrap();
        let reg = TaskRegistry::load(store, Rc::new(FixedClock::new(Local::now())));
        assert!(reg.tasks().is_empty());
    }

    proptest! {
        #[test]
        fn increment_is_capped_at_estimate(estimate in 1u32..10, presses in 0usize..25) {
            let (mut reg, _) = registry();
            let task = reg.add("t").unwrap();
            let mut edit = TaskEdit::from_task(&task);
            edit.estimated_pomodoros = estimate;
            reg.edit(&task.id, edit).unwrap();
            for _ in 0..presses {
                reg.increment_pomodoro(&task.id).unwrap();
            }
            let done = reg.get(&task.id).unwrap().completed_pomodoros;
            prop_assert_eq!(done as usize, presses.min(estimate as usize));
            if done == estimate {
                let before = reg.get(&task.id).unwrap().clone();
                prop_assert!(!reg.increment_pomodoro(&task.id).unwrap());
                prop_assert_eq!(reg.get(&task.id).unwrap(), &before);
            }
        }

        #[test]
        fn edit_clamps_completed_to_estimate(initial in 1u32..10, done in 0u32..10, new_estimate in 1u32..10) {
            let (mut reg, _) = registry();
            let task = reg.add("t").unwrap();
            let mut edit = TaskEdit::from_task(&task);
            edit.estimated_pomodoros = initial;
            reg.edit(&task.id, edit.clone()).unwrap();
            for _ in 0..done {
                reg.increment_pomodoro(&task.id).unwrap();
            }
            edit.estimated_pomodoros = new_estimate;
            reg.edit(&task.id, edit).unwrap();
            let t = reg.get(&task.id).unwrap();
            prop_assert!(t.completed_pomodoros <= t.estimated_pomodoros);
            prop_assert_eq!(t.completed_pomodoros, done.min(initial).min(new_estimate));
        }
    }
}
