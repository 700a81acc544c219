//! Integration tests for the wired application over a SQLite store.

use std::rc::Rc;

use chrono::{Duration, Local, TimeZone};
use pomofocus_core::storage::keys;
use pomofocus_core::{
    Achievement, ChartView, Event, FixedClock, KeyValueStore, ManualTicks, MemoryBackend,
    PomodoroApp, SessionType, SqliteBackend, TickSource, TimerSettings, TimerState,
};
use tempfile::TempDir;

fn quick_settings() -> TimerSettings {
    TimerSettings {
        work_duration: 3,
        short_break_duration: 1,
        long_break_duration: 2,
        auto_start_breaks: true,
        auto_start_pomodoros: true,
    }
}

fn clock() -> FixedClock {
    FixedClock::new(Local.with_ymd_and_hms(2024, 3, 14, 9, 0, 0).unwrap())
}

fn run_until_idle(app: &mut PomodoroApp, ticks: &ManualTicks, sessions: usize) -> Vec<Event> {
    let mut completed = 0;
    let mut events = Vec::new();
    if app.timer().state() != TimerState::Running {
        app.start();
    }
    while ticks.is_armed() && completed < sessions {
        app.tick();
        for event in app.drain_events() {
            if matches!(event, Event::SessionCompleted { .. }) {
                completed += 1;
            }
            events.push(event);
        }
    }
    events
}

#[test]
fn full_cycle_with_auto_start_reaches_long_break() {
    let store = KeyValueStore::new(MemoryBackend::new(), "pomofocus_");
    store.set_json(keys::TIMER_SETTINGS, &quick_settings()).unwrap();
    let ticks = ManualTicks::new();
    let mut app = PomodoroApp::open(store, Rc::new(clock()), ticks.clone());

    let events = run_until_idle(&mut app, &ticks, 8);
    let nexts: Vec<SessionType> = events
        .iter()
        .filter_map(|e| match e {
            Event::SessionCompleted { next, .. } => Some(*next),
            _ => None,
        })
        .collect();
    assert_eq!(
        nexts,
        vec![
            SessionType::ShortBreak,
            SessionType::Work,
            SessionType::ShortBreak,
            SessionType::Work,
            SessionType::ShortBreak,
            SessionType::Work,
            SessionType::LongBreak,
            SessionType::Work,
        ]
    );
    // One arm for the manual start, then one per auto-started session.
    assert_eq!(ticks.arm_count(), 9);
    assert_eq!(app.summary().total_sessions, 4);
    assert_eq!(app.summary().total_focus_secs, 12);
    assert_eq!(app.summary().total_break_secs, 5);
}

#[test]
fn state_survives_reopen_of_sqlite_file() {
    let dir = TempDir::new().unwrap();
    let db = dir.path().join("pomofocus.db");
    let clock = clock();

    {
        let store = KeyValueStore::new(SqliteBackend::open(&db, None).unwrap(), "pomofocus_");
        store.set_json(keys::TIMER_SETTINGS, &quick_settings()).unwrap();
        let ticks = ManualTicks::new();
        let mut app = PomodoroApp::open(store, Rc::new(clock.clone()), ticks.clone());
        let id = app.add_task("write report").unwrap().id;
        app.increment_task_pomodoro(&id).unwrap();
        run_until_idle(&mut app, &ticks, 1);
        app.pause();
    }

    clock.advance(Duration::days(1));
    let store = KeyValueStore::new(SqliteBackend::open(&db, None).unwrap(), "pomofocus_");
    let app = PomodoroApp::open(store, Rc::new(clock), ManualTicks::new());

    assert_eq!(app.tasks().len(), 1);
    assert_eq!(app.tasks()[0].completed_pomodoros, 1);
    assert_eq!(app.timer().sessions_completed(), 1);
    assert_eq!(app.timer().state(), TimerState::Idle);
    assert_eq!(app.timer().session_type(), SessionType::Work);
    assert_eq!(app.summary().total_sessions, 1);
    assert_eq!(app.streak(), 2);
    assert!(app.unlocked_achievements().contains(&Achievement::FirstPomodoro));
}

#[test]
fn weekly_chart_counts_todays_focus() {
    let store = KeyValueStore::new(MemoryBackend::new(), "pomofocus_");
    store
        .set_json(
            keys::TIMER_SETTINGS,
            &TimerSettings {
                work_duration: 120,
                ..quick_settings()
            },
        )
        .unwrap();
    let ticks = ManualTicks::new();
    let mut app = PomodoroApp::open(store, Rc::new(clock()), ticks.clone());
    run_until_idle(&mut app, &ticks, 1);

    let chart = app.chart(ChartView::Weekly);
    assert_eq!(chart.labels.len(), 7);
    // 2024-03-14 is a Thursday.
    assert_eq!(chart.focus_minutes[4], 2.0);
    assert_eq!(chart.focus_minutes.iter().sum::<f64>(), 2.0);

    let daily = app.chart(ChartView::Daily);
    assert_eq!(daily.focus_minutes[9], 2.0);
}

#[test]
fn export_then_import_into_fresh_store() {
    let source = KeyValueStore::new(MemoryBackend::new(), "pomofocus_");
    let ticks = ManualTicks::new();
    let mut app = PomodoroApp::open(source, Rc::new(clock()), ticks);
    let id = app.add_task("plan sprint").unwrap().id;
    app.toggle_task(&id).unwrap();
    let json = app.export_json().unwrap();

    let target = KeyValueStore::new(MemoryBackend::new(), "other_");
    let mut restored = PomodoroApp::open(target.clone(), Rc::new(clock()), ManualTicks::new());
    restored.import_json(&json).unwrap();
    assert_eq!(restored.tasks().len(), 1);
    assert!(restored.tasks()[0].completed);
    assert_eq!(restored.summary().productivity_score, 100);
    assert!(target.keys().contains(&"tasks".to_string()));
}

#[test]
fn unavailable_store_still_runs_the_timer() {
    let ticks = ManualTicks::new();
    let store = KeyValueStore::unavailable("pomofocus_");
    let mut app = PomodoroApp::open(store, Rc::new(clock()), ticks.clone());
    app.update_timer_settings(quick_settings()).unwrap_err();
    assert_eq!(app.timer().remaining_secs(), 3);

    run_until_idle(&mut app, &ticks, 1);
    assert_eq!(app.summary().total_sessions, 1);
    assert!(app.add_task("in memory only").is_err());
    assert_eq!(app.tasks().len(), 1);
}
