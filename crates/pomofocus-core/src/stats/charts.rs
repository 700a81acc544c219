//! Time-bucketed views over the session history.
//!
//! All bucketing happens in local time: a session belongs to the calendar
//! day and hour shown on the user's wall clock when it finished.

use chrono::{DateTime, Datelike, Days, Local, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::tasks::Task;
use crate::timer::SessionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartView {
    /// Today, by hour of day.
    Daily,
    /// Current Sunday-based week, by day of week.
    Weekly,
}

/// Completed vs. open tasks created on or after a bucket's start date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDistribution {
    pub completed: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub view: ChartView,
    pub labels: Vec<String>,
    /// Focus minutes per label.
    pub focus_minutes: Vec<f64>,
    pub tasks: TaskDistribution,
}

const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn local_date(ts: &DateTime<chrono::Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// Work minutes per hour of day for sessions on `today`.
pub fn hourly_focus_minutes(sessions: &[SessionRecord], today: NaiveDate) -> [f64; 24] {
    let mut buckets = [0.0; 24];
    for session in sessions.iter().filter(|s| s.is_work()) {
        let local = session.timestamp.with_timezone(&Local);
        if local.date_naive() == today {
            buckets[local.hour() as usize] += f64::from(session.duration) / 60.0;
        }
    }
    buckets
}

/// Work minutes per weekday (0 = Sunday) for sessions since the start of the
/// week containing `today`.
pub fn weekday_focus_minutes(sessions: &[SessionRecord], today: NaiveDate) -> [f64; 7] {
    let start = week_start(today);
    let mut buckets = [0.0; 7];
    for session in sessions.iter().filter(|s| s.is_work()) {
        let date = local_date(&session.timestamp);
        if date >= start {
            buckets[date.weekday().num_days_from_sunday() as usize] +=
                f64::from(session.duration) / 60.0;
        }
    }
    buckets
}

pub fn task_distribution(tasks: &[Task], since: NaiveDate) -> TaskDistribution {
    tasks
        .iter()
        .filter(|t| local_date(&t.created_at) >= since)
        .fold(TaskDistribution::default(), |mut acc, t| {
            if t.completed {
                acc.completed += 1;
            } else {
                acc.pending += 1;
            }
            acc
        })
}

pub fn build_chart(
    view: ChartView,
    sessions: &[SessionRecord],
    tasks: &[Task],
    today: NaiveDate,
) -> Chart {
    match view {
        ChartView::Daily => Chart {
            view,
            labels: (0..24).map(|h| format!("{h:02}:00")).collect(),
            focus_minutes: hourly_focus_minutes(sessions, today).to_vec(),
            tasks: task_distribution(tasks, today),
        },
        ChartView::Weekly => Chart {
            view,
            labels: WEEKDAY_LABELS.iter().map(|d| d.to_string()).collect(),
            focus_minutes: weekday_focus_minutes(sessions, today).to_vec(),
            tasks: task_distribution(tasks, week_start(today)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SessionType;
    use chrono::{TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn work(ts: DateTime<Utc>, secs: u32) -> SessionRecord {
        SessionRecord::new(SessionType::Work, secs, ts)
    }

    #[test]
    fn week_starts_on_sunday() {
        // 2024-05-08 is a Wednesday.
        let wed = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
        assert_eq!(week_start(wed), NaiveDate::from_ymd_opt(2024, 5, 5).unwrap());
        let sun = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
        assert_eq!(week_start(sun), sun);
    }

    #[test]
    fn hourly_buckets_only_today_work() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
        let sessions = vec![
            work(at(2024, 5, 8, 9, 10), 1500),
            work(at(2024, 5, 8, 9, 50), 1500),
            work(at(2024, 5, 8, 14, 0), 600),
            work(at(2024, 5, 7, 9, 0), 1500),
            SessionRecord::new(SessionType::ShortBreak, 300, at(2024, 5, 8, 9, 30)),
        ];
        let buckets = hourly_focus_minutes(&sessions, today);
        assert_eq!(buckets[9], 50.0);
        assert_eq!(buckets[14], 10.0);
        assert_eq!(buckets.iter().sum::<f64>(), 60.0);
    }

    #[test]
    fn weekly_buckets_ignore_previous_week() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
        let sessions = vec![
            work(at(2024, 5, 5, 10, 0), 1500),
            work(at(2024, 5, 8, 10, 0), 1500),
            work(at(2024, 5, 8, 11, 0), 1500),
            work(at(2024, 5, 4, 10, 0), 1500),
        ];
        let buckets = weekday_focus_minutes(&sessions, today);
        assert_eq!(buckets, [25.0, 0.0, 0.0, 50.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn distribution_counts_tasks_created_since() {
        let mk = |created: DateTime<Utc>, completed: bool| Task {
            id: created.to_rfc3339(),
            name: "t".into(),
            completed,
            estimated_pomodoros: 1,
            completed_pomodoros: 0,
            priority: Default::default(),
            notes: String::new(),
            created_at: created,
            completed_at: None,
        };
        let tasks = vec![
            mk(at(2024, 5, 8, 8, 0), true),
            mk(at(2024, 5, 8, 9, 0), false),
            mk(at(2024, 5, 6, 9, 0), false),
            mk(at(2024, 4, 30, 9, 0), true),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 5, 8).unwrap();
        let daily = build_chart(ChartView::Daily, &[], &tasks, today);
        assert_eq!(daily.tasks, TaskDistribution { completed: 1, pending: 1 });
        assert_eq!(daily.labels.len(), 24);
        let weekly = build_chart(ChartView::Weekly, &[], &tasks, today);
        assert_eq!(weekly.tasks, TaskDistribution { completed: 1, pending: 2 });
        assert_eq!(weekly.labels[0], "Sun");
    }
}
