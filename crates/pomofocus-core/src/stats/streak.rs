//! Usage-date log and consecutive-day streak.

use std::collections::BTreeSet;
use std::rc::Rc;

use chrono::{Days, NaiveDate};
use tracing::warn;

use crate::clock::Clock;
use crate::error::Result;
use crate::storage::{keys, KeyValueStore};

/// Upper bound on how far back the streak walk goes.
pub const MAX_STREAK_DAYS: u32 = 100;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Consecutive days ending at `today` that appear in `dates`.
///
/// Zero when `today` itself is missing, whatever came before.
pub fn daily_streak(dates: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    if !dates.contains(&today) {
        return 0;
    }
    let mut streak = 1;
    let mut day = today;
    while streak < MAX_STREAK_DAYS {
        match day.checked_sub_days(Days::new(1)) {
            Some(prev) if dates.contains(&prev) => {
                streak += 1;
                day = prev;
            }
            _ => break,
        }
    }
    streak
}

/// Set of calendar days the application was opened, persisted as
/// `YYYY-MM-DD` strings under `usageDates`.
pub struct UsageLog {
    store: KeyValueStore,
    clock: Rc<dyn Clock>,
    dates: BTreeSet<NaiveDate>,
}

impl UsageLog {
    pub fn load(store: KeyValueStore, clock: Rc<dyn Clock>) -> Self {
        let raw: Vec<String> = store.get_json(keys::USAGE_DATES).unwrap_or_default();
        let dates = raw
            .iter()
            .filter_map(|s| match NaiveDate::parse_from_str(s, DATE_FORMAT) {
                Ok(d) => Some(d),
                Err(e) => {
                    warn!(value = %s, error = %e, "skipping malformed usage date");
                    None
                }
            })
            .collect();
        Self { store, clock, dates }
    }

    pub fn dates(&self) -> &BTreeSet<NaiveDate> {
        &self.dates
    }

    /// Mark today as used. Returns whether today was new.
    pub fn record_today(&mut self) -> Result<bool> {
        if !self.dates.insert(self.clock.today()) {
            return Ok(false);
        }
        let raw: Vec<String> = self
            .dates
            .iter()
            .map(|d| d.format(DATE_FORMAT).to_string())
            .collect();
        self.store.set_json(keys::USAGE_DATES, &raw)?;
        Ok(true)
    }

    pub fn streak(&self) -> u32 {
        daily_streak(&self.dates, self.clock.today())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::storage::{MemoryBackend, DEFAULT_NAMESPACE};
    use chrono::{Duration, Local, TimeZone};

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap() + Duration::days(offset)
    }

    #[test]
    fn three_consecutive_days() {
        let dates: BTreeSet<_> = [day(0), day(-1), day(-2), day(-4)].into_iter().collect();
        assert_eq!(daily_streak(&dates, day(0)), 3);
    }

    #[test]
    fn missing_today_is_zero() {
        let dates: BTreeSet<_> = [day(-1), day(-2), day(-3)].into_iter().collect();
        assert_eq!(daily_streak(&dates, day(0)), 0);
    }

    #[test]
    fn only_today_is_one() {
        let dates: BTreeSet<_> = [day(0)].into_iter().collect();
        assert_eq!(daily_streak(&dates, day(0)), 1);
    }

    #[test]
    fn streak_is_capped() {
        let dates: BTreeSet<_> = (0..150).map(|i| day(-i)).collect();
        assert_eq!(daily_streak(&dates, day(0)), MAX_STREAK_DAYS);
    }

    #[test]
    fn record_today_persists_once() {
        let store = KeyValueStore::new(MemoryBackend::new(), DEFAULT_NAMESPACE);
        store
            .set_json(keys::USAGE_DATES, &["2024-06-14", "garbage"])
            .unwrap();
        let clock = FixedClock::new(Local.with_ymd_and_hms(2024, 6, 15, 7, 0, 0).unwrap());
        let mut log = UsageLog::load(store.clone(), Rc::new(clock));
        assert!(log.record_today().unwrap());
        assert!(!log.record_today().unwrap());
        assert_eq!(log.streak(), 2);

        let raw: Vec<String> = store.get_json(keys::USAGE_DATES).unwrap();
        assert_eq!(raw, vec!["2024-06-14".to_string(), "2024-06-15".to_string()]);
    }
}
