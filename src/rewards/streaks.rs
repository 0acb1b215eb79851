//! Daily activity streak
//!
//! The streak grows by one when the player is active on the day after the last
//! active day and restarts at one after a gap.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::DayKey;
use crate::store::{Result, StorageKey, Store};

/// Persisted streak counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakInfo {
    pub current: u32,
    pub best: u32,
    pub last_activity_day: Option<DayKey>,
}

impl StreakInfo {
    /// Active if there was activity on `today` or the day before
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        let Some(last) = self.last_activity_day.as_ref().and_then(DayKey::date) else {
            return false;
        };
        (today - last).num_days() <= 1
    }

    /// Record activity on `day`; returns whether the counter changed
    pub fn record(&mut self, day: NaiveDate) -> bool {
        let last = self.last_activity_day.as_ref().and_then(DayKey::date);

        let next = match last {
            Some(last) if last == day => return false,
            // Activity recorded out of order never moves the streak backwards
            Some(last) if last > day => return false,
            Some(last) if (day - last).num_days() == 1 => self.current + 1,
            _ => 1,
        };

        self.current = next;
        self.best = self.best.max(next);
        self.last_activity_day = Some(DayKey::from_date(day));
        true
    }
}

/// Persists the daily streak
#[derive(Clone)]
pub struct StreakTracker {
    store: Store,
}

impl StreakTracker {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn info(&self) -> Result<StreakInfo> {
        self.store.load(StorageKey::Streaks)
    }

    /// Current streak length, zero once it has lapsed
    pub fn current_days(&self) -> Result<u32> {
        self.current_days_on(Local::now().date_naive())
    }

    /// Streak length as seen on `today`
    pub fn current_days_on(&self, today: NaiveDate) -> Result<u32> {
        let info = self.info()?;
        if info.is_active_on(today) {
            Ok(info.current)
        } else {
            Ok(0)
        }
    }

    pub fn record_today(&self) -> Result<(StreakInfo, bool)> {
        self.record_on(Local::now().date_naive())
    }

    pub fn record_on(&self, day: NaiveDate) -> Result<(StreakInfo, bool)> {
        let mut info = self.info()?;
        let changed = info.record(day);
        if changed {
            tracing::debug!("Daily streak now {} (best {})", info.current, info.best);
            self.store.save(StorageKey::Streaks, &info)?;
        }
        Ok((info, changed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_consecutive_days_extend() {
        let mut info = StreakInfo::default();
        assert!(info.record(day("2024-03-01")));
        assert!(info.record(day("2024-03-02")));
        assert!(info.record(day("2024-03-03")));
        assert_eq!(info.current, 3);
        assert_eq!(info.best, 3);
    }

    #[test]
    fn test_same_day_is_unchanged() {
        let mut info = StreakInfo::default();
        info.record(day("2024-03-01"));
        assert!(!info.record(day("2024-03-01")));
        assert_eq!(info.current, 1);
    }

    #[test]
    fn test_gap_restarts_and_keeps_best() {
        let mut info = StreakInfo::default();
        info.record(day("2024-02-28"));
        info.record(day("2024-02-29"));
        info.record(day("2024-03-01"));
        info.record(day("2024-03-05"));
        assert_eq!(info.current, 1);
        assert_eq!(info.best, 3);
    }

    #[test]
    fn test_is_active_on() {
        let mut info = StreakInfo::default();
        assert!(!info.is_active_on(day("2024-03-01")));
        info.record(day("2024-03-01"));
        assert!(info.is_active_on(day("2024-03-02")));
        assert!(!info.is_active_on(day("2024-03-03")));
    }

    #[test]
    fn test_tracker_persists() {
        let store = Store::in_memory();
        let tracker = StreakTracker::new(store.clone());
        tracker.record_on(day("2024-01-31")).unwrap();
        let (info, changed) = tracker.record_on(day("2024-02-01")).unwrap();
        assert!(changed);
        assert_eq!(info.current, 2);
        assert_eq!(StreakTracker::new(store).info().unwrap().current, 2);
    }
}
