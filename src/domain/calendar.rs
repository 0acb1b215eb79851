use std::collections::BTreeMap;
use std::fmt;

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Calendar day with the time of day truncated, stored as `YYYY-MM-DD`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayKey(String);

impl DayKey {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }

    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        Self::from_date(dt.date())
    }

    pub fn today() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    /// Parse a `YYYY-MM-DD` string
    pub fn parse(s: &str) -> Option<Self> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .ok()
            .map(Self::from_date)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, "%Y-%m-%d").ok()
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<NaiveDate> for DayKey {
    fn from(date: NaiveDate) -> Self {
        Self::from_date(date)
    }
}

/// Event titles per day, in insertion order within each day
pub type EventsByDay = BTreeMap<DayKey, Vec<String>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_of_day_is_truncated() {
        let morning = NaiveDate::from_ymd_opt(2026, 3, 9)
            .unwrap()
            .and_hms_opt(7, 15, 0)
            .unwrap();
        let night = NaiveDate::from_ymd_opt(2026, 3, 9)
            .unwrap()
            .and_hms_opt(23, 59, 59)
            .unwrap();
        assert_eq!(DayKey::from_datetime(morning), DayKey::from_datetime(night));
        assert_eq!(DayKey::from_datetime(morning).as_str(), "2026-03-09");
    }

    #[test]
    fn test_parse() {
        assert_eq!(DayKey::parse(" 2026-12-01 ").unwrap().as_str(), "2026-12-01");
        assert!(DayKey::parse("12/01/2026").is_none());
    }

    #[test]
    fn test_events_serialize_as_map() {
        let mut events = EventsByDay::new();
        events.insert(
            DayKey::parse("2026-01-02").unwrap(),
            vec!["Standup".to_string(), "Gym".to_string()],
        );
        let json = serde_json::to_string(&events).unwrap();
        assert_eq!(json, r#"{"2026-01-02":["Standup","Gym"]}"#);

        let back: EventsByDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, events);
    }
}
