//! Monthly leaderboard snapshot
//!
//! The snapshot is a cached ranking that is wiped whenever the local calendar
//! month changes. Each recompute replaces the local player's entry with a fresh
//! one, sorts by XP (stable, so ties keep their previous order), and persists
//! the result.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::domain::{FriendId, Profile};
use crate::rewards::{level_for_xp, XpState};
use crate::store::{Result, StorageKey, Store};
use crate::timer::Scheduled;

/// Reserved id of the local player's entry
pub const PLAYER_ID: &str = "player";

/// Shortest countdown refresh period
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub avatar: String,
    pub xp: u64,
    #[serde(default)]
    pub level: u32,
}

/// Live data used for the local player's entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPlayer {
    pub username: String,
    pub avatar: String,
    pub xp_total: u64,
}

impl LocalPlayer {
    pub fn new(profile: &Profile, xp: &XpState) -> Self {
        Self {
            username: profile.username.clone(),
            avatar: profile.avatar.clone(),
            xp_total: xp.total,
        }
    }

    fn entry(&self) -> LeaderboardEntry {
        LeaderboardEntry {
            id: PLAYER_ID.to_string(),
            username: self.username.clone(),
            avatar: self.avatar.clone(),
            xp: self.xp_total,
            level: level_for_xp(self.xp_total),
        }
    }
}

/// Sorted entries plus the local player's 1-based rank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standings {
    pub rank: usize,
    pub entries: Vec<LeaderboardEntry>,
}

impl Standings {
    fn from_sorted(entries: Vec<LeaderboardEntry>) -> Self {
        let rank = entries
            .iter()
            .position(|e| e.id == PLAYER_ID)
            .map_or(0, |i| i + 1);
        Self { rank, entries }
    }

    /// Only the player and friends, ranked within that subset
    pub fn friends_view(&self, friend_ids: &[FriendId]) -> Standings {
        let entries = self
            .entries
            .iter()
            .filter(|e| e.id == PLAYER_ID || friend_ids.contains(&e.id))
            .cloned()
            .collect();
        Self::from_sorted(entries)
    }
}

/// Time remaining until the next monthly reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeToReset {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl std::fmt::Display for TimeToReset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d {}h {}m", self.days, self.hours, self.minutes)
    }
}

/// Reset period marker, `YYYY-M` with a zero-based month
pub fn reset_marker(now: NaiveDateTime) -> String {
    format!("{}-{}", now.year(), now.month0())
}

/// First instant of the month after `now`
fn next_month_start(now: NaiveDateTime) -> NaiveDateTime {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(now)
}

pub fn time_to_next_reset_at(now: NaiveDateTime) -> TimeToReset {
    let secs = (next_month_start(now) - now).num_seconds().max(0);
    TimeToReset {
        days: secs / 86_400,
        hours: (secs % 86_400) / 3_600,
        minutes: (secs % 3_600) / 60,
    }
}

pub fn time_to_next_reset() -> TimeToReset {
    time_to_next_reset_at(Local::now().naive_local())
}

/// Publish [`time_to_next_reset`] every `period` (at least one minute).
/// The countdown stops when the returned handle is dropped.
pub fn watch_countdown(period: Duration) -> (Scheduled, watch::Receiver<TimeToReset>) {
    let (tx, rx) = watch::channel(time_to_next_reset());
    let handle = Scheduled::every(period.max(MIN_REFRESH_INTERVAL), move || {
        tx.send_replace(time_to_next_reset());
    });
    (handle, rx)
}

/// Persisted monthly ranking
#[derive(Clone)]
pub struct Leaderboard {
    store: Store,
}

impl Leaderboard {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Clear the snapshot if the month changed; `true` when a reset happened
    pub fn reset_check(&self) -> Result<bool> {
        self.reset_check_at(Local::now().naive_local())
    }

    pub fn reset_check_at(&self, now: NaiveDateTime) -> Result<bool> {
        let current = reset_marker(now);
        let stored = self.store.get_raw(StorageKey::LeaderboardResetMarker)?;
        if stored.as_deref() == Some(current.as_str()) {
            return Ok(false);
        }

        tracing::info!(
            "Leaderboard period changed ({} -> {}), clearing snapshot",
            stored.as_deref().unwrap_or("none"),
            current
        );
        self.store
            .set_raw(StorageKey::LeaderboardResetMarker, &current)?;
        self.store.remove(StorageKey::LeaderboardSnapshot)?;
        Ok(true)
    }

    /// Valid stored entries, one per id, in stored order
    pub fn snapshot(&self) -> Result<Vec<LeaderboardEntry>> {
        let raw: Vec<serde_json::Value> = self.store.load(StorageKey::LeaderboardSnapshot)?;
        let mut seen = HashSet::new();
        Ok(raw
            .into_iter()
            .filter_map(|v| serde_json::from_value::<LeaderboardEntry>(v).ok())
            .filter(|e| seen.insert(e.id.clone()))
            .collect())
    }

    /// Replace the player's entry, sort by XP descending, and persist
    pub fn recompute(&self, player: &LocalPlayer) -> Result<Standings> {
        let mut entries = self.snapshot()?;
        entries.retain(|e| e.id != PLAYER_ID);
        entries.push(player.entry());
        entries.sort_by(|a, b| b.xp.cmp(&a.xp));

        self.store.save(StorageKey::LeaderboardSnapshot, &entries)?;
        Ok(Standings::from_sorted(entries))
    }

    /// Reset check followed by a recompute
    pub fn refresh(&self, player: &LocalPlayer) -> Result<Standings> {
        self.reset_check()?;
        self.recompute(player)
    }
}
