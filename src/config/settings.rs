//! Settings sections of the config file

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::leaderboard::MIN_REFRESH_INTERVAL;
use crate::rewards::critical::{DEFAULT_CRATE_REWARD_CHANCE, DEFAULT_CRITICAL_HIT_CHANCE};

/// Where persisted state lives
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite database path (defaults to ~/.questlog/state.db)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Reward tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsSettings {
    /// Chance (percent) of a 2x XP critical hit
    #[serde(default = "default_critical_hit_chance")]
    pub critical_hit_chance: u32,

    /// Chance (percent) of a bonus crate
    #[serde(default = "default_crate_reward_chance")]
    pub crate_reward_chance: u32,

    /// Base XP per completed task
    #[serde(default = "default_task_xp")]
    pub task_xp: u64,

    /// Gems per completed task
    #[serde(default = "default_task_gems")]
    pub task_gems: u64,
}

fn default_critical_hit_chance() -> u32 {
    DEFAULT_CRITICAL_HIT_CHANCE
}

fn default_crate_reward_chance() -> u32 {
    DEFAULT_CRATE_REWARD_CHANCE
}

fn default_task_xp() -> u64 {
    10
}

fn default_task_gems() -> u64 {
    1
}

impl Default for RewardsSettings {
    fn default() -> Self {
        Self {
            critical_hit_chance: default_critical_hit_chance(),
            crate_reward_chance: default_crate_reward_chance(),
            task_xp: default_task_xp(),
            task_gems: default_task_gems(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardSettings {
    /// Countdown refresh period in seconds (minimum 60)
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

fn default_refresh_interval_secs() -> u64 {
    60
}

impl LeaderboardSettings {
    /// Refresh period, never below one minute
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs).max(MIN_REFRESH_INTERVAL)
    }
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval_secs(),
        }
    }
}
