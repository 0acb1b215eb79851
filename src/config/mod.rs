//! Configuration loading and management
//!
//! The config lives at `~/.questlog/config.toml`. Every field has a default, so
//! a partial (or empty) file is valid.

mod io;
mod settings;

pub use settings::{LeaderboardSettings, RewardsSettings, StorageSettings};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::rewards::{CriticalChances, RewardSettings};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub rewards: RewardsSettings,

    #[serde(default)]
    pub leaderboard: LeaderboardSettings,
}

impl Config {
    /// Database path, falling back to ~/.questlog/state.db
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("state.db"))
    }

    /// Reward settings with chances clamped to 0..=100
    pub fn reward_settings(&self) -> RewardSettings {
        RewardSettings {
            task_xp: self.rewards.task_xp,
            task_gems: self.rewards.task_gems,
            chances: CriticalChances {
                critical_hit_chance: self.rewards.critical_hit_chance.min(100),
                crate_reward_chance: self.rewards.crate_reward_chance.min(100),
            },
        }
    }
}
