//! CLI command implementations

pub mod init;
pub mod leaderboard;
pub mod rewards;
pub mod social;
pub mod task;

use std::path::Path;

use anyhow::{bail, Context, Result};

use questlog::config::Config;
use questlog::rewards::{RewardEvent, RewardManager};
use questlog::store::Store;

/// Loaded config plus the opened state store
pub struct AppContext {
    pub config: Config,
    pub store: Store,
    pub rewards: RewardManager,
}

impl AppContext {
    /// Load the config (creating it if missing) and open the state database
    pub fn open(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        let db_path = config.database_path();
        let store = Store::open(&db_path)
            .with_context(|| format!("Failed to open state database: {}", db_path.display()))?;
        tracing::debug!("Using state database {}", db_path.display());

        let rewards = RewardManager::new(store.clone(), config.reward_settings());
        Ok(Self {
            config,
            store,
            rewards,
        })
    }
}

/// Parse "on"/"off" style switches
pub(crate) fn parse_switch(state: &str) -> Result<bool> {
    match state.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => bail!("Expected 'on' or 'off', got '{}'", other),
    }
}

/// Print what a reward flow produced
pub(crate) fn print_reward_events(events: &[RewardEvent]) {
    for event in events {
        match event {
            RewardEvent::Critical(roll) => {
                if roll.is_critical {
                    println!("  ⚡ CRITICAL HIT! x{} XP", roll.xp_multiplier);
                }
                if roll.crate_reward {
                    println!("  🎁 Bonus crate!");
                }
            }
            RewardEvent::XpAwarded { amount, multiplier } => {
                if (*multiplier - 1.0).abs() > f64::EPSILON {
                    println!("  +{} XP (skills x{:.2})", amount, multiplier);
                } else {
                    println!("  +{} XP", amount);
                }
            }
            RewardEvent::GemsAwarded { amount } => println!("  +{} 💎", amount),
            RewardEvent::CrateEarned { available } => {
                println!("  Crates waiting: {} (open with `questlog crate open`)", available)
            }
            RewardEvent::CrateOpened(reward) => println!("  Crate contained {}", reward),
            RewardEvent::StreakExtended { days } => println!("  🔥 {}-day streak", days),
            RewardEvent::LevelUp(level_up) => {
                println!(
                    "  ⬆️  Level up! {} → {}",
                    level_up.old_level, level_up.new_level
                )
            }
            RewardEvent::MedalEarned(id) => {
                let def = id.def();
                println!("  {} Medal earned: {} - {}", def.icon, def.name, def.description);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_switch() {
        assert!(parse_switch("ON").unwrap());
        assert!(!parse_switch("off").unwrap());
        assert!(parse_switch("maybe").is_err());
    }
}
