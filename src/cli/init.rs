//! Init command implementation

use anyhow::{bail, Result};
use std::path::PathBuf;

use questlog::config::Config;

/// Default configuration content for questlog init
pub const DEFAULT_CONFIG: &str = r#"# questlog configuration
# ======================
#
# Every value below is the built-in default; delete what you do not change.

# ============================================================================
# STORAGE - Where progress is kept
# ============================================================================
#
#   path - SQLite database file (default: ~/.questlog/state.db)

[storage]
# path = "/path/to/state.db"

# ============================================================================
# REWARDS
# ============================================================================
#
#   critical_hit_chance - Percent chance of a 2x XP critical hit (0-100)
#   crate_reward_chance - Percent chance of a bonus crate (0-100)
#   task_xp             - Base XP per completed task
#   task_gems           - Gems per completed task

[rewards]
critical_hit_chance = 8
crate_reward_chance = 2
task_xp = 10
task_gems = 1

# ============================================================================
# LEADERBOARD
# ============================================================================
#
#   refresh_interval_secs - Refresh period of `leaderboard --watch` (minimum 60)

[leaderboard]
refresh_interval_secs = 60
"#;

/// Write the default configuration
/// By default creates the global config at ~/.questlog/config.toml
pub fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    println!("Created: {}", config_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.rewards.critical_hit_chance, 8);
        assert_eq!(config.rewards.crate_reward_chance, 2);
        assert_eq!(config.leaderboard.refresh_interval_secs, 60);
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        init_command(Some(path.clone()), false).unwrap();
        assert!(init_command(Some(path.clone()), false).is_err());
        init_command(Some(path), true).unwrap();
    }
}
