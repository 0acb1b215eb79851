//! Configuration file I/O operations

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::Config;

impl Config {
    /// Get the global config directory path (~/.questlog/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".questlog")
    }

    /// Get the global config file path (~/.questlog/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration with an exclusive lock and an atomic temp-file rename
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;
        write_locked(path, &content, false)?;
        Ok(())
    }

    /// Load the global configuration, creating it with defaults when missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::global_config_path())
    }

    /// Load configuration from `path`, creating it with defaults when missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            Self::auto_init(path)?;
        }
        Self::from_file(path)
    }

    /// Write a default config unless another process got there first
    fn auto_init(path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(&Self::default())
            .with_context(|| "Failed to serialize default config")?;
        if write_locked(path, &content, true)? {
            eprintln!("Created {}", path.display());
        }
        Ok(())
    }
}

/// Write `content` to `path` under a sibling lock file. With `only_if_missing`,
/// nothing is written if the file exists once the lock is held. Returns whether
/// the file was written.
pub(crate) fn write_locked(path: &Path, content: &str, only_if_missing: bool) -> Result<bool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    // Lock file separate from the config so the rename does not drop it
    let lock_path = path.with_extension("toml.lock");
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&lock_path)
        .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

    lock_file
        .lock_exclusive()
        .with_context(|| "Failed to acquire config lock")?;

    if only_if_missing && path.exists() {
        return Ok(false);
    }

    let temp_path = path.with_extension("toml.tmp");
    let mut temp_file = File::create(&temp_path)
        .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

    temp_file
        .write_all(content.as_bytes())
        .with_context(|| "Failed to write config content")?;

    temp_file
        .sync_all()
        .with_context(|| "Failed to sync config file")?;

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename config file: {}", path.display()))?;

    // Lock is released when lock_file is dropped
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.rewards.task_xp, 10);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.rewards.crate_reward_chance = 50;
        config.leaderboard.refresh_interval_secs = 300;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.rewards.crate_reward_chance, 50);
        assert_eq!(loaded.leaderboard.refresh_interval_secs, 300);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_only_if_missing_keeps_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rewards]\ntask_xp = 99\n").unwrap();

        assert!(!write_locked(&path, "", true).unwrap());
        assert_eq!(Config::from_file(&path).unwrap().rewards.task_xp, 99);
    }

    #[test]
    fn test_parse_error_has_context() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[rewards\n").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }
}
