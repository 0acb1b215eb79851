//! Persistent state storage
//!
//! Every component reads and writes its state through a [`Store`] handle that is
//! injected at construction. The handle wraps a [`KeyValueStore`] backend holding
//! JSON-serialized values under fixed [`StorageKey`]s.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐ ┌──────────┐ ┌─────────────┐ ┌───────────┐
//! │  Ledger  │ │  Skills  │ │ Leaderboard │ │ TaskStore │
//! └────┬─────┘ └────┬─────┘ └──────┬──────┘ └─────┬─────┘
//!      └────────────┴──────┬───────┴──────────────┘
//!                          ▼
//!                   Store (typed JSON)
//!                          │
//!             ┌────────────┴────────────┐
//!             ▼                         ▼
//!   SqliteStore (~/.questlog/state.db)  MemoryStore (tests)
//! ```
//!
//! Reads never fail on bad data: a malformed value is logged and replaced by the
//! type's default. Only backend failures surface as [`StoreError`].

mod db;
mod memory;

pub use db::SqliteStore;
pub use memory::MemoryStore;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Error type for storage backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to access storage: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize value for '{key}': {source}")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Raw string storage, the equivalent of a browser's local storage
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Fixed keys of the persisted state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    Tasks,
    Events,
    Gems,
    Xp,
    Medals,
    Skills,
    Progress,
    Streaks,
    Profile,
    LeaderboardSnapshot,
    LeaderboardResetMarker,
    Friends,
    Users,
    Messages,
    CriticalTestMode,
    CrateTestMode,
}

impl StorageKey {
    /// Get the string key used by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Events => "events",
            Self::Gems => "gems",
            Self::Xp => "xp",
            Self::Medals => "medals",
            Self::Skills => "skills",
            Self::Progress => "progress",
            Self::Streaks => "streaks",
            Self::Profile => "profile",
            Self::LeaderboardSnapshot => "leaderboard_monthly",
            Self::LeaderboardResetMarker => "leaderboard_reset_date",
            Self::Friends => "friends",
            Self::Users => "users",
            Self::Messages => "messages",
            Self::CriticalTestMode => "critical_test_mode",
            Self::CrateTestMode => "crate_test_mode",
        }
    }
}

/// Shared handle to the state backend
///
/// Cloning is cheap; all clones see the same backend. Each call holds the
/// backend lock only for a single read or write.
#[derive(Clone)]
pub struct Store {
    backend: Arc<Mutex<dyn KeyValueStore>>,
}

impl Store {
    /// Wrap an arbitrary backend
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
        }
    }

    /// Volatile store for tests
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    /// Open the SQLite store at `path`
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(SqliteStore::open(path)?))
    }

    fn backend(&self) -> MutexGuard<'_, dyn KeyValueStore + 'static> {
        // A panic mid-write leaves the map itself consistent
        self.backend.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get_raw(&self, key: StorageKey) -> Result<Option<String>> {
        self.backend().get(key.as_str())
    }

    pub fn set_raw(&self, key: StorageKey, value: &str) -> Result<()> {
        self.backend().set(key.as_str(), value)
    }

    pub fn remove(&self, key: StorageKey) -> Result<()> {
        self.backend().remove(key.as_str())
    }

    /// Load a JSON value, falling back to `T::default()` when absent or malformed
    pub fn load<T>(&self, key: StorageKey) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.load_opt(key)?.unwrap_or_default())
    }

    /// Load a JSON value; `None` when absent or malformed
    pub fn load_opt<T>(&self, key: StorageKey) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let Some(raw) = self.get_raw(key)? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!("Discarding malformed '{}' state: {}", key.as_str(), e);
                Ok(None)
            }
        }
    }

    /// Serialize and persist a value
    pub fn save<T>(&self, key: StorageKey, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string(value).map_err(|source| StoreError::Serialize {
            key: key.as_str(),
            source,
        })?;
        self.set_raw(key, &json)
    }

    /// Read a boolean flag stored as `"true"` or absent
    pub fn flag(&self, key: StorageKey) -> Result<bool> {
        Ok(self.get_raw(key)?.as_deref() == Some("true"))
    }

    /// Set (`"true"`) or clear (remove) a boolean flag
    pub fn set_flag(&self, key: StorageKey, enabled: bool) -> Result<()> {
        if enabled {
            self.set_raw(key, "true")
        } else {
            self.remove(key)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_returns_default() {
        let store = Store::in_memory();
        let tasks: Vec<String> = store.load(StorageKey::Tasks).unwrap();
        assert!(tasks.is_empty());
    }

    #[test]
    fn test_load_malformed_returns_default() {
        let store = Store::in_memory();
        store.set_raw(StorageKey::Friends, "{not json").unwrap();

        let friends: Vec<String> = store.load(StorageKey::Friends).unwrap();
        assert!(friends.is_empty());
        let opt: Option<Vec<String>> = store.load_opt(StorageKey::Friends).unwrap();
        assert!(opt.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let store = Store::in_memory();
        store
            .save(StorageKey::Friends, &vec!["ada#1".to_string()])
            .unwrap();
        let friends: Vec<String> = store.load(StorageKey::Friends).unwrap();
        assert_eq!(friends, vec!["ada#1".to_string()]);
    }

    #[test]
    fn test_flags() {
        let store = Store::in_memory();
        assert!(!store.flag(StorageKey::CriticalTestMode).unwrap());

        store.set_flag(StorageKey::CriticalTestMode, true).unwrap();
        assert_eq!(
            store.get_raw(StorageKey::CriticalTestMode).unwrap().as_deref(),
            Some("true")
        );
        assert!(store.flag(StorageKey::CriticalTestMode).unwrap());

        store.set_flag(StorageKey::CriticalTestMode, false).unwrap();
        assert_eq!(store.get_raw(StorageKey::CriticalTestMode).unwrap(), None);
    }

    #[test]
    fn test_clones_share_backend() {
        let store = Store::in_memory();
        let other = store.clone();
        store.set_raw(StorageKey::Gems, "12").unwrap();
        assert_eq!(other.get_raw(StorageKey::Gems).unwrap().as_deref(), Some("12"));
    }
}
