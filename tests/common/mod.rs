//! Shared test utilities for questlog integration tests

#![allow(dead_code)]

use questlog::rewards::{RewardManager, RewardSettings};
use questlog::store::Store;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

/// A fresh in-memory store
pub fn memory_store() -> Store {
    Store::in_memory()
}

/// A SQLite-backed store in a temp directory; keep the `TempDir` alive
pub fn sqlite_store() -> (TempDir, Store) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = Store::open(&dir.path().join("state.db")).expect("Failed to open store");
    (dir, store)
}

/// Reopen the database created by [`sqlite_store`]
pub fn reopen(dir: &TempDir) -> Store {
    Store::open(&dir.path().join("state.db")).expect("Failed to reopen store")
}

/// Reward manager with default settings over `store`
pub fn rewards(store: &Store) -> RewardManager {
    RewardManager::new(store.clone(), RewardSettings::default())
}

/// Deterministic RNG for roll-based tests
pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(7)
}
