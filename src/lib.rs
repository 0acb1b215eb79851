//! Questlog - a gamified task list
//!
//! Completing tasks feeds a reward loop: XP and gems, random critical hits
//! and crate drops, streaks, medals, and a purchasable skill tree. All state
//! lives in a small key-value store (SQLite on disk, or in memory for tests)
//! and is exposed through typed services that share one [`store::Store`].
//!
//! ## Layout
//!
//! - [`store`]: key-value persistence with typed JSON helpers
//! - [`domain`]: plain data types (tasks, events, friends, profile)
//! - [`tasks`]: task and calendar store with an optional remote mirror
//! - [`rewards`]: currencies, rolls, medals, skills, streaks, crates
//! - [`leaderboard`]: monthly snapshot and ranking
//! - [`social`]: user directory, friends, and messages
//! - [`timer`]: cancellable scheduling and the focus timer
//! - [`config`]: `~/.questlog/config.toml`

pub mod config;
pub mod domain;
pub mod leaderboard;
pub mod rewards;
pub mod social;
pub mod store;
pub mod tasks;
pub mod timer;

pub use domain::*;
