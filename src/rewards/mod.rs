//! Reward system: gems, XP, critical rolls, medals, skills, streaks, and crates
//!
//! Each component owns one slice of persisted state and reads/writes it through
//! an injected [`Store`](crate::store::Store). [`RewardManager`] wires them into
//! the task completion and crate opening flows.

pub mod crates;
pub mod critical;
pub mod currency;
mod manager;
pub mod medals;
pub mod skills;
pub mod streaks;
pub mod xp;

pub use crates::{CrateOpener, CratePhase, CrateReward, BRONZE_REWARDS};
pub use critical::{CriticalChances, CriticalResult, CriticalRoller, TestMode};
pub use currency::GemLedger;
pub use manager::{Progress, RewardEvent, RewardManager, RewardSettings};
pub use medals::{Medal, MedalCriteria, MedalId, MedalTracker, MEDALS};
pub use skills::{CostType, Skill, SkillDef, SkillEvent, SkillTree, Tree, SKILLS};
pub use streaks::{StreakInfo, StreakTracker};
pub use xp::{level_for_xp, LevelUp, XpLedger, XpState};
