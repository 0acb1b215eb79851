//! Critical success rolls
//!
//! Every XP-giving action gets two independent percentage rolls: one for a 2x XP
//! critical hit and one for a bonus crate. Each roll can be forced to 100% with a
//! persisted test-mode flag.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::store::{Result, StorageKey, Store};

/// Default chance (percent) of a 2x XP critical hit
pub const DEFAULT_CRITICAL_HIT_CHANCE: u32 = 8;

/// Default chance (percent) of a bonus crate
pub const DEFAULT_CRATE_REWARD_CHANCE: u32 = 2;

/// XP multiplier applied on a critical hit
pub const CRITICAL_XP_MULTIPLIER: u32 = 2;

/// Outcome of one roll; never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriticalResult {
    pub is_critical: bool,
    /// 2 on a critical hit, otherwise 1
    pub xp_multiplier: u32,
    pub crate_reward: bool,
}

/// Effective roll percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalChances {
    pub critical_hit_chance: u32,
    pub crate_reward_chance: u32,
}

impl Default for CriticalChances {
    fn default() -> Self {
        Self {
            critical_hit_chance: DEFAULT_CRITICAL_HIT_CHANCE,
            crate_reward_chance: DEFAULT_CRATE_REWARD_CHANCE,
        }
    }
}

/// Independently switchable test modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestMode {
    /// Force every roll to be a critical hit
    Critical,
    /// Force every roll to award a crate
    Crate,
}

impl TestMode {
    fn key(&self) -> StorageKey {
        match self {
            Self::Critical => StorageKey::CriticalTestMode,
            Self::Crate => StorageKey::CrateTestMode,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Crate => "crate",
        }
    }
}

/// Rolls critical hits and bonus crates
#[derive(Clone)]
pub struct CriticalRoller {
    store: Store,
    base: CriticalChances,
}

impl CriticalRoller {
    /// Roller with the default 8% / 2% chances
    pub fn new(store: Store) -> Self {
        Self::with_chances(store, CriticalChances::default())
    }

    /// Roller with configured base chances
    pub fn with_chances(store: Store, base: CriticalChances) -> Self {
        Self { store, base }
    }

    pub fn is_test_mode(&self, mode: TestMode) -> Result<bool> {
        self.store.flag(mode.key())
    }

    pub fn set_test_mode(&self, mode: TestMode, enabled: bool) -> Result<()> {
        tracing::info!(
            "{} test mode {}",
            mode.as_str(),
            if enabled { "enabled" } else { "disabled" }
        );
        self.store.set_flag(mode.key(), enabled)
    }

    /// Currently effective percentages, with test modes applied
    pub fn chances(&self) -> Result<CriticalChances> {
        let critical_hit_chance = if self.is_test_mode(TestMode::Critical)? {
            100
        } else {
            self.base.critical_hit_chance
        };
        let crate_reward_chance = if self.is_test_mode(TestMode::Crate)? {
            100
        } else {
            self.base.crate_reward_chance
        };
        Ok(CriticalChances {
            critical_hit_chance,
            crate_reward_chance,
        })
    }

    /// Roll using the thread-local RNG
    pub fn roll(&self) -> Result<CriticalResult> {
        self.roll_with(&mut rand::thread_rng())
    }

    /// Roll with a caller-provided RNG
    pub fn roll_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<CriticalResult> {
        let chances = self.chances()?;
        Ok(roll_chances(chances, rng))
    }
}

/// Two independent uniform draws over `[0, 100)`
pub fn roll_chances<R: Rng + ?Sized>(chances: CriticalChances, rng: &mut R) -> CriticalResult {
    let hit_draw: f64 = rng.gen_range(0.0..100.0);
    let crate_draw: f64 = rng.gen_range(0.0..100.0);

    let xp_multiplier = if hit_draw < f64::from(chances.critical_hit_chance) {
        CRITICAL_XP_MULTIPLIER
    } else {
        1
    };

    CriticalResult {
        is_critical: xp_multiplier == CRITICAL_XP_MULTIPLIER,
        xp_multiplier,
        crate_reward: crate_draw < f64::from(chances.crate_reward_chance),
    }
}
