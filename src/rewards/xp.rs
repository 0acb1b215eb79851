//! XP ledger and level derivation
//!
//! XP has two counters: `current` is spendable (skills are bought with it) while
//! `total` only ever grows and drives the player's level.

use serde::{Deserialize, Serialize};

use crate::store::{Result, StorageKey, Store};

/// XP needed per level
pub const XP_PER_LEVEL: u64 = 100;

/// Persisted XP counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XpState {
    #[serde(default)]
    pub current: u64,
    #[serde(default)]
    pub total: u64,
}

impl XpState {
    pub fn level(&self) -> u32 {
        level_for_xp(self.total)
    }
}

/// Level for a lifetime XP total (level 1 at 0 XP)
pub fn level_for_xp(total_xp: u64) -> u32 {
    (total_xp / XP_PER_LEVEL) as u32 + 1
}

/// A level transition caused by an XP award
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub old_level: u32,
    pub new_level: u32,
}

/// Spendable XP plus lifetime total
#[derive(Clone)]
pub struct XpLedger {
    store: Store,
}

impl XpLedger {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn state(&self) -> Result<XpState> {
        self.store.load(StorageKey::Xp)
    }

    /// Spendable XP
    pub fn current(&self) -> Result<u64> {
        Ok(self.state()?.current)
    }

    /// Overwrite the spendable counter (lifetime total is untouched)
    pub fn set_current(&self, amount: u64) -> Result<()> {
        let mut state = self.state()?;
        state.current = amount;
        self.store.save(StorageKey::Xp, &state)
    }

    /// Add XP to both counters; reports a level up if one happened
    pub fn award(&self, amount: u64) -> Result<(XpState, Option<LevelUp>)> {
        let old = self.state()?;
        let new = XpState {
            current: old.current.saturating_add(amount),
            total: old.total.saturating_add(amount),
        };
        self.store.save(StorageKey::Xp, &new)?;

        let level_up = (new.level() > old.level()).then(|| LevelUp {
            old_level: old.level(),
            new_level: new.level(),
        });
        Ok((new, level_up))
    }

    /// Credit spendable XP only, returning a previous debit
    pub fn refund(&self, amount: u64) -> Result<()> {
        let mut state = self.state()?;
        state.current = state.current.saturating_add(amount);
        self.store.save(StorageKey::Xp, &state)
    }

    /// Debit spendable XP; `false` when the balance is too low
    pub fn spend(&self, amount: u64) -> Result<bool> {
        let mut state = self.state()?;
        if amount > state.current {
            tracing::debug!("Not enough XP: need {}, have {}", amount, state.current);
            return Ok(false);
        }
        state.current -= amount;
        self.store.save(StorageKey::Xp, &state)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_xp() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(1250), 13);
    }

    #[test]
    fn test_award_grows_both_counters() {
        let xp = XpLedger::new(Store::in_memory());
        let (state, level_up) = xp.award(60).unwrap();
        assert_eq!(state, XpState { current: 60, total: 60 });
        assert!(level_up.is_none());

        let (state, level_up) = xp.award(50).unwrap();
        assert_eq!(state.total, 110);
        assert_eq!(
            level_up,
            Some(LevelUp {
                old_level: 1,
                new_level: 2
            })
        );
    }

    #[test]
    fn test_spend_keeps_total() {
        let xp = XpLedger::new(Store::in_memory());
        xp.award(100).unwrap();
        assert!(xp.spend(80).unwrap());
        assert!(!xp.spend(21).unwrap());

        let state = xp.state().unwrap();
        assert_eq!(state.current, 20);
        assert_eq!(state.total, 100);
    }
}
