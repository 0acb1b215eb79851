//! Gem ledger
//!
//! Gems are stored as a plain integer string. The balance can never go negative:
//! a spend larger than the balance is refused and leaves it untouched.

use crate::store::{Result, StorageKey, Store};

/// Integer gem balance with an insufficient-funds guard
#[derive(Clone)]
pub struct GemLedger {
    store: Store,
}

impl GemLedger {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Current balance (0 when unset or unreadable)
    pub fn balance(&self) -> Result<u64> {
        let Some(raw) = self.store.get_raw(StorageKey::Gems)? else {
            return Ok(0);
        };

        match raw.trim().parse::<i64>() {
            Ok(n) => Ok(n.max(0) as u64),
            Err(_) => {
                tracing::warn!("Gem balance '{}' is not an integer, treating as 0", raw);
                Ok(0)
            }
        }
    }

    pub fn set_balance(&self, amount: u64) -> Result<()> {
        self.store.set_raw(StorageKey::Gems, &amount.to_string())
    }

    /// Credit gems and return the new balance
    pub fn add(&self, amount: u64) -> Result<u64> {
        let new_balance = self.balance()?.saturating_add(amount);
        self.set_balance(new_balance)?;
        Ok(new_balance)
    }

    /// Debit gems; returns `false` without touching the balance when it is too low
    pub fn spend(&self, amount: u64) -> Result<bool> {
        let current = self.balance()?;
        if amount > current {
            tracing::debug!("Not enough gems: need {}, have {}", amount, current);
            return Ok(false);
        }
        self.set_balance(current - amount)?;
        Ok(true)
    }
}
