//! Total supply tracking.

use crate::amount::Amount;
use crate::error::{LedgerError, Result};

/// Tracks total issued supply. Supply only grows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupplyController {
    total_supply: Amount,
}

impl SupplyController {
    /// Create a controller with nothing issued.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            total_supply: Amount::ZERO,
        }
    }

    /// Total issued supply.
    #[must_use]
    pub const fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Validate issuing `amount` and return the resulting total.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the total would not fit.
    pub fn plan_issue(&self, amount: Amount) -> Result<Amount> {
        self.total_supply
            .checked_add(amount)
            .ok_or_else(|| LedgerError::overflow("mint"))
    }

    /// Record a total returned by [`Self::plan_issue`].
    pub fn commit_issue(&mut self, new_total: Amount) {
        debug_assert!(new_total >= self.total_supply);
        self.total_supply = new_total;
    }
}
