//! Balance and allowance tables.
//!
//! Mutations are split into a validating `plan_*` step that only reads and a
//! `commit` step that cannot fail. Callers validate every part of an
//! operation first and commit only once all plans succeeded, so a failed
//! operation leaves the tables untouched.

use std::collections::{BTreeMap, HashMap};

use crate::address::Address;
use crate::amount::Amount;
use crate::error::{LedgerError, Result};
use crate::event::Event;

/// A validated balance movement, ready to commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Movement {
    from: Address,
    to: Address,
    amount: Amount,
    from_after: Amount,
    to_after: Amount,
}

impl Movement {
    /// The notification this movement emits.
    pub const fn event(&self) -> Event {
        Event::Transfer {
            from: self.from,
            to: self.to,
            amount: self.amount,
        }
    }
}

/// A validated credit of newly issued tokens, ready to commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Credit {
    to: Address,
    amount: Amount,
    to_after: Amount,
}

impl Credit {
    /// The notification this credit emits (a transfer from the zero address).
    pub const fn event(&self) -> Event {
        Event::Transfer {
            from: Address::ZERO,
            to: self.to,
            amount: self.amount,
        }
    }
}

/// Account balances and spender allowances.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
}

impl Ledger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `account`; zero for unknown accounts.
    #[must_use]
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Amount `spender` may move on behalf of `owner`.
    #[must_use]
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or_default()
    }

    /// Non-zero balances, ordered by address.
    #[must_use]
    pub fn balances(&self) -> BTreeMap<Address, Amount> {
        self.balances
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(account, amount)| (*account, *amount))
            .collect()
    }

    /// Non-zero allowances keyed by (owner, spender).
    #[must_use]
    pub fn allowances(&self) -> BTreeMap<(Address, Address), Amount> {
        self.allowances
            .iter()
            .filter(|(_, amount)| !amount.is_zero())
            .map(|(key, amount)| (*key, *amount))
            .collect()
    }

    /// Sum of all balances, or `None` if it does not fit.
    #[must_use]
    pub fn sum_balances(&self) -> Option<Amount> {
        self.balances
            .values()
            .try_fold(Amount::ZERO, |acc, amount| acc.checked_add(*amount))
    }

    /// Validate moving `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidRecipient`] if `to` is the zero address
    /// - [`LedgerError::InsufficientBalance`] if `from` holds less than `amount`
    pub fn plan_transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<Movement> {
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }

        let have = self.balance_of(from);
        let from_after = have
            .checked_sub(amount)
            .ok_or(LedgerError::InsufficientBalance {
                account: *from,
                have,
                need: amount,
            })?;

        let to_after = if from == to {
            have
        } else {
            self.balance_of(to)
                .checked_add(amount)
                .ok_or_else(|| LedgerError::overflow("transfer"))?
        };

        Ok(Movement {
            from: *from,
            to: *to,
            amount,
            from_after,
            to_after,
        })
    }

    /// Validate crediting `amount` of newly issued tokens to `to`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidRecipient`] if `to` is the zero address
    /// - [`LedgerError::Overflow`] if the balance would not fit
    pub fn plan_credit(&self, to: &Address, amount: Amount) -> Result<Credit> {
        if to.is_zero() {
            return Err(LedgerError::InvalidRecipient);
        }
        let to_after = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::overflow("mint"))?;
        Ok(Credit {
            to: *to,
            amount,
            to_after,
        })
    }

    /// Validate spending `amount` of the (owner, spender) allowance and
    /// return the remaining allowance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InsufficientAllowance`] if the allowance is
    /// below `amount`.
    pub fn plan_spend(&self, owner: &Address, spender: &Address, amount: Amount) -> Result<Amount> {
        let have = self.allowance(owner, spender);
        have.checked_sub(amount)
            .ok_or(LedgerError::InsufficientAllowance {
                owner: *owner,
                spender: *spender,
                have,
                need: amount,
            })
    }

    /// Apply a validated movement.
    pub fn commit_transfer(&mut self, movement: Movement) -> Event {
        if movement.from != movement.to {
            self.balances.insert(movement.from, movement.from_after);
        }
        self.balances.insert(movement.to, movement.to_after);
        movement.event()
    }

    /// Apply a validated credit.
    pub fn commit_credit(&mut self, credit: Credit) -> Event {
        self.balances.insert(credit.to, credit.to_after);
        credit.event()
    }

    /// Overwrite the (owner, spender) allowance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidSpender`] if `spender` is the zero address.
    pub fn set_allowance(&mut self, owner: &Address, spender: &Address, amount: Amount) -> Result<Event> {
        if spender.is_zero() {
            return Err(LedgerError::InvalidSpender);
        }
        self.allowances.insert((*owner, *spender), amount);
        Ok(Event::Approval {
            owner: *owner,
            spender: *spender,
            amount,
        })
    }
}
