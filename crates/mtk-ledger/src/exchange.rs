//! Native-currency-to-token exchange and its reserve.
//!
//! The exchange prices purchases at the rate in force when the purchase
//! executes and accumulates the native value paid into a reserve that only
//! the owner can withdraw. Payouts leave the ledger through a
//! [`NativeTransfer`] rail supplied by the host.

use thiserror::Error;

use crate::address::Address;
use crate::amount::Amount;
use crate::error::{LedgerError, Result};

/// Default exchange rate: tokens per unit of native currency.
pub const DEFAULT_TOKENS_PER_UNIT: u64 = 1000;

/// A payout refused by the receiving side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct PayoutRejected {
    /// Why the payout was refused.
    pub reason: String,
}

impl PayoutRejected {
    /// Create a rejection with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Rail that moves native currency out of the ledger.
pub trait NativeTransfer {
    /// Send `amount` of native currency to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`PayoutRejected`] if the recipient refuses the payment.
    fn send(&mut self, to: &Address, amount: Amount) -> std::result::Result<(), PayoutRejected>;
}

/// A [`NativeTransfer`] that records payouts in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransfer {
    payouts: Vec<(Address, Amount)>,
    reject_reason: Option<String>,
}

impl RecordingTransfer {
    /// A rail that accepts every payout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A rail that refuses every payout with `reason`.
    #[must_use]
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self {
            payouts: Vec::new(),
            reject_reason: Some(reason.into()),
        }
    }

    /// Payouts accepted so far.
    #[must_use]
    pub fn payouts(&self) -> &[(Address, Amount)] {
        &self.payouts
    }

    /// Total native value received by `account`.
    #[must_use]
    pub fn received_by(&self, account: &Address) -> Amount {
        self.payouts
            .iter()
            .filter(|(to, _)| to == account)
            .fold(Amount::ZERO, |acc, (_, amount)| {
                acc.checked_add(*amount).unwrap_or(Amount::MAX)
            })
    }
}

impl NativeTransfer for RecordingTransfer {
    fn send(&mut self, to: &Address, amount: Amount) -> std::result::Result<(), PayoutRejected> {
        if let Some(reason) = &self.reject_reason {
            return Err(PayoutRejected::new(reason.clone()));
        }
        self.payouts.push((*to, amount));
        Ok(())
    }
}

/// Exchange rate and native-currency reserve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    tokens_per_unit: u64,
    reserve: Amount,
}

impl Exchange {
    /// Create an exchange with an empty reserve.
    #[must_use]
    pub const fn new(tokens_per_unit: u64) -> Self {
        Self {
            tokens_per_unit,
            reserve: Amount::ZERO,
        }
    }

    /// Current rate.
    #[must_use]
    pub const fn tokens_per_unit(&self) -> u64 {
        self.tokens_per_unit
    }

    /// Native currency held.
    #[must_use]
    pub const fn reserve(&self) -> Amount {
        self.reserve
    }

    /// Replace the rate.
    pub fn set_tokens_per_unit(&mut self, rate: u64) {
        self.tokens_per_unit = rate;
    }

    /// Tokens owed for `paid_value` at the current rate.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ZeroPayment`] if nothing was paid
    /// - [`LedgerError::ExchangeDisabled`] if the rate is zero
    /// - [`LedgerError::Overflow`] if the product does not fit
    pub fn quote(&self, paid_value: Amount) -> Result<Amount> {
        if paid_value.is_zero() {
            return Err(LedgerError::ZeroPayment);
        }
        if self.tokens_per_unit == 0 {
            return Err(LedgerError::ExchangeDisabled);
        }
        paid_value
            .checked_mul(u128::from(self.tokens_per_unit))
            .ok_or_else(|| LedgerError::overflow("buy"))
    }

    /// Validate depositing `paid_value` and return the resulting reserve.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Overflow`] if the reserve would not fit.
    pub fn plan_deposit(&self, paid_value: Amount) -> Result<Amount> {
        self.reserve
            .checked_add(paid_value)
            .ok_or_else(|| LedgerError::overflow("reserve"))
    }

    /// Record a reserve returned by [`Self::plan_deposit`].
    pub fn commit_deposit(&mut self, new_reserve: Amount) {
        self.reserve = new_reserve;
    }

    /// Zero the reserve and return what it held.
    pub fn take_reserve(&mut self) -> Amount {
        std::mem::take(&mut self.reserve)
    }

    /// Put back a reserve taken by [`Self::take_reserve`].
    pub fn restore_reserve(&mut self, amount: Amount) {
        self.reserve = amount;
    }
}

impl Default for Exchange {
    fn default() -> Self {
        Self::new(DEFAULT_TOKENS_PER_UNIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_at_default_rate() {
        let exchange = Exchange::default();
        assert_eq!(
            exchange.quote(Amount::from_tokens(1)).ok(),
            Some(Amount::from_tokens(1000))
        );
    }

    #[test]
    fn test_quote_zero_payment() {
        let exchange = Exchange::default();
        assert!(matches!(
            exchange.quote(Amount::ZERO),
            Err(LedgerError::ZeroPayment)
        ));
    }

    #[test]
    fn test_quote_zero_rate_disabled() {
        let exchange = Exchange::new(0);
        assert!(matches!(
            exchange.quote(Amount::from_tokens(1)),
            Err(LedgerError::ExchangeDisabled)
        ));
    }

    #[test]
    fn test_quote_overflow() {
        let exchange = Exchange::new(u64::MAX);
        assert!(matches!(
            exchange.quote(Amount::MAX),
            Err(LedgerError::Overflow { operation: "buy" })
        ));
    }

    #[test]
    fn test_take_and_restore_reserve() {
        let mut exchange = Exchange::default();
        let reserve = exchange.plan_deposit(Amount::from_tokens(2)).expect("deposit");
        exchange.commit_deposit(reserve);

        let taken = exchange.take_reserve();
        assert_eq!(taken, Amount::from_tokens(2));
        assert_eq!(exchange.reserve(), Amount::ZERO);

        exchange.restore_reserve(taken);
        assert_eq!(exchange.reserve(), Amount::from_tokens(2));
    }

    #[test]
    fn test_recording_transfer() {
        let mut rail = RecordingTransfer::new();
        let owner = Address::random();
        rail.send(&owner, Amount::from_tokens(1)).expect("send");
        rail.send(&owner, Amount::from_tokens(2)).expect("send");
        assert_eq!(rail.received_by(&owner), Amount::from_tokens(3));
        assert_eq!(rail.payouts().len(), 2);
    }

    #[test]
    fn test_rejecting_transfer() {
        let mut rail = RecordingTransfer::rejecting("recipient refused");
        let result = rail.send(&Address::random(), Amount::from_tokens(1));
        assert_eq!(result, Err(PayoutRejected::new("recipient refused")));
        assert!(rail.payouts().is_empty());
    }
}
