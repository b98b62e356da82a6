//! Thread-safe handle to a [`Token`].
//!
//! Every call takes the lock for its whole duration, so calls are totally
//! ordered and no two faucet claims from one account can both pass the
//! cooldown check.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::address::Address;
use crate::amount::Amount;
use crate::call::{Call, Receipt};
use crate::error::Result;
use crate::event::EventRecord;
use crate::exchange::NativeTransfer;
use crate::token::Token;

/// Cloneable, lock-protected [`Token`].
#[derive(Debug, Clone)]
pub struct SharedToken {
    inner: Arc<Mutex<Token>>,
}

impl SharedToken {
    /// Wrap a token.
    #[must_use]
    pub fn new(token: Token) -> Self {
        Self {
            inner: Arc::new(Mutex::new(token)),
        }
    }

    /// Run `f` with exclusive access.
    pub fn with<R>(&self, f: impl FnOnce(&mut Token) -> R) -> R {
        let mut token = self.inner.lock();
        f(&mut token)
    }

    /// Run `f` with read access.
    pub fn read<R>(&self, f: impl FnOnce(&Token) -> R) -> R {
        let token = self.inner.lock();
        f(&token)
    }

    /// Route a call to the token.
    ///
    /// # Errors
    ///
    /// Returns whatever [`Token::dispatch`] returns.
    pub fn dispatch(
        &self,
        caller: &Address,
        call: &Call,
        rail: &mut dyn NativeTransfer,
    ) -> Result<Receipt> {
        self.with(|token| token.dispatch(caller, call, rail))
    }

    /// Balance of `account`.
    #[must_use]
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.read(|token| token.balance_of(account))
    }

    /// Total issued supply.
    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.read(Token::total_supply)
    }

    /// Events with a sequence number greater than `seq`.
    #[must_use]
    pub fn events_since(&self, seq: u64) -> Vec<EventRecord> {
        self.read(|token| token.events_since(seq).to_vec())
    }

    /// Live stream of future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.read(Token::subscribe)
    }
}

impl From<Token> for SharedToken {
    fn from(token: Token) -> Self {
        Self::new(token)
    }
}
