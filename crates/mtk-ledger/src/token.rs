//! The ledger instance and its public operations.
//!
//! [`Token`] composes access control, the balance ledger, supply, exchange
//! and faucet. Every mutating operation validates everything it needs before
//! the first write, so a failing call leaves no trace: no state change and
//! no event.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::access::AccessControl;
use crate::address::Address;
use crate::amount::Amount;
use crate::call::{Call, Receipt};
use crate::clock::{Clock, SystemClock, Timestamp};
use crate::config::TokenConfig;
use crate::error::{LedgerError, Result};
use crate::event::{Event, EventLog, EventRecord, History};
use crate::exchange::{Exchange, NativeTransfer};
use crate::faucet::Faucet;
use crate::ledger::Ledger;
use crate::supply::SupplyController;

/// Immutable token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Token name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
    /// Decimal places.
    pub decimals: u8,
}

/// A single fungible-value ledger.
#[derive(Debug)]
pub struct Token {
    metadata: TokenMetadata,
    contract: Address,
    access: AccessControl,
    ledger: Ledger,
    supply: SupplyController,
    exchange: Exchange,
    faucet: Faucet,
    log: EventLog,
    clock: Arc<dyn Clock>,
}

impl Token {
    /// Deploy a ledger owned by `owner`, using wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns error if the config is invalid or `owner` is the zero address.
    pub fn new(owner: Address, config: &TokenConfig) -> Result<Self> {
        Self::with_clock(owner, config, Arc::new(SystemClock))
    }

    /// Deploy a ledger owned by `owner`, reading time from `clock`.
    ///
    /// Issues the initial supply to the owner, then moves
    /// `contract_funding` from the owner into the contract account.
    ///
    /// # Errors
    ///
    /// Returns error if the config is invalid or `owner` is the zero address.
    pub fn with_clock(owner: Address, config: &TokenConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        if owner.is_zero() {
            return Err(LedgerError::config("owner must not be the zero address"));
        }

        let contract = Address::derive(&owner, &config.symbol);
        let mut token = Self {
            metadata: TokenMetadata {
                name: config.name.clone(),
                symbol: config.symbol.clone(),
                decimals: config.decimals,
            },
            contract,
            access: AccessControl::new(owner),
            ledger: Ledger::new(),
            supply: SupplyController::new(),
            exchange: Exchange::new(config.tokens_per_unit),
            faucet: Faucet::new(config.faucet_amount, config.claim_cooldown_secs),
            log: EventLog::new(),
            clock,
        };

        token.issue(&owner, config.initial_supply)?;
        if !config.contract_funding.is_zero() {
            token.transfer(&owner, &contract, config.contract_funding)?;
        }

        info!(
            owner = %owner,
            contract = %contract,
            symbol = %token.metadata.symbol,
            initial_supply = %config.initial_supply,
            "token deployed"
        );
        Ok(token)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Token metadata.
    #[must_use]
    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    /// Token name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Token symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    /// Decimal places.
    #[must_use]
    pub fn decimals(&self) -> u8 {
        self.metadata.decimals
    }

    /// The ledger's own account, which funds purchases and faucet claims.
    #[must_use]
    pub fn contract_address(&self) -> Address {
        self.contract
    }

    /// The owner identity.
    #[must_use]
    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    /// Total issued supply.
    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.supply.total_supply()
    }

    /// Balance of `account`.
    #[must_use]
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.ledger.balance_of(account)
    }

    /// Amount `spender` may move on behalf of `owner`.
    #[must_use]
    pub fn allowance(&self, owner: &Address, spender: &Address) -> Amount {
        self.ledger.allowance(owner, spender)
    }

    /// Non-zero balances.
    #[must_use]
    pub fn balances(&self) -> BTreeMap<Address, Amount> {
        self.ledger.balances()
    }

    /// Non-zero allowances keyed by (owner, spender).
    #[must_use]
    pub fn allowances(&self) -> BTreeMap<(Address, Address), Amount> {
        self.ledger.allowances()
    }

    /// Tokens per unit of native currency.
    #[must_use]
    pub fn tokens_per_unit(&self) -> u64 {
        self.exchange.tokens_per_unit()
    }

    /// Native currency held by the ledger.
    #[must_use]
    pub fn reserve(&self) -> Amount {
        self.exchange.reserve()
    }

    /// Tokens per faucet claim.
    #[must_use]
    pub fn faucet_amount(&self) -> Amount {
        self.faucet.amount()
    }

    /// Seconds between faucet claims.
    #[must_use]
    pub fn claim_cooldown(&self) -> u64 {
        self.faucet.cooldown_secs()
    }

    /// Time of `account`'s last claim; zero if it never claimed.
    #[must_use]
    pub fn last_claim_time(&self, account: &Address) -> Timestamp {
        self.faucet.last_claim_time(account)
    }

    /// Earliest time `account` may claim again; zero if it may claim now.
    #[must_use]
    pub fn next_claim_time(&self, account: &Address) -> Timestamp {
        self.faucet.next_claim_time(account)
    }

    /// Current time as seen by the ledger.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// All events since deployment.
    #[must_use]
    pub fn events(&self) -> &[EventRecord] {
        self.log.records()
    }

    /// Events with a sequence number greater than `seq`.
    #[must_use]
    pub fn events_since(&self, seq: u64) -> &[EventRecord] {
        self.log.since(seq)
    }

    /// Live stream of future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.log.subscribe()
    }

    /// Tables rebuilt from the event log.
    ///
    /// # Errors
    ///
    /// Returns error if the log does not replay cleanly.
    pub fn history(&self) -> Result<History> {
        History::replay(self.log.records())
    }

    /// Whether the balances sum to the total supply.
    #[must_use]
    pub fn is_conserved(&self) -> bool {
        self.ledger.sum_balances() == Some(self.supply.total_supply())
    }

    // =========================================================================
    // Ledger
    // =========================================================================

    /// Move `amount` from `caller` to `to`.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidRecipient`] if `to` is the zero address
    /// - [`LedgerError::InsufficientBalance`] if `caller` holds too little
    pub fn transfer(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<Receipt> {
        let now = self.clock.now();
        let movement = self.ledger.plan_transfer(caller, to, amount)?;
        let event = self.ledger.commit_transfer(movement);
        info!(caller = %caller, to = %to, amount = %amount, "transfer");
        Ok(self.emit(vec![event], now))
    }

    /// Set `caller`'s allowance for `spender` to exactly `amount`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidSpender`] if `spender` is the zero address.
    pub fn approve(&mut self, caller: &Address, spender: &Address, amount: Amount) -> Result<Receipt> {
        let now = self.clock.now();
        let event = self.ledger.set_allowance(caller, spender, amount)?;
        info!(owner = %caller, spender = %spender, amount = %amount, "approve");
        Ok(self.emit(vec![event], now))
    }

    /// Move `amount` from `from` to `to`, spending `caller`'s allowance.
    ///
    /// Emits the updated allowance as an `Approval` before the `Transfer`,
    /// so allowances can be rebuilt from the log.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InsufficientAllowance`] if the allowance is too low
    /// - [`LedgerError::InvalidRecipient`] if `to` is the zero address
    /// - [`LedgerError::InsufficientBalance`] if `from` holds too little
    pub fn transfer_from(
        &mut self,
        caller: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<Receipt> {
        let now = self.clock.now();
        let remaining = self.ledger.plan_spend(from, caller, amount)?;
        let movement = self.ledger.plan_transfer(from, to, amount)?;

        let approval = self.ledger.set_allowance(from, caller, remaining)?;
        let transfer = self.ledger.commit_transfer(movement);
        info!(
            spender = %caller,
            from = %from,
            to = %to,
            amount = %amount,
            remaining = %remaining,
            "transfer_from"
        );
        Ok(self.emit(vec![approval, transfer], now))
    }

    // =========================================================================
    // Supply
    // =========================================================================

    /// Issue `amount` new tokens to `to` (owner only).
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the owner
    /// - [`LedgerError::Overflow`] if total supply would not fit
    /// - [`LedgerError::InvalidRecipient`] if `to` is the zero address
    pub fn mint(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<Receipt> {
        self.access.require_owner(caller)?;
        self.issue(to, amount)
    }

    fn issue(&mut self, to: &Address, amount: Amount) -> Result<Receipt> {
        let now = self.clock.now();
        let new_total = self.supply.plan_issue(amount)?;
        let credit = self.ledger.plan_credit(to, amount)?;

        self.supply.commit_issue(new_total);
        let event = self.ledger.commit_credit(credit);
        info!(to = %to, amount = %amount, total_supply = %new_total, "mint");
        Ok(self.emit(vec![event], now))
    }

    // =========================================================================
    // Exchange
    // =========================================================================

    /// Buy tokens with `paid_value` of native currency at the current rate.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::ZeroPayment`] if nothing was paid
    /// - [`LedgerError::ExchangeDisabled`] if the rate is zero
    /// - [`LedgerError::Overflow`] if the token amount or reserve would not fit
    /// - [`LedgerError::InsufficientLiquidity`] if the contract holds too few tokens
    pub fn buy(&mut self, caller: &Address, paid_value: Amount) -> Result<Receipt> {
        let now = self.clock.now();
        let token_amount = self.exchange.quote(paid_value)?;
        self.require_liquidity(token_amount)?;
        let movement = self
            .ledger
            .plan_transfer(&self.contract, caller, token_amount)?;
        let new_reserve = self.exchange.plan_deposit(paid_value)?;

        let transfer = self.ledger.commit_transfer(movement);
        self.exchange.commit_deposit(new_reserve);
        info!(
            buyer = %caller,
            paid_value = %paid_value,
            token_amount = %token_amount,
            rate = self.exchange.tokens_per_unit(),
            "tokens purchased"
        );
        let purchase = Event::TokensPurchased {
            buyer: *caller,
            paid_value,
            token_amount,
        };
        Ok(self.emit(vec![transfer, purchase], now))
    }

    /// Change the exchange rate (owner only). Zero switches purchases off.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Unauthorized`] if `caller` is not the owner.
    pub fn set_exchange_rate(&mut self, caller: &Address, rate: u64) -> Result<Receipt> {
        self.access.require_owner(caller)?;
        let previous = self.exchange.tokens_per_unit();
        self.exchange.set_tokens_per_unit(rate);
        info!(previous, rate, "exchange rate updated");
        Ok(Receipt::default())
    }

    /// Pay the whole native reserve to the owner (owner only).
    ///
    /// The reserve is zeroed before `rail` is invoked and restored if the
    /// payout is rejected.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::Unauthorized`] if `caller` is not the owner
    /// - [`LedgerError::TransferFailed`] if `rail` rejects the payout
    pub fn withdraw(&mut self, caller: &Address, rail: &mut dyn NativeTransfer) -> Result<Receipt> {
        self.access.require_owner(caller)?;
        let owner = self.access.owner();
        let amount = self.exchange.take_reserve();

        if let Err(rejected) = rail.send(&owner, amount) {
            self.exchange.restore_reserve(amount);
            warn!(owner = %owner, amount = %amount, reason = %rejected, "withdrawal rejected");
            return Err(LedgerError::TransferFailed {
                reason: rejected.reason,
            });
        }

        info!(owner = %owner, amount = %amount, "reserve withdrawn");
        Ok(Receipt {
            events: Vec::new(),
            payout: Some(amount),
        })
    }

    // =========================================================================
    // Faucet
    // =========================================================================

    /// Claim the faucet amount, at most once per cooldown window.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::CooldownActive`] if `caller` claimed too recently
    /// - [`LedgerError::InsufficientLiquidity`] if the contract holds too few tokens
    pub fn claim(&mut self, caller: &Address) -> Result<Receipt> {
        let now = self.clock.now();
        self.faucet.check(caller, now)?;
        let amount = self.faucet.amount();
        self.require_liquidity(amount)?;
        let movement = self.ledger.plan_transfer(&self.contract, caller, amount)?;

        let event = self.ledger.commit_transfer(movement);
        self.faucet.record_claim(caller, now);
        info!(
            account = %caller,
            amount = %amount,
            next_claim = self.faucet.next_claim_time(caller),
            "faucet claim"
        );
        Ok(self.emit(vec![event], now))
    }

    /// Change the faucet amount (owner only).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Unauthorized`] if `caller` is not the owner.
    pub fn set_faucet_amount(&mut self, caller: &Address, amount: Amount) -> Result<Receipt> {
        self.access.require_owner(caller)?;
        self.faucet.set_amount(amount);
        info!(amount = %amount, "faucet amount updated");
        Ok(Receipt::default())
    }

    /// Change the faucet cooldown (owner only).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Unauthorized`] if `caller` is not the owner.
    pub fn set_cooldown(&mut self, caller: &Address, seconds: u64) -> Result<Receipt> {
        self.access.require_owner(caller)?;
        self.faucet.set_cooldown_secs(seconds);
        info!(seconds, "faucet cooldown updated");
        Ok(Receipt::default())
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Route `call` from `caller` to its operation.
    ///
    /// `rail` is only used by [`Call::Withdraw`].
    ///
    /// # Errors
    ///
    /// Returns whatever the routed operation returns.
    pub fn dispatch(
        &mut self,
        caller: &Address,
        call: &Call,
        rail: &mut dyn NativeTransfer,
    ) -> Result<Receipt> {
        match call {
            Call::Transfer { to, amount } => self.transfer(caller, to, *amount),
            Call::Approve { spender, amount } => self.approve(caller, spender, *amount),
            Call::TransferFrom { from, to, amount } => {
                self.transfer_from(caller, from, to, *amount)
            }
            Call::Mint { to, amount } => self.mint(caller, to, *amount),
            Call::Buy { value } => self.buy(caller, *value),
            Call::Claim => self.claim(caller),
            Call::Withdraw => self.withdraw(caller, rail),
            Call::SetExchangeRate { rate } => self.set_exchange_rate(caller, *rate),
            Call::SetFaucetAmount { amount } => self.set_faucet_amount(caller, *amount),
            Call::SetCooldown { seconds } => self.set_cooldown(caller, *seconds),
        }
    }

    fn require_liquidity(&self, requested: Amount) -> Result<()> {
        let available = self.ledger.balance_of(&self.contract);
        if available < requested {
            return Err(LedgerError::InsufficientLiquidity {
                available,
                requested,
            });
        }
        Ok(())
    }

    fn emit(&mut self, events: Vec<Event>, now: Timestamp) -> Receipt {
        debug_assert!(self.is_conserved(), "balances diverged from total supply");
        Receipt {
            events: self.log.append(events, now),
            payout: None,
        }
    }
}
