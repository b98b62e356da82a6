//! # mtk-ledger
//!
//! A single fungible-value ledger: balances, delegated spending allowances,
//! owner-gated issuance, purchases with native currency at an adjustable
//! rate, owner withdrawal of the collected currency, and a rate-limited
//! faucet.
//!
//! ## Token Details
//!
//! - **Name / Symbol**: `MyToken` / `MTK` by default
//! - **Decimals**: 18 (1 MTK = `10^18` base units)
//! - **Initial supply**: 1000 MTK, issued to the owner
//! - **Exchange rate**: 1000 MTK per unit of native currency
//! - **Faucet**: 50 MTK per claim, one claim per 72 hours per account
//!
//! Purchases and faucet claims are paid from the contract account, whose
//! address is derived from the owner and symbol. It holds nothing until
//! someone transfers tokens to it.
//!
//! ## Example
//!
//! ```rust
//! use mtk_ledger::{Address, Amount, Token, TokenConfig};
//!
//! # fn example() -> mtk_ledger::Result<()> {
//! let owner = Address::random();
//! let alice = Address::random();
//! let mut token = Token::new(owner, &TokenConfig::default())?;
//!
//! // Stock the contract, then buy with 1 unit of native currency.
//! let contract = token.contract_address();
//! token.transfer(&owner, &contract, Amount::from_tokens(1000))?;
//! let receipt = token.buy(&alice, Amount::from_tokens(1))?;
//!
//! assert_eq!(token.balance_of(&alice), Amount::from_tokens(1000));
//! assert_eq!(receipt.events.len(), 2);
//! # Ok(())
//! # }
//! # example().expect("example");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod access;
pub mod address;
pub mod amount;
pub mod call;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod exchange;
pub mod faucet;
pub mod ledger;
pub mod shared;
pub mod supply;
pub mod token;

pub use access::AccessControl;
pub use address::{Address, ADDRESS_LEN};
pub use amount::{Amount, BASE_UNITS_PER_TOKEN, DECIMALS};
pub use call::{Call, Receipt};
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use config::TokenConfig;
pub use error::{LedgerError, Result};
pub use event::{Event, EventLog, EventRecord, History};
pub use exchange::{NativeTransfer, PayoutRejected, RecordingTransfer};
pub use shared::SharedToken;
pub use token::{Token, TokenMetadata};

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    enum Op {
        Transfer(usize, usize, u128),
        Approve(usize, usize, u128),
        TransferFrom(usize, usize, usize, u128),
        Mint(usize, u128),
        Buy(usize, u128),
        Claim(usize),
        Advance(u64),
    }

    const ACCOUNTS: usize = 4;

    fn op() -> impl Strategy<Value = Op> {
        let idx = 0..ACCOUNTS;
        let amt = 0u128..2_000_000_000_000_000_000_000;
        prop_oneof![
            (idx.clone(), idx.clone(), amt.clone()).prop_map(|(a, b, n)| Op::Transfer(a, b, n)),
            (idx.clone(), idx.clone(), amt.clone()).prop_map(|(a, b, n)| Op::Approve(a, b, n)),
            (idx.clone(), idx.clone(), idx.clone(), amt.clone())
                .prop_map(|(s, a, b, n)| Op::TransferFrom(s, a, b, n)),
            (idx.clone(), amt.clone()).prop_map(|(a, n)| Op::Mint(a, n)),
            (idx.clone(), 0u128..1_000_000_000_000_000_000).prop_map(|(a, n)| Op::Buy(a, n)),
            idx.prop_map(Op::Claim),
            (0u64..300_000).prop_map(Op::Advance),
        ]
    }

    proptest! {
        #[test]
        fn balances_always_sum_to_supply(ops in prop::collection::vec(op(), 1..60)) {
            let clock = ManualClock::new(1_000);
            let owner = Address::new([1; ADDRESS_LEN]);
            let config = TokenConfig {
                contract_funding: Amount::from_tokens(500),
                ..TokenConfig::default()
            };
            let mut token = Token::with_clock(owner, &config, Arc::new(clock.clone()))
                .expect("deploy");
            let mut accounts: Vec<Address> =
                (2..=ACCOUNTS as u8).map(|b| Address::new([b; ADDRESS_LEN])).collect();
            accounts.insert(0, owner);

            for op in ops {
                let before = token.events().len();
                let result = match op {
                    Op::Transfer(a, b, n) => {
                        token.transfer(&accounts[a], &accounts[b], Amount::from_base_units(n))
                    }
                    Op::Approve(a, b, n) => {
                        token.approve(&accounts[a], &accounts[b], Amount::from_base_units(n))
                    }
                    Op::TransferFrom(s, a, b, n) => token.transfer_from(
                        &accounts[s],
                        &accounts[a],
                        &accounts[b],
                        Amount::from_base_units(n),
                    ),
                    Op::Mint(a, n) => token.mint(&owner, &accounts[a], Amount::from_base_units(n)),
                    Op::Buy(a, n) => token.buy(&accounts[a], Amount::from_base_units(n)),
                    Op::Claim(a) => token.claim(&accounts[a]),
                    Op::Advance(secs) => {
                        clock.advance(secs);
                        Ok(Receipt::default())
                    }
                };
                if result.is_err() {
                    prop_assert_eq!(token.events().len(), before);
                }
                prop_assert!(token.is_conserved());
            }

            let history = token.history().expect("replay");
            prop_assert_eq!(history.balances, token.balances());
            prop_assert_eq!(history.allowances, token.allowances());
            prop_assert_eq!(history.total_supply, token.total_supply());
            prop_assert_eq!(history.total_paid, token.reserve());
        }

        #[test]
        fn failed_transfer_changes_nothing(extra in 1u128..1_000_000) {
            let owner = Address::new([1; ADDRESS_LEN]);
            let to = Address::new([2; ADDRESS_LEN]);
            let mut token = Token::with_clock(
                owner,
                &TokenConfig::default(),
                Arc::new(ManualClock::new(0)),
            )
            .expect("deploy");
            let have = token.balance_of(&owner).base_units();

            let result = token.transfer(&owner, &to, Amount::from_base_units(have + extra));
            prop_assert!(
                matches!(result, Err(LedgerError::InsufficientBalance { .. })),
                "expected InsufficientBalance"
            );
            prop_assert_eq!(token.balance_of(&owner).base_units(), have);
            prop_assert_eq!(token.balance_of(&to), Amount::ZERO);
        }
    }
}
