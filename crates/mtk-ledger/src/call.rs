//! Dispatchable ledger calls and their receipts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::address::Address;
use crate::amount::Amount;
use crate::event::EventRecord;

/// A mutating ledger operation. The caller travels alongside the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    /// Move tokens from the caller.
    Transfer {
        /// Recipient.
        to: Address,
        /// Amount to move.
        amount: Amount,
    },
    /// Set the caller's allowance for `spender`.
    Approve {
        /// Spender.
        spender: Address,
        /// New allowance.
        amount: Amount,
    },
    /// Move tokens from `from` using the caller's allowance.
    TransferFrom {
        /// Account debited.
        from: Address,
        /// Recipient.
        to: Address,
        /// Amount to move.
        amount: Amount,
    },
    /// Issue new tokens (owner only).
    Mint {
        /// Recipient.
        to: Address,
        /// Amount to issue.
        amount: Amount,
    },
    /// Buy tokens with native currency.
    Buy {
        /// Native value attached to the call.
        value: Amount,
    },
    /// Claim from the faucet.
    Claim,
    /// Pay the native reserve out to the owner (owner only).
    Withdraw,
    /// Change the exchange rate (owner only).
    SetExchangeRate {
        /// Tokens per unit of native currency.
        rate: u64,
    },
    /// Change the faucet amount (owner only).
    SetFaucetAmount {
        /// Tokens per claim.
        amount: Amount,
    },
    /// Change the faucet cooldown (owner only).
    SetCooldown {
        /// Seconds between claims.
        seconds: u64,
    },
}

impl Call {
    /// Operation name, as used in logs and scripts.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "transfer",
            Self::Approve { .. } => "approve",
            Self::TransferFrom { .. } => "transfer_from",
            Self::Mint { .. } => "mint",
            Self::Buy { .. } => "buy",
            Self::Claim => "claim",
            Self::Withdraw => "withdraw",
            Self::SetExchangeRate { .. } => "set_exchange_rate",
            Self::SetFaucetAmount { .. } => "set_faucet_amount",
            Self::SetCooldown { .. } => "set_cooldown",
        }
    }

    /// Whether only the owner may make this call.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(
            self,
            Self::Mint { .. }
                | Self::Withdraw
                | Self::SetExchangeRate { .. }
                | Self::SetFaucetAmount { .. }
                | Self::SetCooldown { .. }
        )
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Outcome of a successful call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Events emitted by the call, in order.
    pub events: Vec<EventRecord>,
    /// Native value paid out (withdrawals only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout: Option<Amount>,
}
