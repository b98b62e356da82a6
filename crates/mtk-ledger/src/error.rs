//! Error types for MTK ledger operations.

use thiserror::Error;

use crate::address::Address;
use crate::amount::Amount;
use crate::clock::Timestamp;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur during ledger operations.
///
/// Every operation error aborts the whole call: no state is mutated and no
/// event is emitted.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Caller is not the ledger owner.
    #[error("unauthorized: {caller} is not the owner")]
    Unauthorized {
        /// Identity that attempted the call.
        caller: Address,
    },

    /// Account balance is below the requested amount.
    #[error("insufficient balance: {account} has {have}, needs {need}")]
    InsufficientBalance {
        /// Account being debited.
        account: Address,
        /// Current balance.
        have: Amount,
        /// Requested amount.
        need: Amount,
    },

    /// Spender allowance is below the requested amount.
    #[error("insufficient allowance: {spender} may move {have} from {owner}, needs {need}")]
    InsufficientAllowance {
        /// Account whose tokens would move.
        owner: Address,
        /// Account attempting the move.
        spender: Address,
        /// Current allowance.
        have: Amount,
        /// Requested amount.
        need: Amount,
    },

    /// The contract account does not hold enough tokens to pay out.
    #[error("insufficient liquidity: contract holds {available}, needs {requested}")]
    InsufficientLiquidity {
        /// Tokens held by the contract account.
        available: Amount,
        /// Tokens the call would pay out.
        requested: Amount,
    },

    /// Arithmetic would exceed the representable range.
    #[error("arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed.
        operation: &'static str,
    },

    /// Faucet cooldown has not elapsed for this account.
    #[error("cooldown active: {account} may claim again at {retry_at}")]
    CooldownActive {
        /// Account that attempted the claim.
        account: Address,
        /// Earliest timestamp (unix seconds) at which a claim succeeds.
        retry_at: Timestamp,
    },

    /// Recipient is the zero identity.
    #[error("invalid recipient: zero address")]
    InvalidRecipient,

    /// Spender is the zero identity.
    #[error("invalid spender: zero address")]
    InvalidSpender,

    /// Purchase carried no native value.
    #[error("payment must be greater than zero")]
    ZeroPayment,

    /// Exchange rate is zero, so purchases are switched off.
    #[error("exchange disabled: rate is zero")]
    ExchangeDisabled,

    /// The native-currency payout was rejected by the recipient.
    #[error("transfer failed: {reason}")]
    TransferFailed {
        /// Reason reported by the payout rail.
        reason: String,
    },

    /// Invalid amount literal.
    #[error("invalid amount: {message}")]
    InvalidAmount {
        /// Description of the amount error.
        message: String,
    },

    /// Invalid address literal.
    #[error("invalid address: {message}")]
    InvalidAddress {
        /// Description of the address error.
        message: String,
    },

    /// Invalid configuration.
    #[error("invalid config: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LedgerError {
    /// Create an invalid amount error.
    #[must_use]
    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            message: message.into(),
        }
    }

    /// Create an invalid address error.
    #[must_use]
    pub fn invalid_address(message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            message: message.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an overflow error for the named operation.
    #[must_use]
    pub const fn overflow(operation: &'static str) -> Self {
        Self::Overflow { operation }
    }

    /// Stable machine-readable name of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::InsufficientBalance { .. } => "insufficient_balance",
            Self::InsufficientAllowance { .. } => "insufficient_allowance",
            Self::InsufficientLiquidity { .. } => "insufficient_liquidity",
            Self::Overflow { .. } => "overflow",
            Self::CooldownActive { .. } => "cooldown_active",
            Self::InvalidRecipient => "invalid_recipient",
            Self::InvalidSpender => "invalid_spender",
            Self::ZeroPayment => "zero_payment",
            Self::ExchangeDisabled => "exchange_disabled",
            Self::TransferFailed { .. } => "transfer_failed",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::InvalidAddress { .. } => "invalid_address",
            Self::Config { .. } => "config",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_balance_display() {
        let err = LedgerError::InsufficientBalance {
            account: Address::ZERO,
            have: Amount::from_tokens(5),
            need: Amount::from_tokens(10),
        };
        let msg = err.to_string();
        assert!(msg.contains("has 5"));
        assert!(msg.contains("needs 10"));
    }

    #[test]
    fn test_cooldown_display_includes_retry_time() {
        let err = LedgerError::CooldownActive {
            account: Address::ZERO,
            retry_at: 259_200,
        };
        assert!(err.to_string().contains("259200"));
    }

    #[test]
    fn test_kind_is_stable() {
        assert_eq!(LedgerError::ZeroPayment.kind(), "zero_payment");
        assert_eq!(LedgerError::overflow("mint").kind(), "overflow");
        assert_eq!(
            LedgerError::TransferFailed {
                reason: "rejected".to_string()
            }
            .kind(),
            "transfer_failed"
        );
    }

    #[test]
    fn test_invalid_amount_display() {
        let err = LedgerError::invalid_amount("bad format");
        assert!(err.to_string().contains("bad format"));
    }
}
