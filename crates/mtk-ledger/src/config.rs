//! Ledger deployment parameters.
//!
//! A [`TokenConfig`] carries everything needed to instantiate a ledger. It is
//! stored as JSON; missing fields fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::amount::{Amount, DECIMALS};
use crate::error::{LedgerError, Result};
use crate::exchange::DEFAULT_TOKENS_PER_UNIT;
use crate::faucet::{DEFAULT_CLAIM_COOLDOWN_SECS, DEFAULT_FAUCET_AMOUNT};

/// Default token name.
pub const DEFAULT_NAME: &str = "MyToken";

/// Default token symbol.
pub const DEFAULT_SYMBOL: &str = "MTK";

/// Default supply issued to the owner at construction.
pub const DEFAULT_INITIAL_SUPPLY: Amount = Amount::from_tokens(1000);

/// Parameters for a new ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenConfig {
    /// Token name.
    pub name: String,
    /// Token symbol. Also salts the contract address.
    pub symbol: String,
    /// Decimal places; only 18 is supported.
    pub decimals: u8,
    /// Supply issued to the owner at construction.
    pub initial_supply: Amount,
    /// Tokens delivered per unit of native currency.
    pub tokens_per_unit: u64,
    /// Tokens handed out per faucet claim.
    pub faucet_amount: Amount,
    /// Seconds between faucet claims from one account.
    pub claim_cooldown_secs: u64,
    /// Tokens the owner moves into the contract account at construction.
    pub contract_funding: Amount,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            decimals: DECIMALS,
            initial_supply: DEFAULT_INITIAL_SUPPLY,
            tokens_per_unit: DEFAULT_TOKENS_PER_UNIT,
            faucet_amount: DEFAULT_FAUCET_AMOUNT,
            claim_cooldown_secs: DEFAULT_CLAIM_COOLDOWN_SECS,
            contract_funding: Amount::ZERO,
        }
    }
}

impl TokenConfig {
    /// Load and validate a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, is not valid JSON, or fails
    /// [`Self::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json(&contents)?;
        debug!(path = %path.display(), symbol = %config.symbol, "loaded token config");
        Ok(config)
    }

    /// Parse and validate a configuration from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or fails [`Self::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::config("name must not be empty"));
        }
        if self.symbol.trim().is_empty() {
            return Err(LedgerError::config("symbol must not be empty"));
        }
        if self.decimals != DECIMALS {
            return Err(LedgerError::config(format!(
                "decimals must be {DECIMALS}, got {}",
                self.decimals
            )));
        }
        if self.contract_funding > self.initial_supply {
            return Err(LedgerError::config(format!(
                "contract_funding {} exceeds initial_supply {}",
                self.contract_funding, self.initial_supply
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = TokenConfig::default();
        assert_eq!(config.symbol, "MTK");
        assert_eq!(config.initial_supply, Amount::from_tokens(1000));
        assert_eq!(config.tokens_per_unit, 1000);
        assert_eq!(config.faucet_amount, Amount::from_tokens(50));
        assert_eq!(config.claim_cooldown_secs, 259_200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = TokenConfig::from_json(r#"{ "initial_supply": "5000" }"#).expect("parse");
        assert_eq!(config.initial_supply, Amount::from_tokens(5000));
        assert_eq!(config.name, DEFAULT_NAME);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result = TokenConfig::from_json(r#"{ "owner_can_burn": true }"#);
        assert!(matches!(result, Err(LedgerError::Json(_))));
    }

    #[test]
    fn test_wrong_decimals_rejected() {
        let result = TokenConfig::from_json(r#"{ "decimals": 6 }"#);
        assert!(matches!(result, Err(LedgerError::Config { .. })));
    }

    #[test]
    fn test_funding_above_supply_rejected() {
        let config = TokenConfig {
            contract_funding: Amount::from_tokens(2000),
            ..TokenConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_symbol_rejected() {
        let config = TokenConfig {
            symbol: "  ".to_string(),
            ..TokenConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        let json = TokenConfig::default().to_json_pretty().expect("json");
        file.write_all(json.as_bytes()).expect("write");

        let loaded = TokenConfig::load(file.path()).expect("load");
        assert_eq!(loaded, TokenConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let result = TokenConfig::load("/nonexistent/mtk.json");
        assert!(matches!(result, Err(LedgerError::Io(_))));
    }
}
