//! Token amount type with fixed-point precision.
//!
//! Amounts are integers of base units, 18 decimal places per whole token.
//! The same type carries native-currency values, which share the 18-decimal
//! scale. All arithmetic is checked.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LedgerError;

/// Number of decimal places for MTK precision.
pub const DECIMALS: u8 = 18;

/// One whole token in base units.
pub const BASE_UNITS_PER_TOKEN: u128 = 1_000_000_000_000_000_000;

/// A token (or native-currency) amount in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u128);

impl Amount {
    /// Zero amount constant.
    pub const ZERO: Self = Self(0);

    /// Largest representable amount.
    pub const MAX: Self = Self(u128::MAX);

    /// Creates an amount from base units.
    #[must_use]
    pub const fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    /// Creates an amount from whole tokens.
    #[must_use]
    pub const fn from_tokens(tokens: u64) -> Self {
        // u64::MAX * 10^18 < u128::MAX, so this cannot overflow.
        Self(tokens as u128 * BASE_UNITS_PER_TOKEN)
    }

    /// Returns the amount in base units.
    #[must_use]
    pub const fn base_units(self) -> u128 {
        self.0
    }

    /// Checked addition. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_add(self, rhs: Self) -> Option<Self> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked subtraction. Returns `None` on underflow.
    #[must_use]
    pub const fn checked_sub(self, rhs: Self) -> Option<Self> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Checked multiplication by a scalar. Returns `None` on overflow.
    #[must_use]
    pub const fn checked_mul(self, rhs: u128) -> Option<Self> {
        match self.0.checked_mul(rhs) {
            Some(v) => Some(Self(v)),
            None => None,
        }
    }

    /// Returns true if this amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / BASE_UNITS_PER_TOKEN;
        let frac = self.0 % BASE_UNITS_PER_TOKEN;
        if frac == 0 {
            write!(f, "{whole}")
        } else {
            let frac_str = format!("{frac:018}");
            write!(f, "{whole}.{}", frac_str.trim_end_matches('0'))
        }
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    /// Parses a decimal token string such as `"1000"` or `"0.25"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('-') {
            return Err(LedgerError::invalid_amount("negative values not allowed"));
        }

        let (whole_str, frac_str) = match s.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (s, ""),
        };
        if whole_str.is_empty() && frac_str.is_empty() {
            return Err(LedgerError::invalid_amount(format!("invalid number: {s:?}")));
        }
        if frac_str.contains('.') {
            return Err(LedgerError::invalid_amount(format!("invalid format: {s}")));
        }
        if frac_str.len() > usize::from(DECIMALS) {
            return Err(LedgerError::invalid_amount("too many decimal places"));
        }

        let whole: u128 = if whole_str.is_empty() {
            0
        } else {
            whole_str
                .parse()
                .map_err(|_| LedgerError::invalid_amount(format!("invalid whole part: {s}")))?
        };

        let frac: u128 = if frac_str.is_empty() {
            0
        } else {
            if !frac_str.bytes().all(|b| b.is_ascii_digit()) {
                return Err(LedgerError::invalid_amount(format!(
                    "invalid fractional part: {s}"
                )));
            }
            let padded = format!("{frac_str:0<18}");
            padded
                .parse()
                .map_err(|_| LedgerError::invalid_amount(format!("invalid fractional part: {s}")))?
        };

        whole
            .checked_mul(BASE_UNITS_PER_TOKEN)
            .and_then(|units| units.checked_add(frac))
            .map(Amount)
            .ok_or_else(|| LedgerError::invalid_amount("overflow"))
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

impl From<u128> for Amount {
    fn from(units: u128) -> Self {
        Self::from_base_units(units)
    }
}
