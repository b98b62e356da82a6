//! Account identities.
//!
//! An [`Address`] is a fixed-width 20-byte identity rendered as `0x`-prefixed
//! lowercase hex. The all-zero address is the null identity: it can never
//! receive tokens or allowances and is the `from` side of issuance events.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{LedgerError, Result};

/// Length of an address in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Domain separator for derived contract identities.
const CONTRACT_DERIVATION_CONTEXT: &[u8] = b"mtk-ledger/contract-address/v1";

/// A fixed-width account identity.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The null identity.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    /// Create an address from a fixed-size byte array.
    #[must_use]
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Create an address from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns error if the slice is not exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            LedgerError::invalid_address(format!(
                "address must be {ADDRESS_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Parse a hex address, with or without the `0x` prefix.
    ///
    /// # Errors
    ///
    /// Returns error if the string is not valid hex or has the wrong length.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|e| LedgerError::invalid_address(format!("invalid hex: {e}")))?;
        Self::from_slice(&bytes)
    }

    /// Derive the identity of a ledger instance from its owner and a label.
    ///
    /// The same owner and label always produce the same address.
    #[must_use]
    pub fn derive(owner: &Self, label: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(CONTRACT_DERIVATION_CONTEXT);
        hasher.update(&owner.0);
        hasher.update(label.as_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest.as_bytes()[..ADDRESS_LEN]);
        Self(bytes)
    }

    /// Generate a random address.
    #[must_use]
    pub fn random() -> Self {
        Self(rand::random())
    }

    /// Get the raw bytes of the address.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Returns true for the null identity.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
