//! Single-owner access control.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::address::Address;
use crate::error::{LedgerError, Result};

/// Holds the one identity allowed to run administrative operations.
///
/// The owner is fixed at construction; there is no transfer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Address,
}

impl AccessControl {
    /// Create access control for `owner`.
    #[must_use]
    pub const fn new(owner: Address) -> Self {
        Self { owner }
    }

    /// The owner identity.
    #[must_use]
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Whether `caller` is the owner.
    #[must_use]
    pub fn is_owner(&self, caller: &Address) -> bool {
        *caller == self.owner
    }

    /// Gate for administrative operations.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Unauthorized`] if `caller` is not the owner.
    pub fn require_owner(&self, caller: &Address) -> Result<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            warn!(caller = %caller, "rejected administrative call from non-owner");
            Err(LedgerError::Unauthorized { caller: *caller })
        }
    }
}
