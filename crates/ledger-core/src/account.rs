//! Account types for the ledger.
//!
//! An account is a name and a store-assigned id. Its balance lives in the
//! balance store and is never part of the account record itself.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::AccountId;

/// A registered account.
///
/// Accounts are created once by registration and never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Store-assigned identifier.
    pub id: AccountId,

    /// Display name, non-empty.
    pub name: String,
}

impl Account {
    /// Create an account record for an id the store has already assigned.
    #[must_use]
    pub fn new(id: AccountId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Validate a display name for registration.
///
/// # Errors
///
/// Returns `LedgerError::EmptyName` if the name is empty.
pub fn validate_name(name: &str) -> Result<&str> {
    if name.is_empty() {
        return Err(LedgerError::EmptyName);
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(validate_name(""), Err(LedgerError::EmptyName)));
    }

    #[test]
    fn whitespace_name_is_kept_verbatim() {
        assert_eq!(validate_name(" bob ").unwrap(), " bob ");
    }
}
