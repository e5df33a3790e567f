//! Error types for the ledger.

use crate::AccountId;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Registration with an empty name.
    #[error("name must not be empty")]
    EmptyName,

    /// Mint, spend or transfer of a zero or negative amount.
    #[error("amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// The rejected amount.
        amount: i64,
    },

    /// Account not found.
    #[error("account not found: {account_id}")]
    AccountNotFound {
        /// The id that was not found.
        account_id: AccountId,
    },

    /// Debit larger than the current balance.
    #[error("insufficient balance on account {account_id}: balance={balance}, required={required}")]
    InsufficientBalance {
        /// The account being debited.
        account_id: AccountId,
        /// Balance at the time of the check.
        balance: i64,
        /// Amount requested.
        required: i64,
    },

    /// A credit would push a balance past `i64::MAX`.
    #[error("balance overflow on account {account_id}")]
    BalanceOverflow {
        /// The account being credited.
        account_id: AccountId,
    },

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Coarse classification of a [`LedgerError`].
///
/// Every error falls into exactly one bucket; the HTTP adapter maps buckets to
/// status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input the caller can fix.
    Validation,
    /// A referenced account does not exist.
    NotFound,
    /// A business rule rejected the operation.
    Domain,
    /// Anything else: storage failures, overflow, corrupt rows.
    Internal,
}

impl LedgerError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyName | Self::NonPositiveAmount { .. } => ErrorKind::Validation,
            Self::AccountNotFound { .. } => ErrorKind::NotFound,
            Self::InsufficientBalance { .. } => ErrorKind::Domain,
            Self::BalanceOverflow { .. } | Self::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Shorthand for an account-not-found error.
    #[must_use]
    pub const fn not_found(account_id: AccountId) -> Self {
        Self::AccountNotFound { account_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_has_one_kind() {
        let id = AccountId::new(1);
        let cases = [
            (LedgerError::EmptyName, ErrorKind::Validation),
            (
                LedgerError::NonPositiveAmount { amount: 0 },
                ErrorKind::Validation,
            ),
            (LedgerError::not_found(id), ErrorKind::NotFound),
            (
                LedgerError::InsufficientBalance {
                    account_id: id,
                    balance: 1,
                    required: 2,
                },
                ErrorKind::Domain,
            ),
            (
                LedgerError::BalanceOverflow { account_id: id },
                ErrorKind::Internal,
            ),
            (LedgerError::Storage("boom".into()), ErrorKind::Internal),
        ];

        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn insufficient_balance_message_names_both_amounts() {
        let err = LedgerError::InsufficientBalance {
            account_id: AccountId::new(4),
            balance: 10,
            required: 25,
        };
        assert_eq!(
            err.to_string(),
            "insufficient balance on account 4: balance=10, required=25"
        );
    }
}
