//! Error types for ledger storage.

use ledger_core::{AccountId, LedgerError};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Balance row not found.
    #[error("balance not found for account {account_id}")]
    NotFound {
        /// The account whose balance row is missing.
        account_id: AccountId,
    },

    /// A write would break a stored invariant.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// A stored row could not be mapped back to a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The unit was used after it committed.
    #[error("unit of work already finished")]
    Finished,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_check_violation()
                || db.is_foreign_key_violation()
                || db.is_unique_violation()
            {
                return Self::Constraint(db.message().to_string());
            }
        }
        Self::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(err.to_string())
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { account_id } => Self::AccountNotFound { account_id },
            other => Self::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::ErrorKind;

    #[test]
    fn missing_balance_row_surfaces_as_not_found() {
        let err: LedgerError = StoreError::NotFound {
            account_id: AccountId::new(3),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn other_store_errors_are_internal() {
        for err in [
            StoreError::Database("connection reset".into()),
            StoreError::Constraint("balances_amount_check".into()),
            StoreError::Corrupt("transaction 1 has no payload".into()),
            StoreError::Finished,
        ] {
            let err: LedgerError = err.into();
            assert_eq!(err.kind(), ErrorKind::Internal);
        }
    }
}
