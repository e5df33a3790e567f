//! Relational schema definitions.
//!
//! The PostgreSQL tables are created by the migrations under `migrations/`.
//! A transaction row points at exactly one payload row through three nullable
//! foreign keys; [`TransactionRow::resolve`] turns that shape back into a
//! [`TransactionKind`].

use chrono::{DateTime, Utc};

use ledger_core::{AccountId, Transaction, TransactionId, TransactionKind};

use crate::error::{Result, StoreError};

/// Table names.
pub mod table {
    /// Account Directory.
    pub const ACCOUNTS: &str = "accounts";

    /// Balance Store, one row per account.
    pub const BALANCES: &str = "balances";

    /// Mint payloads.
    pub const MINTS: &str = "mints";

    /// Spend payloads.
    pub const SPENDS: &str = "spends";

    /// Transfer payloads.
    pub const TRANSFERS: &str = "transfers";

    /// Transaction Log.
    pub const TRANSACTIONS: &str = "transactions";
}

/// Returns all table names in creation order.
#[must_use]
pub fn all_tables() -> Vec<&'static str> {
    vec![
        table::ACCOUNTS,
        table::BALANCES,
        table::MINTS,
        table::SPENDS,
        table::TRANSFERS,
        table::TRANSACTIONS,
    ]
}

/// A transaction row joined with its three optional payload tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRow {
    /// `transactions.id`
    pub id: i64,
    /// `transactions.account_id`
    pub account_id: i64,
    /// `transactions.inserted_at`
    pub inserted_at: DateTime<Utc>,
    /// `mints.amount`, when `mint_id` is set.
    pub mint_amount: Option<i64>,
    /// `spends.amount`, when `spend_id` is set.
    pub spend_amount: Option<i64>,
    /// `transfers.amount`, when `transfer_id` is set.
    pub transfer_amount: Option<i64>,
    /// `transfers.recipient`, when `transfer_id` is set.
    pub transfer_recipient: Option<i64>,
}

impl TransactionRow {
    /// Resolve the row into its concrete variant.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Corrupt` unless exactly one payload is present.
    pub fn resolve(self) -> Result<Transaction> {
        let kind = match (
            self.mint_amount,
            self.spend_amount,
            self.transfer_amount,
            self.transfer_recipient,
        ) {
            (Some(amount), None, None, None) => TransactionKind::Mint { amount },
            (None, Some(amount), None, None) => TransactionKind::Spend { amount },
            (None, None, Some(amount), Some(recipient)) => TransactionKind::Transfer {
                amount,
                recipient: AccountId::new(recipient),
            },
            _ => {
                return Err(StoreError::Corrupt(format!(
                    "transaction {} does not resolve to exactly one payload",
                    self.id
                )))
            }
        };

        Ok(Transaction {
            id: TransactionId::new(self.id),
            account_id: AccountId::new(self.account_id),
            kind,
            inserted_at: self.inserted_at,
        })
    }
}
