//! Transaction records for the ledger.
//!
//! Every balance change appends one immutable [`Transaction`]. The payload is
//! a tagged variant so that exactly one of mint, spend, or transfer is ever set
//! on a row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::{AccountId, TransactionId};

/// An appended transaction row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-assigned id, increasing with insertion order.
    pub id: TransactionId,

    /// The account whose balance this row explains.
    ///
    /// For transfers this is the sender.
    pub account_id: AccountId,

    /// Type-specific payload.
    #[serde(flatten)]
    pub kind: TransactionKind,

    /// Insertion timestamp assigned by the store.
    pub inserted_at: DateTime<Utc>,
}

impl Transaction {
    /// Amount moved by this transaction, always positive.
    #[must_use]
    pub const fn amount(&self) -> i64 {
        self.kind.amount()
    }
}

/// The payload of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionKind {
    /// Credit with no counterparty.
    Mint {
        /// Amount credited.
        amount: i64,
    },

    /// Debit with no counterparty.
    Spend {
        /// Amount debited.
        amount: i64,
    },

    /// Debit of the row's account, credit of `recipient`.
    Transfer {
        /// Amount moved.
        amount: i64,
        /// Account credited.
        recipient: AccountId,
    },
}

impl TransactionKind {
    /// Create a mint payload.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NonPositiveAmount` if `amount <= 0`.
    pub fn mint(amount: i64) -> Result<Self> {
        Ok(Self::Mint {
            amount: require_positive(amount)?,
        })
    }

    /// Create a spend payload.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NonPositiveAmount` if `amount <= 0`.
    pub fn spend(amount: i64) -> Result<Self> {
        Ok(Self::Spend {
            amount: require_positive(amount)?,
        })
    }

    /// Create a transfer payload.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NonPositiveAmount` if `amount <= 0`.
    pub fn transfer(amount: i64, recipient: AccountId) -> Result<Self> {
        Ok(Self::Transfer {
            amount: require_positive(amount)?,
            recipient,
        })
    }

    /// Amount carried by the payload.
    #[must_use]
    pub const fn amount(&self) -> i64 {
        match self {
            Self::Mint { amount } | Self::Spend { amount } | Self::Transfer { amount, .. } => {
                *amount
            }
        }
    }

    /// The wire tag of the payload.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::Spend { .. } => "spend",
            Self::Transfer { .. } => "transfer",
        }
    }

    /// Recipient account, set only for transfers.
    #[must_use]
    pub const fn recipient(&self) -> Option<AccountId> {
        match self {
            Self::Transfer { recipient, .. } => Some(*recipient),
            Self::Mint { .. } | Self::Spend { .. } => None,
        }
    }
}

/// Check that an amount is strictly positive.
///
/// # Errors
///
/// Returns `LedgerError::NonPositiveAmount` if `amount <= 0`.
pub fn require_positive(amount: i64) -> Result<i64> {
    if amount <= 0 {
        return Err(LedgerError::NonPositiveAmount { amount });
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_amounts_are_rejected() {
        assert!(matches!(
            TransactionKind::mint(0),
            Err(LedgerError::NonPositiveAmount { amount: 0 })
        ));
        assert!(matches!(
            TransactionKind::spend(-5),
            Err(LedgerError::NonPositiveAmount { amount: -5 })
        ));
        assert!(TransactionKind::transfer(-1, AccountId::new(2)).is_err());
    }

    #[test]
    fn only_transfers_carry_a_recipient() {
        let transfer = TransactionKind::transfer(50, AccountId::new(2)).unwrap();
        assert_eq!(transfer.recipient(), Some(AccountId::new(2)));
        assert_eq!(transfer.amount(), 50);
        assert_eq!(TransactionKind::mint(10).unwrap().recipient(), None);
        assert_eq!(TransactionKind::spend(10).unwrap().recipient(), None);
    }

    #[test]
    fn transfer_serializes_with_type_tag() {
        let tx = Transaction {
            id: TransactionId::new(3),
            account_id: AccountId::new(1),
            kind: TransactionKind::transfer(50, AccountId::new(2)).unwrap(),
            inserted_at: DateTime::parse_from_rfc3339("2024-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "transfer");
        assert_eq!(json["amount"], 50);
        assert_eq!(json["recipient"], 2);
        assert_eq!(json["account_id"], 1);

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn mint_has_no_recipient_field() {
        let json = serde_json::to_value(TransactionKind::mint(100).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "mint", "amount": 100 }));
    }
}
