//! Storage layer for the ledger.
//!
//! This crate persists accounts, balances and the transaction log. Every read
//! and write goes through a [`UnitOfWork`]: a store transaction that either
//! commits as a whole or leaves no trace.
//!
//! # Backends
//!
//! - [`PgStore`]: PostgreSQL via `sqlx`, with embedded migrations. Balance
//!   reads that guard a debit take `FOR UPDATE` row locks.
//! - [`MemoryStore`]: in-process, for tests and local runs. A unit holds the
//!   whole store exclusively until it is committed or dropped.
//!
//! # Rollback
//!
//! Dropping a unit without calling [`UnitOfWork::commit`] discards every write
//! it made. This holds on early returns, on errors and during unwinding.
//!
//! # Example
//!
//! ```no_run
//! use ledger_store::{LedgerStore, MemoryStore};
//!
//! # async fn example() -> ledger_store::Result<()> {
//! let store = MemoryStore::new();
//!
//! let mut unit = store.begin().await?;
//! let account_id = unit.insert_account("alice").await?;
//! unit.insert_balance(account_id).await?;
//! unit.commit().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
pub mod postgres;
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::{PgStore, PgStoreOptions};

use async_trait::async_trait;

use ledger_core::{Account, AccountId, Transaction, TransactionKind};

/// Entry point to a storage backend.
///
/// Implementations are cheap to share behind an `Arc` and hand out one
/// [`UnitOfWork`] per operation.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Start a new atomic unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot open a transaction.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;

    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend does not answer.
    async fn ping(&self) -> Result<()>;
}

/// One atomic unit of reads and writes.
///
/// Writes become visible to other units only after [`UnitOfWork::commit`].
/// Dropping the unit without committing rolls it back.
#[async_trait]
pub trait UnitOfWork: Send {
    // =========================================================================
    // Account Directory
    // =========================================================================

    /// Insert an account and return its store-assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn insert_account(&mut self, name: &str) -> Result<AccountId>;

    /// Get an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn account(&mut self, id: AccountId) -> Result<Option<Account>>;

    /// Check whether an account exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn account_exists(&mut self, id: AccountId) -> Result<bool> {
        Ok(self.account(id).await?.is_some())
    }

    // =========================================================================
    // Balance Store
    // =========================================================================

    /// Create the zero balance row of a freshly inserted account.
    ///
    /// # Errors
    ///
    /// Returns an error if the row already exists or the account is unknown.
    async fn insert_balance(&mut self, id: AccountId) -> Result<()>;

    /// Read a balance without locking it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn balance(&mut self, id: AccountId) -> Result<Option<i64>>;

    /// Read a balance and lock its row until the unit ends.
    ///
    /// Any check made against the returned value stays valid for the rest of
    /// the unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn lock_balance(&mut self, id: AccountId) -> Result<Option<i64>>;

    /// Add `amount` to a balance and return the new value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the balance row does not exist.
    async fn increment_balance(&mut self, id: AccountId, amount: i64) -> Result<i64>;

    /// Subtract `amount` from a balance and return the new value.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the balance row does not exist.
    /// - `StoreError::Constraint` if the balance would go negative.
    async fn decrement_balance(&mut self, id: AccountId, amount: i64) -> Result<i64>;

    // =========================================================================
    // Transaction Log
    // =========================================================================

    /// Append a transaction row for `account_id`.
    ///
    /// The payload row and the transaction row are written together; the
    /// returned record carries the store-assigned id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn append_transaction(
        &mut self,
        account_id: AccountId,
        kind: TransactionKind,
    ) -> Result<Transaction>;

    /// List all transactions of an account, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Corrupt` if a row does not resolve to exactly one
    /// payload.
    async fn transactions(&mut self, account_id: AccountId) -> Result<Vec<Transaction>>;

    // =========================================================================
    // Completion
    // =========================================================================

    /// Make every write of this unit durable and visible.
    ///
    /// The unit is finished afterwards; any further call returns
    /// `StoreError::Finished`.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails; nothing is applied in that case.
    async fn commit(&mut self) -> Result<()>;
}
