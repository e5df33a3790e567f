//! PostgreSQL storage implementation.
//!
//! This module provides the `PgStore` implementation of the `LedgerStore`
//! trait. Each unit of work is one `sqlx` transaction; dropping it without a
//! commit rolls it back.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use sqlx::{Postgres, Row};

use ledger_core::{Account, AccountId, Transaction, TransactionId, TransactionKind};

use crate::error::{Result, StoreError};
use crate::schema::TransactionRow;
use crate::{LedgerStore, UnitOfWork};

/// Connection pool settings for [`PgStore::connect`].
#[derive(Debug, Clone)]
pub struct PgStoreOptions {
    /// Maximum number of pooled connections.
    pub max_connections: u32,

    /// How long to wait for a free connection.
    pub acquire_timeout: Duration,
}

impl Default for PgStoreOptions {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// PostgreSQL-backed storage implementation.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect to the database at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be established.
    pub async fn connect(url: &str, options: &PgStoreOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .acquire_timeout(options.acquire_timeout)
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    /// The underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Database migrations applied");
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnit { tx: Some(tx) }))
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// A unit of work backed by one database transaction.
struct PgUnit {
    tx: Option<sqlx::Transaction<'static, Postgres>>,
}

impl PgUnit {
    fn conn(&mut self) -> Result<&mut PgConnection> {
        self.tx.as_deref_mut().ok_or(StoreError::Finished)
    }

    async fn select_balance(&mut self, id: AccountId, for_update: bool) -> Result<Option<i64>> {
        let sql = if for_update {
            "SELECT amount FROM balances WHERE account_id = $1 FOR UPDATE"
        } else {
            "SELECT amount FROM balances WHERE account_id = $1"
        };

        let amount = sqlx::query_scalar::<_, i64>(sql)
            .bind(id.get())
            .fetch_optional(self.conn()?)
            .await?;

        Ok(amount)
    }
}

#[async_trait]
impl UnitOfWork for PgUnit {
    // =========================================================================
    // Account Directory
    // =========================================================================

    async fn insert_account(&mut self, name: &str) -> Result<AccountId> {
        let id =
            sqlx::query_scalar::<_, i64>("INSERT INTO accounts (name) VALUES ($1) RETURNING id")
                .bind(name)
                .fetch_one(self.conn()?)
                .await?;

        Ok(AccountId::new(id))
    }

    async fn account(&mut self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query("SELECT id, name FROM accounts WHERE id = $1")
            .bind(id.get())
            .fetch_optional(self.conn()?)
            .await?;

        row.map(|r| -> Result<Account> {
            Ok(Account::new(
                AccountId::new(r.try_get("id")?),
                r.try_get::<String, _>("name")?,
            ))
        })
        .transpose()
    }

    // =========================================================================
    // Balance Store
    // =========================================================================

    async fn insert_balance(&mut self, id: AccountId) -> Result<()> {
        sqlx::query("INSERT INTO balances (account_id, amount) VALUES ($1, 0)")
            .bind(id.get())
            .execute(self.conn()?)
            .await?;

        Ok(())
    }

    async fn balance(&mut self, id: AccountId) -> Result<Option<i64>> {
        self.select_balance(id, false).await
    }

    async fn lock_balance(&mut self, id: AccountId) -> Result<Option<i64>> {
        self.select_balance(id, true).await
    }

    async fn increment_balance(&mut self, id: AccountId, amount: i64) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE balances SET amount = amount + $2 WHERE account_id = $1 RETURNING amount",
        )
        .bind(id.get())
        .bind(amount)
        .fetch_optional(self.conn()?)
        .await?
        .ok_or(StoreError::NotFound { account_id: id })
    }

    async fn decrement_balance(&mut self, id: AccountId, amount: i64) -> Result<i64> {
        // balances.amount carries CHECK (amount >= 0), so an overdraft surfaces
        // as StoreError::Constraint.
        sqlx::query_scalar::<_, i64>(
            "UPDATE balances SET amount = amount - $2 WHERE account_id = $1 RETURNING amount",
        )
        .bind(id.get())
        .bind(amount)
        .fetch_optional(self.conn()?)
        .await?
        .ok_or(StoreError::NotFound { account_id: id })
    }

    // =========================================================================
    // Transaction Log
    // =========================================================================

    async fn append_transaction(
        &mut self,
        account_id: AccountId,
        kind: TransactionKind,
    ) -> Result<Transaction> {
        let conn = self.conn()?;

        let (column, payload_id) = match kind {
            TransactionKind::Mint { amount } => {
                let id = sqlx::query_scalar::<_, i64>(
                    "INSERT INTO mints (amount) VALUES ($1) RETURNING id",
                )
                .bind(amount)
                .fetch_one(&mut *conn)
                .await?;
                ("mint_id", id)
            }
            TransactionKind::Spend { amount } => {
                let id = sqlx::query_scalar::<_, i64>(
                    "INSERT INTO spends (amount) VALUES ($1) RETURNING id",
                )
                .bind(amount)
                .fetch_one(&mut *conn)
                .await?;
                ("spend_id", id)
            }
            TransactionKind::Transfer { amount, recipient } => {
                let id = sqlx::query_scalar::<_, i64>(
                    "INSERT INTO transfers (amount, recipient) VALUES ($1, $2) RETURNING id",
                )
                .bind(amount)
                .bind(recipient.get())
                .fetch_one(&mut *conn)
                .await?;
                ("transfer_id", id)
            }
        };

        // `column` is one of three literals above, never caller input.
        let sql = format!(
            "INSERT INTO transactions (account_id, {column}) VALUES ($1, $2) \
             RETURNING id, inserted_at"
        );
        let row = sqlx::query(&sql)
            .bind(account_id.get())
            .bind(payload_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok(Transaction {
            id: TransactionId::new(row.try_get("id")?),
            account_id,
            kind,
            inserted_at: row.try_get("inserted_at")?,
        })
    }

    async fn transactions(&mut self, account_id: AccountId) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(
            r"
            SELECT t.id,
                   t.account_id,
                   t.inserted_at,
                   m.amount    AS mint_amount,
                   s.amount    AS spend_amount,
                   tr.amount   AS transfer_amount,
                   tr.recipient AS transfer_recipient
            FROM transactions t
            LEFT JOIN mints m ON m.id = t.mint_id
            LEFT JOIN spends s ON s.id = t.spend_id
            LEFT JOIN transfers tr ON tr.id = t.transfer_id
            WHERE t.account_id = $1
            ORDER BY t.id ASC
            ",
        )
        .bind(account_id.get())
        .fetch_all(self.conn()?)
        .await?;

        rows.into_iter()
            .map(|r| {
                TransactionRow {
                    id: r.try_get("id")?,
                    account_id: r.try_get("account_id")?,
                    inserted_at: r.try_get("inserted_at")?,
                    mint_amount: r.try_get("mint_amount")?,
                    spend_amount: r.try_get("spend_amount")?,
                    transfer_amount: r.try_get("transfer_amount")?,
                    transfer_recipient: r.try_get("transfer_recipient")?,
                }
                .resolve()
            })
            .collect()
    }

    // =========================================================================
    // Completion
    // =========================================================================

    async fn commit(&mut self) -> Result<()> {
        let tx = self.tx.take().ok_or(StoreError::Finished)?;
        tx.commit().await?;
        Ok(())
    }
}
