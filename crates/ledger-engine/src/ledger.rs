//! The ledger engine.

use std::sync::Arc;

use futures::future::BoxFuture;

use ledger_core::{
    validate_name, AccountId, LedgerError, Result, Transaction, TransactionId,
    TransactionKind,
};
use ledger_store::{LedgerStore, UnitOfWork};

/// Validates and atomically applies ledger operations.
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn LedgerStore>,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger").finish_non_exhaustive()
    }
}

impl Ledger {
    /// Create an engine over a storage backend.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    /// The storage backend.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Run `op` inside one atomic unit.
    ///
    /// The unit commits when `op` returns `Ok`. On `Err`, on an early return,
    /// or if `op` panics, the unit is dropped uncommitted and all of its
    /// writes are discarded.
    ///
    /// # Errors
    ///
    /// Returns the error of `op`, or a storage error if the unit cannot be
    /// opened or committed.
    pub async fn atomically<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: for<'u> FnOnce(&'u mut dyn UnitOfWork) -> BoxFuture<'u, Result<T>> + Send,
    {
        let mut unit = self.store.begin().await?;
        let value = op(unit.as_mut()).await?;
        unit.commit().await?;
        Ok(value)
    }

    /// Register a new account with a zero balance.
    ///
    /// # Errors
    ///
    /// - `LedgerError::EmptyName` if `name` is empty.
    /// - `LedgerError::Storage` if the store fails.
    pub async fn register(&self, name: &str) -> Result<AccountId> {
        let name = validate_name(name)
            .map_err(|err| rejected("register", err))?
            .to_owned();

        let account_id = self
            .atomically(move |unit| {
                Box::pin(async move {
                    let account_id = unit.insert_account(&name).await?;
                    unit.insert_balance(account_id).await?;
                    Ok::<_, LedgerError>(account_id)
                })
            })
            .await
            .map_err(|err| rejected("register", err))?;

        tracing::info!(account_id = %account_id, "Account registered");
        Ok(account_id)
    }

    /// Current balance of an account.
    ///
    /// # Errors
    ///
    /// - `LedgerError::AccountNotFound` if the account does not exist.
    /// - `LedgerError::Storage` if the store fails.
    pub async fn balance(&self, account_id: AccountId) -> Result<i64> {
        self.atomically(move |unit| {
            Box::pin(async move {
                unit.balance(account_id)
                    .await?
                    .ok_or(LedgerError::not_found(account_id))
            })
        })
        .await
        .map_err(|err| rejected("balance", err))
    }

    /// All transactions recorded on an account, oldest first.
    ///
    /// Incoming transfers are recorded on the sender only and do not appear
    /// here.
    ///
    /// # Errors
    ///
    /// - `LedgerError::AccountNotFound` if the account does not exist.
    /// - `LedgerError::Storage` if the store fails or a row is corrupt.
    pub async fn transactions(&self, account_id: AccountId) -> Result<Vec<Transaction>> {
        self.atomically(move |unit| {
            Box::pin(async move {
                if !unit.account_exists(account_id).await? {
                    return Err(LedgerError::not_found(account_id));
                }
                Ok(unit.transactions(account_id).await?)
            })
        })
        .await
        .map_err(|err| rejected("transactions", err))
    }

    /// Credit `amount` to an account.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NonPositiveAmount` if `amount <= 0`.
    /// - `LedgerError::AccountNotFound` if the account does not exist.
    /// - `LedgerError::BalanceOverflow` if the balance would overflow.
    /// - `LedgerError::Storage` if the store fails.
    pub async fn mint(&self, account_id: AccountId, amount: i64) -> Result<TransactionId> {
        let kind = TransactionKind::mint(amount).map_err(|err| rejected("mint", err))?;

        let (transaction, balance) = self
            .atomically(move |unit| {
                Box::pin(async move {
                    let current = unit
                        .lock_balance(account_id)
                        .await?
                        .ok_or(LedgerError::not_found(account_id))?;
                    credit_headroom(account_id, current, amount)?;

                    let transaction = unit.append_transaction(account_id, kind).await?;
                    let balance = unit.increment_balance(account_id, amount).await?;
                    Ok::<_, LedgerError>((transaction, balance))
                })
            })
            .await
            .map_err(|err| rejected("mint", err))?;

        tracing::info!(
            account_id = %account_id,
            transaction_id = %transaction.id,
            amount = amount,
            balance = balance,
            "Mint committed"
        );
        Ok(transaction.id)
    }

    /// Debit `amount` from an account.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NonPositiveAmount` if `amount <= 0`.
    /// - `LedgerError::AccountNotFound` if the account does not exist.
    /// - `LedgerError::InsufficientBalance` if `amount` exceeds the balance.
    /// - `LedgerError::Storage` if the store fails.
    pub async fn spend(&self, account_id: AccountId, amount: i64) -> Result<TransactionId> {
        let kind = TransactionKind::spend(amount).map_err(|err| rejected("spend", err))?;

        let (transaction, balance) = self
            .atomically(move |unit| {
                Box::pin(async move {
                    let current = unit
                        .lock_balance(account_id)
                        .await?
                        .ok_or(LedgerError::not_found(account_id))?;
                    ensure_funds(account_id, current, amount)?;

                    let transaction = unit.append_transaction(account_id, kind).await?;
                    let balance = unit.decrement_balance(account_id, amount).await?;
                    Ok::<_, LedgerError>((transaction, balance))
                })
            })
            .await
            .map_err(|err| rejected("spend", err))?;

        tracing::info!(
            account_id = %account_id,
            transaction_id = %transaction.id,
            amount = amount,
            balance = balance,
            "Spend committed"
        );
        Ok(transaction.id)
    }

    /// Move `amount` from `sender` to `recipient`.
    ///
    /// One transaction row is written, on the sender's account.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NonPositiveAmount` if `amount <= 0`.
    /// - `LedgerError::AccountNotFound` if either account does not exist.
    /// - `LedgerError::InsufficientBalance` if `amount` exceeds the sender's
    ///   balance.
    /// - `LedgerError::BalanceOverflow` if the recipient's balance would
    ///   overflow.
    /// - `LedgerError::Storage` if the store fails.
    pub async fn transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: i64,
    ) -> Result<TransactionId> {
        let kind =
            TransactionKind::transfer(amount, recipient).map_err(|err| rejected("transfer", err))?;

        let transaction = self
            .atomically(move |unit| {
                Box::pin(async move {
                    let (sender_balance, recipient_balance) =
                        lock_pair(unit, sender, recipient).await?;
                    let sender_balance =
                        sender_balance.ok_or(LedgerError::not_found(sender))?;
                    let recipient_balance =
                        recipient_balance.ok_or(LedgerError::not_found(recipient))?;

                    ensure_funds(sender, sender_balance, amount)?;
                    if sender != recipient {
                        credit_headroom(recipient, recipient_balance, amount)?;
                    }

                    let transaction = unit.append_transaction(sender, kind).await?;
                    unit.decrement_balance(sender, amount).await?;
                    unit.increment_balance(recipient, amount).await?;
                    Ok::<_, LedgerError>(transaction)
                })
            })
            .await
            .map_err(|err| rejected("transfer", err))?;

        tracing::info!(
            sender = %sender,
            recipient = %recipient,
            transaction_id = %transaction.id,
            amount = amount,
            "Transfer committed"
        );
        Ok(transaction.id)
    }
}

/// Lock both balance rows of a transfer, lowest account id first.
///
/// A fixed lock order keeps two opposite transfers between the same pair of
/// accounts from deadlocking. Returns `(sender, recipient)` balances.
async fn lock_pair(
    unit: &mut dyn UnitOfWork,
    sender: AccountId,
    recipient: AccountId,
) -> Result<(Option<i64>, Option<i64>)> {
    if sender == recipient {
        let balance = unit.lock_balance(sender).await?;
        return Ok((balance, balance));
    }

    let (low, high) = if sender < recipient {
        (sender, recipient)
    } else {
        (recipient, sender)
    };
    let low_balance = unit.lock_balance(low).await?;
    let high_balance = unit.lock_balance(high).await?;

    if low == sender {
        Ok((low_balance, high_balance))
    } else {
        Ok((high_balance, low_balance))
    }
}

fn ensure_funds(account_id: AccountId, balance: i64, required: i64) -> Result<()> {
    if required > balance {
        return Err(LedgerError::InsufficientBalance {
            account_id,
            balance,
            required,
        });
    }
    Ok(())
}

fn credit_headroom(account_id: AccountId, balance: i64, amount: i64) -> Result<()> {
    balance
        .checked_add(amount)
        .map(|_| ())
        .ok_or(LedgerError::BalanceOverflow { account_id })
}

/// Log a failed operation and hand the error back.
///
/// Insufficient funds are a warning; every other failure is logged at debug.
/// Internal errors are logged again, at error level, where they are rendered.
fn rejected(operation: &'static str, err: LedgerError) -> LedgerError {
    if let LedgerError::InsufficientBalance {
        account_id,
        balance,
        required,
    } = &err
    {
        tracing::warn!(
            operation = operation,
            account_id = %account_id,
            balance = balance,
            required = required,
            "Debit rejected: insufficient balance"
        );
    } else {
        tracing::debug!(
            operation = operation,
            kind = ?err.kind(),
            error = %err,
            "Operation rejected"
        );
    }
    err
}
