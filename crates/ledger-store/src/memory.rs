//! In-memory storage implementation.
//!
//! `MemoryStore` keeps everything in one map-backed state guarded by an async
//! mutex. A unit of work owns the guard for its whole lifetime, so units run
//! one at a time and every check-then-act sequence inside a unit is
//! serialisable.
//!
//! Writes are applied in place and recorded in an undo log. Committing clears
//! the log; dropping an uncommitted unit replays it backwards.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use ledger_core::{Account, AccountId, Transaction, TransactionId, TransactionKind};

use crate::error::{Result, StoreError};
use crate::{LedgerStore, UnitOfWork};

/// Process-local storage backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_account_id: i64,
    last_transaction_id: i64,
    accounts: BTreeMap<AccountId, Account>,
    balances: HashMap<AccountId, i64>,
    log: Vec<Transaction>,
}

/// A write that can be reverted.
#[derive(Debug)]
enum Undo {
    Account(AccountId),
    Balance(AccountId),
    Amount { id: AccountId, previous: i64 },
    Appended,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(MemoryUnit {
            state: Some(guard),
            undo: Vec::new(),
        }))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

struct MemoryUnit {
    state: Option<OwnedMutexGuard<MemoryState>>,
    undo: Vec<Undo>,
}

impl MemoryUnit {
    fn state(&mut self) -> Result<&mut MemoryState> {
        self.state.as_deref_mut().ok_or(StoreError::Finished)
    }

    fn set_amount(&mut self, id: AccountId, next: i64) -> Result<i64> {
        let state = self.state()?;
        let slot = state
            .balances
            .get_mut(&id)
            .ok_or(StoreError::NotFound { account_id: id })?;
        let previous = std::mem::replace(slot, next);
        self.undo.push(Undo::Amount { id, previous });
        Ok(next)
    }

    fn current(&mut self, id: AccountId) -> Result<i64> {
        self.state()?
            .balances
            .get(&id)
            .copied()
            .ok_or(StoreError::NotFound { account_id: id })
    }

    fn rollback(&mut self) {
        let Some(state) = self.state.as_deref_mut() else {
            return;
        };

        if !self.undo.is_empty() {
            tracing::debug!(writes = self.undo.len(), "Rolling back in-memory unit");
        }

        while let Some(undo) = self.undo.pop() {
            match undo {
                Undo::Account(id) => {
                    state.accounts.remove(&id);
                }
                Undo::Balance(id) => {
                    state.balances.remove(&id);
                }
                Undo::Amount { id, previous } => {
                    state.balances.insert(id, previous);
                }
                Undo::Appended => {
                    state.log.pop();
                }
            }
        }
    }
}

impl Drop for MemoryUnit {
    fn drop(&mut self) {
        self.rollback();
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
    // =========================================================================
    // Account Directory
    // =========================================================================

    async fn insert_account(&mut self, name: &str) -> Result<AccountId> {
        if name.is_empty() {
            return Err(StoreError::Constraint("account name must not be empty".into()));
        }

        let state = self.state()?;
        // Ids come from a sequence and are never handed out twice, even when
        // the unit that drew them rolls back.
        state.last_account_id += 1;
        let id = AccountId::new(state.last_account_id);
        state.accounts.insert(id, Account::new(id, name));
        self.undo.push(Undo::Account(id));

        Ok(id)
    }

    async fn account(&mut self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.state()?.accounts.get(&id).cloned())
    }

    // =========================================================================
    // Balance Store
    // =========================================================================

    async fn insert_balance(&mut self, id: AccountId) -> Result<()> {
        let state = self.state()?;
        if !state.accounts.contains_key(&id) {
            return Err(StoreError::Constraint(format!(
                "balance references unknown account {id}"
            )));
        }
        if state.balances.contains_key(&id) {
            return Err(StoreError::Constraint(format!(
                "balance for account {id} already exists"
            )));
        }

        state.balances.insert(id, 0);
        self.undo.push(Undo::Balance(id));
        Ok(())
    }

    async fn balance(&mut self, id: AccountId) -> Result<Option<i64>> {
        Ok(self.state()?.balances.get(&id).copied())
    }

    async fn lock_balance(&mut self, id: AccountId) -> Result<Option<i64>> {
        // The unit already holds the whole store.
        self.balance(id).await
    }

    async fn increment_balance(&mut self, id: AccountId, amount: i64) -> Result<i64> {
        let next = self.current(id)?.checked_add(amount).ok_or_else(|| {
            StoreError::Constraint(format!("balance of account {id} overflows"))
        })?;
        self.set_amount(id, next)
    }

    async fn decrement_balance(&mut self, id: AccountId, amount: i64) -> Result<i64> {
        let next = self
            .current(id)?
            .checked_sub(amount)
            .filter(|next| *next >= 0)
            .ok_or_else(|| {
                StoreError::Constraint(format!("balance of account {id} would go negative"))
            })?;
        self.set_amount(id, next)
    }

    // =========================================================================
    // Transaction Log
    // =========================================================================

    async fn append_transaction(
        &mut self,
        account_id: AccountId,
        kind: TransactionKind,
    ) -> Result<Transaction> {
        let state = self.state()?;
        if !state.accounts.contains_key(&account_id) {
            return Err(StoreError::Constraint(format!(
                "transaction references unknown account {account_id}"
            )));
        }
        if let Some(recipient) = kind.recipient() {
            if !state.accounts.contains_key(&recipient) {
                return Err(StoreError::Constraint(format!(
                    "transfer references unknown recipient {recipient}"
                )));
            }
        }

        state.last_transaction_id += 1;
        let transaction = Transaction {
            id: TransactionId::new(state.last_transaction_id),
            account_id,
            kind,
            inserted_at: Utc::now(),
        };
        state.log.push(transaction.clone());
        self.undo.push(Undo::Appended);

        Ok(transaction)
    }

    async fn transactions(&mut self, account_id: AccountId) -> Result<Vec<Transaction>> {
        Ok(self
            .state()?
            .log
            .iter()
            .filter(|tx| tx.account_id == account_id)
            .cloned()
            .collect())
    }

    // =========================================================================
    // Completion
    // =========================================================================

    async fn commit(&mut self) -> Result<()> {
        if self.state.is_none() {
            return Err(StoreError::Finished);
        }
        self.undo.clear();
        self.state = None;
        Ok(())
    }
}
