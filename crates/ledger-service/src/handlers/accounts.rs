//! Account and ledger handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledger_core::{AccountId, Transaction, TransactionId};

use crate::error::ApiError;
use crate::extract::{AccountPath, ApiJson};
use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

/// Register request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name, must not be empty.
    pub name: String,
}

/// Register response.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// The new account's id.
    pub account_id: AccountId,
}

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Current balance in atomic units.
    pub balance: i64,
}

/// Mint or spend request.
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    /// Amount in atomic units, must be positive.
    pub amount: i64,
}

/// Transfer request.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Amount in atomic units, must be positive.
    pub amount: i64,
    /// Recipient account.
    pub to: AccountId,
}

/// Response of every balance-changing operation.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// The appended transaction.
    pub transaction_id: TransactionId,
}

/// One row of an account's history.
#[derive(Debug, Serialize)]
pub struct TransactionView {
    /// "mint", "spend" or "transfer".
    #[serde(rename = "type")]
    pub kind: String,
    /// Amount moved.
    pub amount: i64,
    /// Insertion timestamp.
    pub inserted_at: DateTime<Utc>,
    /// Credited account, transfers only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<AccountId>,
}

impl From<&Transaction> for TransactionView {
    fn from(tx: &Transaction) -> Self {
        Self {
            kind: tx.kind.as_str().to_string(),
            amount: tx.amount(),
            inserted_at: tx.inserted_at,
            recipient: tx.kind.recipient(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Register a new account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let account_id = state.ledger.register(&body.name).await?;
    Ok(Json(RegisterResponse { account_id }))
}

/// Get an account's balance.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    AccountPath(account_id): AccountPath,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state.ledger.balance(account_id).await?;
    tracing::debug!(account_id = %account_id, balance = balance, "Balance read");
    Ok(Json(BalanceResponse { balance }))
}

/// List an account's transactions, oldest first.
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    AccountPath(account_id): AccountPath,
) -> Result<Json<Vec<TransactionView>>, ApiError> {
    let transactions = state.ledger.transactions(account_id).await?;
    tracing::debug!(
        account_id = %account_id,
        count = transactions.len(),
        "Transactions listed"
    );
    Ok(Json(transactions.iter().map(TransactionView::from).collect()))
}

/// Credit an account.
pub async fn mint(
    State(state): State<Arc<AppState>>,
    AccountPath(account_id): AccountPath,
    ApiJson(body): ApiJson<AmountRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let transaction_id = state.ledger.mint(account_id, body.amount).await?;
    Ok(Json(TransactionResponse { transaction_id }))
}

/// Debit an account.
pub async fn spend(
    State(state): State<Arc<AppState>>,
    AccountPath(account_id): AccountPath,
    ApiJson(body): ApiJson<AmountRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let transaction_id = state.ledger.spend(account_id, body.amount).await?;
    Ok(Json(TransactionResponse { transaction_id }))
}

/// Move funds from the path account to `to`.
pub async fn transfer(
    State(state): State<Arc<AppState>>,
    AccountPath(account_id): AccountPath,
    ApiJson(body): ApiJson<TransferRequest>,
) -> Result<Json<TransactionResponse>, ApiError> {
    let transaction_id = state
        .ledger
        .transfer(account_id, body.to, body.amount)
        .await?;
    Ok(Json(TransactionResponse { transaction_id }))
}
