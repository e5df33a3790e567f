//! Request and response types for the ledger client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ledger_core::{AccountId, TransactionId};

/// Register request body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
}

/// Register response.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    /// The new account's id.
    pub account_id: AccountId,
}

/// Balance response.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceResponse {
    /// Current balance in atomic units.
    pub balance: i64,
}

/// Mint or spend request body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AmountRequest {
    pub amount: i64,
}

/// Transfer request body.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct TransferRequest {
    pub amount: i64,
    pub to: AccountId,
}

/// Response of mint, spend and transfer.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionResponse {
    /// The appended transaction.
    pub transaction_id: TransactionId,
}

/// Transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Credit with no counterparty.
    Mint,
    /// Debit with no counterparty.
    Spend,
    /// Debit of the listed account, credit of the recipient.
    Transfer,
}

/// One row of an account's history.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionView {
    /// Transaction type.
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Amount moved.
    pub amount: i64,
    /// Insertion timestamp.
    pub inserted_at: DateTime<Utc>,
    /// Credited account, transfers only.
    #[serde(default)]
    pub recipient: Option<AccountId>,
}

/// Health check response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// API error body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}
