//! Ledger HTTP client implementation.

use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use ledger_core::{AccountId, TransactionId};

use crate::error::ClientError;
use crate::types::{
    AmountRequest, ApiErrorResponse, BalanceResponse, HealthResponse, RegisterRequest,
    RegisterResponse, TransactionResponse, TransactionView, TransferRequest,
};

/// Ledger API client.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    client: Client,
    base_url: String,
}

impl LedgerClient {
    /// Create a new ledger client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the ledger service (e.g., `"http://ledger:3000"`)
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new ledger client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` if `name` is empty, or an error if the
    /// request fails.
    pub async fn register(&self, name: &str) -> Result<AccountId, ClientError> {
        let response: RegisterResponse = self
            .send(
                Method::POST,
                "/accounts/register",
                Some(&RegisterRequest { name }),
            )
            .await?;
        Ok(response.account_id)
    }

    /// Get an account's balance.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::AccountNotFound` if the account does not exist,
    /// or an error if the request fails.
    pub async fn balance(&self, account_id: AccountId) -> Result<i64, ClientError> {
        let response: BalanceResponse = self
            .send::<(), _>(
                Method::GET,
                &format!("/accounts/{account_id}/balance"),
                None,
            )
            .await?;
        Ok(response.balance)
    }

    /// List an account's transactions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::AccountNotFound` if the account does not exist,
    /// or an error if the request fails.
    pub async fn transactions(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransactionView>, ClientError> {
        self.send::<(), _>(
            Method::GET,
            &format!("/accounts/{account_id}/transactions"),
            None,
        )
        .await
    }

    /// Credit an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is rejected, the account does not exist,
    /// or the request fails.
    pub async fn mint(
        &self,
        account_id: AccountId,
        amount: i64,
    ) -> Result<TransactionId, ClientError> {
        let response: TransactionResponse = self
            .send(
                Method::POST,
                &format!("/accounts/{account_id}/mint"),
                Some(&AmountRequest { amount }),
            )
            .await?;
        Ok(response.transaction_id)
    }

    /// Debit an account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InsufficientBalance` if `amount` exceeds the
    /// balance, or another error as for [`LedgerClient::mint`].
    pub async fn spend(
        &self,
        account_id: AccountId,
        amount: i64,
    ) -> Result<TransactionId, ClientError> {
        let response: TransactionResponse = self
            .send(
                Method::POST,
                &format!("/accounts/{account_id}/spend"),
                Some(&AmountRequest { amount }),
            )
            .await?;
        Ok(response.transaction_id)
    }

    /// Move `amount` from `sender` to `recipient`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InsufficientBalance` if `amount` exceeds the
    /// sender's balance, or another error as for [`LedgerClient::mint`].
    pub async fn transfer(
        &self,
        sender: AccountId,
        recipient: AccountId,
        amount: i64,
    ) -> Result<TransactionId, ClientError> {
        let response: TransactionResponse = self
            .send(
                Method::POST,
                &format!("/accounts/{sender}/transfer"),
                Some(&TransferRequest {
                    amount,
                    to: recipient,
                }),
            )
            .await?;
        Ok(response.transaction_id)
    }

    /// Check service health.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service is unhealthy.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.send::<(), _>(Method::GET, "/health", None).await
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(method = %method, url = %url, "Sending ledger request");

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let code = api_error.error.code.as_str();
                let message = api_error.error.message;
                let detail = |key: &str| {
                    api_error
                        .error
                        .details
                        .as_ref()
                        .and_then(|d| d.get(key))
                        .and_then(serde_json::Value::as_i64)
                        .unwrap_or(0)
                };

                // Map specific error codes to typed errors
                match code {
                    "validation_error" => Err(ClientError::Validation { message }),
                    "not_found" => Err(ClientError::AccountNotFound { message }),
                    "insufficient_balance" => Err(ClientError::InsufficientBalance {
                        balance: detail("balance"),
                        required: detail("required"),
                    }),
                    _ => Err(ClientError::Api {
                        code: code.to_string(),
                        message,
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let client = LedgerClient::new("http://localhost:3000").unwrap();
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = LedgerClient::new("http://localhost:3000/").unwrap();
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn client_options() {
        let options = ClientOptions { timeout_seconds: 5 };
        let client = LedgerClient::with_options("http://localhost:3000", options).unwrap();
        assert_eq!(client.base_url, "http://localhost:3000");
    }
}
