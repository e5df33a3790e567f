//! API error types and responses.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use ledger_core::{ErrorKind, LedgerError};

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// A debit larger than the balance.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                msg.clone(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::InsufficientBalance { balance, required } => (
                StatusCode::BAD_REQUEST,
                "insufficient_balance",
                self.to_string(),
                Some(serde_json::json!({
                    "balance": balance,
                    "required": required
                })),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match (err.kind(), &err) {
            (
                ErrorKind::Domain,
                LedgerError::InsufficientBalance {
                    balance, required, ..
                },
            ) => Self::InsufficientBalance {
                balance: *balance,
                required: *required,
            },
            (ErrorKind::Validation | ErrorKind::Domain, _) => Self::BadRequest(err.to_string()),
            (ErrorKind::NotFound, _) => Self::NotFound(err.to_string()),
            (ErrorKind::Internal, _) => Self::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ledger_core::AccountId;

    #[test]
    fn ledger_errors_map_to_status_codes() {
        let cases = [
            (LedgerError::EmptyName, StatusCode::BAD_REQUEST),
            (
                LedgerError::NonPositiveAmount { amount: 0 },
                StatusCode::BAD_REQUEST,
            ),
            (
                LedgerError::not_found(AccountId::new(1)),
                StatusCode::NOT_FOUND,
            ),
            (
                LedgerError::InsufficientBalance {
                    account_id: AccountId::new(1),
                    balance: 1,
                    required: 2,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                LedgerError::BalanceOverflow {
                    account_id: AccountId::new(1),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                LedgerError::Storage("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn insufficient_balance_keeps_figures() {
        let err = ApiError::from(LedgerError::InsufficientBalance {
            account_id: AccountId::new(7),
            balance: 10,
            required: 25,
        });
        assert!(matches!(
            err,
            ApiError::InsufficientBalance {
                balance: 10,
                required: 25
            }
        ));
    }
}
