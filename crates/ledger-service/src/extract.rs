//! Request extractors whose rejections render as [`ApiError`].
//!
//! Axum's stock `Json` and `Path` extractors answer malformed input with a
//! plain-text body (and 422 for JSON that parses but does not fit the type).
//! These wrappers turn every such rejection into a 400 `validation_error`.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path};
use axum::http::request::Parts;

use ledger_core::{AccountId, IdError};

use crate::error::ApiError;

/// JSON body extractor.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// The `:id` path segment, parsed as an [`AccountId`].
#[derive(Debug, Clone, Copy)]
pub struct AccountPath(pub AccountId);

#[async_trait]
impl<S> FromRequestParts<S> for AccountPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        raw.parse()
            .map(Self)
            .map_err(|err: IdError| ApiError::BadRequest(err.to_string()))
    }
}
