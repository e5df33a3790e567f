//! Ledger HTTP API service.
//!
//! This crate exposes the ledger engine over HTTP:
//!
//! - Account registration
//! - Balance and transaction history reads
//! - Mint, spend and transfer
//!
//! Errors are returned as `{"error": {"code", "message", "details"?}}` with
//! a status derived from the error's kind: validation and domain failures are
//! 400, unknown accounts 404, everything else 500.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ServiceConfig, StoreBackend};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
