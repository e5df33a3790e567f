//! Ledger Client SDK.
//!
//! This crate provides a client library for services to interact with the
//! ledger API.
//!
//! # Example
//!
//! ```no_run
//! use ledger_client::LedgerClient;
//!
//! # async fn example() -> Result<(), ledger_client::ClientError> {
//! let client = LedgerClient::new("http://ledger:3000")?;
//!
//! let alice = client.register("alice").await?;
//! let bob = client.register("bob").await?;
//!
//! client.mint(alice, 100).await?;
//! client.transfer(alice, bob, 40).await?;
//!
//! println!("Alice now holds {}", client.balance(alice).await?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, LedgerClient};
pub use error::ClientError;
pub use types::{
    BalanceResponse, HealthResponse, RegisterResponse, TransactionResponse, TransactionType,
    TransactionView,
};

pub use ledger_core::{AccountId, TransactionId};
