//! Core types for the ledger service.
//!
//! This crate provides the types shared by the store, the engine and the HTTP
//! layer:
//!
//! - **Identifiers**: `AccountId`, `TransactionId`
//! - **Accounts**: `Account`
//! - **Transactions**: `Transaction`, `TransactionKind`
//! - **Errors**: `LedgerError`, classified by `ErrorKind`
//!
//! # Amounts
//!
//! Amounts and balances are whole units stored as `i64`. Amounts passed to
//! mint, spend and transfer must be strictly positive; balances never drop
//! below zero.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod error;
pub mod ids;
pub mod transaction;

pub use account::{validate_name, Account};
pub use error::{ErrorKind, LedgerError, Result};
pub use ids::{AccountId, IdError, TransactionId};
pub use transaction::{require_positive, Transaction, TransactionKind};
