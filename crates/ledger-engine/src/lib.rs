//! Ledger transaction engine.
//!
//! [`Ledger`] is the only writer of balances and the transaction log. Each of
//! its operations validates its input, then runs as one atomic unit against
//! the store: every existence and sufficiency check and every write happen in
//! the same unit, so a concurrent debit can never invalidate a check that has
//! already passed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ledger_engine::Ledger;
//! use ledger_store::MemoryStore;
//!
//! # async fn example() -> ledger_core::Result<()> {
//! let ledger = Ledger::new(Arc::new(MemoryStore::new()));
//!
//! let alice = ledger.register("alice").await?;
//! let bob = ledger.register("bob").await?;
//!
//! ledger.mint(alice, 100).await?;
//! ledger.transfer(alice, bob, 40).await?;
//!
//! assert_eq!(ledger.balance(alice).await?, 60);
//! assert_eq!(ledger.balance(bob).await?, 40);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod ledger;

pub use ledger::Ledger;
