//! Application state.

use std::sync::Arc;

use ledger_engine::Ledger;
use ledger_store::LedgerStore;

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The ledger engine.
    pub ledger: Ledger,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state over a storage backend.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, config: ServiceConfig) -> Self {
        Self {
            ledger: Ledger::new(store),
            config,
        }
    }
}
