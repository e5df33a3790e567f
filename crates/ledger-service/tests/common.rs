//! Common test utilities for ledger service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::json;

use ledger_service::{create_router, AppState, ServiceConfig, StoreBackend};
use ledger_store::MemoryStore;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
}

impl TestHarness {
    /// Create a new test harness over an empty in-memory store.
    pub fn new() -> Self {
        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            store_backend: StoreBackend::Memory,
            ..ServiceConfig::default()
        };

        let state = AppState::new(Arc::new(MemoryStore::new()), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server }
    }

    /// Register an account and return its id.
    pub async fn register(&self, name: &str) -> i64 {
        let response = self
            .server
            .post("/accounts/register")
            .json(&json!({ "name": name }))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        body["account_id"].as_i64().expect("account_id missing")
    }

    /// Register an account and mint `amount` into it.
    pub async fn funded(&self, name: &str, amount: i64) -> i64 {
        let id = self.register(name).await;
        self.server
            .post(&format!("/accounts/{id}/mint"))
            .json(&json!({ "amount": amount }))
            .await
            .assert_status_ok();
        id
    }

    /// Current balance of an account, read over HTTP.
    pub async fn balance(&self, id: i64) -> i64 {
        let response = self.server.get(&format!("/accounts/{id}/balance")).await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        body["balance"].as_i64().expect("balance missing")
    }

    /// Transaction history of an account, read over HTTP.
    pub async fn transactions(&self, id: i64) -> Vec<serde_json::Value> {
        let response = self
            .server
            .get(&format!("/accounts/{id}/transactions"))
            .await;
        response.assert_status_ok();
        response.json()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
