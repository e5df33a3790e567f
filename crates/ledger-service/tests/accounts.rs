//! Account and ledger integration tests.

mod common;

use axum::http::StatusCode;
use common::TestHarness;
use serde_json::json;

// ============================================================================
// Register
// ============================================================================

#[tokio::test]
async fn register_returns_positive_id_and_zero_balance() {
    let harness = TestHarness::new();

    let id = harness.register("alice").await;

    assert!(id > 0);
    assert_eq!(harness.balance(id).await, 0);
    assert!(harness.transactions(id).await.is_empty());
}

#[tokio::test]
async fn register_twice_gives_distinct_ids() {
    let harness = TestHarness::new();

    let first = harness.register("alice").await;
    let second = harness.register("alice").await;

    assert_ne!(first, second);
}

#[tokio::test]
async fn register_with_empty_name_fails() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/accounts/register")
        .json(&json!({ "name": "" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn register_without_name_is_rejected() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/accounts/register")
        .json(&json!({}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn malformed_json_body_is_a_validation_error() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/accounts/register")
        .text("{\"name\": ")
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
}

// ============================================================================
// Reads
// ============================================================================

#[tokio::test]
async fn unknown_account_reads_are_not_found() {
    let harness = TestHarness::new();

    let response = harness.server.get("/accounts/999/balance").await;
    response.assert_status_not_found();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "not_found");

    harness
        .server
        .get("/accounts/999/transactions")
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn non_numeric_account_id_is_rejected() {
    let harness = TestHarness::new();

    for path in ["/accounts/abc/balance", "/accounts/abc/transactions"] {
        let response = harness.server.get(path).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"]["code"], "validation_error");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("invalid account id"));
    }

    harness
        .server
        .post("/accounts/abc/mint")
        .json(&json!({ "amount": 10 }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Mint
// ============================================================================

#[tokio::test]
async fn mint_credits_and_records_transaction() {
    let harness = TestHarness::new();
    let id = harness.register("alice").await;

    let response = harness
        .server
        .post(&format!("/accounts/{id}/mint"))
        .json(&json!({ "amount": 100 }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["transaction_id"].as_i64().unwrap() > 0);

    assert_eq!(harness.balance(id).await, 100);
    let log = harness.transactions(id).await;
    assert_eq!(log.len(), 1);
    assert_eq!(log[0]["type"], "mint");
    assert_eq!(log[0]["amount"], 100);
    assert!(log[0]["inserted_at"].is_string());
    assert!(log[0].get("recipient").is_none());
}

#[tokio::test]
async fn mint_non_positive_amount_fails() {
    let harness = TestHarness::new();
    let id = harness.register("alice").await;

    for amount in [0, -5] {
        harness
            .server
            .post(&format!("/accounts/{id}/mint"))
            .json(&json!({ "amount": amount }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    assert_eq!(harness.balance(id).await, 0);
}

#[tokio::test]
async fn mint_into_unknown_account_is_not_found() {
    let harness = TestHarness::new();

    harness
        .server
        .post("/accounts/42/mint")
        .json(&json!({ "amount": 10 }))
        .await
        .assert_status_not_found();
}

// ============================================================================
// Spend
// ============================================================================

#[tokio::test]
async fn spend_debits_balance() {
    let harness = TestHarness::new();
    let id = harness.funded("alice", 100).await;

    harness
        .server
        .post(&format!("/accounts/{id}/spend"))
        .json(&json!({ "amount": 30 }))
        .await
        .assert_status_ok();

    assert_eq!(harness.balance(id).await, 70);
    let log = harness.transactions(id).await;
    assert_eq!(log.len(), 2);
    assert_eq!(log[1]["type"], "spend");
    assert_eq!(log[1]["amount"], 30);
}

#[tokio::test]
async fn overspend_fails_without_side_effects() {
    let harness = TestHarness::new();
    let id = harness.funded("alice", 50).await;

    let response = harness
        .server
        .post(&format!("/accounts/{id}/spend"))
        .json(&json!({ "amount": 51 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "insufficient_balance");
    assert_eq!(body["error"]["details"]["balance"], 50);
    assert_eq!(body["error"]["details"]["required"], 51);

    assert_eq!(harness.balance(id).await, 50);
    assert_eq!(harness.transactions(id).await.len(), 1);
}

// ============================================================================
// Transfer
// ============================================================================

#[tokio::test]
async fn transfer_moves_funds() {
    let harness = TestHarness::new();
    let a = harness.funded("alice", 50).await;
    let b = harness.register("bob").await;

    let response = harness
        .server
        .post(&format!("/accounts/{a}/transfer"))
        .json(&json!({ "amount": 50, "to": b }))
        .await;
    response.assert_status_ok();

    assert_eq!(harness.balance(a).await, 0);
    assert_eq!(harness.balance(b).await, 50);

    let sender_log = harness.transactions(a).await;
    assert_eq!(sender_log.len(), 2);
    assert_eq!(sender_log[1]["type"], "transfer");
    assert_eq!(sender_log[1]["amount"], 50);
    assert_eq!(sender_log[1]["recipient"], b);

    // The recipient's history does not show incoming transfers.
    assert!(harness.transactions(b).await.is_empty());
}

#[tokio::test]
async fn transfer_to_unknown_recipient_is_not_found() {
    let harness = TestHarness::new();
    let a = harness.funded("alice", 50).await;

    harness
        .server
        .post(&format!("/accounts/{a}/transfer"))
        .json(&json!({ "amount": 10, "to": 9999 }))
        .await
        .assert_status_not_found();

    assert_eq!(harness.balance(a).await, 50);
    assert_eq!(harness.transactions(a).await.len(), 1);
}

#[tokio::test]
async fn transfer_with_insufficient_balance_fails() {
    let harness = TestHarness::new();
    let a = harness.funded("alice", 10).await;
    let b = harness.register("bob").await;

    harness
        .server
        .post(&format!("/accounts/{a}/transfer"))
        .json(&json!({ "amount": 11, "to": b }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(harness.balance(a).await, 10);
    assert_eq!(harness.balance(b).await, 0);
}

#[tokio::test]
async fn transfer_without_recipient_is_rejected() {
    let harness = TestHarness::new();
    let a = harness.funded("alice", 10).await;

    let response = harness
        .server
        .post(&format!("/accounts/{a}/transfer"))
        .json(&json!({ "amount": 5 }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(harness.balance(a).await, 10);
    assert_eq!(harness.transactions(a).await.len(), 1);
}

#[tokio::test]
async fn mistyped_amount_is_a_validation_error() {
    let harness = TestHarness::new();
    let id = harness.funded("alice", 10).await;

    let response = harness
        .server
        .post(&format!("/accounts/{id}/spend"))
        .json(&json!({ "amount": "five" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(harness.balance(id).await, 10);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn concurrent_spends_never_overdraw() {
    let harness = TestHarness::new();
    let id = harness.funded("alice", 100).await;

    let path = format!("/accounts/{id}/spend");
    let first = harness.server.post(&path).json(&json!({ "amount": 100 }));
    let second = harness.server.post(&path).json(&json!({ "amount": 100 }));
    let (first, second) = tokio::join!(async { first.await }, async { second.await });

    let (winner, loser) = if first.status_code() == StatusCode::OK {
        (first, second)
    } else {
        (second, first)
    };
    winner.assert_status_ok();
    loser.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = loser.json();
    assert_eq!(body["error"]["code"], "insufficient_balance");
    assert_eq!(body["error"]["details"]["balance"], 0);
    assert_eq!(body["error"]["details"]["required"], 100);

    assert_eq!(harness.balance(id).await, 0);
    assert_eq!(harness.transactions(id).await.len(), 2);
}
