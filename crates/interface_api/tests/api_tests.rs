//! End-to-end tests for the pledge HTTP API
//!
//! Requests go through the full router, middleware included, via
//! `tower::ServiceExt::oneshot`.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use core_kernel::{Currency, PledgeId};
use domain_pledge::{InMemoryLedgerStore, PledgeLedger, ReconciliationService};
use interface_api::{config::ApiConfig, create_router, seed_demo_pledge, AppState};
use test_utils::{TemporalFixtures, TestLedgerBuilder};

fn service() -> Arc<ReconciliationService> {
    Arc::new(ReconciliationService::new(
        Arc::new(InMemoryLedgerStore::new()),
        Arc::new(TemporalFixtures::march_clock()),
    ))
}

fn router(service: Arc<ReconciliationService>) -> Router {
    create_router(AppState::new(service, ApiConfig::default()).unwrap())
}

async fn app_with(ledger: PledgeLedger) -> (Router, PledgeId) {
    let service = service();
    let pledge_id = service.open_ledger(ledger).await.unwrap().pledge_id();
    (router(service), pledge_id)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: String) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: String, body: Value) -> Request<Body> {
    post_raw(uri, body.to_string())
}

fn post_raw(uri: String, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn payments_uri(pledge_id: PledgeId) -> String {
    format!("/api/v1/pledges/{}/payments", pledge_id)
}

fn ledger_uri(pledge_id: PledgeId) -> String {
    format!("/api/v1/pledges/{}/ledger", pledge_id)
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).unwrap(),
        other => Decimal::from_str(&other.to_string()).unwrap(),
    }
}

// ============================================================================
// Health
// ============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let app = router(service());
        let (status, body) = send(&app, get("/health".to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reports_store() {
        let app = router(service());
        let (status, body) = send(&app, get("/health/ready".to_string())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ledger_store"]["status"], "healthy");
    }
}

// ============================================================================
// Building-fund walkthrough
// ============================================================================

mod payment_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_pledge_paid_off_over_two_payments() {
        let (app, pledge_id) = app_with(TestLedgerBuilder::new().build()).await;

        let (status, state) = send(&app, get(ledger_uri(pledge_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decimal(&state["remaining_amount"]), dec!(10000));
        assert_eq!(state["is_complete"], false);

        let (status, recorded) = send(
            &app,
            post_json(
                payments_uri(pledge_id),
                json!({"amount": "3000.00", "currency": "GHS", "method": "mobile_money"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(recorded["receipt_number"], "PAY-001");
        assert_eq!(recorded["payment"]["date"], "2024-03-17");
        assert_eq!(decimal(&recorded["ledger"]["paid_amount"]), dec!(3000));
        assert_eq!(decimal(&recorded["ledger"]["remaining_amount"]), dec!(7000));

        let (status, error) = send(
            &app,
            post_json(payments_uri(pledge_id), json!({"amount": "7000.01", "method": "cash"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error["error"], "validation_error");

        let (status, recorded) = send(
            &app,
            post_json(
                payments_uri(pledge_id),
                json!({"amount": "7000.00", "method": "cash", "date": "2024-03-10", "notes": "Balance"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(recorded["receipt_number"], "PAY-002");
        assert_eq!(recorded["ledger"]["is_complete"], true);
        assert_eq!(recorded["ledger"]["status"], "completed");
        assert_eq!(recorded["ledger"]["next_due_date"], Value::Null);
        assert_eq!(recorded["ledger"]["last_payment_date"], "2024-03-10");
        assert_eq!(decimal(&recorded["ledger"]["remaining_amount"]), Decimal::ZERO);

        let (status, payments) = send(&app, get(payments_uri(pledge_id))).await;
        assert_eq!(status, StatusCode::OK);
        let payments = payments.as_array().unwrap();
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[0]["receipt_number"], "PAY-001");
        assert_eq!(payments[1]["notes"], "Balance");
        assert_eq!(payments[1]["date"], "2024-03-10");
    }

    #[tokio::test]
    async fn test_seeded_demo_pledge_is_served() {
        let service = service();
        let start = TemporalFixtures::pledge_start();
        let pledge_id = seed_demo_pledge(&service, Currency::GHS, start).await.unwrap();
        let app = router(service);

        let (status, state) = send(&app, get(ledger_uri(pledge_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state["currency"], "GHS");
        assert_eq!(decimal(&state["total_amount"]), dec!(10000));
        assert_eq!(state["next_due_date"], "2024-01-07");
        assert_eq!(state["is_overdue"], true);
    }
}

// ============================================================================
// Rejections
// ============================================================================

mod rejection_tests {
    use super::*;

    #[tokio::test]
    async fn test_non_positive_amounts() {
        let (app, pledge_id) = app_with(TestLedgerBuilder::new().build()).await;

        for amount in ["-5.00", "0.00"] {
            let (status, body) = send(
                &app,
                post_json(payments_uri(pledge_id), json!({"amount": amount, "method": "cash"})),
            )
            .await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
            assert!(body["message"].as_str().unwrap().contains("greater than zero"));
        }
    }

    #[tokio::test]
    async fn test_foreign_currency() {
        let (app, pledge_id) = app_with(TestLedgerBuilder::new().build()).await;
        let (status, _) = send(
            &app,
            post_json(
                payments_uri(pledge_id),
                json!({"amount": "100", "currency": "USD", "method": "card"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_currency() {
        let (app, pledge_id) = app_with(TestLedgerBuilder::new().build()).await;
        let (status, body) = send(
            &app,
            post_json(
                payments_uri(pledge_id),
                json!({"amount": "100", "currency": "XYZ", "method": "cash"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("Unknown currency"));
        assert!(message.contains("XYZ"));
    }

    #[tokio::test]
    async fn test_sub_minor_amount_is_rejected_not_rounded() {
        let (app, pledge_id) = app_with(TestLedgerBuilder::new().build()).await;
        send(
            &app,
            post_json(payments_uri(pledge_id), json!({"amount": "3000.00", "method": "cash"})),
        )
        .await;

        let (status, _) = send(
            &app,
            post_json(payments_uri(pledge_id), json!({"amount": "7000.00005", "method": "cash"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (_, state) = send(&app, get(ledger_uri(pledge_id))).await;
        assert_eq!(state["is_complete"], false);
        assert_eq!(decimal(&state["remaining_amount"]), dec!(7000));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let (app, pledge_id) = app_with(TestLedgerBuilder::new().build()).await;
        let (status, body) = send(
            &app,
            post_json(payments_uri(pledge_id), json!({"amount": "100", "method": "barter"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["message"].as_str().unwrap().contains("barter"));
    }

    #[tokio::test]
    async fn test_invalid_body_fields() {
        let (app, pledge_id) = app_with(TestLedgerBuilder::new().build()).await;

        let (status, _) = send(
            &app,
            post_json(
                payments_uri(pledge_id),
                json!({"amount": "100", "method": "cash", "receipt_number": "PAY-999"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, body) = send(
            &app,
            post_json(
                payments_uri(pledge_id),
                json!({"amount": "100", "currency": "CEDI", "method": "cash"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["details"].as_array().is_some());

        let (status, _) = send(&app, post_raw(payments_uri(pledge_id), "{not json".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rejected_payment_leaves_ledger_unchanged() {
        let (app, pledge_id) = app_with(TestLedgerBuilder::new().build()).await;

        send(
            &app,
            post_json(payments_uri(pledge_id), json!({"amount": "10000.01", "method": "cash"})),
        )
        .await;

        let (_, payments) = send(&app, get(payments_uri(pledge_id))).await;
        assert!(payments.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_pledge() {
        let app = router(service());
        let (status, body) = send(&app, get(ledger_uri(PledgeId::new()))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_malformed_pledge_id() {
        let app = router(service());
        let (status, body) = send(&app, get("/api/v1/pledges/not-a-pledge/ledger".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }
}
