//! End-to-end HTTP tests against the axum router

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use banking_api::{app, AppState};
use ledger_core::{config::PartnerConfig, Config, Ledger};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_app_with(config: Config) -> Router {
    let ledger = Arc::new(Ledger::open(config).unwrap());
    app(AppState::new(ledger))
}

fn test_app() -> Router {
    test_app_with(Config::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

async fn create_jane(app: &Router) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/customers",
        Some(json!({"name": "Jane Doe", "email": "jane@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

fn id(value: &Value, key: &str) -> String {
    value[key].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_customer_and_list_accounts() {
    let app = test_app();
    let jane = create_jane(&app).await;
    let customer_id = id(&jane, "customerId");

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/customers/{}/accounts", customer_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customerId"], customer_id.as_str());

    let accounts = body["accounts"].as_array().unwrap();
    assert_eq!(accounts.len(), 2);

    let savings = accounts.iter().find(|a| a["type"] == "savings").unwrap();
    let current = accounts.iter().find(|a| a["type"] == "current").unwrap();
    assert_eq!(savings["id"], jane["savingsAccountId"]);
    assert_eq!(savings["balance"], 500.0);
    assert_eq!(current["balance"], 0.0);
}

#[tokio::test]
async fn test_create_customer_reports_every_validation_error() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/customers",
        Some(json!({"name": "R2-D2", "email": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"errors": ["Name must contain only letters and spaces", "Email cannot be empty"]})
    );
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/customers")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({"errors": ["Invalid request body"]}));
}

#[tokio::test]
async fn test_unknown_customer_is_not_found() {
    let app = test_app();

    for path in ["accounts", "transactions", "bankz/balances"] {
        let (status, body) =
            send(&app, Method::GET, &format!("/api/customers/ghost/{}", path), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {}", path);
        assert_eq!(body, json!({"errors": ["Customer not found"]}));
    }
}

#[tokio::test]
async fn test_internal_transfer_flow() {
    let app = test_app();
    let jane = create_jane(&app).await;
    let customer_id = id(&jane, "customerId");
    let current = id(&jane, "currentAccountId");
    let savings = id(&jane, "savingsAccountId");
    let transfers = format!("/api/customers/{}/transfers", customer_id);

    // Current starts at zero
    let (status, body) = send(
        &app,
        Method::POST,
        &transfers,
        Some(json!({"fromAccountId": current, "toAccountId": savings, "amount": 100.0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"errors": ["Insufficient funds"]}));

    let (status, body) = send(
        &app,
        Method::POST,
        &transfers,
        Some(json!({"fromAccountId": savings, "toAccountId": current, "amount": 100.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    let transaction_id = id(&body, "transactionId");

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/customers/{}/transactions?type=transfer", customer_id),
        None,
    )
    .await;
    let listed = body["transactions"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], transaction_id.as_str());
    assert_eq!(listed[0]["accountId"], savings.as_str());
    assert_eq!(listed[0]["fromAccountId"], savings.as_str());
    assert_eq!(listed[0]["toAccountId"], current.as_str());
    assert_eq!(listed[0]["amount"], 100.0);
    assert!(listed[0]["createdAt"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_current_to_savings_records_fee_and_interest() {
    let app = test_app();
    let jane = create_jane(&app).await;
    let customer_id = id(&jane, "customerId");
    let current = id(&jane, "currentAccountId");
    let savings = id(&jane, "savingsAccountId");
    let transfers = format!("/api/customers/{}/transfers", customer_id);

    send(
        &app,
        Method::POST,
        &transfers,
        Some(json!({"fromAccountId": savings, "toAccountId": current, "amount": 300})),
    )
    .await;
    let (status, _) = send(
        &app,
        Method::POST,
        &transfers,
        Some(json!({"fromAccountId": current, "toAccountId": savings, "amount": 200})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/customers/{}/transactions?type=fee", customer_id),
        None,
    )
    .await;
    let fees = body["transactions"].as_array().unwrap();
    assert_eq!(fees.len(), 1);
    assert_eq!(fees[0]["amount"], 0.1);
    assert_eq!(fees[0]["accountId"], current.as_str());

    let (_, body) = send(
        &app,
        Method::GET,
        &format!(
            "/api/customers/{}/transactions?accountId={}&type=interest",
            customer_id, savings
        ),
        None,
    )
    .await;
    let interest = body["transactions"].as_array().unwrap();
    assert_eq!(interest.len(), 1);
    assert_eq!(interest[0]["amount"], 1.0);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/customers/{}/accounts", customer_id),
        None,
    )
    .await;
    let accounts = body["accounts"].as_array().unwrap();
    let current_balance = accounts.iter().find(|a| a["type"] == "current").unwrap()["balance"]
        .as_f64()
        .unwrap();
    let savings_balance = accounts.iter().find(|a| a["type"] == "savings").unwrap()["balance"]
        .as_f64()
        .unwrap();
    assert!((current_balance - 99.9).abs() < 1e-9);
    assert!((savings_balance - 401.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_transfer_validation_messages() {
    let app = test_app();
    let jane = create_jane(&app).await;
    let customer_id = id(&jane, "customerId");
    let savings = id(&jane, "savingsAccountId");
    let current = id(&jane, "currentAccountId");
    let transfers = format!("/api/customers/{}/transfers", customer_id);

    let cases = [
        (
            json!({"fromAccountId": savings, "toAccountId": "x", "amount": 0}),
            StatusCode::BAD_REQUEST,
            "Amount must be positive".to_string(),
        ),
        (
            json!({"fromAccountId": savings, "toAccountId": savings, "amount": 5}),
            StatusCode::BAD_REQUEST,
            "Cannot transfer to the same account".to_string(),
        ),
        (
            json!({"toAccountId": savings, "amount": 5}),
            StatusCode::BAD_REQUEST,
            "From account ID cannot be empty".to_string(),
        ),
        (
            json!({"fromAccountId": savings, "amount": 5}),
            StatusCode::BAD_REQUEST,
            "To account ID cannot be empty".to_string(),
        ),
        (
            json!({"fromAccountId": current, "toAccountId": savings, "amount": 7.92e28}),
            StatusCode::BAD_REQUEST,
            "Amount too large".to_string(),
        ),
        (
            json!({"fromAccountId": "missing", "toAccountId": savings, "amount": 5}),
            StatusCode::BAD_REQUEST,
            "Source account missing not found".to_string(),
        ),
        (
            json!({"fromAccountId": savings, "toAccountId": "nowhere", "amount": 5}),
            StatusCode::BAD_REQUEST,
            "Destination account nowhere not found".to_string(),
        ),
    ];

    for (body, expected_status, expected_message) in cases {
        let (status, response) = send(&app, Method::POST, &transfers, Some(body)).await;
        assert_eq!(status, expected_status, "{}", expected_message);
        assert_eq!(response, json!({"errors": [expected_message]}));
    }

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/customers/ghost/transfers",
        Some(json!({"fromAccountId": savings, "toAccountId": "x", "amount": 5})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"errors": ["Customer not found"]}));
}

#[tokio::test]
async fn test_cross_customer_transfer_is_rejected() {
    let app = test_app();
    let jane = create_jane(&app).await;
    let (_, john) = send(
        &app,
        Method::POST,
        "/api/customers",
        Some(json!({"name": "John Roe", "email": "john@example.com"})),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/customers/{}/transfers", id(&jane, "customerId")),
        Some(json!({
            "fromAccountId": id(&jane, "savingsAccountId"),
            "toAccountId": id(&john, "savingsAccountId"),
            "amount": 10
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({"errors": ["Destination account does not belong to the customer"]})
    );
}

#[tokio::test]
async fn test_external_transfer_and_partner_balances() {
    let app = test_app();
    let jane = create_jane(&app).await;
    let customer_id = id(&jane, "customerId");
    let savings = id(&jane, "savingsAccountId");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/customers/{}/transfers", customer_id),
        Some(json!({"fromAccountId": savings, "toAccountId": "bankz-acc-123", "amount": 50})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(id(&body, "transactionId").starts_with("bankz-tx-"));

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/customers/{}/bankz/balances", customer_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["balances"],
        json!([
            {"accountId": "bankz-acc-123", "balance": 1050.0},
            {"accountId": "bankz-acc-456", "balance": 500.0}
        ])
    );

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/api/customers/{}/transactions?type=bankz_transfer", customer_id),
        None,
    )
    .await;
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_partner_auth_failure_is_server_error() {
    let config = Config {
        partner: PartnerConfig {
            client_secret: "rotated".to_string(),
            ..PartnerConfig::default()
        },
        ..Config::default()
    };
    let app = test_app_with(config);
    let jane = create_jane(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/customers/{}/bankz/balances", id(&jane, "customerId")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"errors": ["Failed to authenticate with Bank Z"]}));
}

#[tokio::test]
async fn test_empty_transaction_filter_result_is_ok() {
    let app = test_app();
    let jane = create_jane(&app).await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!(
            "/api/customers/{}/transactions?type=interest",
            id(&jane, "customerId")
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transactions"], json!([]));
}

#[tokio::test]
async fn test_health_and_metrics() {
    let app = test_app();
    create_jane(&app).await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("ledger_customers_created_total 1"));
}
