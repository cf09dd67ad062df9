//! Integration tests for the API.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use payroll_ledger::api::create_router;
use payroll_ledger::app::AppState;
use payroll_ledger::domain::{Company, HealthResponse, HealthStatus, NewUser, Transaction, TransactionType, User};
use payroll_ledger::test_utils::MockDatabaseClient;

fn create_test_state() -> (Arc<MockDatabaseClient>, Router) {
    let db = Arc::new(MockDatabaseClient::new());
    let state = Arc::new(AppState::new(Arc::clone(&db)));
    (db, create_router(state))
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn seed_employee(db: &MockDatabaseClient, salary: i64) -> User {
    let position = db.insert_position("CEO", salary);
    db.insert_user(&NewUser {
        name: "test".to_string(),
        secret_id: "secret".to_string(),
        email: "test@test.com".to_string(),
        phone: "123456789".to_string(),
        address: "Jln. Malioboro".to_string(),
        position_id: position.id,
    })
}

#[tokio::test]
async fn test_health_check_healthy() {
    let (_db, router) = create_test_state();

    let (status, json) = send(&router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let health: HealthResponse = serde_json::from_value(json).unwrap();
    assert_eq!(health.status, HealthStatus::Healthy);
    assert_eq!(health.database, HealthStatus::Healthy);
}

#[tokio::test]
async fn test_readiness_reflects_database() {
    let (db, router) = create_test_state();

    let (status, _) = send(&router, "GET", "/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);

    db.set_healthy(false);
    let (status, _) = send(&router, "GET", "/health/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(&router, "GET", "/health/live", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_payroll_flow() {
    let (_db, router) = create_test_state();

    let (status, json) = send(
        &router,
        "POST",
        "/company",
        Some(json!({"name": "PT SEJAHTERA SELAMANYA", "balance": 20000000, "address": "Jln. Malioboro"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["balance"], 20_000_000);

    let (status, json) = send(
        &router,
        "POST",
        "/positions",
        Some(json!({"name": "CEO", "salary": 5000000})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let position_id = json["data"]["id"].as_i64().unwrap();

    let (status, json) = send(
        &router,
        "POST",
        "/users",
        Some(json!({
            "name": "budi",
            "secret_id": "s3cret",
            "email": "budi@test.com",
            "phone": "08123",
            "address": "Jln. Kaliurang",
            "position_id": position_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"].get("secret_id").is_none());
    let user_id = json["data"]["id"].as_i64().unwrap();

    let (status, json) = send(
        &router,
        "POST",
        "/users/withdraw",
        Some(json!({"id": user_id, "secret_id": "s3cret"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);

    let (status, json) = send(&router, "GET", "/company", None).await;
    assert_eq!(status, StatusCode::OK);
    let company: Company = serde_json::from_value(json["data"].clone()).unwrap();
    assert_eq!(company.balance, 15_000_000);

    let (status, json) = send(&router, "GET", "/transactions", None).await;
    assert_eq!(status, StatusCode::OK);
    let ledger: Vec<Transaction> = serde_json::from_value(json["data"].clone()).unwrap();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].amount, 5_000_000);
    assert_eq!(ledger[0].note, "budi withdraw salary ");
    assert_eq!(ledger[0].r#type, TransactionType::Debit);
}

#[tokio::test]
async fn test_withdraw_with_wrong_secret_is_rejected() {
    let (db, router) = create_test_state();
    db.set_company("PT Test", "Jln. Test", 1_000);
    let user = seed_employee(&db, 100);

    let (status, json) = send(
        &router,
        "POST",
        "/users/withdraw",
        Some(json!({"id": user.id, "secret_id": "guess"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "secret id not valid");
    assert_eq!(db.company().unwrap().balance, 1_000);
    assert!(db.transactions().is_empty());
}

#[tokio::test]
async fn test_withdraw_with_insufficient_balance() {
    let (db, router) = create_test_state();
    db.set_company("PT Test", "Jln. Test", 50);
    let user = seed_employee(&db, 100);

    let (status, json) = send(
        &router,
        "POST",
        "/users/withdraw",
        Some(json!({"id": user.id, "secret_id": "secret"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["message"], "insufficient_balance");
    assert_eq!(db.company().unwrap().balance, 50);
    assert!(db.transactions().is_empty());
}

#[tokio::test]
async fn test_withdraw_unknown_user() {
    let (db, router) = create_test_state();
    db.set_company("PT Test", "Jln. Test", 1_000);

    let (status, json) = send(
        &router,
        "POST",
        "/users/withdraw",
        Some(json!({"id": 404, "secret_id": "secret"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "not_found");
}

#[tokio::test]
async fn test_store_user_with_unknown_position() {
    let (db, router) = create_test_state();

    let (status, json) = send(
        &router,
        "POST",
        "/users",
        Some(json!({
            "name": "budi",
            "secret_id": "s3cret",
            "email": "budi@test.com",
            "phone": "08123",
            "address": "Jln. Kaliurang",
            "position_id": 77
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "position id not valid ");
    assert!(db.users().is_empty());
}

#[tokio::test]
async fn test_get_user_includes_position() {
    let (db, router) = create_test_state();
    let user = seed_employee(&db, 4_200);

    let (status, json) = send(&router, "GET", &format!("/users/{}", user.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], "test");
    assert_eq!(json["data"]["position"]["salary"], 4_200);

    let (status, _) = send(&router, "GET", "/users/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_and_delete_user() {
    let (db, router) = create_test_state();
    let user = seed_employee(&db, 100);

    let (status, json) = send(
        &router,
        "PUT",
        &format!("/users/{}", user.id),
        Some(json!({
            "name": "renamed",
            "secret_id": "secret",
            "email": "renamed@test.com",
            "phone": "1",
            "address": "Jln. Baru",
            "position_id": user.position_id
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], "renamed");

    let (status, _) = send(&router, "DELETE", &format!("/users/{}", user.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(db.users().is_empty());

    let (status, _) = send(&router, "DELETE", &format!("/users/{}", user.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_position_crud() {
    let (db, router) = create_test_state();

    let (status, json) = send(
        &router,
        "POST",
        "/positions",
        Some(json!({"name": "CTO", "salary": 900})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = json["data"]["id"].as_i64().unwrap();

    let (status, json) = send(
        &router,
        "PUT",
        &format!("/positions/{}", id),
        Some(json!({"name": "CTO", "salary": 1200})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["salary"], 1200);

    let (status, json) = send(&router, "GET", "/positions", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let (status, _) = send(&router, "DELETE", &format!("/positions/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(db.positions().is_empty());

    let (status, _) = send(
        &router,
        "PUT",
        &format!("/positions/{}", id),
        Some(json!({"name": "CTO", "salary": 1200})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_position_in_use_conflicts() {
    let (db, router) = create_test_state();
    let user = seed_employee(&db, 100);

    let (status, json) = send(
        &router,
        "DELETE",
        &format!("/positions/{}", user.position_id),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["success"], false);
    assert_eq!(db.positions().len(), 1);
}

#[tokio::test]
async fn test_company_status_mapping() {
    let (db, router) = create_test_state();

    let (status, json) = send(&router, "GET", "/company", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["message"], "not_found");

    let (status, _) = send(
        &router,
        "POST",
        "/company/topup",
        Some(json!({"balance": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    db.set_company("PT Test", "Jln. Test", 0);
    let (status, json) = send(
        &router,
        "POST",
        "/company/topup",
        Some(json!({"balance": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["balance"], 100);

    let ledger = db.transactions();
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].note, "Topup balance company");
    assert_eq!(ledger[0].r#type, TransactionType::Credit);
}

#[tokio::test]
async fn test_company_write_failure_is_unprocessable() {
    let db = Arc::new(MockDatabaseClient::failing_on(
        "company.create_or_update",
        "constraint violated",
    ));
    let router = create_router(Arc::new(AppState::new(Arc::clone(&db))));

    let (status, json) = send(
        &router,
        "POST",
        "/company",
        Some(json!({"name": "PT Test", "balance": 1, "address": "Jln. Test"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_company_read_failure_is_internal_error() {
    let db = Arc::new(MockDatabaseClient::failing_on("company.get", "db down"));
    let router = create_router(Arc::new(AppState::new(Arc::clone(&db))));

    let (status, _) = send(&router, "GET", "/company", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_transactions_failure_is_internal_error() {
    let db = Arc::new(MockDatabaseClient::failing_on("transaction.fetch", "db down"));
    let router = create_router(Arc::new(AppState::new(Arc::clone(&db))));

    let (status, json) = send(&router, "GET", "/transactions", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["message"], "database_error");
}
