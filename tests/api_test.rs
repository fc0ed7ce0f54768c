mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use common::MockFixture;
use library_back_office::api::handlers::AppState;
use library_back_office::api::router::create_router;
use library_back_office::api::types::*;
use library_back_office::application::navigation::{BadgeColor, NavigationBadge};
use library_back_office::domain::{ActorRole, TransactionStatus};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// APIテスト用のヘルパー関数
// ============================================================================

fn setup_app(fixture: &MockFixture) -> axum::Router {
    let app_state = Arc::new(AppState {
        service_deps: fixture.deps(),
    });
    create_router(app_state)
}

async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    role: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        builder = builder.header("x-actor-role", role);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// 書籍と借り手を登録し、貸出作成リクエストを返す
fn create_request(fixture: &MockFixture) -> Value {
    let book_id = fixture.available_book();
    let borrower_id = fixture.borrower("Alice");
    json!({
        "book_id": book_id.value(),
        "borrower_id": borrower_id.value(),
        "borrowed_date": "2024-01-01",
        "borrowed_for_days": 10,
    })
}

async fn create_via_api(app: &axum::Router, fixture: &MockFixture) -> TransactionResponse {
    let response = send(
        app,
        "POST",
        "/transactions",
        Some("staff"),
        Some(create_request(fixture)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await
}

// ============================================================================
// 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let fixture = MockFixture::new();
    let app = setup_app(&fixture);

    let response = send(&app, "GET", "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_full_transaction_flow() {
    let fixture = MockFixture::new();
    let app = setup_app(&fixture);

    // Step 1: 貸出作成
    let created = create_via_api(&app, &fixture).await;
    assert_eq!(created.status, TransactionStatus::Borrowed);
    assert_eq!(created.fine, 0);
    assert_eq!(created.created_by, ActorRole::Staff);
    assert_eq!(created.due_date, Some(common::date(2024, 1, 11)));

    // Step 2: 延滞して返却
    let uri = format!("/transactions/{}/return", created.transaction_id);
    let response = send(
        &app,
        "POST",
        &uri,
        Some("staff"),
        Some(json!({ "returned_date": "2024-01-16" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let returned: TransactionResponse = read_json(response).await;
    assert_eq!(returned.status, TransactionStatus::Delayed);
    assert_eq!(returned.delay_days, 5);
    assert_eq!(returned.fine, 50);

    // Step 3: 詳細取得
    let uri = format!("/transactions/{}", created.transaction_id);
    let response = send(&app, "GET", &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: TransactionResponse = read_json(response).await;
    assert_eq!(fetched, returned);

    // Step 4: 削除
    let response = send(&app, "DELETE", &uri, Some("admin"), None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, "GET", &uri, None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_edit_transaction_via_api() {
    let fixture = MockFixture::new();
    let app = setup_app(&fixture);
    let created = create_via_api(&app, &fixture).await;

    let uri = format!("/transactions/{}", created.transaction_id);
    let response = send(
        &app,
        "PUT",
        &uri,
        Some("admin"),
        Some(json!({
            "book_id": created.book_id,
            "borrower_id": created.borrower_id,
            "borrowed_date": "2024-01-01",
            "borrowed_for_days": 10,
            "returned_date": "2024-01-11",
            "status": "returned",
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let edited: TransactionResponse = read_json(response).await;
    assert_eq!(edited.status, TransactionStatus::Returned);
    assert_eq!(edited.fine, 0);
    assert_eq!(edited.updated_by, ActorRole::Admin);
}

#[tokio::test]
async fn test_list_stats_and_badge() {
    let fixture = MockFixture::new();
    let app = setup_app(&fixture);
    let first = create_via_api(&app, &fixture).await;
    create_via_api(&app, &fixture).await;

    let uri = format!("/transactions/{}/return", first.transaction_id);
    send(
        &app,
        "POST",
        &uri,
        Some("staff"),
        Some(json!({ "returned_date": "2024-01-05" })),
    )
    .await;

    let response = send(&app, "GET", "/transactions?status=borrowed", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let borrowed: Vec<TransactionResponse> = read_json(response).await;
    assert_eq!(borrowed.len(), 1);

    let response = send(&app, "GET", "/stats/transactions", None, None).await;
    let stats: TransactionStatsResponse = read_json(response).await;
    assert_eq!(stats.borrowed, 1);
    assert_eq!(stats.returned, 1);
    assert_eq!(stats.delayed, 0);
    assert_eq!(stats.total, 2);

    let response = send(&app, "GET", "/navigation/transactions", None, None).await;
    let badge: NavigationBadge = read_json(response).await;
    assert_eq!(badge.count, 2);
    assert_eq!(badge.color, BadgeColor::Primary);
}

#[tokio::test]
async fn test_fine_preview() {
    let fixture = MockFixture::new();
    let app = setup_app(&fixture);

    let response = send(
        &app,
        "GET",
        "/fine-preview?borrowed_date=2024-01-01&borrowed_for_days=10&returned_date=2024-01-16",
        None,
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let preview: FinePreviewResponse = read_json(response).await;
    assert_eq!(preview.delay_days, 5);
    assert_eq!(preview.fine, 50);
    assert_eq!(preview.breakdown, "5 Days x $10 = $50.00");
}

// ============================================================================
// 異常系
// ============================================================================

#[tokio::test]
async fn test_create_without_actor_role_is_bad_request() {
    let fixture = MockFixture::new();
    let app = setup_app(&fixture);

    let response = send(
        &app,
        "POST",
        "/transactions",
        None,
        Some(create_request(&fixture)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "MISSING_ACTOR_ROLE");
    assert!(fixture.repository.is_empty());
}

#[tokio::test]
async fn test_create_with_borrower_role_is_bad_request() {
    let fixture = MockFixture::new();
    let app = setup_app(&fixture);

    let response = send(
        &app,
        "POST",
        "/transactions",
        Some("borrower"),
        Some(create_request(&fixture)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "INVALID_ACTOR_ROLE");
}

#[tokio::test]
async fn test_create_missing_borrower_is_unprocessable() {
    let fixture = MockFixture::new();
    let app = setup_app(&fixture);

    let response = send(
        &app,
        "POST",
        "/transactions",
        Some("staff"),
        Some(json!({
            "book_id": fixture.available_book().value(),
            "borrowed_date": "2024-01-01",
            "borrowed_for_days": 10,
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "MISSING_REQUIRED_FIELD");
}

#[tokio::test]
async fn test_create_with_negative_period_is_unprocessable() {
    let fixture = MockFixture::new();
    let app = setup_app(&fixture);
    let mut request = create_request(&fixture);
    request["borrowed_for_days"] = json!(-5);

    let response = send(&app, "POST", "/transactions", Some("staff"), Some(request)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "INVALID_LOAN_PERIOD");
}

#[tokio::test]
async fn test_create_declaring_returned_is_unprocessable() {
    let fixture = MockFixture::new();
    let app = setup_app(&fixture);
    let mut request = create_request(&fixture);
    request["status"] = json!("returned");

    let response = send(&app, "POST", "/transactions", Some("staff"), Some(request)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "STATUS_NOT_ALLOWED");
}

#[tokio::test]
async fn test_create_with_unavailable_book_is_unprocessable() {
    let fixture = MockFixture::new();
    let app = setup_app(&fixture);

    let response = send(
        &app,
        "POST",
        "/transactions",
        Some("staff"),
        Some(json!({
            "book_id": Uuid::new_v4(),
            "borrower_id": fixture.borrower("Alice").value(),
            "borrowed_date": "2024-01-01",
            "borrowed_for_days": 10,
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = read_json(response).await;
    assert_eq!(error.error, "BOOK_NOT_AVAILABLE");
}

#[tokio::test]
async fn test_return_with_another_date_is_conflict() {
    let fixture = MockFixture::new();
    let app = setup_app(&fixture);
    let created = create_via_api(&app, &fixture).await;
    let uri = format!("/transactions/{}/return", created.transaction_id);

    let first = send(
        &app,
        "POST",
        &uri,
        Some("staff"),
        Some(json!({ "returned_date": "2024-01-05" })),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = send(
        &app,
        "POST",
        &uri,
        Some("staff"),
        Some(json!({ "returned_date": "2024-01-07" })),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let error: ErrorResponse = read_json(second).await;
    assert_eq!(error.error, "ALREADY_RETURNED");
}

#[tokio::test]
async fn test_return_unknown_transaction_is_not_found() {
    let fixture = MockFixture::new();
    let app = setup_app(&fixture);

    let uri = format!("/transactions/{}/return", Uuid::new_v4());
    let response = send(
        &app,
        "POST",
        &uri,
        Some("staff"),
        Some(json!({ "returned_date": "2024-01-05" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_with_unknown_status_is_bad_request() {
    let fixture = MockFixture::new();
    let app = setup_app(&fixture);

    let response = send(&app, "GET", "/transactions?status=overdue", None, None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
