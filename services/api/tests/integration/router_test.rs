use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode, header};
use axum_test::TestServer;
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::Value;
use uuid::Uuid;

use marquee_api::infra::gateway::MockPaymentGateway;
use marquee_api::router::build_router;
use marquee_api::state::AppState;
use marquee_api_schema::users;
use marquee_auth::identity::JwtSecret;
use marquee_core::middleware::SecurityHeaders;
use marquee_core::rate_limit::RateLimiter;
use marquee_domain::user::UserRole;
use marquee_testing::auth::MockAuth;

use crate::helpers::{TEST_JWT_SECRET, TEST_PAYMENT_SECRET};

fn state(db: DatabaseConnection) -> AppState {
    AppState {
        db,
        jwt_secret: JwtSecret::new(TEST_JWT_SECRET),
        jwt_expires_secs: 3600,
        gateway: MockPaymentGateway::new(TEST_PAYMENT_SECRET),
        rate_limiter: RateLimiter::in_memory(),
        public_base_url: Arc::from("http://localhost:3000"),
        security_headers: SecurityHeaders::default(),
        cors_allowed_origins: None,
    }
}

fn server(db: DatabaseConnection) -> TestServer {
    TestServer::new(build_router(state(db))).unwrap()
}

fn empty_db() -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres).into_connection()
}

fn user_row(id: Uuid, role: UserRole, status: &str) -> users::Model {
    let now = Utc::now();
    users::Model {
        id,
        name: "Router Test".to_owned(),
        email: format!("{id}@example.com"),
        phone_number: None,
        password_hash: String::new(),
        role: i16::from(role.as_u8()),
        status: status.to_owned(),
        email_verified: true,
        email_verification_token_hash: None,
        email_verification_expires_at: None,
        reset_password_token_hash: None,
        reset_password_expires_at: None,
        qr_code: format!("USER-{}", id.simple()),
        last_login_at: None,
        created_at: now,
        updated_at: now,
    }
}

fn db_with_user(row: users::Model) -> DatabaseConnection {
    MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row]])
        .into_connection()
}

#[tokio::test]
async fn should_report_health() {
    let server = server(empty_db());

    let response = server.get("/api/v1/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "API is running");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    server.get("/healthz").await.assert_status_ok();
    server.get("/readyz").await.assert_status_ok();
}

#[tokio::test]
async fn should_set_security_and_request_id_headers() {
    let response = server(empty_db()).get("/api/v1/health").await;
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn should_reject_missing_token() {
    let response = server(empty_db()).get("/api/v1/auth/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["kind"], "UNAUTHORIZED");
}

#[tokio::test]
async fn should_reject_garbage_token() {
    let response = server(empty_db())
        .get("/api/v1/tickets/me")
        .add_header(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer nope"),
        )
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_return_profile_for_valid_token() {
    let auth = MockAuth::customer();
    let server = server(db_with_user(user_row(auth.user_id, auth.role, "active")));

    let response = server
        .get("/api/v1/auth/me")
        .add_header(header::AUTHORIZATION, auth.bearer(TEST_JWT_SECRET))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["id"], auth.user_id.to_string());
    assert_eq!(body["role"], "customer");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn should_reject_inactive_account() {
    let auth = MockAuth::customer();
    let server = server(db_with_user(user_row(auth.user_id, auth.role, "suspended")));

    let response = server
        .get("/api/v1/auth/me")
        .add_header(header::AUTHORIZATION, auth.bearer(TEST_JWT_SECRET))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_forbid_customer_on_admin_routes() {
    let auth = MockAuth::customer();
    let server = server(db_with_user(user_row(auth.user_id, auth.role, "active")));

    let response = server
        .get("/api/v1/admin/stats")
        .add_header(header::AUTHORIZATION, auth.bearer(TEST_JWT_SECRET))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["kind"], "FORBIDDEN");
}

#[tokio::test]
async fn should_use_stored_role_over_token_claim() {
    // Token claims admin, but the account was demoted to customer.
    let auth = MockAuth::admin();
    let server = server(db_with_user(user_row(auth.user_id, UserRole::Customer, "active")));

    let response = server
        .get("/api/v1/admin/settings")
        .add_header(header::AUTHORIZATION, auth.bearer(TEST_JWT_SECRET))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn should_map_malformed_json_to_validation_error() {
    let response = server(empty_db())
        .post("/api/v1/users/setup-admin")
        .text("not json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn should_rate_limit_login_attempts() {
    let server = server(empty_db());

    for _ in 0..5 {
        let response = server.post("/api/v1/auth/login").text("not json").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }
    let limited = server.post("/api/v1/auth/login").text("not json").await;
    limited.assert_status(StatusCode::TOO_MANY_REQUESTS);

    // Other routes keep their own budget.
    server.get("/api/v1/health").await.assert_status_ok();
}

#[tokio::test]
async fn should_map_bad_path_uuid_to_validation_error() {
    let response = server(empty_db()).get("/api/v1/events/not-a-uuid").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION_FAILED");
    assert!(body["errors"][0].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn should_map_bad_query_to_validation_error() {
    let response = server(empty_db()).get("/api/v1/events?page=abc").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION_FAILED");
}

/// Status of `method path` for an active account with `role`.
async fn status_as(role: UserRole, method: &str, path: &str) -> StatusCode {
    let auth = MockAuth::new(Uuid::now_v7(), role);
    let server = server(db_with_user(user_row(auth.user_id, role, "active")));
    let request = match method {
        "GET" => server.get(path),
        "PUT" => server.put(path).json(&serde_json::json!({ "name": "Renamed" })),
        "DELETE" => server.delete(path),
        other => panic!("unsupported method {other}"),
    };
    request
        .add_header(header::AUTHORIZATION, auth.bearer(TEST_JWT_SECRET))
        .await
        .status_code()
}

#[tokio::test]
async fn should_keep_user_management_admin_only() {
    let someone = format!("/api/v1/users/{}", Uuid::now_v7());
    for role in [UserRole::Customer, UserRole::Staff] {
        assert_eq!(
            status_as(role, "GET", "/api/v1/users").await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_as(role, "GET", &someone).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_as(role, "PUT", &someone).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_as(role, "DELETE", &someone).await,
            StatusCode::FORBIDDEN
        );
    }
}

#[tokio::test]
async fn should_keep_admin_routes_from_staff() {
    let someone = Uuid::now_v7();
    for path in [
        "/api/v1/admin/users".to_owned(),
        format!("/api/v1/admin/users/{someone}"),
        format!("/api/v1/admin/users/{someone}/tickets"),
        "/api/v1/admin/tickets".to_owned(),
        "/api/v1/admin/events".to_owned(),
    ] {
        assert_eq!(
            status_as(UserRole::Staff, "GET", &path).await,
            StatusCode::FORBIDDEN,
            "{path}"
        );
    }
}
