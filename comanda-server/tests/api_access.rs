//! Access-control gate tests over the HTTP surface.

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{seed_table, setup_db};
use comanda_server::auth::JwtConfig;
use comanda_server::db::repository::{dining_table, user};
use comanda_server::{api, Config, ServerState};
use shared::models::{SyncRolesRequest, UserCreate};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

async fn setup_app() -> (TempDir, SqlitePool, ServerState, Router) {
    let (dir, pool) = setup_db().await;

    let config = Config {
        work_dir: dir.path().to_string_lossy().to_string(),
        http_port: 0,
        jwt: JwtConfig {
            secret: "integration-test-secret-integration-test".to_string(),
            expiration_seconds: 3600,
            issuer: "comanda-server".to_string(),
            audience: "comanda-clients".to_string(),
        },
        environment: "test".to_string(),
        request_timeout_ms: 30000,
    };

    let state = ServerState::with_pool(config, pool.clone());
    let app = api::router(state.clone()).with_state(state.clone());
    (dir, pool, state, app)
}

/// Create a user and attach one seeded role, returning a bearer token
async fn user_with_role(pool: &SqlitePool, state: &ServerState, username: &str, role: &str) -> String {
    let created = user::create(
        pool,
        UserCreate {
            name: username.to_string(),
            username: username.to_string(),
            password: "not-a-real-hash".to_string(),
        },
    )
    .await
    .unwrap();

    let role_id = sqlx::query_scalar::<_, i64>("SELECT id FROM roles WHERE name = ?")
        .bind(role)
        .fetch_one(pool)
        .await
        .unwrap();
    user::sync_roles(
        pool,
        created.id,
        &SyncRolesRequest {
            roles_ids: vec![role_id],
        },
    )
    .await
    .unwrap();

    state
        .jwt_service
        .generate_token(created.id, username)
        .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let (_dir, _pool, _state, app) = setup_app().await;

    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (_dir, _pool, _state, app) = setup_app().await;

    let response = app
        .oneshot(Request::get("/api/tables").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let (_dir, _pool, _state, app) = setup_app().await;

    let response = app
        .oneshot(
            Request::get("/api/tables")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_permission_is_forbidden_and_state_unchanged() {
    let (_dir, pool, state, app) = setup_app().await;
    let table_id = seed_table(&pool, 5).await;

    // customer holds order.create and reads, but not table.update
    let token = user_with_role(&pool, &state, "guest", "customer").await;

    let response = app
        .oneshot(
            Request::put(format!("/api/tables/{table_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"available":"N"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let table = dining_table::find_by_id(&pool, table_id).await.unwrap().unwrap();
    assert_eq!(table.available, "Y", "denied request must not mutate state");
}

#[tokio::test]
async fn granted_permission_passes_the_gate() {
    let (_dir, pool, state, app) = setup_app().await;
    let table_id = seed_table(&pool, 5).await;

    let token = user_with_role(&pool, &state, "staff", "waiter").await;

    let response = app
        .oneshot(
            Request::put(format!("/api/tables/{table_id}"))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"available":"N"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let table = dining_table::find_by_id(&pool, table_id).await.unwrap().unwrap();
    assert_eq!(table.available, "N");
}

#[tokio::test]
async fn login_issues_a_bearer_token() {
    let (_dir, _pool, _state, app) = setup_app().await;

    let response = app
        .oneshot(
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"username":"admin","password":"password"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["data"]["type"], "Bearer");
    assert!(json["data"]["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert!(json["data"]["user"]["password"].is_null(), "hash never leaves");
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let (_dir, _pool, _state, app) = setup_app().await;

    let response = app
        .oneshot(
            Request::post("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"username":"admin","password":"wrong"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
