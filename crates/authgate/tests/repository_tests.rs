//! Gate tests against the SQLite account repository.

use std::sync::Arc;

use axum::http::StatusCode;
use sqlx::SqlitePool;

use authgate::account::AccountRepository;
use authgate::api::{AppState, create_router};
use authgate::auth::{AuthGate, GateConfig};
use authgate::db::Database;

mod common;
use common::{StubVerifier, get_json};

async fn insert_account(pool: &SqlitePool, id: &str, external_id: &str, is_active: bool) {
    sqlx::query(
        "INSERT INTO accounts (id, external_id, email, display_name, is_active) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(external_id)
    .bind(format!("{external_id}@example.com"))
    .bind("Seeded User")
    .bind(is_active)
    .execute(pool)
    .await
    .unwrap();
}

async fn app_for(db: &Database, subject_id: &str) -> axum::Router {
    let gate = AuthGate::new(
        GateConfig::default(),
        Arc::new(StubVerifier::valid(subject_id, Some("claim@example.com"), None)),
        Arc::new(AccountRepository::new(db.pool().clone())),
    );
    create_router(AppState::new(gate))
}

#[tokio::test]
async fn test_active_account_from_database() {
    let db = Database::in_memory().await.unwrap();
    insert_account(db.pool(), "acc-1", "abc123", true).await;

    let (status, json) = get_json(app_for(&db, "abc123").await, "/me", Some("token")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["identity"]["external_id"], "abc123");
    assert_eq!(json["identity"]["email"], "claim@example.com");
    assert_eq!(json["account"]["id"], "acc-1");
    assert_eq!(json["account"]["display_name"], "Seeded User");
    assert_eq!(json["account"]["is_active"], true);
}

#[tokio::test]
async fn test_inactive_account_from_database() {
    let db = Database::in_memory().await.unwrap();
    insert_account(db.pool(), "acc-1", "abc123", false).await;

    let (status, json) = get_json(app_for(&db, "abc123").await, "/me", Some("token")).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(json["error_code"], "ACCOUNT_INACTIVE");
}

#[tokio::test]
async fn test_unknown_subject_from_database() {
    let db = Database::in_memory().await.unwrap();
    insert_account(db.pool(), "acc-1", "abc123", true).await;

    let (status, json) = get_json(app_for(&db, "zzz999").await, "/me", Some("token")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error_code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn test_database_failure_is_auth_error() {
    let db = Database::in_memory().await.unwrap();
    let app = app_for(&db, "abc123").await;
    db.pool().close().await;

    let (status, json) = get_json(app, "/me", Some("token")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error_code"], "AUTH_ERROR");
}
