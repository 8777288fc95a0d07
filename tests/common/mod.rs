//! Shared test harness: an in-memory database behind the real router.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)] // Test code can use unwrap

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use storefront::{config::AuthConfig, router, AppState, MIGRATOR};
use tower::ServiceExt;

/// The application wired over a fresh in-memory database.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

/// Build the app over an in-memory database with migrations applied.
///
/// A single pooled connection keeps every query on the same in-memory
/// database (each SQLite `:memory:` connection is otherwise its own world).
pub async fn app() -> TestApp {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    MIGRATOR.run(&pool).await.unwrap();

    let state = AppState::new(
        pool,
        &AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_seconds: 3_600,
        },
    );
    TestApp {
        router: router::build(state.clone()),
        state,
    }
}

/// Scratch database file, removed (with its WAL sidecars) on drop.
pub struct ScratchDb {
    pub path: PathBuf,
}

impl Drop for ScratchDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut path = self.path.clone().into_os_string();
            path.push(suffix);
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Build the app over a file-backed WAL database with a multi-connection
/// pool, matching the production pool shape rather than the in-memory
/// single-connection harness.
pub async fn file_backed_app(name: &str, max_connections: u32) -> (TestApp, ScratchDb) {
    let path = std::env::temp_dir().join(format!("storefront-{name}-{}.db", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let db = ScratchDb { path };

    let options = SqliteConnectOptions::new()
        .filename(&db.path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5_000));
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .unwrap();
    MIGRATOR.run(&pool).await.unwrap();

    let state = AppState::new(
        pool,
        &AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_seconds: 3_600,
        },
    );
    let app = TestApp {
        router: router::build(state.clone()),
        state,
    };
    (app, db)
}

/// Send one request through the router and decode the JSON response.
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Register a customer with fixed profile fields.
pub async fn register(app: &TestApp, username: &str, is_admin: bool) {
    let (status, body) = send(
        &app.router,
        "POST",
        "/customers/register",
        None,
        Some(json!({
            "FullName": format!("{username} Example"),
            "Username": username,
            "Password": "hunter22",
            "Age": 30,
            "Address": "12 Main St",
            "Gender": "Other",
            "MaritalStatus": "Single",
            "IsAdmin": is_admin,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
}

/// Log a registered customer in and return the bearer token.
pub async fn login(app: &TestApp, username: &str) -> String {
    let (status, body) = send(
        &app.router,
        "POST",
        "/customers/login",
        None,
        Some(json!({"Username": username, "Password": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

/// Add a good and return its id.
pub async fn add_good(app: &TestApp, name: &str, price: f64, stock: i64) -> i64 {
    let (status, body) = send(
        &app.router,
        "POST",
        "/inventory/add",
        None,
        Some(json!({
            "Name": name,
            "Category": "Electronics",
            "PricePerItem": price,
            "Description": "A test good",
            "StockCount": stock,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "add good failed: {body}");
    body["GoodID"].as_i64().unwrap()
}

/// Charge a customer's own wallet.
pub async fn charge_wallet(app: &TestApp, username: &str, token: &str, amount: f64) {
    let (status, body) = send(
        &app.router,
        "POST",
        &format!("/customers/charge/{username}"),
        Some(token),
        Some(json!({"Amount": amount})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "charge failed: {body}");
}

/// Current wallet balance in dollars, read through the profile endpoint.
pub async fn wallet_balance(app: &TestApp, username: &str) -> f64 {
    let (status, body) = send(&app.router, "GET", &format!("/customers/{username}"), None, None).await;
    assert_eq!(status, StatusCode::OK, "profile fetch failed: {body}");
    body["WalletBalance"].as_f64().unwrap()
}

/// Current stock count, read through the inventory endpoint.
pub async fn stock_count(app: &TestApp, good_id: i64) -> i64 {
    let (status, body) = send(&app.router, "GET", &format!("/inventory/{good_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK, "good fetch failed: {body}");
    body["StockCount"].as_i64().unwrap()
}
