//! Sale pipeline integration tests, including the concurrency property.

#![allow(clippy::unwrap_used, clippy::panic)] // Test code can use unwrap

mod common;

use axum::http::StatusCode;
use common::{
    add_good, app, charge_wallet, file_backed_app, login, register, send, stock_count,
    wallet_balance,
};
use serde_json::json;
use storefront::StoreError;

#[tokio::test]
async fn successful_sale_moves_money_stock_and_ledger() {
    let app = app().await;
    register(&app, "alice", false).await;
    let token = login(&app, "alice").await;
    charge_wallet(&app, "alice", &token, 100.0).await;
    let good_id = add_good(&app, "Headphones", 40.0, 10).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/sales/sale",
        None,
        Some(json!({"Username": "alice", "GoodName": "Headphones", "Quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "sale failed: {body}");
    assert!((body["totalCost"].as_f64().unwrap() - 40.0).abs() < f64::EPSILON);

    let balance = wallet_balance(&app, "alice").await;
    assert!((balance - 60.0).abs() < f64::EPSILON);
    assert_eq!(stock_count(&app, good_id).await, 9);

    let (status, history) = send(&app.router, "GET", "/sales/purchases/alice", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["Name"], "Headphones");
    assert_eq!(history[0]["Quantity"], 1);
    assert!((history[0]["TotalAmount"].as_f64().unwrap() - 40.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn insufficient_stock_leaves_everything_untouched() {
    let app = app().await;
    register(&app, "alice", false).await;
    let token = login(&app, "alice").await;
    charge_wallet(&app, "alice", &token, 1000.0).await;
    let good_id = add_good(&app, "Headphones", 40.0, 2).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/sales/sale",
        None,
        Some(json!({"Username": "alice", "GoodName": "Headphones", "Quantity": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["message"], "Insufficient stock. Available stock: 2.");

    let balance = wallet_balance(&app, "alice").await;
    assert!((balance - 1000.0).abs() < f64::EPSILON);
    assert_eq!(stock_count(&app, good_id).await, 2);

    let (_, history) = send(&app.router, "GET", "/sales/purchases/alice", None, None).await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn insufficient_funds_reports_the_balance() {
    let app = app().await;
    register(&app, "alice", false).await;
    let token = login(&app, "alice").await;
    charge_wallet(&app, "alice", &token, 30.0).await;
    add_good(&app, "Headphones", 40.0, 10).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/sales/sale",
        None,
        Some(json!({"Username": "alice", "GoodName": "Headphones", "Quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["message"], "Insufficient funds. Wallet balance: $30.00.");

    let balance = wallet_balance(&app, "alice").await;
    assert!((balance - 30.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn unknown_good_is_not_found() {
    let app = app().await;
    register(&app, "alice", false).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/sales/sale",
        None,
        Some(json!({"Username": "alice", "GoodName": "Unobtainium", "Quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Good 'Unobtainium' not found.");
}

#[tokio::test]
async fn unknown_customer_is_not_found() {
    let app = app().await;
    add_good(&app, "Headphones", 40.0, 10).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/sales/sale",
        None,
        Some(json!({"Username": "ghost", "GoodName": "Headphones", "Quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Customer 'ghost' not found.");
}

#[tokio::test]
async fn goods_listing_shows_only_in_stock_goods() {
    let app = app().await;
    add_good(&app, "Headphones", 40.0, 10).await;
    let sold_out = add_good(&app, "Keyboard", 25.0, 1).await;

    let (status, _) = send(
        &app.router,
        "POST",
        &format!("/inventory/deduct/{sold_out}"),
        None,
        Some(json!({"Quantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app.router, "GET", "/sales/goods", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let goods = body.as_array().unwrap();
    assert_eq!(goods.len(), 1);
    assert_eq!(goods[0]["Name"], "Headphones");
    assert!((goods[0]["PricePerItem"].as_f64().unwrap() - 40.0).abs() < f64::EPSILON);
}

/// K concurrent purchases over limited stock: exactly floor(S / qty) succeed,
/// the rest fail with insufficient stock, and the final counts are exact.
#[tokio::test]
async fn concurrent_purchases_never_oversell() {
    let app = app().await;
    register(&app, "alice", false).await;
    let token = login(&app, "alice").await;
    charge_wallet(&app, "alice", &token, 10_000.0).await;
    let good_id = add_good(&app, "Headphones", 10.0, 7).await;

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let sales = app.state.sales.clone();
            tokio::spawn(async move { sales.purchase("alice", "Headphones", 2).await })
        })
        .collect();

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    // floor(7 / 2) = 3 successful purchases, one unit left over.
    assert_eq!(successes, 3);
    assert_eq!(stock_count(&app, good_id).await, 1);

    let balance = wallet_balance(&app, "alice").await;
    assert!((balance - (10_000.0 - 60.0)).abs() < f64::EPSILON);

    let (_, history) = send(&app.router, "GET", "/sales/purchases/alice", None, None).await;
    assert_eq!(history.as_array().unwrap().len(), 3);
}

/// The same property over a file-backed WAL database with a multi-connection
/// pool: transactions genuinely overlap here, and every loser must still get
/// the insufficient-stock error, not a lock-contention one.
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_purchases_on_a_multi_connection_pool() {
    let (app, _db) = file_backed_app("concurrent-sales", 8).await;
    register(&app, "alice", false).await;
    let token = login(&app, "alice").await;
    charge_wallet(&app, "alice", &token, 10_000.0).await;
    let good_id = add_good(&app, "Headphones", 10.0, 7).await;

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let sales = app.state.sales.clone();
            tokio::spawn(async move { sales.purchase("alice", "Headphones", 2).await })
        })
        .collect();

    let mut successes = 0;
    let mut insufficient = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => successes += 1,
            Err(StoreError::InsufficientStock { .. }) => insufficient += 1,
            Err(other) => panic!("unexpected purchase error: {other}"),
        }
    }

    assert_eq!(successes, 3);
    assert_eq!(insufficient, 13);
    assert_eq!(stock_count(&app, good_id).await, 1);

    let balance = wallet_balance(&app, "alice").await;
    assert!((balance - (10_000.0 - 60.0)).abs() < f64::EPSILON);
}
