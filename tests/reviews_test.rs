//! Review service integration tests.

#![allow(clippy::unwrap_used)] // Test code can use unwrap

mod common;

use axum::http::StatusCode;
use common::{add_good, app, login, register, send, TestApp};
use serde_json::{json, Value};

async fn customer_id(app: &TestApp, username: &str) -> i64 {
    let (status, body) = send(&app.router, "GET", &format!("/customers/{username}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    body["CustomerID"].as_i64().unwrap()
}

async fn submit_review(app: &TestApp, token: &str, customer_id: i64, good_id: i64, rating: i64) -> i64 {
    let (status, body) = send(
        &app.router,
        "POST",
        "/reviews/submit",
        Some(token),
        Some(json!({
            "CustomerID": customer_id,
            "GoodID": good_id,
            "Rating": rating,
            "Comment": "Works as described.",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "submit failed: {body}");
    body["ReviewID"].as_i64().unwrap()
}

async fn review_status(app: &TestApp, review_id: i64) -> Value {
    let (status, body) = send(&app.router, "GET", &format!("/reviews/details/{review_id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    body["Status"].clone()
}

#[tokio::test]
async fn submitted_reviews_start_pending() {
    let app = app().await;
    register(&app, "alice", false).await;
    let token = login(&app, "alice").await;
    let alice = customer_id(&app, "alice").await;
    let good = add_good(&app, "Laptop", 899.99, 5).await;

    let review = submit_review(&app, &token, alice, good, 4).await;
    assert_eq!(review_status(&app, review).await, "Pending");

    let (status, body) = send(&app.router, "GET", &format!("/reviews/details/{review}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["CustomerName"], "alice Example");
    assert_eq!(body["Rating"], 4);
}

#[tokio::test]
async fn out_of_range_rating_is_rejected_and_stores_nothing() {
    let app = app().await;
    register(&app, "alice", false).await;
    let token = login(&app, "alice").await;
    let alice = customer_id(&app, "alice").await;
    let good = add_good(&app, "Laptop", 899.99, 5).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/reviews/submit",
        Some(&token),
        Some(json!({"CustomerID": alice, "GoodID": good, "Rating": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "Rating must be between 1 and 5.");

    let (_, body) = send(&app.router, "GET", &format!("/reviews/customer/{alice}"), None, None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn submitting_for_another_customer_is_forbidden() {
    let app = app().await;
    register(&app, "alice", false).await;
    register(&app, "mallory", false).await;
    let mallory = login(&app, "mallory").await;
    let alice = customer_id(&app, "alice").await;
    let good = add_good(&app, "Laptop", 899.99, 5).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/reviews/submit",
        Some(&mallory),
        Some(json!({"CustomerID": alice, "GoodID": good, "Rating": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn non_admin_moderation_is_forbidden_and_changes_nothing() {
    let app = app().await;
    register(&app, "alice", false).await;
    let token = login(&app, "alice").await;
    let alice = customer_id(&app, "alice").await;
    let good = add_good(&app, "Laptop", 899.99, 5).await;
    let review = submit_review(&app, &token, alice, good, 4).await;

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/reviews/moderate/{review}"),
        Some(&token),
        Some(json!({"Status": "Accepted"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Only admins can moderate reviews.");
    assert_eq!(review_status(&app, review).await, "Pending");
}

#[tokio::test]
async fn admin_moderates_through_all_three_states() {
    let app = app().await;
    register(&app, "root", true).await;
    register(&app, "alice", false).await;
    let root = login(&app, "root").await;
    let alice_token = login(&app, "alice").await;
    let alice = customer_id(&app, "alice").await;
    let good = add_good(&app, "Laptop", 899.99, 5).await;
    let review = submit_review(&app, &alice_token, alice, good, 4).await;

    for status_name in ["Accepted", "Rejected", "Pending"] {
        let (status, body) = send(
            &app.router,
            "PUT",
            &format!("/reviews/moderate/{review}"),
            Some(&root),
            Some(json!({"Status": status_name})),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "moderate failed: {body}");
        assert_eq!(body["Status"], status_name);
    }
}

#[tokio::test]
async fn unknown_moderation_status_is_a_validation_error() {
    let app = app().await;
    register(&app, "root", true).await;
    let root = login(&app, "root").await;

    let (status, body) = send(
        &app.router,
        "PUT",
        "/reviews/moderate/1",
        Some(&root),
        Some(json!({"Status": "Maybe"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn product_listing_shows_accepted_reviews_by_upvotes() {
    let app = app().await;
    register(&app, "root", true).await;
    register(&app, "alice", false).await;
    let root = login(&app, "root").await;
    let alice_token = login(&app, "alice").await;
    let root_id = customer_id(&app, "root").await;
    let alice = customer_id(&app, "alice").await;
    let good = add_good(&app, "Laptop", 899.99, 5).await;

    let first = submit_review(&app, &alice_token, alice, good, 4).await;
    let second = submit_review(&app, &root, root_id, good, 5).await;
    let hidden = submit_review(&app, &alice_token, alice, good, 1).await;

    for review in [first, second] {
        let (status, _) = send(
            &app.router,
            "PUT",
            &format!("/reviews/moderate/{review}"),
            Some(&root),
            Some(json!({"Status": "Accepted"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Three upvotes for the second review, one for the first.
    for _ in 0..3 {
        let (status, _) =
            send(&app.router, "PUT", &format!("/reviews/upvote/{second}"), None, None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = send(&app.router, "PUT", &format!("/reviews/upvote/{first}"), None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app.router, "GET", &format!("/reviews/product/{good}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["ReviewID"].as_i64().unwrap(), second);
    assert_eq!(listed[0]["Upvotes"], 3);
    assert_eq!(listed[1]["ReviewID"].as_i64().unwrap(), first);
    assert!(listed.iter().all(|r| r["ReviewID"].as_i64().unwrap() != hidden));
}

#[tokio::test]
async fn votes_accumulate() {
    let app = app().await;
    register(&app, "alice", false).await;
    let token = login(&app, "alice").await;
    let alice = customer_id(&app, "alice").await;
    let good = add_good(&app, "Laptop", 899.99, 5).await;
    let review = submit_review(&app, &token, alice, good, 4).await;

    for _ in 0..4 {
        send(&app.router, "PUT", &format!("/reviews/upvote/{review}"), None, None).await;
    }
    let (_, body) = send(&app.router, "PUT", &format!("/reviews/downvote/{review}"), None, None).await;
    assert_eq!(body["Upvotes"], 4);
    assert_eq!(body["Downvotes"], 1);
}

#[tokio::test]
async fn owner_update_resets_moderation() {
    let app = app().await;
    register(&app, "root", true).await;
    register(&app, "alice", false).await;
    let root = login(&app, "root").await;
    let token = login(&app, "alice").await;
    let alice = customer_id(&app, "alice").await;
    let good = add_good(&app, "Laptop", 899.99, 5).await;
    let review = submit_review(&app, &token, alice, good, 4).await;

    let (status, _) = send(
        &app.router,
        "PUT",
        &format!("/reviews/moderate/{review}"),
        Some(&root),
        Some(json!({"Status": "Accepted"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app.router,
        "PUT",
        &format!("/reviews/update/{review}"),
        Some(&token),
        Some(json!({"Rating": 2, "Comment": "Broke after a week."})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Rating"], 2);
    assert_eq!(body["Status"], "Pending");
}

#[tokio::test]
async fn strangers_cannot_update_or_delete_reviews() {
    let app = app().await;
    register(&app, "alice", false).await;
    register(&app, "mallory", false).await;
    let alice_token = login(&app, "alice").await;
    let mallory = login(&app, "mallory").await;
    let alice = customer_id(&app, "alice").await;
    let good = add_good(&app, "Laptop", 899.99, 5).await;
    let review = submit_review(&app, &alice_token, alice, good, 4).await;

    let (status, _) = send(
        &app.router,
        "PUT",
        &format!("/reviews/update/{review}"),
        Some(&mallory),
        Some(json!({"Rating": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app.router,
        "DELETE",
        &format!("/reviews/delete/{review}"),
        Some(&mallory),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_can_delete_any_review() {
    let app = app().await;
    register(&app, "root", true).await;
    register(&app, "alice", false).await;
    let root = login(&app, "root").await;
    let token = login(&app, "alice").await;
    let alice = customer_id(&app, "alice").await;
    let good = add_good(&app, "Laptop", 899.99, 5).await;
    let review = submit_review(&app, &token, alice, good, 4).await;

    let (status, _) = send(
        &app.router,
        "DELETE",
        &format!("/reviews/delete/{review}"),
        Some(&root),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app.router, "GET", &format!("/reviews/details/{review}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customer_review_listing_includes_good_names() {
    let app = app().await;
    register(&app, "alice", false).await;
    let token = login(&app, "alice").await;
    let alice = customer_id(&app, "alice").await;
    let laptop = add_good(&app, "Laptop", 899.99, 5).await;
    let mouse = add_good(&app, "Mouse", 19.99, 50).await;
    submit_review(&app, &token, alice, laptop, 4).await;
    submit_review(&app, &token, alice, mouse, 5).await;

    let (status, body) = send(&app.router, "GET", &format!("/reviews/customer/{alice}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let reviews = body.as_array().unwrap();
    assert_eq!(reviews.len(), 2);
    // Newest first.
    assert_eq!(reviews[0]["GoodName"], "Mouse");
    assert_eq!(reviews[1]["GoodName"], "Laptop");
}
