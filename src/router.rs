//! Router composition for the whole HTTP surface.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Build the application router over shared state.
#[must_use]
pub fn build(state: AppState) -> Router {
    let customers = Router::new()
        .route("/register", post(handlers::customers::register))
        .route("/login", post(handlers::customers::login))
        .route("/", get(handlers::customers::list))
        .route("/:username", get(handlers::customers::get))
        .route("/update/:username", put(handlers::customers::update))
        .route("/delete/:username", delete(handlers::customers::delete))
        .route("/charge/:username", post(handlers::customers::charge))
        .route("/deduct/:username", post(handlers::customers::deduct));

    let inventory = Router::new()
        .route("/add", post(handlers::inventory::add))
        .route("/deduct/:good_id", post(handlers::inventory::deduct))
        .route("/update/:good_id", put(handlers::inventory::update))
        .route("/:good_id", get(handlers::inventory::get));

    let sales = Router::new()
        .route("/goods", get(handlers::sales::goods))
        .route("/sale", post(handlers::sales::sale))
        .route("/purchases/:username", get(handlers::sales::purchases));

    let reviews = Router::new()
        .route("/submit", post(handlers::reviews::submit))
        .route("/update/:review_id", put(handlers::reviews::update))
        .route("/delete/:review_id", delete(handlers::reviews::delete))
        .route("/moderate/:review_id", put(handlers::reviews::moderate))
        .route("/upvote/:review_id", put(handlers::reviews::upvote))
        .route("/downvote/:review_id", put(handlers::reviews::downvote))
        .route("/details/:review_id", get(handlers::reviews::details))
        .route("/product/:good_id", get(handlers::reviews::for_product))
        .route("/customer/:customer_id", get(handlers::reviews::for_customer));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/customers", customers)
        .nest("/inventory", inventory)
        .nest("/sales", sales)
        .nest("/reviews", reviews)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
