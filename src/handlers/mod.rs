//! HTTP handlers, one module per service surface.

pub mod customers;
pub mod inventory;
pub mod reviews;
pub mod sales;

use axum::Json;
use serde::Serialize;

/// Liveness probe response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process serves traffic.
    pub status: &'static str,
}

/// GET `/health`.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
