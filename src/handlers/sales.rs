//! Sales service: goods display, purchases, and purchase history.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extractors::JsonBody;
use crate::money::Money;
use crate::state::AppState;
use crate::stores::{GoodSummary, PurchaseRecord};

/// Purchase request body.
#[derive(Debug, Deserialize)]
pub struct SaleRequest {
    /// Buying customer.
    #[serde(rename = "Username")]
    pub username: String,
    /// Good to purchase, by name.
    #[serde(rename = "GoodName")]
    pub good_name: String,
    /// Units to purchase.
    #[serde(rename = "Quantity")]
    pub quantity: i64,
}

/// Purchase success body.
#[derive(Debug, Serialize)]
pub struct SaleResponse {
    #[allow(missing_docs)]
    pub message: String,
    /// Total charged, in dollars.
    #[serde(rename = "totalCost")]
    pub total_cost: Money,
}

/// GET `/sales/goods`.
pub async fn goods(State(state): State<AppState>) -> Result<Json<Vec<GoodSummary>>> {
    Ok(Json(state.catalog.list_in_stock().await?))
}

/// POST `/sales/sale`.
pub async fn sale(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SaleRequest>,
) -> Result<Json<SaleResponse>> {
    let receipt = state
        .sales
        .purchase(&body.username, &body.good_name, body.quantity)
        .await?;

    Ok(Json(SaleResponse {
        message: "Purchase successful.".to_string(),
        total_cost: receipt.total_cost,
    }))
}

/// GET `/sales/purchases/{username}`.
pub async fn purchases(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<PurchaseRecord>>> {
    Ok(Json(state.sales.history(&username).await?))
}
