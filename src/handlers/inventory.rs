//! Inventory service: adding goods, stock deduction, and good details.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::extractors::JsonBody;
use crate::handlers::customers::MessageResponse;
use crate::model::{Category, Good};
use crate::money::Money;
use crate::state::AppState;
use crate::stores::{NewGood, UpdateGood};

/// New good request body.
#[derive(Debug, Deserialize)]
pub struct AddGoodRequest {
    #[allow(missing_docs)]
    #[serde(rename = "Name")]
    pub name: String,
    #[allow(missing_docs)]
    #[serde(rename = "Category")]
    pub category: Category,
    #[allow(missing_docs)]
    #[serde(rename = "PricePerItem")]
    pub price_per_item: Money,
    #[allow(missing_docs)]
    #[serde(rename = "Description")]
    pub description: String,
    #[allow(missing_docs)]
    #[serde(rename = "StockCount")]
    pub stock_count: i64,
}

/// Partial good update body. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateGoodRequest {
    #[allow(missing_docs)]
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[allow(missing_docs)]
    #[serde(rename = "Category")]
    pub category: Option<Category>,
    #[allow(missing_docs)]
    #[serde(rename = "PricePerItem")]
    pub price_per_item: Option<Money>,
    #[allow(missing_docs)]
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[allow(missing_docs)]
    #[serde(rename = "StockCount")]
    pub stock_count: Option<i64>,
}

/// Stock deduction request body.
#[derive(Debug, Deserialize)]
pub struct DeductStockRequest {
    #[allow(missing_docs)]
    #[serde(rename = "Quantity")]
    pub quantity: i64,
}

/// Response to a successful good addition.
#[derive(Debug, Serialize)]
pub struct GoodAddedResponse {
    #[allow(missing_docs)]
    pub message: String,
    /// Id of the newly added good.
    #[serde(rename = "GoodID")]
    pub good_id: i64,
}

/// A good as exposed on the wire.
#[derive(Debug, Serialize)]
pub struct GoodResponse {
    #[allow(missing_docs)]
    #[serde(rename = "GoodID")]
    pub good_id: i64,
    #[allow(missing_docs)]
    #[serde(rename = "Name")]
    pub name: String,
    #[allow(missing_docs)]
    #[serde(rename = "Category")]
    pub category: Category,
    /// Price per item in dollars.
    #[serde(rename = "PricePerItem")]
    pub price_per_item: Money,
    #[allow(missing_docs)]
    #[serde(rename = "Description")]
    pub description: String,
    #[allow(missing_docs)]
    #[serde(rename = "StockCount")]
    pub stock_count: i64,
}

impl From<Good> for GoodResponse {
    fn from(good: Good) -> Self {
        Self {
            good_id: good.good_id,
            name: good.name,
            category: good.category,
            price_per_item: good.price_per_item,
            description: good.description,
            stock_count: good.stock_count,
        }
    }
}

/// POST `/inventory/add`.
pub async fn add(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<AddGoodRequest>,
) -> Result<(StatusCode, Json<GoodAddedResponse>)> {
    let good = state
        .catalog
        .add(NewGood {
            name: body.name,
            category: body.category,
            price_per_item: body.price_per_item,
            description: body.description,
            stock_count: body.stock_count,
        })
        .await?;

    tracing::info!(good_id = good.good_id, name = %good.name, "good added");
    Ok((
        StatusCode::CREATED,
        Json(GoodAddedResponse {
            message: "Good added successfully.".to_string(),
            good_id: good.good_id,
        }),
    ))
}

/// POST `/inventory/deduct/{goodId}`.
pub async fn deduct(
    State(state): State<AppState>,
    Path(good_id): Path<i64>,
    JsonBody(body): JsonBody<DeductStockRequest>,
) -> Result<Json<MessageResponse>> {
    state.catalog.deduct_stock(good_id, body.quantity).await?;
    Ok(Json(MessageResponse {
        message: "Stock deducted successfully.".to_string(),
    }))
}

/// PUT `/inventory/update/{goodId}`.
pub async fn update(
    State(state): State<AppState>,
    Path(good_id): Path<i64>,
    JsonBody(body): JsonBody<UpdateGoodRequest>,
) -> Result<Json<MessageResponse>> {
    state
        .catalog
        .update_fields(
            good_id,
            UpdateGood {
                name: body.name,
                category: body.category,
                price_per_item: body.price_per_item,
                description: body.description,
                stock_count: body.stock_count,
            },
        )
        .await?;

    Ok(Json(MessageResponse {
        message: "Good updated successfully.".to_string(),
    }))
}

/// GET `/inventory/{goodId}`.
pub async fn get(
    State(state): State<AppState>,
    Path(good_id): Path<i64>,
) -> Result<Json<GoodResponse>> {
    let good = state.catalog.get_by_id(good_id).await?;
    Ok(Json(good.into()))
}
