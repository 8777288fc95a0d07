//! Review service: submission, editing, moderation, votes, and listings.
//!
//! Authorization runs against the stored account rather than token claims,
//! so a revoked admin flag takes effect immediately.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::extractors::{AuthenticatedCustomer, JsonBody};
use crate::handlers::customers::MessageResponse;
use crate::model::{Review, ReviewStatus};
use crate::state::AppState;
use crate::stores::{CustomerReview, NewReview, ReviewDetails};

/// Review submission body.
#[derive(Debug, Deserialize)]
pub struct SubmitReviewRequest {
    /// Author; must match the authenticated caller.
    #[serde(rename = "CustomerID")]
    pub customer_id: i64,
    #[allow(missing_docs)]
    #[serde(rename = "GoodID")]
    pub good_id: i64,
    #[allow(missing_docs)]
    #[serde(rename = "Rating")]
    pub rating: i64,
    #[allow(missing_docs)]
    #[serde(rename = "Comment")]
    pub comment: Option<String>,
}

/// Review edit body.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    #[allow(missing_docs)]
    #[serde(rename = "Rating")]
    pub rating: i64,
    #[allow(missing_docs)]
    #[serde(rename = "Comment")]
    pub comment: Option<String>,
}

/// Moderation body. An unknown status string fails deserialization and comes
/// back as a 400.
#[derive(Debug, Deserialize)]
pub struct ModerateReviewRequest {
    #[allow(missing_docs)]
    #[serde(rename = "Status")]
    pub status: ReviewStatus,
}

/// Response to a successful submission.
#[derive(Debug, Serialize)]
pub struct ReviewSubmittedResponse {
    #[allow(missing_docs)]
    pub message: String,
    /// Id of the newly created review.
    #[serde(rename = "ReviewID")]
    pub review_id: i64,
}

/// A review as exposed on the wire.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    #[allow(missing_docs)]
    #[serde(rename = "ReviewID")]
    pub review_id: i64,
    #[allow(missing_docs)]
    #[serde(rename = "CustomerID")]
    pub customer_id: i64,
    #[allow(missing_docs)]
    #[serde(rename = "GoodID")]
    pub good_id: i64,
    #[allow(missing_docs)]
    #[serde(rename = "Rating")]
    pub rating: i64,
    #[allow(missing_docs)]
    #[serde(rename = "Comment")]
    pub comment: Option<String>,
    #[allow(missing_docs)]
    #[serde(rename = "Status")]
    pub status: ReviewStatus,
    #[allow(missing_docs)]
    #[serde(rename = "Upvotes")]
    pub upvotes: i64,
    #[allow(missing_docs)]
    #[serde(rename = "Downvotes")]
    pub downvotes: i64,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            review_id: review.review_id,
            customer_id: review.customer_id,
            good_id: review.good_id,
            rating: review.rating,
            comment: review.comment,
            status: review.status,
            upvotes: review.upvotes,
            downvotes: review.downvotes,
        }
    }
}

/// POST `/reviews/submit`. The authenticated caller must be the review's
/// author.
pub async fn submit(
    State(state): State<AppState>,
    caller: AuthenticatedCustomer,
    JsonBody(body): JsonBody<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<ReviewSubmittedResponse>)> {
    let actor = state.accounts.get_by_username(&caller.username).await?;
    if actor.customer_id != body.customer_id {
        return Err(StoreError::Forbidden("Unauthorized access.".to_string()));
    }

    let review = state
        .reviews
        .submit(NewReview {
            customer_id: body.customer_id,
            good_id: body.good_id,
            rating: body.rating,
            comment: body.comment,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReviewSubmittedResponse {
            message: "Review submitted successfully.".to_string(),
            review_id: review.review_id,
        }),
    ))
}

/// PUT `/reviews/update/{reviewId}`. Owner or admin.
pub async fn update(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
    caller: AuthenticatedCustomer,
    JsonBody(body): JsonBody<UpdateReviewRequest>,
) -> Result<Json<ReviewResponse>> {
    let actor = state.accounts.get_by_username(&caller.username).await?;
    let review = state
        .reviews
        .update(review_id, &actor, body.rating, body.comment)
        .await?;
    Ok(Json(review.into()))
}

/// DELETE `/reviews/delete/{reviewId}`. Owner or admin.
pub async fn delete(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
    caller: AuthenticatedCustomer,
) -> Result<Json<MessageResponse>> {
    let actor = state.accounts.get_by_username(&caller.username).await?;
    state.reviews.delete(review_id, &actor).await?;
    Ok(Json(MessageResponse {
        message: "Review deleted successfully.".to_string(),
    }))
}

/// PUT `/reviews/moderate/{reviewId}`. Admin only.
pub async fn moderate(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
    caller: AuthenticatedCustomer,
    JsonBody(body): JsonBody<ModerateReviewRequest>,
) -> Result<Json<ReviewResponse>> {
    let actor = state.accounts.get_by_username(&caller.username).await?;
    let review = state.reviews.moderate(review_id, &actor, body.status).await?;
    Ok(Json(review.into()))
}

/// PUT `/reviews/upvote/{reviewId}`.
pub async fn upvote(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
) -> Result<Json<ReviewResponse>> {
    let review = state.reviews.upvote(review_id).await?;
    Ok(Json(review.into()))
}

/// PUT `/reviews/downvote/{reviewId}`.
pub async fn downvote(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
) -> Result<Json<ReviewResponse>> {
    let review = state.reviews.downvote(review_id).await?;
    Ok(Json(review.into()))
}

/// GET `/reviews/details/{reviewId}`.
pub async fn details(
    State(state): State<AppState>,
    Path(review_id): Path<i64>,
) -> Result<Json<ReviewDetails>> {
    Ok(Json(state.reviews.get_details(review_id).await?))
}

/// GET `/reviews/product/{goodId}`. Accepted reviews only, most upvoted
/// first.
pub async fn for_product(
    State(state): State<AppState>,
    Path(good_id): Path<i64>,
) -> Result<Json<Vec<ReviewDetails>>> {
    Ok(Json(state.reviews.list_for_good(good_id).await?))
}

/// GET `/reviews/customer/{customerId}`.
pub async fn for_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
) -> Result<Json<Vec<CustomerReview>>> {
    Ok(Json(state.reviews.list_for_customer(customer_id).await?))
}
