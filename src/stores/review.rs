//! Review submission, moderation, and community votes.
//!
//! Reviews move through a three-state moderation lifecycle: every submission
//! starts `Pending`, only an admin moves it to `Accepted` or `Rejected`, and
//! a moderated review can be sent back to `Pending`. Product listings only
//! ever show `Accepted` reviews.

use chrono::Utc;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::error::{Result, StoreError};
use crate::model::{Customer, Review, ReviewStatus};

/// A review submission, validated and inserted by [`ReviewStore::submit`].
#[derive(Debug, Clone)]
pub struct NewReview {
    /// Review author.
    pub customer_id: i64,
    /// Reviewed good.
    pub good_id: i64,
    /// Rating in `[1, 5]`.
    pub rating: i64,
    #[allow(missing_docs)]
    pub comment: Option<String>,
}

/// A review joined with its author's display name.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReviewDetails {
    #[allow(missing_docs)]
    #[serde(rename = "ReviewID")]
    pub review_id: i64,
    #[allow(missing_docs)]
    #[serde(rename = "GoodID")]
    pub good_id: i64,
    /// Display name of the author.
    #[serde(rename = "CustomerName")]
    pub customer_name: String,
    #[allow(missing_docs)]
    #[serde(rename = "Rating")]
    pub rating: i64,
    #[allow(missing_docs)]
    #[serde(rename = "Comment")]
    pub comment: Option<String>,
    #[allow(missing_docs)]
    #[serde(rename = "Status")]
    #[sqlx(try_from = "String")]
    pub status: ReviewStatus,
    #[allow(missing_docs)]
    #[serde(rename = "Upvotes")]
    pub upvotes: i64,
    #[allow(missing_docs)]
    #[serde(rename = "Downvotes")]
    pub downvotes: i64,
}

/// A review joined with the name of the good it covers, as listed on a
/// customer's own review page.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerReview {
    #[allow(missing_docs)]
    #[serde(rename = "ReviewID")]
    pub review_id: i64,
    /// Name of the reviewed good.
    #[serde(rename = "GoodName")]
    pub good_name: String,
    #[allow(missing_docs)]
    #[serde(rename = "Rating")]
    pub rating: i64,
    #[allow(missing_docs)]
    #[serde(rename = "Comment")]
    pub comment: Option<String>,
    #[allow(missing_docs)]
    #[serde(rename = "Status")]
    #[sqlx(try_from = "String")]
    pub status: ReviewStatus,
}

/// SQLite-backed review store.
#[derive(Debug, Clone)]
pub struct ReviewStore {
    pool: SqlitePool,
}

impl ReviewStore {
    /// Create a new review store over a connected pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Submit a review. New reviews always start `Pending`.
    ///
    /// # Errors
    ///
    /// `Validation` for an out-of-range rating or a customer/good id that
    /// does not exist.
    pub async fn submit(&self, new: NewReview) -> Result<Review> {
        validate_rating(new.rating)?;

        let customer_exists: Option<i64> =
            sqlx::query_scalar("SELECT customer_id FROM customers WHERE customer_id = ?")
                .bind(new.customer_id)
                .fetch_optional(&self.pool)
                .await?;
        if customer_exists.is_none() {
            return Err(StoreError::Validation(
                "Invalid CustomerID: no such customer.".to_string(),
            ));
        }
        let good_exists: Option<i64> =
            sqlx::query_scalar("SELECT good_id FROM goods WHERE good_id = ?")
                .bind(new.good_id)
                .fetch_optional(&self.pool)
                .await?;
        if good_exists.is_none() {
            return Err(StoreError::Validation("Invalid GoodID: no such good.".to_string()));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r"
            INSERT INTO reviews
                (customer_id, good_id, rating, comment, status, upvotes, downvotes,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 0, 0, ?, ?)
            ",
        )
        .bind(new.customer_id)
        .bind(new.good_id)
        .bind(new.rating)
        .bind(&new.comment)
        .bind(ReviewStatus::Pending.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        tracing::info!(
            review_id = result.last_insert_rowid(),
            customer_id = new.customer_id,
            good_id = new.good_id,
            "review submitted"
        );
        self.get_by_id(result.last_insert_rowid()).await
    }

    /// Fetch a review by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such review exists.
    pub async fn get_by_id(&self, review_id: i64) -> Result<Review> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE review_id = ?")
            .bind(review_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("Review not found.".to_string()))
    }

    /// Rewrite a review's rating and comment. Only the author or the admin
    /// may edit, and the edited review returns to `Pending` for
    /// re-moderation.
    ///
    /// # Errors
    ///
    /// `Validation` for an out-of-range rating, `NotFound` for an unknown
    /// review, `Forbidden` for any other caller.
    pub async fn update(
        &self,
        review_id: i64,
        actor: &Customer,
        rating: i64,
        comment: Option<String>,
    ) -> Result<Review> {
        validate_rating(rating)?;

        let review = self.get_by_id(review_id).await?;
        authorize_owner_or_admin(&review, actor)?;

        sqlx::query(
            r"
            UPDATE reviews
            SET rating = ?, comment = ?, status = ?, updated_at = ?
            WHERE review_id = ?
            ",
        )
        .bind(rating)
        .bind(&comment)
        .bind(ReviewStatus::Pending.as_str())
        .bind(Utc::now())
        .bind(review_id)
        .execute(&self.pool)
        .await?;

        self.get_by_id(review_id).await
    }

    /// Delete a review. Only the author or the admin may delete.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown review, `Forbidden` for any other caller.
    pub async fn delete(&self, review_id: i64, actor: &Customer) -> Result<()> {
        let review = self.get_by_id(review_id).await?;
        authorize_owner_or_admin(&review, actor)?;

        sqlx::query("DELETE FROM reviews WHERE review_id = ?")
            .bind(review_id)
            .execute(&self.pool)
            .await?;
        tracing::info!(review_id, "review deleted");
        Ok(())
    }

    /// Move a review to any moderation state, including back to `Pending`.
    /// Admin only; the flag is taken from the caller's stored account, not
    /// from the token.
    ///
    /// # Errors
    ///
    /// `Forbidden` for a non-admin caller, `NotFound` for an unknown review.
    pub async fn moderate(
        &self,
        review_id: i64,
        actor: &Customer,
        status: ReviewStatus,
    ) -> Result<Review> {
        if !actor.is_admin {
            return Err(StoreError::Forbidden(
                "Only admins can moderate reviews.".to_string(),
            ));
        }

        let result = sqlx::query("UPDATE reviews SET status = ?, updated_at = ? WHERE review_id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(review_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Review not found.".to_string()));
        }

        tracing::info!(review_id, status = %status, "review moderated");
        self.get_by_id(review_id).await
    }

    /// Increment a review's upvote counter.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown review.
    pub async fn upvote(&self, review_id: i64) -> Result<Review> {
        self.vote(review_id, "upvotes").await
    }

    /// Increment a review's downvote counter.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown review.
    pub async fn downvote(&self, review_id: i64) -> Result<Review> {
        self.vote(review_id, "downvotes").await
    }

    async fn vote(&self, review_id: i64, column: &'static str) -> Result<Review> {
        // Column name comes from the two callers above, never from input.
        let result = sqlx::query(&format!(
            "UPDATE reviews SET {column} = {column} + 1, updated_at = ? WHERE review_id = ?"
        ))
        .bind(Utc::now())
        .bind(review_id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Review not found.".to_string()));
        }
        self.get_by_id(review_id).await
    }

    /// Full details of a review, including the author's display name.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown review.
    pub async fn get_details(&self, review_id: i64) -> Result<ReviewDetails> {
        sqlx::query_as::<_, ReviewDetails>(
            r"
            SELECT reviews.review_id, reviews.good_id, customers.full_name AS customer_name,
                   reviews.rating, reviews.comment, reviews.status,
                   reviews.upvotes, reviews.downvotes
            FROM reviews
            JOIN customers ON reviews.customer_id = customers.customer_id
            WHERE reviews.review_id = ?
            ",
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("Review not found.".to_string()))
    }

    /// Accepted reviews for a good, most upvoted first. Pending and rejected
    /// reviews never appear here.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown good.
    pub async fn list_for_good(&self, good_id: i64) -> Result<Vec<ReviewDetails>> {
        let good_exists: Option<i64> =
            sqlx::query_scalar("SELECT good_id FROM goods WHERE good_id = ?")
                .bind(good_id)
                .fetch_optional(&self.pool)
                .await?;
        if good_exists.is_none() {
            return Err(StoreError::NotFound("Good not found.".to_string()));
        }

        Ok(sqlx::query_as::<_, ReviewDetails>(
            r"
            SELECT reviews.review_id, reviews.good_id, customers.full_name AS customer_name,
                   reviews.rating, reviews.comment, reviews.status,
                   reviews.upvotes, reviews.downvotes
            FROM reviews
            JOIN customers ON reviews.customer_id = customers.customer_id
            WHERE reviews.good_id = ? AND reviews.status = ?
            ORDER BY reviews.upvotes DESC, reviews.review_id
            ",
        )
        .bind(good_id)
        .bind(ReviewStatus::Accepted.as_str())
        .fetch_all(&self.pool)
        .await?)
    }

    /// All of a customer's reviews in every moderation state, newest first.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown customer id.
    pub async fn list_for_customer(&self, customer_id: i64) -> Result<Vec<CustomerReview>> {
        let customer_exists: Option<i64> =
            sqlx::query_scalar("SELECT customer_id FROM customers WHERE customer_id = ?")
                .bind(customer_id)
                .fetch_optional(&self.pool)
                .await?;
        if customer_exists.is_none() {
            return Err(StoreError::NotFound("Customer not found.".to_string()));
        }

        Ok(sqlx::query_as::<_, CustomerReview>(
            r"
            SELECT reviews.review_id, goods.name AS good_name,
                   reviews.rating, reviews.comment, reviews.status
            FROM reviews
            JOIN goods ON reviews.good_id = goods.good_id
            WHERE reviews.customer_id = ?
            ORDER BY reviews.review_id DESC
            ",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

fn validate_rating(rating: i64) -> Result<()> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(StoreError::Validation("Rating must be between 1 and 5.".to_string()))
    }
}

fn authorize_owner_or_admin(review: &Review, actor: &Customer) -> Result<()> {
    if actor.is_admin || review.customer_id == actor.customer_id {
        Ok(())
    } else {
        Err(StoreError::Forbidden(
            "You can only modify your own reviews.".to_string(),
        ))
    }
}
