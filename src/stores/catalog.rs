//! Goods catalog store: inventory additions, stock deduction, and queries.
//!
//! Stock deduction carries its `stock_count >= ?` guard in the WHERE clause
//! of the UPDATE. Two concurrent deductions on the same good therefore race
//! only over who commits first; the loser observes the reduced count and
//! fails cleanly instead of driving stock negative.

use chrono::Utc;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::error::{Result, StoreError};
use crate::model::{Category, Good};
use crate::money::Money;

/// A new good to add to the catalog.
#[derive(Debug, Clone)]
pub struct NewGood {
    /// Unique good name.
    pub name: String,
    #[allow(missing_docs)]
    pub category: Category,
    /// Price per item.
    pub price_per_item: Money,
    #[allow(missing_docs)]
    pub description: String,
    /// Initial stock count.
    pub stock_count: i64,
}

/// Partial good update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateGood {
    #[allow(missing_docs)]
    pub name: Option<String>,
    #[allow(missing_docs)]
    pub category: Option<Category>,
    #[allow(missing_docs)]
    pub price_per_item: Option<Money>,
    #[allow(missing_docs)]
    pub description: Option<String>,
    #[allow(missing_docs)]
    pub stock_count: Option<i64>,
}

impl UpdateGood {
    const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.price_per_item.is_none()
            && self.description.is_none()
            && self.stock_count.is_none()
    }
}

/// Name and price of a good available for sale.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GoodSummary {
    /// Good name.
    #[serde(rename = "Name")]
    pub name: String,
    /// Price per item in dollars.
    #[serde(rename = "PricePerItem")]
    #[sqlx(rename = "price_cents", try_from = "i64")]
    pub price_per_item: Money,
}

/// SQLite-backed goods catalog.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    pool: SqlitePool,
}

impl CatalogStore {
    /// Create a new catalog store over a connected pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a good to the catalog.
    ///
    /// # Errors
    ///
    /// `Validation` for a non-positive price or negative stock, `Conflict`
    /// for a duplicate name.
    pub async fn add(&self, new: NewGood) -> Result<Good> {
        if !new.price_per_item.is_positive() {
            return Err(StoreError::Validation(
                "PricePerItem must be a positive number.".to_string(),
            ));
        }
        if new.stock_count < 0 {
            return Err(StoreError::Validation(
                "StockCount must be a non-negative integer.".to_string(),
            ));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r"
            INSERT INTO goods (name, category, price_cents, description, stock_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&new.name)
        .bind(new.category.as_str())
        .bind(new.price_per_item.cents())
        .bind(&new.description)
        .bind(new.stock_count)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| map_good_insert_error(e, &new.name))?;

        self.get_by_id(result.last_insert_rowid()).await
    }

    /// Fetch a good by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such good exists.
    pub async fn get_by_id(&self, good_id: i64) -> Result<Good> {
        sqlx::query_as::<_, Good>("SELECT * FROM goods WHERE good_id = ?")
            .bind(good_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("Good not found.".to_string()))
    }

    /// Goods currently available for sale (stock above zero).
    ///
    /// # Errors
    ///
    /// Propagates database failures.
    pub async fn list_in_stock(&self) -> Result<Vec<GoodSummary>> {
        Ok(sqlx::query_as::<_, GoodSummary>(
            "SELECT name, price_cents FROM goods WHERE stock_count > 0 ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// Deduct stock as one atomic conditional statement.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity` when the quantity is not positive, `NotFound` for an
    /// unknown good, `InsufficientStock` when the available stock is short.
    pub async fn deduct_stock(&self, good_id: i64, quantity: i64) -> Result<()> {
        if quantity <= 0 {
            return Err(StoreError::InvalidQuantity);
        }

        let result = sqlx::query(
            r"
            UPDATE goods
            SET stock_count = stock_count - ?, updated_at = ?
            WHERE good_id = ? AND stock_count >= ?
            ",
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(good_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let available: Option<i64> =
                sqlx::query_scalar("SELECT stock_count FROM goods WHERE good_id = ?")
                    .bind(good_id)
                    .fetch_optional(&self.pool)
                    .await?;
            return Err(match available {
                None => StoreError::NotFound("Good not found.".to_string()),
                Some(available) => StoreError::InsufficientStock { available },
            });
        }
        tracing::debug!(good_id, quantity, "stock deducted");
        Ok(())
    }

    /// Apply a partial update to a good.
    ///
    /// # Errors
    ///
    /// `Validation` when no fields are provided or a provided price/stock is
    /// out of range, `NotFound` for an unknown good, `Conflict` when renaming
    /// onto an existing name.
    pub async fn update_fields(&self, good_id: i64, update: UpdateGood) -> Result<()> {
        if update.is_empty() {
            return Err(StoreError::Validation("No fields provided to update.".to_string()));
        }
        if matches!(update.price_per_item, Some(price) if !price.is_positive()) {
            return Err(StoreError::Validation(
                "PricePerItem must be a positive number.".to_string(),
            ));
        }
        if matches!(update.stock_count, Some(stock) if stock < 0) {
            return Err(StoreError::Validation(
                "StockCount must be a non-negative integer.".to_string(),
            ));
        }

        let name = update.name.clone();
        let result = sqlx::query(
            r"
            UPDATE goods SET
                name = COALESCE(?, name),
                category = COALESCE(?, category),
                price_cents = COALESCE(?, price_cents),
                description = COALESCE(?, description),
                stock_count = COALESCE(?, stock_count),
                updated_at = ?
            WHERE good_id = ?
            ",
        )
        .bind(update.name)
        .bind(update.category.map(Category::as_str))
        .bind(update.price_per_item.map(Money::cents))
        .bind(update.description)
        .bind(update.stock_count)
        .bind(Utc::now())
        .bind(good_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_good_insert_error(e, name.as_deref().unwrap_or("")))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Good not found.".to_string()));
        }
        Ok(())
    }
}

fn map_good_insert_error(err: sqlx::Error, name: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.message().contains("goods.name") {
            return StoreError::Conflict(format!("A good with the name '{name}' already exists."));
        }
    }
    err.into()
}
