//! Sale pipeline and purchase ledger.
//!
//! A purchase debits a wallet, decrements stock, and appends a ledger row as
//! one transaction. The transaction opens with `BEGIN IMMEDIATE`, so
//! concurrent purchasers queue on the write lock (bounded by the busy
//! timeout) and read stock and balance as committed by whoever ran before
//! them; a loser fails with the precise insufficient-stock or
//! insufficient-funds error rather than a snapshot conflict. The guards are
//! still repeated in the WHERE clause of each UPDATE, so even a stale read
//! can never oversell a good or overdraw a wallet. If any step fails the
//! transaction is dropped uncommitted and nothing is applied.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Connection, FromRow, SqlitePool};

use crate::error::{Result, StoreError};
use crate::money::Money;

/// Outcome of a completed sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleReceipt {
    /// Ledger id of the recorded purchase.
    pub purchase_id: i64,
    /// Price x quantity actually charged.
    pub total_cost: Money,
}

/// One row of a customer's purchase history.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseRecord {
    /// Name of the purchased good.
    #[serde(rename = "Name")]
    pub name: String,
    /// Units purchased.
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    /// Total charged at the time of sale.
    #[serde(rename = "TotalAmount")]
    #[sqlx(rename = "total_cents", try_from = "i64")]
    pub total_amount: Money,
    /// When the sale completed.
    #[serde(rename = "PurchaseDate")]
    pub purchase_date: DateTime<Utc>,
}

#[derive(FromRow)]
struct GoodForSale {
    good_id: i64,
    price_cents: i64,
    stock_count: i64,
}

#[derive(FromRow)]
struct CustomerForSale {
    customer_id: i64,
    wallet_balance_cents: i64,
}

/// SQLite-backed sale pipeline over the shared customers/goods tables plus
/// the append-only purchase ledger.
#[derive(Debug, Clone)]
pub struct SaleStore {
    pool: SqlitePool,
}

impl SaleStore {
    /// Create a new sale store over a connected pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Execute a purchase of `quantity` units of the good named `good_name`
    /// for the customer `username`.
    ///
    /// Either all three mutations land (wallet debit, stock decrement,
    /// ledger append) or none do.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity`, `NotFound` (good or customer), `InsufficientStock`
    /// (reports available units), `InsufficientFunds` (reports the wallet
    /// balance), or `Transient` when the store is locked past its busy
    /// timeout.
    pub async fn purchase(
        &self,
        username: &str,
        good_name: &str,
        quantity: i64,
    ) -> Result<SaleReceipt> {
        if quantity <= 0 {
            return Err(StoreError::InvalidQuantity);
        }

        // Take the write lock up front. A deferred transaction would let
        // concurrent purchasers read the same snapshot and fail with a busy
        // error on upgrade instead of the precise guard error.
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin_with("BEGIN IMMEDIATE").await?;

        let good = sqlx::query_as::<_, GoodForSale>(
            "SELECT good_id, price_cents, stock_count FROM goods WHERE name = ?",
        )
        .bind(good_name)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::good_not_found(good_name))?;

        if good.stock_count < quantity {
            return Err(StoreError::InsufficientStock {
                available: good.stock_count,
            });
        }

        let customer = sqlx::query_as::<_, CustomerForSale>(
            "SELECT customer_id, wallet_balance_cents FROM customers WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::customer_not_found(username))?;

        let total_cost = Money::from_cents(good.price_cents)
            .checked_mul(quantity)
            .ok_or(StoreError::InvalidQuantity)?;

        if customer.wallet_balance_cents < total_cost.cents() {
            return Err(StoreError::InsufficientFunds {
                balance: Money::from_cents(customer.wallet_balance_cents),
            });
        }

        let now = Utc::now();

        // The guards repeat inside the UPDATEs: if a competing purchase
        // committed between our reads and here, the affected-row count drops
        // to zero and we abort with a fresh reading of the row.
        let stock = sqlx::query(
            r"
            UPDATE goods
            SET stock_count = stock_count - ?, updated_at = ?
            WHERE good_id = ? AND stock_count >= ?
            ",
        )
        .bind(quantity)
        .bind(now)
        .bind(good.good_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;
        if stock.rows_affected() == 0 {
            let available: i64 = sqlx::query_scalar("SELECT stock_count FROM goods WHERE good_id = ?")
                .bind(good.good_id)
                .fetch_one(&mut *tx)
                .await?;
            return Err(StoreError::InsufficientStock { available });
        }

        let wallet = sqlx::query(
            r"
            UPDATE customers
            SET wallet_balance_cents = wallet_balance_cents - ?, updated_at = ?
            WHERE customer_id = ? AND wallet_balance_cents >= ?
            ",
        )
        .bind(total_cost.cents())
        .bind(now)
        .bind(customer.customer_id)
        .bind(total_cost.cents())
        .execute(&mut *tx)
        .await?;
        if wallet.rows_affected() == 0 {
            let balance: i64 = sqlx::query_scalar(
                "SELECT wallet_balance_cents FROM customers WHERE customer_id = ?",
            )
            .bind(customer.customer_id)
            .fetch_one(&mut *tx)
            .await?;
            return Err(StoreError::InsufficientFunds {
                balance: Money::from_cents(balance),
            });
        }

        let ledger = sqlx::query(
            r"
            INSERT INTO purchases (customer_id, good_id, quantity, total_cents, purchase_date)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(customer.customer_id)
        .bind(good.good_id)
        .bind(quantity)
        .bind(total_cost.cents())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            %username,
            good = %good_name,
            quantity,
            total = %total_cost,
            "sale completed"
        );
        Ok(SaleReceipt {
            purchase_id: ledger.last_insert_rowid(),
            total_cost,
        })
    }

    /// Purchase history for a customer, most recent first.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown username.
    pub async fn history(&self, username: &str) -> Result<Vec<PurchaseRecord>> {
        let customer_id: Option<i64> =
            sqlx::query_scalar("SELECT customer_id FROM customers WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        let customer_id = customer_id.ok_or_else(|| StoreError::customer_not_found(username))?;

        Ok(sqlx::query_as::<_, PurchaseRecord>(
            r"
            SELECT goods.name, purchases.quantity, purchases.total_cents, purchases.purchase_date
            FROM purchases
            JOIN goods ON purchases.good_id = goods.good_id
            WHERE purchases.customer_id = ?
            ORDER BY purchases.purchase_id DESC
            ",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
