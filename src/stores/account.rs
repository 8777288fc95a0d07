//! Customer account store: registration, profiles, and wallet mutation.
//!
//! Wallet charge/deduct are single conditional UPDATE statements against the
//! balance column, so concurrent mutations of the same account serialize at
//! the database and can never interleave into a lost update or a negative
//! balance.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{Result, StoreError};
use crate::model::{username_is_valid, Customer, Gender, MaritalStatus};
use crate::money::Money;
use crate::password;

/// A registration request, validated and inserted by [`AccountStore::create`].
#[derive(Debug, Clone)]
pub struct NewCustomer {
    /// Display name.
    pub full_name: String,
    /// Desired unique username.
    pub username: String,
    /// Plaintext password; hashed before storage.
    pub password: String,
    /// Age in years.
    pub age: i64,
    /// Postal address.
    pub address: String,
    #[allow(missing_docs)]
    pub gender: Gender,
    #[allow(missing_docs)]
    pub marital_status: MaritalStatus,
    /// Request the (unique) admin flag.
    pub is_admin: bool,
}

/// Partial profile update. `None` fields are left untouched; the wallet
/// balance and admin flag are never updatable through this path.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomer {
    #[allow(missing_docs)]
    pub full_name: Option<String>,
    /// New plaintext password; rehashed before storage.
    pub password: Option<String>,
    #[allow(missing_docs)]
    pub age: Option<i64>,
    #[allow(missing_docs)]
    pub address: Option<String>,
    #[allow(missing_docs)]
    pub gender: Option<Gender>,
    #[allow(missing_docs)]
    pub marital_status: Option<MaritalStatus>,
}

impl UpdateCustomer {
    const fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.password.is_none()
            && self.age.is_none()
            && self.address.is_none()
            && self.gender.is_none()
            && self.marital_status.is_none()
    }
}

/// SQLite-backed customer account store.
#[derive(Debug, Clone)]
pub struct AccountStore {
    pool: SqlitePool,
}

impl AccountStore {
    /// Create a new account store over a connected pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Register a new customer with a zero wallet balance.
    ///
    /// The admin flag is granted through a conditional insert guarded by the
    /// `single_admin` unique index, so at most one admin can exist even under
    /// concurrent registration.
    ///
    /// # Errors
    ///
    /// `Validation` for a bad username or non-positive age, `Conflict` for a
    /// taken username or an already-existing admin.
    pub async fn create(&self, new: NewCustomer) -> Result<Customer> {
        if !username_is_valid(&new.username) {
            return Err(StoreError::Validation(
                "Invalid username. Must be 3-20 characters long and contain only letters, \
                 numbers, underscores, dots, or hyphens."
                    .to_string(),
            ));
        }
        if new.age <= 0 {
            return Err(StoreError::Validation("Age must be greater than 0.".to_string()));
        }
        if new.password.is_empty() {
            return Err(StoreError::Validation("Password must not be empty.".to_string()));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r"
            INSERT INTO customers
                (full_name, username, password_hash, age, address, gender,
                 marital_status, wallet_balance_cents, is_admin, created_at, updated_at)
            SELECT ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?
            WHERE NOT (? AND EXISTS (SELECT 1 FROM customers WHERE is_admin = 1))
            ",
        )
        .bind(&new.full_name)
        .bind(&new.username)
        .bind(password::hash(&new.password))
        .bind(new.age)
        .bind(&new.address)
        .bind(new.gender.as_str())
        .bind(new.marital_status.as_str())
        .bind(new.is_admin)
        .bind(now)
        .bind(now)
        .bind(new.is_admin)
        .execute(&self.pool)
        .await
        .map_err(map_customer_insert_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Conflict("An admin already exists.".to_string()));
        }

        self.get_by_id(result.last_insert_rowid()).await
    }

    /// Verify a username/password pair, returning the account on success.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` for an unknown username or a password mismatch; the
    /// two cases are deliberately indistinguishable to the caller.
    pub async fn authenticate(&self, username: &str, plaintext: &str) -> Result<Customer> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        match customer {
            Some(customer) if password::verify(plaintext, &customer.password_hash) => Ok(customer),
            _ => Err(StoreError::Unauthenticated("Invalid credentials.".to_string())),
        }
    }

    /// Fetch a customer by username.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such account exists.
    pub async fn get_by_username(&self, username: &str) -> Result<Customer> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::customer_not_found(username))
    }

    /// Fetch a customer by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if no such account exists.
    pub async fn get_by_id(&self, customer_id: i64) -> Result<Customer> {
        sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE customer_id = ?")
            .bind(customer_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("Customer not found.".to_string()))
    }

    /// All customers, oldest first.
    ///
    /// # Errors
    ///
    /// Propagates database failures.
    pub async fn list(&self) -> Result<Vec<Customer>> {
        Ok(
            sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY customer_id")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    ///
    /// `Validation` when no fields are provided or a provided age is not
    /// positive, `NotFound` for an unknown username.
    pub async fn update_fields(&self, username: &str, update: UpdateCustomer) -> Result<()> {
        if update.is_empty() {
            return Err(StoreError::Validation("No fields provided to update.".to_string()));
        }
        if matches!(update.age, Some(age) if age <= 0) {
            return Err(StoreError::Validation("Age must be greater than 0.".to_string()));
        }

        let result = sqlx::query(
            r"
            UPDATE customers SET
                full_name = COALESCE(?, full_name),
                password_hash = COALESCE(?, password_hash),
                age = COALESCE(?, age),
                address = COALESCE(?, address),
                gender = COALESCE(?, gender),
                marital_status = COALESCE(?, marital_status),
                updated_at = ?
            WHERE username = ?
            ",
        )
        .bind(update.full_name)
        .bind(update.password.map(|p| password::hash(&p)))
        .bind(update.age)
        .bind(update.address)
        .bind(update.gender.map(Gender::as_str))
        .bind(update.marital_status.map(MaritalStatus::as_str))
        .bind(Utc::now())
        .bind(username)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::customer_not_found(username));
        }
        Ok(())
    }

    /// Credit a wallet.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` when the amount is not positive, `NotFound` for an
    /// unknown username.
    pub async fn charge_wallet(&self, username: &str, amount: Money) -> Result<()> {
        if !amount.is_positive() {
            return Err(StoreError::InvalidAmount);
        }

        let result = sqlx::query(
            r"
            UPDATE customers
            SET wallet_balance_cents = wallet_balance_cents + ?, updated_at = ?
            WHERE username = ?
            ",
        )
        .bind(amount.cents())
        .bind(Utc::now())
        .bind(username)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::customer_not_found(username));
        }
        tracing::debug!(%username, amount = %amount, "wallet charged");
        Ok(())
    }

    /// Debit a wallet. The balance guard lives in the WHERE clause, making
    /// the read-check-write a single atomic statement.
    ///
    /// # Errors
    ///
    /// `InvalidAmount` when the amount is not positive, `NotFound` for an
    /// unknown username, `InsufficientBalance` when the balance is short.
    pub async fn deduct_wallet(&self, username: &str, amount: Money) -> Result<()> {
        if !amount.is_positive() {
            return Err(StoreError::InvalidAmount);
        }

        let result = sqlx::query(
            r"
            UPDATE customers
            SET wallet_balance_cents = wallet_balance_cents - ?, updated_at = ?
            WHERE username = ? AND wallet_balance_cents >= ?
            ",
        )
        .bind(amount.cents())
        .bind(Utc::now())
        .bind(username)
        .bind(amount.cents())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either the account is missing or the balance was short; look at
            // the row to report which.
            let exists: Option<i64> =
                sqlx::query_scalar("SELECT customer_id FROM customers WHERE username = ?")
                    .bind(username)
                    .fetch_optional(&self.pool)
                    .await?;
            return Err(match exists {
                None => StoreError::customer_not_found(username),
                Some(_) => StoreError::InsufficientBalance,
            });
        }
        tracing::debug!(%username, amount = %amount, "wallet deducted");
        Ok(())
    }

    /// Delete an account. Dependent purchases and reviews are removed by the
    /// cascade policy on their foreign keys.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown username.
    pub async fn delete(&self, username: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM customers WHERE username = ?")
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::customer_not_found(username));
        }
        tracing::info!(%username, "customer deleted");
        Ok(())
    }
}

/// Map insert failures onto the registration error surface.
fn map_customer_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("customers.username") {
                return StoreError::Conflict("Username already exists.".to_string());
            }
            if message.contains("customers.is_admin") {
                return StoreError::Conflict("An admin already exists.".to_string());
            }
        }
    }
    err.into()
}
