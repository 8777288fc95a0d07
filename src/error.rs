//! Error taxonomy for store and pipeline operations.
//!
//! Every failure mode maps to a stable machine-checkable code plus an HTTP
//! status, and each error converts directly into a JSON response body via
//! Axum's `IntoResponse`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::money::Money;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Comprehensive error taxonomy for the storefront services.
///
/// Insufficient balance/stock/funds and duplicate names are business-rule
/// conflicts and surface as HTTP 400 with code `CONFLICT`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// Malformed, missing, or out-of-range input.
    #[error("{0}")]
    Validation(String),

    /// A charge or deduction amount that is not a positive number.
    #[error("'Amount' must be a positive number.")]
    InvalidAmount,

    /// A purchase or stock deduction quantity that is not positive.
    #[error("Quantity must be greater than 0.")]
    InvalidQuantity,

    /// Referenced entity does not exist. Carries the full user-facing message.
    #[error("{0}")]
    NotFound(String),

    /// Caller is authenticated but not allowed to perform the operation.
    #[error("{0}")]
    Forbidden(String),

    /// Missing, invalid, or expired bearer token.
    #[error("{0}")]
    Unauthenticated(String),

    /// Business-rule conflict: duplicate username/good name, second admin.
    #[error("{0}")]
    Conflict(String),

    /// Wallet deduction larger than the current balance.
    #[error("Insufficient balance.")]
    InsufficientBalance,

    /// Stock deduction or purchase larger than the available stock.
    #[error("Insufficient stock. Available stock: {available}.")]
    InsufficientStock {
        /// Units available at the time of the failed deduction.
        available: i64,
    },

    /// Purchase total larger than the customer's wallet balance.
    #[error("Insufficient funds. Wallet balance: ${balance}.")]
    InsufficientFunds {
        /// Wallet balance at the time of the failed purchase.
        balance: Money,
    },

    /// Lock timeout or serialization conflict. Safe to retry.
    #[error("The store is busy, please retry: {0}")]
    Transient(String),

    /// Unexpected database failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Stable error code included in every error response body.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidAmount | Self::InvalidQuantity => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::Conflict(_)
            | Self::InsufficientBalance
            | Self::InsufficientStock { .. }
            | Self::InsufficientFunds { .. } => "CONFLICT",
            Self::Transient(_) => "TRANSIENT",
            Self::Database(_) => "INTERNAL",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::InvalidAmount
            | Self::InvalidQuantity
            | Self::Conflict(_)
            | Self::InsufficientBalance
            | Self::InsufficientStock { .. }
            | Self::InsufficientFunds { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build a `NotFound` for a customer looked up by username.
    #[must_use]
    pub fn customer_not_found(username: &str) -> Self {
        Self::NotFound(format!("Customer '{username}' not found."))
    }

    /// Build a `NotFound` for a good looked up by name.
    #[must_use]
    pub fn good_not_found(name: &str) -> Self {
        Self::NotFound(format!("Good '{name}' not found."))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Stable error code for client-side handling.
    code: &'static str,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, code = self.code(), error = %self, "request failed");
        }

        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // SQLITE_BUSY (5) and SQLITE_LOCKED (6) mean a competing writer
            // held the database past the busy timeout. Retriable.
            if matches!(db_err.code().as_deref(), Some("5" | "6")) {
                return Self::Transient(db_err.message().to_string());
            }
        }
        if matches!(err, sqlx::Error::PoolTimedOut) {
            return Self::Transient("connection pool timed out".to_string());
        }
        Self::Database(err.to_string())
    }
}
