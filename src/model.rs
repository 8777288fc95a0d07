//! Domain entities: customers, goods, purchases, and reviews.
//!
//! Enumerated columns are stored as TEXT and converted through `TryFrom` so
//! an unexpected database value surfaces as a decode error instead of
//! panicking mid-request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use thiserror::Error;

use crate::money::Money;

/// A stored TEXT value that does not match any variant of an enumerated column.
#[derive(Debug, Error)]
#[error("invalid {kind} value: {value}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

macro_rules! text_enum {
    ($(#[$doc:meta])* $name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[allow(missing_docs)]
                $variant,
            )+
        }

        impl $name {
            /// The canonical TEXT representation stored in the database.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                match value.as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError { kind: $kind, value }),
                }
            }
        }
    };
}

text_enum!(
    /// Customer gender.
    Gender, "gender", { Male => "Male", Female => "Female", Other => "Other" }
);

text_enum!(
    /// Customer marital status.
    MaritalStatus, "marital status", {
        Single => "Single",
        Married => "Married",
        Divorced => "Divorced",
        Widowed => "Widowed",
    }
);

text_enum!(
    /// Good category.
    Category, "category", {
        Food => "Food",
        Clothes => "Clothes",
        Accessories => "Accessories",
        Electronics => "Electronics",
    }
);

text_enum!(
    /// Moderation lifecycle state of a review.
    ///
    /// New reviews always start `Pending`; only an admin moves them, and a
    /// moderated review may be re-set to `Pending`.
    ReviewStatus, "review status", {
        Pending => "Pending",
        Accepted => "Accepted",
        Rejected => "Rejected",
    }
);

/// A registered customer account with its wallet balance.
#[derive(Debug, Clone, FromRow)]
pub struct Customer {
    /// Unique customer id.
    pub customer_id: i64,
    /// Display name.
    pub full_name: String,
    /// Unique login name, 3-20 chars of `[A-Za-z0-9_.-]`.
    pub username: String,
    /// Salted credential hash. Never serialized.
    pub password_hash: String,
    /// Age in years, always positive.
    pub age: i64,
    /// Postal address.
    pub address: String,
    #[sqlx(try_from = "String")]
    #[allow(missing_docs)]
    pub gender: Gender,
    #[sqlx(try_from = "String")]
    #[allow(missing_docs)]
    pub marital_status: MaritalStatus,
    /// Wallet balance; never negative.
    #[sqlx(rename = "wallet_balance_cents", try_from = "i64")]
    pub wallet_balance: Money,
    /// At most one customer carries this flag at any time.
    pub is_admin: bool,
    #[allow(missing_docs)]
    pub created_at: DateTime<Utc>,
    #[allow(missing_docs)]
    pub updated_at: DateTime<Utc>,
}

/// A good in the catalog.
#[derive(Debug, Clone, FromRow)]
pub struct Good {
    /// Unique good id.
    pub good_id: i64,
    /// Unique good name.
    pub name: String,
    #[sqlx(try_from = "String")]
    #[allow(missing_docs)]
    pub category: Category,
    /// Price per item; always positive.
    #[sqlx(rename = "price_cents", try_from = "i64")]
    pub price_per_item: Money,
    #[allow(missing_docs)]
    pub description: String,
    /// Units available for sale; never negative.
    pub stock_count: i64,
    #[allow(missing_docs)]
    pub created_at: DateTime<Utc>,
    #[allow(missing_docs)]
    pub updated_at: DateTime<Utc>,
}

/// An append-only ledger entry for a completed sale.
#[derive(Debug, Clone, FromRow)]
pub struct Purchase {
    /// Unique purchase id.
    pub purchase_id: i64,
    /// Buyer.
    pub customer_id: i64,
    /// Good sold.
    pub good_id: i64,
    /// Units sold; always positive.
    pub quantity: i64,
    /// Price x quantity at the time of sale.
    #[sqlx(rename = "total_cents", try_from = "i64")]
    pub total_amount: Money,
    #[allow(missing_docs)]
    pub purchase_date: DateTime<Utc>,
}

/// A product review with its moderation state and vote counts.
#[derive(Debug, Clone, FromRow)]
pub struct Review {
    /// Unique review id.
    pub review_id: i64,
    /// Review author.
    pub customer_id: i64,
    /// Reviewed good.
    pub good_id: i64,
    /// Rating in `[1, 5]`.
    pub rating: i64,
    #[allow(missing_docs)]
    pub comment: Option<String>,
    #[sqlx(try_from = "String")]
    #[allow(missing_docs)]
    pub status: ReviewStatus,
    #[allow(missing_docs)]
    pub upvotes: i64,
    #[allow(missing_docs)]
    pub downvotes: i64,
    #[allow(missing_docs)]
    pub created_at: DateTime<Utc>,
    #[allow(missing_docs)]
    pub updated_at: DateTime<Utc>,
}

/// Validate a username against the account policy: 3-20 characters, each one
/// a letter, digit, underscore, dot, or hyphen.
#[must_use]
pub fn username_is_valid(username: &str) -> bool {
    (3..=20).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}
