//! Storefront: a transactional e-commerce backend.
//!
//! Four services share one SQLite database behind an Axum router:
//!
//! - **Customers** — registration, login, profiles, and wallet operations.
//! - **Inventory** — the goods catalog and stock management.
//! - **Sales** — the atomic purchase pipeline and the purchase ledger.
//! - **Reviews** — moderated product reviews with community votes.
//!
//! Every balance or stock mutation is a conditional UPDATE (or a transaction
//! of conditional UPDATEs), so concurrent requests cannot oversell stock or
//! overdraw a wallet.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod money;
pub mod password;
pub mod router;
pub mod state;
pub mod stores;
pub mod token;

pub use config::Config;
pub use error::{Result, StoreError};
pub use money::Money;
pub use state::AppState;

/// Embedded schema migrations, applied at startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();
