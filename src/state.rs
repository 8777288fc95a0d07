//! Shared application state for the HTTP layer.

use sqlx::SqlitePool;

use crate::config::AuthConfig;
use crate::stores::{AccountStore, CatalogStore, ReviewStore, SaleStore};
use crate::token::TokenSigner;

/// State handed to every handler: one store per component plus the token
/// signer. All stores share the same pool, so every mutation path goes
/// through the same database.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Customer accounts and wallet balances.
    pub accounts: AccountStore,
    /// Goods and stock counts.
    pub catalog: CatalogStore,
    /// Sale pipeline and purchase ledger.
    pub sales: SaleStore,
    /// Review submission and moderation.
    pub reviews: ReviewStore,
    /// Bearer token issuance and verification.
    pub tokens: TokenSigner,
}

impl AppState {
    /// Build the application state over a connected pool.
    #[must_use]
    pub fn new(pool: SqlitePool, auth: &AuthConfig) -> Self {
        Self {
            accounts: AccountStore::new(pool.clone()),
            catalog: CatalogStore::new(pool.clone()),
            sales: SaleStore::new(pool.clone()),
            reviews: ReviewStore::new(pool),
            tokens: TokenSigner::new(&auth.jwt_secret, auth.token_ttl_seconds),
        }
    }
}
