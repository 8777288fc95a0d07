//! Configuration management for the storefront services.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// SQLite configuration.
    pub database: DatabaseConfig,
    /// Bearer-token configuration.
    pub auth: AuthConfig,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

/// SQLite configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL, e.g. `sqlite://storefront.db`.
    pub url: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// How long a writer waits on a locked database before the operation
    /// surfaces a retriable error, in milliseconds.
    pub busy_timeout_ms: u64,
}

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret for signing bearer tokens.
    pub jwt_secret: String,
    /// Token time-to-live in seconds. Default: 1 hour.
    pub token_ttl_seconds: i64,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// development defaults for anything unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://storefront.db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
                busy_timeout_ms: env::var("DATABASE_BUSY_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5_000),
            },
            auth: AuthConfig {
                jwt_secret: env::var("AUTH_JWT_SECRET")
                    .unwrap_or_else(|_| "dev-secret-change-in-production".to_string()),
                token_ttl_seconds: env::var("AUTH_TOKEN_TTL_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3_600),
            },
        }
    }
}
