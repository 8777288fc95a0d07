//! Database pool construction.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Connect a pool per the database config.
///
/// Foreign keys are enabled on every connection so the delete cascades fire,
/// and the busy timeout bounds how long a writer waits on a lock before the
/// request fails as retriable.
///
/// # Errors
///
/// Returns an error when the URL is malformed or the database is unreachable.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

    Ok(SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?)
}
