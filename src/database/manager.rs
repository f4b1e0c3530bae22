use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidDatabaseUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    /// True when the underlying driver reported a UNIQUE constraint violation.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::Sqlx(sqlx::Error::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }
}

/// Open a connection pool for the configured SQLite database.
///
/// The database file is created when missing and foreign keys are enforced on
/// every connection, which the report cascade depends on.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| DatabaseError::InvalidDatabaseUrl(e.to_string()))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    info!("Created database pool for: {}", config.url);
    Ok(pool)
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &SqlitePool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
