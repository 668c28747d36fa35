//! Database initialization and migration runner.
//!
//! DESIGN
//! ======
//! Designs and grid presets live in one embedded SQLite database. Opening it
//! is idempotent: the file is created on first use and the embedded
//! migrations bring the schema up to date, seeding the built-in grid preset
//! exactly once when the presets table is first created.

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::ErrorCode;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl ErrorCode for DbError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "E_DATABASE",
            Self::Migrate(_) => "E_MIGRATE",
        }
    }
}

/// Open (creating if needed) the SQLite database and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

/// Open a private in-memory database. Used by tests and dry runs.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_memory_pool() -> Result<SqlitePool, DbError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<(), DbError> {
    sqlx::migrate!("src/db/migrations").run(pool).await?;
    Ok(())
}
