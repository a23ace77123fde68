//! Database operations for the store's `PostgreSQL` database.
//!
//! One repository struct per entity, borrowing the shared [`PgPool`].
//! Queries use the runtime `sqlx` API with `FromRow` row structs that are
//! converted into the domain models from [`crate::models`].
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p mobigear-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod chat;
pub mod coupons;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;

/// Errors returned by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Row not found where one was required.
    #[error("not found")]
    NotFound,

    /// Unique or business constraint violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Stored data failed to parse into a domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl RepositoryError {
    /// Map a unique-violation database error to [`RepositoryError::Conflict`].
    pub(crate) fn from_unique(e: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
