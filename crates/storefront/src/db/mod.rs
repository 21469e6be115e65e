//! Database operations for storefront `PostgreSQL`.
//!
//! Stores local data only (the orders API is the source of truth for
//! submitted orders):
//!
//! ## Tables
//!
//! - `customers` - Customer profiles keyed by user identity
//! - `sessions` - Tower-sessions storage (shared with the auth service,
//!   which writes the logged-in identity this crate reads)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via
//! `sqlx migrate run` against the storefront database.

pub mod customers;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The expected row does not exist.
    #[error("row not found")]
    NotFound,
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
