//! Database operations for storefront `PostgreSQL`.
//!
//! # Database: `pepsa_storefront`
//!
//! User documents are stored wholesale as JSONB; the cart is a JSONB item
//! list keyed by an opaque token.
//!
//! ## Tables
//!
//! - `auth_identifier` - Credential records (uid, email, phone, password hash)
//! - `user_profile` - Whole profile documents (JSONB, embedded order history)
//! - `cart` - Persisted carts keyed by cart token (JSONB item list)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p pepsa-cli -- migrate
//! ```

pub mod carts;
pub mod profiles;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::{CartStorage, MemoryCartStorage, PgCartStorage};
pub use profiles::{AuthIdentifier, MemoryProfileStore, PgProfileStore, ProfileStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or phone).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
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
