//! Database operations for the API `PostgreSQL` store.
//!
//! # Schema: `shop`
//!
//! ## Tables
//!
//! - `users` / `user_password` - Accounts and their credential rows
//! - `role` / `user_role` - Role reference data and assignments
//! - `category` / `product` - Catalog reference data
//! - `cart` / `cart_item` - One cart per user, one line per product
//! - `wishlist` / `wishlist_item` - One wishlist per user, distinct products
//! - `customer_order` / `order_item` - Immutable price-snapshotted orders
//! - `review` - One review per (user, product)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p clementine-cli -- migrate
//! ```
//!
//! Queries use the runtime `sqlx::query`/`query_as` API with per-module row
//! structs mapped into domain types, so the crate builds without a live
//! database.

pub mod carts;
pub mod catalog;
pub mod orders;
pub mod reviews;
pub mod users;
pub mod wishlists;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use catalog::CatalogRepository;
pub use orders::{OrderRepository, StatusChange};
pub use reviews::ReviewRepository;
pub use users::UserRepository;
pub use wishlists::WishlistRepository;

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

    /// Constraint violation (e.g., unique email).
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

/// Map a sqlx error to `Conflict` when it is a unique violation.
pub(crate) fn map_unique_violation(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}
