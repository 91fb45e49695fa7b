//! Database operations for Stock Home `PostgreSQL`.
//!
//! # Schema: `home`
//!
//! ## Tables
//!
//! - `user` / `user_password` - Local accounts and Argon2 password hashes
//! - `profile` - Display name and phone, one per user
//! - `user_setting` - Per-user JSONB settings (notification preferences)
//! - `house` - Inventory scopes, unique per `(owner_id, name)`
//! - `membership` - User ↔ house with role and soft-delete
//! - `stock_item` - Tracked items; status is derived, never stored
//! - `shopping_entry` - Shopping list with soft-delete
//! - `activity` - Append-only log shown on the timeline
//! - `session` - tower-sessions storage (created by `PostgresStore::migrate`)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p stock-home-cli -- migrate
//! ```
//!
//! Queries are built at runtime with `sqlx::query_as` and `FromRow` row
//! types, so the crate builds without a live database.

pub mod activity;
pub mod houses;
pub mod memberships;
pub mod profiles;
pub mod settings;
pub mod shopping;
pub mod stock_items;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use activity::ActivityRepository;
pub use houses::HouseRepository;
pub use memberships::MembershipRepository;
pub use profiles::ProfileRepository;
pub use settings::SettingsRepository;
pub use shopping::ShoppingRepository;
pub use stock_items::StockItemRepository;
pub use users::UserRepository;

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

impl RepositoryError {
    /// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
    pub(crate) fn from_unique(e: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(e)
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unique_passes_through_other_errors() {
        let err = RepositoryError::from_unique(sqlx::Error::RowNotFound, "house");
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }
}
