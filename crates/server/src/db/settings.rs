//! Per-user settings stored as JSONB.

use serde_json::Value as JsonValue;
use sqlx::PgPool;

use stock_home_core::UserId;

use super::RepositoryError;

/// Repository for `home.user_setting`.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user-specific setting value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, user_id: UserId, key: &str) -> Result<Option<JsonValue>, RepositoryError> {
        let value = sqlx::query_scalar::<_, JsonValue>(
            r"
            SELECT value FROM home.user_setting
            WHERE user_id = $1 AND key = $2
            ",
        )
        .bind(user_id)
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        Ok(value)
    }

    /// Set a user-specific setting value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn set(&self, user_id: UserId, key: &str, value: &JsonValue) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO home.user_setting (user_id, key, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, key) DO UPDATE SET value = $3, updated_at = NOW()
            ",
        )
        .bind(user_id)
        .bind(key)
        .bind(value)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
