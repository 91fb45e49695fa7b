//! Profile repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use stock_home_core::UserId;

use super::RepositoryError;
use crate::models::Profile;

#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: UserId,
    display_name: String,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(r: ProfileRow) -> Self {
        Self {
            user_id: r.user_id,
            display_name: r.display_name,
            phone: r.phone,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the profile of a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT user_id, display_name, phone, created_at, updated_at
            FROM home.profile
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    /// Overwrite display name and phone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user has no profile.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        user_id: UserId,
        display_name: &str,
        phone: Option<&str>,
    ) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            UPDATE home.profile
            SET display_name = $2, phone = $3, updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, display_name, phone, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(display_name)
        .bind(phone)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }
}
