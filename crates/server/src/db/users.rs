//! Accounts and their Argon2 password hashes.
//!
//! Sign-up writes the account, its password and its profile in one
//! transaction so a half-created user can never sign in.

use sqlx::PgPool;

use stock_home_core::{Email, UserId};

use super::RepositoryError;
use crate::models::User;

#[derive(sqlx::FromRow)]
struct Credentials {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT id, email, email_verified, created_at, updated_at
            FROM home.user
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Register an account with its password hash and display name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is taken.
    pub async fn create_with_password(
        &self,
        email: &Email,
        password_hash: &str,
        display_name: &str,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO home.user (email)
            VALUES ($1)
            RETURNING id, email, email_verified, created_at, updated_at
            ",
        )
        .bind(email)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "email"))?;

        sqlx::query("INSERT INTO home.user_password (user_id, password_hash) VALUES ($1, $2)")
            .bind(user.id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        sqlx::query("INSERT INTO home.profile (user_id, display_name) VALUES ($1, $2)")
            .bind(user.id)
            .bind(display_name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// The account for `email` together with its stored hash.
    ///
    /// `None` covers both an unknown email and an account without a
    /// password, so callers cannot tell the two apart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let found = sqlx::query_as::<_, Credentials>(
            r"
            SELECT u.id, u.email, u.email_verified, u.created_at, u.updated_at,
                   p.password_hash
            FROM home.user u
            JOIN home.user_password p ON p.user_id = u.id
            WHERE u.email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(found.map(|c| (c.user, c.password_hash)))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash_by_id(
        &self,
        id: UserId,
    ) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM home.user_password WHERE user_id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(hash)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO home.user_password (user_id, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE
                SET password_hash = EXCLUDED.password_hash, updated_at = NOW()
            ",
        )
        .bind(id)
        .bind(password_hash)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Mark the account's email as confirmed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account uses `email`.
    pub async fn verify_email(&self, email: &Email) -> Result<(), RepositoryError> {
        let updated = sqlx::query(
            "UPDATE home.user SET email_verified = TRUE, updated_at = NOW() WHERE email = $1",
        )
        .bind(email)
        .execute(self.pool)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
