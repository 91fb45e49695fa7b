//! Authentication service.
//!
//! Email and password accounts with Argon2id hashes.

mod error;

pub use error::{AuthError, GENERIC_MESSAGE};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use stock_home_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Minimum password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Minimum display name length after trimming, in characters.
pub const MIN_DISPLAY_NAME_LENGTH: usize = 2;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user with email, password and display name.
    ///
    /// The account and its profile are created in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::InvalidDisplayName` if the display name is too short.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let display_name = validate_display_name(display_name)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create_with_password(&email, &password_hash, display_name)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "user signed up");

        Ok(user)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::EmailNotConfirmed` if confirmation is required and
    /// the account has not been confirmed yet.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
        require_confirmation: bool,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        if require_confirmation && !user.email_verified {
            return Err(AuthError::EmailNotConfirmed);
        }

        Ok(user)
    }

    /// Change a user's password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::IncorrectCurrentPassword` if `current` is wrong.
    /// Returns `AuthError::WeakPassword` if `new` is too short.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        validate_password(new)?;

        let stored = self
            .users
            .get_password_hash_by_id(user_id)
            .await?
            .ok_or(AuthError::IncorrectCurrentPassword)?;

        verify_password(current, &stored).map_err(|_| AuthError::IncorrectCurrentPassword)?;

        let password_hash = hash_password(new)?;
        self.users.set_password_hash(user_id, &password_hash).await?;

        tracing::info!(user_id = %user_id, "password changed");

        Ok(())
    }
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword);
    }

    Ok(())
}

/// Trim a display name and check its length.
///
/// # Errors
///
/// Returns `AuthError::InvalidDisplayName` if fewer than two characters remain.
pub fn validate_display_name(display_name: &str) -> Result<&str, AuthError> {
    let trimmed = display_name.trim();
    if trimmed.chars().count() < MIN_DISPLAY_NAME_LENGTH {
        return Err(AuthError::InvalidDisplayName);
    }
    Ok(trimmed)
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("rahasia123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("rahasia123", &hash).is_ok());
        assert!(matches!(
            verify_password("salah", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("x", "not-a-hash"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_password_minimum_length() {
        assert!(matches!(validate_password("12345"), Err(AuthError::WeakPassword)));
        assert!(validate_password("123456").is_ok());
        // Counted in characters, not bytes
        assert!(matches!(validate_password("ééé"), Err(AuthError::WeakPassword)));
    }

    #[test]
    fn test_display_name_is_trimmed() {
        assert_eq!(validate_display_name("  Rani  ").unwrap(), "Rani");
        assert!(matches!(
            validate_display_name("  R "),
            Err(AuthError::InvalidDisplayName)
        ));
    }
}
