//! Authentication error types.

use axum::http::StatusCode;
use thiserror::Error;

use crate::db::RepositoryError;

/// Generic message for failures the user cannot act on.
pub const GENERIC_MESSAGE: &str = "Terjadi kesalahan. Silakan coba lagi.";

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] stock_home_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Sign-in requires a confirmed email and this one is not.
    #[error("email not confirmed")]
    EmailNotConfirmed,

    /// Password shorter than the minimum length.
    #[error("password too short")]
    WeakPassword,

    /// Display name shorter than the minimum length.
    #[error("display name too short")]
    InvalidDisplayName,

    /// The current password given on a password change is wrong.
    #[error("current password does not match")]
    IncorrectCurrentPassword,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Localized message shown to the user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) => "Email tidak valid",
            Self::InvalidCredentials => "Email atau password salah",
            Self::UserAlreadyExists => "Email sudah terdaftar. Silakan masuk dengan akun Anda.",
            Self::EmailNotConfirmed => "Silakan periksa email Anda untuk konfirmasi akun",
            Self::WeakPassword => "Password minimal 6 karakter",
            Self::InvalidDisplayName => "Nama minimal 2 karakter",
            Self::IncorrectCurrentPassword => "Password saat ini salah",
            Self::Repository(_) | Self::PasswordHash => GENERIC_MESSAGE,
        }
    }

    /// HTTP status the error maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidEmail(_)
            | Self::WeakPassword
            | Self::InvalidDisplayName
            | Self::IncorrectCurrentPassword => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::EmailNotConfirmed => StatusCode::FORBIDDEN,
            Self::Repository(_) | Self::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_sign_up_message() {
        let err = AuthError::UserAlreadyExists;
        assert_eq!(
            err.user_message(),
            "Email sudah terdaftar. Silakan masuk dengan akun Anda."
        );
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_errors_use_generic_message() {
        let err = AuthError::Repository(RepositoryError::DataCorruption("x".to_owned()));
        assert_eq!(err.user_message(), GENERIC_MESSAGE);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unconfirmed_email_is_forbidden() {
        assert_eq!(
            AuthError::EmailNotConfirmed.status_code(),
            StatusCode::FORBIDDEN
        );
    }
}
