//! Handler errors and their JSON rendering.
//!
//! Server-side failures are reported to Sentry before the response is built;
//! clients only ever see the localized message.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::{AuthError, GENERIC_MESSAGE};
use crate::services::listing::FilterError;

/// Every way a handler can fail. Rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Nobody is signed in.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Signed in, but the role does not allow it.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Duplicate name, repeated completion and the like.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited")]
    RateLimited,

    /// Details are logged and reported, never sent to the client.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FilterError> for AppError {
    fn from(err: FilterError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(format!("session: {err}"))
    }
}

impl AppError {
    /// Whether this error is a server-side failure worth reporting.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Database(err) => !matches!(
                err,
                RepositoryError::NotFound | RepositoryError::Conflict(_)
            ),
            Self::Auth(err) => matches!(err, AuthError::Repository(_) | AuthError::PasswordHash),
            Self::Internal(_) => true,
            _ => false,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => err.status_code(),
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    /// Message safe to show to the user.
    fn user_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Data tidak ditemukan".to_owned(),
            Self::Database(RepositoryError::Conflict(_)) => "Data sudah ada".to_owned(),
            Self::Database(_) | Self::Internal(_) => GENERIC_MESSAGE.to_owned(),
            Self::Auth(err) => err.user_message().to_owned(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::RateLimited => "Terlalu banyak permintaan. Coba lagi nanti.".to_owned(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        (self.status_code(), Json(json!({ "error": self.user_message() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Attach the signed-in user to subsequent Sentry events.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Detach the user from Sentry events after sign-out.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Rumah tidak ditemukan".to_string());
        assert_eq!(err.to_string(), "Not found: Rumah tidak ditemukan");
    }

    #[test]
    fn test_app_error_status_codes() {
        let cases = [
            (AppError::NotFound("x".to_owned()), StatusCode::NOT_FOUND),
            (AppError::Unauthorized("x".to_owned()), StatusCode::UNAUTHORIZED),
            (AppError::Forbidden("x".to_owned()), StatusCode::FORBIDDEN),
            (AppError::Conflict("x".to_owned()), StatusCode::CONFLICT),
            (AppError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (AppError::Database(RepositoryError::NotFound), StatusCode::NOT_FOUND),
            (
                AppError::Database(RepositoryError::Conflict("x".to_owned())),
                StatusCode::CONFLICT,
            ),
            (AppError::Internal("x".to_owned()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let label = err.to_string();
            assert_eq!(err.into_response().status(), expected, "{label}");
        }
    }

    #[tokio::test]
    async fn test_auth_error_body_is_localized() {
        let (status, body) = body_of(AppError::Auth(AuthError::UserAlreadyExists)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["error"],
            "Email sudah terdaftar. Silakan masuk dengan akun Anda."
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) = body_of(AppError::Internal("pool exhausted".to_owned())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], GENERIC_MESSAGE);
    }

    #[tokio::test]
    async fn test_filter_error_is_bad_request() {
        let err: AppError = FilterError::Role("owner".to_owned()).into();
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Peran tidak dikenal: owner");
    }
}
