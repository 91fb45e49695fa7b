//! Authentication extractors.
//!
//! Route handlers take [`RequireAuth`] to demand a signed-in user. Requests
//! without one are rejected with `401` and a JSON error body.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentUser, session_keys};

/// Message returned when a signed-in user is required.
pub const SIGN_IN_REQUIRED: &str = "Silakan masuk terlebih dahulu";

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Halo, {}!", user.display_name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_owned()))?;

        let user: CurrentUser = session
            .get(session_keys::CURRENT_USER)
            .await?
            .ok_or_else(|| AppError::Unauthorized(SIGN_IN_REQUIRED.to_owned()))?;

        Ok(Self(user))
    }
}

/// Store the signed-in user in the session.
///
/// The session id is cycled first so a pre-sign-in id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the signed-in user and discard the session (sign-out).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session.flush().await
}
