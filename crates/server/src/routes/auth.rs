//! Authentication route handlers.
//!
//! JSON sign-up, sign-in, sign-out and session lookup. Errors carry the
//! localized messages from [`AuthError::user_message`].

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::db::ProfileRepository;
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Shown after sign-up when the address still has to be confirmed.
const CONFIRM_EMAIL_MESSAGE: &str = "Silakan periksa email Anda untuk konfirmasi akun";

/// Sign-up request body.
#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Sign-in request body.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Response to a successful sign-up or sign-in.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The signed-in user; `None` when email confirmation is pending.
    pub user: Option<CurrentUser>,
    pub message: Option<&'static str>,
}

async fn start_session(session: &Session, user: &CurrentUser) -> Result<()> {
    set_current_user(session, user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

/// Load the display name of `user` for the session, falling back to the
/// mailbox part of the email when no profile row exists.
async fn current_user(state: &AppState, user: User) -> Result<CurrentUser> {
    let display_name = match ProfileRepository::new(state.pool()).get(user.id).await? {
        Some(profile) => profile.display_name,
        None => {
            tracing::warn!(user_id = %user.id, "user has no profile");
            user.email.name_hint().to_owned()
        }
    };

    Ok(CurrentUser::new(user, display_name))
}

/// Create an account.
///
/// Signs the new user in, unless email confirmation is required, in which
/// case the response asks them to check their inbox.
///
/// # Errors
///
/// Returns the localized auth error for invalid input or a duplicate email.
pub async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let user = state
        .auth()
        .sign_up(&body.email, &body.password, &body.display_name)
        .await?;

    if state.requires_confirmed_email() {
        return Ok((
            StatusCode::CREATED,
            Json(AuthResponse {
                user: None,
                message: Some(CONFIRM_EMAIL_MESSAGE),
            }),
        ));
    }

    let current = current_user(&state, user).await?;
    start_session(&session, &current).await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: Some(current),
            message: None,
        }),
    ))
}

/// Sign in with email and password.
///
/// # Errors
///
/// Returns `401` with "Email atau password salah" for bad credentials and
/// `403` when the email still needs confirming.
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SignInRequest>,
) -> Result<Json<AuthResponse>> {
    let user = state
        .auth()
        .sign_in(
            &body.email,
            &body.password,
            state.requires_confirmed_email(),
        )
        .await
        .inspect_err(|e| {
            if matches!(e, AuthError::InvalidCredentials) {
                tracing::info!("sign-in rejected");
            }
        })?;

    let current = current_user(&state, user).await?;
    start_session(&session, &current).await?;

    tracing::info!(user_id = %current.id, "user signed in");

    Ok(Json(AuthResponse {
        user: Some(current),
        message: None,
    }))
}

/// Sign out and discard the session.
///
/// # Errors
///
/// Returns an error if the session store cannot be updated.
pub async fn sign_out(session: Session) -> Result<StatusCode> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The signed-in user, or `401`.
///
/// # Errors
///
/// Returns `401` when nobody is signed in.
pub async fn current_session(RequireAuth(user): RequireAuth) -> Result<Json<CurrentUser>> {
    Ok(Json(user))
}
