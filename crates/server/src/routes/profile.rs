//! Profile and settings route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::db::{
    ActivityRepository, HouseRepository, ProfileRepository, RepositoryError, SettingsRepository,
};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAuth, set_current_user};
use crate::models::{CurrentUser, HouseSummary, NotificationPreferences, Profile};
use crate::services::auth::validate_display_name;
use crate::state::AppState;

/// Longest accepted phone number.
const MAX_PHONE_LENGTH: usize = 32;

/// Profile page response.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub email: String,
    #[serde(flatten)]
    pub profile: Profile,
    pub houses: Vec<HouseSummary>,
    pub total_houses: i64,
    pub total_activities: i64,
}

/// Profile update request. Absent fields stay unchanged; an empty phone clears it.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub display_name: Option<String>,
    pub phone: Option<String>,
}

/// Password change request.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

fn normalize_phone(raw: &str) -> Result<Option<String>> {
    let phone = raw.trim();
    if phone.is_empty() {
        return Ok(None);
    }
    if phone.len() > MAX_PHONE_LENGTH
        || !phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')'))
    {
        return Err(AppError::BadRequest("Nomor telepon tidak valid".to_owned()));
    }
    Ok(Some(phone.to_owned()))
}

async fn load_profile(state: &AppState, user: &CurrentUser) -> Result<Profile> {
    ProfileRepository::new(state.pool())
        .get(user.id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("user {} has no profile", user.id)))
}

/// Profile with house list and totals.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>> {
    let houses_repo = HouseRepository::new(state.pool());
    let activity_repo = ActivityRepository::new(state.pool());

    let (profile, houses, total_houses, total_activities) = tokio::join!(
        load_profile(&state, &user),
        houses_repo.list_for_user(user.id),
        houses_repo.count_for_user(user.id),
        activity_repo.count_by_actor(user.id),
    );

    Ok(Json(ProfileResponse {
        email: user.email.into_inner(),
        profile: profile?,
        houses: houses?,
        total_houses: total_houses?,
        total_activities: total_activities?,
    }))
}

/// Update display name and phone.
///
/// The session copy of the display name is refreshed so new activity
/// records carry the new name.
///
/// # Errors
///
/// Returns `400` for an invalid name or phone number.
pub async fn update(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>> {
    let current = load_profile(&state, &user).await?;

    let display_name = match body.display_name.as_deref() {
        Some(name) => validate_display_name(name)?.to_owned(),
        None => current.display_name,
    };
    let phone = match body.phone.as_deref() {
        Some(raw) => normalize_phone(raw)?,
        None => current.phone,
    };

    let profile = ProfileRepository::new(state.pool())
        .update(user.id, &display_name, phone.as_deref())
        .await?;

    let refreshed = CurrentUser {
        display_name: profile.display_name.clone(),
        ..user
    };
    set_current_user(&session, &refreshed).await?;

    Ok(Json(profile))
}

/// Change the password after verifying the current one.
///
/// # Errors
///
/// Returns `400` if the current password is wrong or the new one too short.
pub async fn change_password(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    state
        .auth()
        .change_password(user.id, &body.current_password, &body.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Stored notification preferences, or the defaults if none were saved.
pub(crate) async fn load_preferences(
    state: &AppState,
    user: &CurrentUser,
) -> Result<NotificationPreferences> {
    let stored = SettingsRepository::new(state.pool())
        .get(user.id, NotificationPreferences::SETTING_KEY)
        .await?;

    match stored {
        Some(value) => serde_json::from_value(value).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid notification preferences: {e}")).into()
        }),
        None => Ok(NotificationPreferences::default()),
    }
}

/// Current notification preferences.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub async fn notifications(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<NotificationPreferences>> {
    Ok(Json(load_preferences(&state, &user).await?))
}

/// Save notification preferences. Missing fields take their defaults.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub async fn update_notifications(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(prefs): Json<NotificationPreferences>,
) -> Result<Json<NotificationPreferences>> {
    let value =
        serde_json::to_value(prefs).map_err(|e| AppError::Internal(format!("serialize: {e}")))?;

    SettingsRepository::new(state.pool())
        .set(user.id, NotificationPreferences::SETTING_KEY, &value)
        .await?;

    Ok(Json(prefs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone() {
        assert_eq!(
            normalize_phone(" +62 812-3456-7890 ").unwrap().as_deref(),
            Some("+62 812-3456-7890")
        );
        assert_eq!(normalize_phone("  ").unwrap(), None);
        assert!(normalize_phone("call me").is_err());
    }
}
