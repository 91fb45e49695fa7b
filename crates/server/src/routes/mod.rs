//! HTTP route handlers for the server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                              - Liveness
//! GET  /health/ready                        - Readiness (database reachable)
//!
//! # Auth (sign-up and sign-in are rate limited)
//! POST /auth/sign-up                        - Create an account
//! POST /auth/sign-in                        - Sign in
//! POST /auth/sign-out                       - Sign out
//! GET  /auth/session                        - Current user or 401
//!
//! # Houses
//! GET  /                                    - Houses of the current user
//! POST /houses                              - Create a house
//!
//! # Profile
//! GET  /profile                             - Profile, houses and totals
//! PUT  /profile                             - Update display name / phone
//! PUT  /profile/password                    - Change password
//! GET  /profile/notifications               - Notification preferences
//! PUT  /profile/notifications               - Save notification preferences
//!
//! # House (resolved by name among the user's houses)
//! GET  /house/{name}/dashboard
//! GET  /house/{name}/stock                  ?search&category&status
//! POST /house/{name}/stock
//! PUT  /house/{name}/stock/{id}
//! DELETE /house/{name}/stock/{id}
//! GET  /house/{name}/shopping               ?search&category&show_completed
//! POST /house/{name}/shopping
//! POST /house/{name}/shopping/{id}/complete
//! DELETE /house/{name}/shopping/{id}
//! GET  /house/{name}/members                ?search&role
//! POST /house/{name}/members
//! PUT  /house/{name}/members/{id}
//! DELETE /house/{name}/members/{id}
//! GET  /house/{name}/timeline               ?search&category&window
//! GET  /house/{name}/reports                ?period
//! GET  /house/{name}/notifications
//! ```
//!
//! Anything else answers `404` with a JSON error body.

pub mod auth;
pub mod dashboard;
pub mod houses;
pub mod members;
pub mod profile;
pub mod shopping;
pub mod stock;
pub mod timeline;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};

use stock_home_core::HouseId;

use crate::db::ActivityRepository;
use crate::config::ServerConfig;
use crate::error::AppError;
use crate::middleware::auth_rate_limiter;
use crate::models::NewActivity;
use crate::state::AppState;

/// Append an activity record after a successful mutation.
///
/// The mutation has already been committed, so a failure here is logged
/// and does not fail the request.
pub(crate) async fn record_activity(state: &AppState, house_id: HouseId, activity: NewActivity) {
    if let Err(e) = ActivityRepository::new(state.pool())
        .append(house_id, &activity)
        .await
    {
        tracing::warn!(
            house_id = %house_id,
            kind = ?activity.kind,
            error = %e,
            "failed to record activity"
        );
    }
}

/// Create the auth routes router. Sign-up and sign-in share one limiter.
pub fn auth_routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(auth::sign_up))
        .route("/sign-in", post(auth::sign_in))
        .layer(auth_rate_limiter(config.trust_proxy))
        .route("/sign-out", post(auth::sign_out))
        .route("/session", get(auth::current_session))
}

/// Create the profile routes router.
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile::show).put(profile::update))
        .route("/password", put(profile::change_password))
        .route(
            "/notifications",
            get(profile::notifications).put(profile::update_notifications),
        )
}

/// Create the per-house routes router.
pub fn house_routes() -> Router<AppState> {
    Router::new()
        .route("/house/{name}/dashboard", get(dashboard::show))
        .route("/house/{name}/stock", get(stock::index).post(stock::create))
        .route(
            "/house/{name}/stock/{id}",
            put(stock::update).delete(stock::delete),
        )
        .route(
            "/house/{name}/shopping",
            get(shopping::index).post(shopping::create),
        )
        .route(
            "/house/{name}/shopping/{id}/complete",
            post(shopping::complete),
        )
        .route(
            "/house/{name}/shopping/{id}",
            axum::routing::delete(shopping::delete),
        )
        .route(
            "/house/{name}/members",
            get(members::index).post(members::invite),
        )
        .route(
            "/house/{name}/members/{id}",
            put(members::update_role).delete(members::remove),
        )
        .route("/house/{name}/timeline", get(timeline::timeline))
        .route("/house/{name}/reports", get(timeline::reports))
        .route("/house/{name}/notifications", get(timeline::notifications))
}

/// Create all routes for the server.
pub fn routes(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .route("/", get(houses::index))
        .route("/houses", post(houses::create))
        .nest("/auth", auth_routes(config))
        .nest("/profile", profile_routes())
        .merge(house_routes())
        .fallback(not_found)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

async fn not_found() -> impl IntoResponse {
    AppError::NotFound("Halaman tidak ditemukan".to_owned())
}
