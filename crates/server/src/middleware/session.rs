//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions, with the
//! session cookie signed by `STOCK_HOME_SESSION_SECRET`.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::{Key, KeyError};
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::ServerConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "stock_home_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Session layer type used by the router.
pub type SessionLayer = SessionManagerLayer<PostgresStore, SignedCookie>;

/// Create the session layer with `PostgreSQL` store.
///
/// The `session` table is created by `PostgresStore::migrate`, which the
/// server runs at startup and `sh-cli migrate` runs on demand.
///
/// # Errors
///
/// Returns `KeyError` if the session secret is too short to derive a
/// signing key.
pub fn create_session_layer(pool: &PgPool, config: &ServerConfig) -> Result<SessionLayer, KeyError> {
    let store = PostgresStore::new(pool.clone());
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
