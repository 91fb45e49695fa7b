//! State handed to every handler.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::auth::AuthService;

/// Shared, read-only server state. Clones share one allocation.
#[derive(Clone)]
pub struct AppState {
    shared: Arc<Shared>,
}

struct Shared {
    config: ServerConfig,
    pool: PgPool,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        Self {
            shared: Arc::new(Shared { config, pool }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.shared.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.shared.pool
    }

    /// Account operations bound to this state's pool.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.pool())
    }

    /// Whether sign-in is refused until the email is confirmed.
    #[must_use]
    pub fn requires_confirmed_email(&self) -> bool {
        self.shared.config.require_email_confirmation
    }
}
