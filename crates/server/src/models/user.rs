//! Accounts and the identity kept in a signed-in session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stock_home_core::{Email, UserId};

/// A registered account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    /// Set by the confirmation flow or `sh-cli user confirm`.
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Who is signed in, as stored in the session.
///
/// Carries the display name so activity records can be attributed without
/// a profile lookup per request. Refreshed when the profile is renamed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Email,
    pub display_name: String,
}

impl CurrentUser {
    #[must_use]
    pub fn new(user: User, display_name: String) -> Self {
        Self {
            id: user.id,
            email: user.email,
            display_name,
        }
    }
}

/// Session entry names.
pub mod session_keys {
    pub const CURRENT_USER: &str = "current_user";
}
