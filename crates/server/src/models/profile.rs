//! Profile and per-user settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stock_home_core::UserId;

/// Public profile of a user.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user_id: UserId,
    pub display_name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which notifications a user wants to receive.
///
/// Stored as a single JSONB value under [`NotificationPreferences::SETTING_KEY`].
/// Missing fields fall back to their defaults so older rows keep loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPreferences {
    pub low_stock: bool,
    pub new_members: bool,
    pub shopping_completed: bool,
    pub weekly_report: bool,
    pub email: bool,
    pub push: bool,
}

impl NotificationPreferences {
    /// Settings key the preferences are stored under.
    pub const SETTING_KEY: &'static str = "notifications";
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            low_stock: true,
            new_members: true,
            shopping_completed: false,
            weekly_report: true,
            email: true,
            push: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let prefs: NotificationPreferences =
            serde_json::from_str(r#"{"shopping_completed": true}"#).unwrap();
        assert!(prefs.shopping_completed);
        assert!(prefs.low_stock);
        assert!(prefs.weekly_report);
    }

    #[test]
    fn test_default_matches_new_account() {
        let prefs = NotificationPreferences::default();
        assert!(!prefs.shopping_completed);
        assert!(prefs.email && prefs.push);
    }
}
