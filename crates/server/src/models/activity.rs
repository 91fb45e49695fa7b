//! Activity log domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stock_home_core::{ActivityCategory, ActivityId, ActivityKind, HouseId, UserId};

/// One entry of the append-only activity log.
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    pub id: ActivityId,
    pub house_id: HouseId,
    /// `None` for system-generated entries.
    pub actor_id: Option<UserId>,
    pub actor_name: String,
    pub kind: ActivityKind,
    pub category: ActivityCategory,
    pub target: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

/// An activity about to be appended.
#[derive(Debug, Clone)]
pub struct NewActivity {
    pub actor_id: Option<UserId>,
    pub actor_name: String,
    pub kind: ActivityKind,
    pub target: String,
    pub detail: String,
}

impl NewActivity {
    /// Display name used for system-generated entries.
    pub const SYSTEM_ACTOR: &'static str = "Sistem";

    /// An activity performed by a user.
    #[must_use]
    pub fn by(
        actor_id: UserId,
        actor_name: impl Into<String>,
        kind: ActivityKind,
        target: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            actor_id: Some(actor_id),
            actor_name: actor_name.into(),
            kind,
            target: target.into(),
            detail: detail.into(),
        }
    }

    /// An activity generated by the system (e.g. a low-stock alert).
    #[must_use]
    pub fn system(kind: ActivityKind, target: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            actor_id: None,
            actor_name: Self::SYSTEM_ACTOR.to_owned(),
            kind,
            target: target.into(),
            detail: detail.into(),
        }
    }
}
