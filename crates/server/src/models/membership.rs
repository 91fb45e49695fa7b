//! House membership domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stock_home_core::{Email, HouseId, MemberRole, MembershipId, MembershipStatus, UserId};

/// A member of a house, joined with their profile.
#[derive(Debug, Clone, Serialize)]
pub struct Member {
    pub id: MembershipId,
    pub house_id: HouseId,
    pub user_id: UserId,
    pub display_name: String,
    pub email: Email,
    pub phone: Option<String>,
    pub role: MemberRole,
    pub status: MembershipStatus,
    pub joined_at: DateTime<Utc>,
    /// Whether this member owns the house (cannot be removed or demoted).
    pub is_owner: bool,
}
