//! House domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stock_home_core::{HouseId, HouseName, MemberRole, UserId};

/// A house (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct House {
    pub id: HouseId,
    pub owner_id: UserId,
    pub name: HouseName,
    pub created_at: DateTime<Utc>,
}

/// A house as listed on the home page, from the viewer's perspective.
#[derive(Debug, Clone, Serialize)]
pub struct HouseSummary {
    pub id: HouseId,
    pub name: HouseName,
    /// The viewer's role in this house.
    pub role: MemberRole,
    /// Whether the viewer owns the house.
    pub is_owner: bool,
    pub member_count: i64,
    pub item_count: i64,
    /// `/house/{encoded name}/dashboard`
    pub dashboard_path: String,
}

/// Path of a house's dashboard, with the name percent-encoded.
#[must_use]
pub fn dashboard_path(name: &HouseName) -> String {
    format!("/house/{}/dashboard", urlencoding::encode(name.as_str()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_path_encodes_spaces() {
        let name = HouseName::parse("Rumah Keluarga").unwrap();
        assert_eq!(dashboard_path(&name), "/house/Rumah%20Keluarga/dashboard");
    }

    #[test]
    fn test_dashboard_path_encodes_reserved_characters() {
        let name = HouseName::parse("Kos B & C?").unwrap();
        assert_eq!(dashboard_path(&name), "/house/Kos%20B%20%26%20C%3F/dashboard");
    }
}
