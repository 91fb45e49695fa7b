//! Status and classification enums shared by the server and the CLI.
//!
//! Every enum serializes as `snake_case` and maps onto a PostgreSQL enum in
//! the `home` schema when the `postgres` feature is enabled. Parsing is
//! case-insensitive and also accepts the Indonesian labels shown to users,
//! so query strings like `?role=Admin` or `?status=Hampir%20Habis` work.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Derived availability of a stock item.
///
/// Never stored; always recomputed from quantity and minimum threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    /// At or above the minimum threshold.
    Sufficient,
    /// Above zero but below the minimum threshold.
    Low,
    /// Nothing left.
    Empty,
}

impl StockStatus {
    /// Derive the status of an item from its quantity and minimum threshold.
    ///
    /// `empty` when the quantity is zero (or negative), `low` when it is
    /// strictly below the minimum, `sufficient` otherwise.
    ///
    /// ```
    /// use rust_decimal::Decimal;
    /// use stock_home_core::StockStatus;
    ///
    /// assert_eq!(StockStatus::derive(Decimal::ZERO, Decimal::from(3)), StockStatus::Empty);
    /// assert_eq!(StockStatus::derive(Decimal::from(2), Decimal::from(3)), StockStatus::Low);
    /// assert_eq!(StockStatus::derive(Decimal::from(3), Decimal::from(3)), StockStatus::Sufficient);
    /// ```
    #[must_use]
    pub fn derive(quantity: Decimal, minimum: Decimal) -> Self {
        if quantity <= Decimal::ZERO {
            Self::Empty
        } else if quantity < minimum {
            Self::Low
        } else {
            Self::Sufficient
        }
    }

    /// Whether the item needs restocking.
    #[must_use]
    pub const fn needs_restock(self) -> bool {
        matches!(self, Self::Low | Self::Empty)
    }

    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sufficient => "sufficient",
            Self::Low => "low",
            Self::Empty => "empty",
        }
    }

    /// User-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sufficient => "Cukup",
            Self::Low => "Hampir Habis",
            Self::Empty => "Habis",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StockStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sufficient" | "cukup" => Ok(Self::Sufficient),
            "low" | "hampir habis" | "hampir_habis" => Ok(Self::Low),
            "empty" | "habis" => Ok(Self::Empty),
            _ => Err(format!("invalid stock status: {s}")),
        }
    }
}

/// Role of a member within a house.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "home.member_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    /// Full control over the house, its members and its data.
    Admin,
    /// Can manage stock and shopping but not members.
    Moderator,
    /// Regular household member.
    Member,
}

impl MemberRole {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Moderator => "moderator",
            Self::Member => "member",
        }
    }

    /// User-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Moderator => "Moderator",
            Self::Member => "Anggota",
        }
    }
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "moderator" => Ok(Self::Moderator),
            "member" | "anggota" => Ok(Self::Member),
            _ => Err(format!("invalid member role: {s}")),
        }
    }
}

/// Whether a membership is still in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "home.membership_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    #[default]
    Active,
    Removed,
}

/// Urgency of a shopping list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "home.shopping_priority", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ShoppingPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl ShoppingPriority {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// User-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "Tinggi",
            Self::Medium => "Sedang",
            Self::Low => "Rendah",
        }
    }
}

impl std::fmt::Display for ShoppingPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShoppingPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" | "tinggi" => Ok(Self::High),
            "medium" | "sedang" => Ok(Self::Medium),
            "low" | "rendah" => Ok(Self::Low),
            _ => Err(format!("invalid shopping priority: {s}")),
        }
    }
}

/// What happened in an activity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "home.activity_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    AddItem,
    EditItem,
    DeleteItem,
    AddShopping,
    CompleteShopping,
    JoinMember,
    ChangeRole,
    RemoveMember,
    LowStockAlert,
}

impl ActivityKind {
    /// The timeline category this kind of activity is grouped under.
    #[must_use]
    pub const fn category(self) -> ActivityCategory {
        match self {
            Self::AddItem | Self::EditItem | Self::DeleteItem => ActivityCategory::Stock,
            Self::AddShopping | Self::CompleteShopping => ActivityCategory::Shopping,
            Self::JoinMember | Self::ChangeRole | Self::RemoveMember => ActivityCategory::Members,
            Self::LowStockAlert => ActivityCategory::System,
        }
    }

    /// Whether this activity concerns a stock item.
    #[must_use]
    pub const fn touches_stock(self) -> bool {
        matches!(
            self,
            Self::AddItem | Self::EditItem | Self::DeleteItem | Self::LowStockAlert
        )
    }
}

/// Timeline grouping of activity records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "home.activity_category", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    Stock,
    Shopping,
    Members,
    System,
}

impl ActivityCategory {
    /// Wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Shopping => "shopping",
            Self::Members => "members",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ActivityCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stock" | "stok" => Ok(Self::Stock),
            "shopping" | "belanja" => Ok(Self::Shopping),
            "members" | "anggota" => Ok(Self::Members),
            "system" | "sistem" => Ok(Self::System),
            _ => Err(format!("invalid activity category: {s}")),
        }
    }
}
