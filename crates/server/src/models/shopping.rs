//! Shopping list domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stock_home_core::{HouseId, ShoppingEntryId, ShoppingPriority, UserId};

/// An entry on a house's shopping list.
#[derive(Debug, Clone, Serialize)]
pub struct ShoppingEntry {
    pub id: ShoppingEntryId,
    pub house_id: HouseId,
    pub name: String,
    pub category: String,
    pub quantity: Decimal,
    pub unit: String,
    pub priority: ShoppingPriority,
    pub added_by: Option<UserId>,
    /// Display name of the member who added the entry, if still known.
    pub added_by_name: Option<String>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new shopping list entry.
#[derive(Debug, Clone, Deserialize)]
pub struct NewShoppingEntry {
    pub name: String,
    pub category: String,
    pub quantity: Decimal,
    pub unit: String,
    #[serde(default)]
    pub priority: ShoppingPriority,
    #[serde(default)]
    pub notes: Option<String>,
}
