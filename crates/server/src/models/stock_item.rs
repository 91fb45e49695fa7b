//! Stock item domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use stock_home_core::{HouseId, StockItemId, StockStatus};

/// A tracked inventory item.
///
/// The status is derived on every read with [`StockItem::status`].
#[derive(Debug, Clone, Serialize)]
pub struct StockItem {
    pub id: StockItemId,
    pub house_id: HouseId,
    pub name: String,
    pub category: String,
    pub quantity: Decimal,
    pub unit: String,
    pub minimum: Decimal,
    pub expires_on: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockItem {
    /// Current availability derived from quantity and minimum.
    #[must_use]
    pub fn status(&self) -> StockStatus {
        StockStatus::derive(self.quantity, self.minimum)
    }
}

/// Fields for a new stock item.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStockItem {
    pub name: String,
    pub category: String,
    pub quantity: Decimal,
    pub unit: String,
    #[serde(default)]
    pub minimum: Decimal,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update of a stock item. Absent fields are left unchanged.
///
/// `expires_on` and `notes` are nullable: an explicit `null` parses to
/// `Some(None)` and clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockItemChanges {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub minimum: Option<Decimal>,
    #[serde(default, deserialize_with = "nullable")]
    pub expires_on: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

/// Present-but-null becomes `Some(None)`; `serde(default)` covers absent.
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl StockItemChanges {
    /// Whether the update carries no changes at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.quantity.is_none()
            && self.unit.is_none()
            && self.minimum.is_none()
            && self.expires_on.is_none()
            && self.notes.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_tell_null_from_absent() {
        let changes: StockItemChanges =
            serde_json::from_str(r#"{"expires_on": null, "name": "Beras"}"#).unwrap();
        assert_eq!(changes.expires_on, Some(None));
        assert_eq!(changes.notes, None);
        assert!(!changes.is_empty());

        let changes: StockItemChanges =
            serde_json::from_str(r#"{"expires_on": "2026-12-01", "notes": null}"#).unwrap();
        assert_eq!(
            changes.expires_on,
            Some(NaiveDate::from_ymd_opt(2026, 12, 1))
        );
        assert_eq!(changes.notes, Some(None));
    }

    #[test]
    fn test_clearing_alone_is_a_change() {
        let changes: StockItemChanges = serde_json::from_str(r#"{"notes": null}"#).unwrap();
        assert!(!changes.is_empty());
        let changes: StockItemChanges = serde_json::from_str("{}").unwrap();
        assert!(changes.is_empty());
    }
}
