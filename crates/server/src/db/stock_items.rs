//! Stock item repository.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use stock_home_core::{HouseId, StockItemId};

use super::RepositoryError;
use crate::models::{NewStockItem, StockItem, StockItemChanges};

#[derive(sqlx::FromRow)]
struct StockItemRow {
    id: StockItemId,
    house_id: HouseId,
    name: String,
    category: String,
    quantity: Decimal,
    unit: String,
    minimum: Decimal,
    expires_on: Option<NaiveDate>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StockItemRow> for StockItem {
    fn from(r: StockItemRow) -> Self {
        Self {
            id: r.id,
            house_id: r.house_id,
            name: r.name,
            category: r.category,
            quantity: r.quantity,
            unit: r.unit,
            minimum: r.minimum,
            expires_on: r.expires_on,
            notes: r.notes,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

const COLUMNS: &str =
    "id, house_id, name, category, quantity, unit, minimum, expires_on, notes, created_at, updated_at";

/// Repository for stock item database operations.
pub struct StockItemRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StockItemRepository<'a> {
    /// Create a new stock item repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all stock items of a house, by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, house_id: HouseId) -> Result<Vec<StockItem>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM home.stock_item WHERE house_id = $1 ORDER BY lower(name) ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, StockItemRow>(&sql)
            .bind(house_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(StockItem::from).collect())
    }

    /// List items that are low or empty, emptiest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_needing_restock(
        &self,
        house_id: HouseId,
    ) -> Result<Vec<StockItem>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM home.stock_item
             WHERE house_id = $1 AND (quantity <= 0 OR quantity < minimum)
             ORDER BY quantity ASC, lower(name) ASC"
        );
        let rows = sqlx::query_as::<_, StockItemRow>(&sql)
            .bind(house_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(StockItem::from).collect())
    }

    /// Create a stock item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        house_id: HouseId,
        item: &NewStockItem,
    ) -> Result<StockItem, RepositoryError> {
        let sql = format!(
            "INSERT INTO home.stock_item
                 (house_id, name, category, quantity, unit, minimum, expires_on, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, StockItemRow>(&sql)
            .bind(house_id)
            .bind(&item.name)
            .bind(&item.category)
            .bind(item.quantity)
            .bind(&item.unit)
            .bind(item.minimum)
            .bind(item.expires_on)
            .bind(&item.notes)
            .fetch_one(self.pool)
            .await?;

        Ok(row.into())
    }

    /// Apply a partial update. Absent fields keep their stored value;
    /// `Some(None)` on a nullable field stores NULL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't belong to the house.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        house_id: HouseId,
        id: StockItemId,
        changes: &StockItemChanges,
    ) -> Result<StockItem, RepositoryError> {
        let sql = format!(
            "UPDATE home.stock_item SET
                 name = COALESCE($3, name),
                 category = COALESCE($4, category),
                 quantity = COALESCE($5, quantity),
                 unit = COALESCE($6, unit),
                 minimum = COALESCE($7, minimum),
                 expires_on = CASE WHEN $8 THEN $9 ELSE expires_on END,
                 notes = CASE WHEN $10 THEN $11 ELSE notes END,
                 updated_at = NOW()
             WHERE house_id = $1 AND id = $2
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, StockItemRow>(&sql)
            .bind(house_id)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.category)
            .bind(changes.quantity)
            .bind(&changes.unit)
            .bind(changes.minimum)
            .bind(changes.expires_on.is_some())
            .bind(changes.expires_on.flatten())
            .bind(changes.notes.is_some())
            .bind(changes.notes.as_ref().and_then(Option::as_deref))
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete an item and return what was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't belong to the house.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(
        &self,
        house_id: HouseId,
        id: StockItemId,
    ) -> Result<StockItem, RepositoryError> {
        let sql = format!(
            "DELETE FROM home.stock_item WHERE house_id = $1 AND id = $2 RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, StockItemRow>(&sql)
            .bind(house_id)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Count all items of a house.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, house_id: HouseId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM home.stock_item WHERE house_id = $1",
        )
        .bind(house_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Count items that are low or empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_needing_restock(&self, house_id: HouseId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM home.stock_item
            WHERE house_id = $1 AND (quantity <= 0 OR quantity < minimum)
            ",
        )
        .bind(house_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}

/// Add `quantity` to the item whose name matches case-insensitively.
///
/// Runs on the caller's connection so it can share a transaction with the
/// shopping entry being completed. Returns `None` when no item matches.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the update fails.
pub(crate) async fn add_quantity_by_name(
    conn: &mut PgConnection,
    house_id: HouseId,
    name: &str,
    quantity: Decimal,
) -> Result<Option<StockItem>, RepositoryError> {
    let sql = format!(
        "UPDATE home.stock_item
         SET quantity = quantity + $3, updated_at = NOW()
         WHERE id = (
             SELECT id FROM home.stock_item
             WHERE house_id = $1 AND lower(name) = lower($2)
             ORDER BY id ASC
             LIMIT 1
         )
         RETURNING {COLUMNS}"
    );
    let row = sqlx::query_as::<_, StockItemRow>(&sql)
        .bind(house_id)
        .bind(name.trim())
        .bind(quantity)
        .fetch_optional(conn)
        .await?;

    Ok(row.map(StockItem::from))
}
