//! Shopping list repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use stock_home_core::{HouseId, ShoppingEntryId, ShoppingPriority, UserId};

use super::RepositoryError;
use super::stock_items::add_quantity_by_name;
use crate::models::{NewShoppingEntry, ShoppingEntry, StockItem};

#[derive(sqlx::FromRow)]
struct ShoppingEntryRow {
    id: ShoppingEntryId,
    house_id: HouseId,
    name: String,
    category: String,
    quantity: Decimal,
    unit: String,
    priority: ShoppingPriority,
    added_by: Option<UserId>,
    added_by_name: Option<String>,
    completed: bool,
    completed_at: Option<DateTime<Utc>>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ShoppingEntryRow> for ShoppingEntry {
    fn from(r: ShoppingEntryRow) -> Self {
        Self {
            id: r.id,
            house_id: r.house_id,
            name: r.name,
            category: r.category,
            quantity: r.quantity,
            unit: r.unit,
            priority: r.priority,
            added_by: r.added_by,
            added_by_name: r.added_by_name,
            completed: r.completed,
            completed_at: r.completed_at,
            notes: r.notes,
            created_at: r.created_at,
        }
    }
}

/// Selects entries as `e`, joined with the name of whoever added them.
const ENTRY_SELECT: &str = r"
    SELECT e.id, e.house_id, e.name, e.category, e.quantity, e.unit, e.priority,
           e.added_by, p.display_name AS added_by_name,
           e.completed, e.completed_at, e.notes, e.created_at
";

/// Result of completing a shopping entry.
#[derive(Debug, Clone)]
pub struct Completion {
    pub entry: ShoppingEntry,
    /// The stock item that was topped up, if restocking was requested and matched.
    pub restocked: Option<StockItem>,
}

/// Repository for shopping list database operations.
pub struct ShoppingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShoppingRepository<'a> {
    /// Create a new shopping repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List live entries: open before completed, then by priority, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, house_id: HouseId) -> Result<Vec<ShoppingEntry>, RepositoryError> {
        let sql = format!(
            "{ENTRY_SELECT}
             FROM home.shopping_entry e
             LEFT JOIN home.profile p ON p.user_id = e.added_by
             WHERE e.house_id = $1 AND e.deleted_at IS NULL
             ORDER BY e.completed ASC, e.priority ASC, e.created_at DESC, e.id DESC"
        );
        let rows = sqlx::query_as::<_, ShoppingEntryRow>(&sql)
            .bind(house_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(ShoppingEntry::from).collect())
    }

    /// Add an entry to the list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        house_id: HouseId,
        added_by: UserId,
        entry: &NewShoppingEntry,
    ) -> Result<ShoppingEntry, RepositoryError> {
        let sql = format!(
            "WITH e AS (
                 INSERT INTO home.shopping_entry
                     (house_id, name, category, quantity, unit, priority, added_by, notes)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 RETURNING *
             )
             {ENTRY_SELECT}
             FROM e
             LEFT JOIN home.profile p ON p.user_id = e.added_by"
        );
        let row = sqlx::query_as::<_, ShoppingEntryRow>(&sql)
            .bind(house_id)
            .bind(&entry.name)
            .bind(&entry.category)
            .bind(entry.quantity)
            .bind(&entry.unit)
            .bind(entry.priority)
            .bind(added_by)
            .bind(&entry.notes)
            .fetch_one(self.pool)
            .await?;

        Ok(row.into())
    }

    /// Mark an entry as bought, optionally adding its quantity to the
    /// matching stock item. Both happen in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry doesn't exist or was deleted.
    /// Returns `RepositoryError::Conflict` if it was already completed.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn complete(
        &self,
        house_id: HouseId,
        id: ShoppingEntryId,
        restock: bool,
    ) -> Result<Completion, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let already_completed = sqlx::query_scalar::<_, bool>(
            r"
            SELECT completed FROM home.shopping_entry
            WHERE house_id = $1 AND id = $2 AND deleted_at IS NULL
            FOR UPDATE
            ",
        )
        .bind(house_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        if already_completed {
            return Err(RepositoryError::Conflict(
                "shopping entry already completed".to_owned(),
            ));
        }

        let sql = format!(
            "WITH e AS (
                 UPDATE home.shopping_entry
                 SET completed = TRUE, completed_at = NOW(), updated_at = NOW()
                 WHERE house_id = $1 AND id = $2
                 RETURNING *
             )
             {ENTRY_SELECT}
             FROM e
             LEFT JOIN home.profile p ON p.user_id = e.added_by"
        );
        let entry: ShoppingEntry = sqlx::query_as::<_, ShoppingEntryRow>(&sql)
            .bind(house_id)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?
            .into();

        let restocked = if restock {
            add_quantity_by_name(&mut *tx, house_id, &entry.name, entry.quantity).await?
        } else {
            None
        };

        tx.commit().await?;

        Ok(Completion { entry, restocked })
    }

    /// Soft-delete an entry and return its name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry doesn't exist or was deleted.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn soft_delete(
        &self,
        house_id: HouseId,
        id: ShoppingEntryId,
    ) -> Result<String, RepositoryError> {
        let name = sqlx::query_scalar::<_, String>(
            r"
            UPDATE home.shopping_entry
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE house_id = $1 AND id = $2 AND deleted_at IS NULL
            RETURNING name
            ",
        )
        .bind(house_id)
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(name)
    }

    /// Count entries still to buy.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_open(&self, house_id: HouseId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM home.shopping_entry
            WHERE house_id = $1 AND deleted_at IS NULL AND completed = FALSE
            ",
        )
        .bind(house_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
