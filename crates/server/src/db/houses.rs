//! House repository: listing, creation and name resolution.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use stock_home_core::{HouseId, HouseName, MemberRole, UserId};

use super::RepositoryError;
use crate::models::house::dashboard_path;
use crate::models::{House, HouseSummary};

#[derive(sqlx::FromRow)]
struct HouseRow {
    id: HouseId,
    owner_id: UserId,
    name: HouseName,
    created_at: DateTime<Utc>,
}

impl From<HouseRow> for House {
    fn from(r: HouseRow) -> Self {
        Self {
            id: r.id,
            owner_id: r.owner_id,
            name: r.name,
            created_at: r.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct HouseSummaryRow {
    id: HouseId,
    owner_id: UserId,
    name: HouseName,
    role: MemberRole,
    member_count: i64,
    item_count: i64,
}

/// Repository for house database operations.
pub struct HouseRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HouseRepository<'a> {
    /// Create a new house repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Resolve a house name to its ID, scoped to the owner.
    ///
    /// The name is trimmed before lookup. A house with the same name owned
    /// by someone else never matches.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn resolve(
        &self,
        owner_id: UserId,
        name: &str,
    ) -> Result<Option<HouseId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, HouseId>(
            r"
            SELECT id
            FROM home.house
            WHERE name = $1 AND owner_id = $2
            ",
        )
        .bind(name.trim())
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(id)
    }

    /// Get a house by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: HouseId) -> Result<Option<House>, RepositoryError> {
        let row = sqlx::query_as::<_, HouseRow>(
            r"
            SELECT id, owner_id, name, created_at
            FROM home.house
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(House::from))
    }

    /// List the houses a user owns or actively belongs to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<HouseSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, HouseSummaryRow>(
            r"
            SELECT h.id, h.owner_id, h.name,
                   COALESCE(m.role, 'admin'::home.member_role) AS role,
                   (SELECT COUNT(*) FROM home.membership mm
                     WHERE mm.house_id = h.id AND mm.deleted_at IS NULL) AS member_count,
                   (SELECT COUNT(*) FROM home.stock_item s
                     WHERE s.house_id = h.id) AS item_count
            FROM home.house h
            LEFT JOIN home.membership m
                   ON m.house_id = h.id AND m.user_id = $1 AND m.deleted_at IS NULL
            WHERE h.owner_id = $1 OR m.id IS NOT NULL
            ORDER BY h.created_at ASC, h.id ASC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| HouseSummary {
                id: r.id,
                dashboard_path: dashboard_path(&r.name),
                is_owner: r.owner_id == user_id,
                name: r.name,
                role: r.role,
                member_count: r.member_count,
                item_count: r.item_count,
            })
            .collect())
    }

    /// Create a house and make the owner its admin, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the owner already has a house with this name.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, owner_id: UserId, name: &HouseName) -> Result<House, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, HouseRow>(
            r"
            INSERT INTO home.house (owner_id, name)
            VALUES ($1, $2)
            RETURNING id, owner_id, name, created_at
            ",
        )
        .bind(owner_id)
        .bind(name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "house"))?;

        sqlx::query(
            r"
            INSERT INTO home.membership (house_id, user_id, role)
            VALUES ($1, $2, 'admin')
            ",
        )
        .bind(row.id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Count houses a user owns or actively belongs to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_user(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(DISTINCT h.id)
            FROM home.house h
            LEFT JOIN home.membership m
                   ON m.house_id = h.id AND m.user_id = $1 AND m.deleted_at IS NULL
            WHERE h.owner_id = $1 OR m.id IS NOT NULL
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
