//! Activity log repository. Records are only ever appended.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use stock_home_core::{ActivityCategory, ActivityId, ActivityKind, HouseId, UserId};

use super::RepositoryError;
use crate::models::{Activity, NewActivity};

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: ActivityId,
    house_id: HouseId,
    actor_id: Option<UserId>,
    actor_name: String,
    kind: ActivityKind,
    category: ActivityCategory,
    target: String,
    detail: String,
    created_at: DateTime<Utc>,
}

impl From<ActivityRow> for Activity {
    fn from(r: ActivityRow) -> Self {
        Self {
            id: r.id,
            house_id: r.house_id,
            actor_id: r.actor_id,
            actor_name: r.actor_name,
            kind: r.kind,
            category: r.category,
            target: r.target,
            detail: r.detail,
            created_at: r.created_at,
        }
    }
}

const COLUMNS: &str = "id, house_id, actor_id, actor_name, kind, category, target, detail, created_at";

/// Upper bound on rows returned by a listing.
const MAX_LISTED: i64 = 1000;

/// Repository for activity database operations.
pub struct ActivityRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ActivityRepository<'a> {
    /// Create a new activity repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append an activity. The category follows from the kind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn append(
        &self,
        house_id: HouseId,
        activity: &NewActivity,
    ) -> Result<Activity, RepositoryError> {
        let sql = format!(
            "INSERT INTO home.activity (house_id, actor_id, actor_name, kind, category, target, detail)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(house_id)
            .bind(activity.actor_id)
            .bind(&activity.actor_name)
            .bind(activity.kind)
            .bind(activity.kind.category())
            .bind(&activity.target)
            .bind(&activity.detail)
            .fetch_one(self.pool)
            .await?;

        Ok(row.into())
    }

    /// List activities newest first, optionally only those at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        house_id: HouseId,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Activity>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM home.activity
             WHERE house_id = $1 AND ($2::timestamptz IS NULL OR created_at >= $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3"
        );
        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(house_id)
            .bind(since)
            .bind(MAX_LISTED)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Activity::from).collect())
    }

    /// The most recent activities.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, house_id: HouseId, limit: i64) -> Result<Vec<Activity>, RepositoryError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM home.activity
             WHERE house_id = $1
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        let rows = sqlx::query_as::<_, ActivityRow>(&sql)
            .bind(house_id)
            .bind(limit)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Activity::from).collect())
    }

    /// Count activities performed by a user across all houses.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_actor(&self, actor_id: UserId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM home.activity WHERE actor_id = $1",
        )
        .bind(actor_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
