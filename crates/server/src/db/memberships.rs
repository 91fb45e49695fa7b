//! Membership repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use stock_home_core::{Email, HouseId, MemberRole, MembershipId, MembershipStatus, UserId};

use super::RepositoryError;
use crate::models::Member;

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: MembershipId,
    house_id: HouseId,
    user_id: UserId,
    display_name: String,
    email: String,
    phone: Option<String>,
    role: MemberRole,
    status: MembershipStatus,
    joined_at: DateTime<Utc>,
    is_owner: bool,
}

impl TryFrom<MemberRow> for Member {
    type Error = RepositoryError;

    fn try_from(r: MemberRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: r.id,
            house_id: r.house_id,
            user_id: r.user_id,
            display_name: r.display_name,
            email,
            phone: r.phone,
            role: r.role,
            status: r.status,
            joined_at: r.joined_at,
            is_owner: r.is_owner,
        })
    }
}

const MEMBER_SELECT: &str = r"
    SELECT m.id, m.house_id, m.user_id,
           COALESCE(p.display_name, u.email) AS display_name,
           u.email, p.phone, m.role, m.status, m.joined_at,
           (h.owner_id = m.user_id) AS is_owner
    FROM home.membership m
    JOIN home.house h ON h.id = m.house_id
    JOIN home.user u ON u.id = m.user_id
    LEFT JOIN home.profile p ON p.user_id = m.user_id
";

/// Repository for membership database operations.
pub struct MembershipRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MembershipRepository<'a> {
    /// Create a new membership repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active members of a house, oldest first. Removed members are excluded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_active(&self, house_id: HouseId) -> Result<Vec<Member>, RepositoryError> {
        let sql = format!(
            "{MEMBER_SELECT} WHERE m.house_id = $1 AND m.deleted_at IS NULL ORDER BY m.joined_at ASC, m.id ASC"
        );
        let rows = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(house_id)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Member::try_from).collect()
    }

    /// Get an active member of a house.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        house_id: HouseId,
        id: MembershipId,
    ) -> Result<Option<Member>, RepositoryError> {
        let sql = format!("{MEMBER_SELECT} WHERE m.house_id = $1 AND m.id = $2 AND m.deleted_at IS NULL");
        let row = sqlx::query_as::<_, MemberRow>(&sql)
            .bind(house_id)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(Member::try_from).transpose()
    }

    /// Add a user to a house.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user is already an active member.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        house_id: HouseId,
        user_id: UserId,
        role: MemberRole,
    ) -> Result<Member, RepositoryError> {
        let id = sqlx::query_scalar::<_, MembershipId>(
            r"
            INSERT INTO home.membership (house_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING id
            ",
        )
        .bind(house_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "membership"))?;

        self.get(house_id, id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Change the role of an active member.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the membership doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_role(
        &self,
        house_id: HouseId,
        id: MembershipId,
        role: MemberRole,
    ) -> Result<Member, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE home.membership
            SET role = $3
            WHERE house_id = $1 AND id = $2 AND deleted_at IS NULL
            ",
        )
        .bind(house_id)
        .bind(id)
        .bind(role)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(house_id, id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Soft-delete a membership.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the membership doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn remove(&self, house_id: HouseId, id: MembershipId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE home.membership
            SET status = 'removed', deleted_at = NOW()
            WHERE house_id = $1 AND id = $2 AND deleted_at IS NULL
            ",
        )
        .bind(house_id)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Count active members of a house.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_active(&self, house_id: HouseId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*) FROM home.membership
            WHERE house_id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(house_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
