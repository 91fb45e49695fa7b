//! House member route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use stock_home_core::{ActivityKind, Email, MemberRole, MembershipId};

use super::record_activity;
use crate::db::{MembershipRepository, RepositoryError, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::HouseContext;
use crate::models::{Member, NewActivity};
use crate::services::listing::{Filter, MemberFilter, MemberQuery};
use crate::state::AppState;

/// Member list response.
#[derive(Debug, Serialize)]
pub struct MemberListResponse {
    pub members: Vec<Member>,
    pub total_count: usize,
}

/// Invitation request body.
#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: String,
    #[serde(default = "default_role")]
    pub role: MemberRole,
}

const fn default_role() -> MemberRole {
    MemberRole::Member
}

/// Role change request body.
#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: MemberRole,
}

async fn find_member(state: &AppState, ctx: &HouseContext, id: MembershipId) -> Result<Member> {
    MembershipRepository::new(state.pool())
        .get(ctx.house.id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Anggota tidak ditemukan".to_owned()))
}

/// List active members, filtered by search and role.
///
/// # Errors
///
/// Returns `400` for an unknown role, or an error if the query fails.
pub async fn index(
    ctx: HouseContext,
    State(state): State<AppState>,
    Query(query): Query<MemberQuery>,
) -> Result<Json<MemberListResponse>> {
    let filter = MemberFilter::from_query(&query)?;

    let all = MembershipRepository::new(state.pool())
        .list_active(ctx.house.id)
        .await?;
    let total_count = all.len();

    Ok(Json(MemberListResponse {
        members: filter.apply(all),
        total_count,
    }))
}

/// Add an existing user to the house by email.
///
/// # Errors
///
/// Returns `404` if no account uses the email and `409` if the user is
/// already a member.
pub async fn invite(
    ctx: HouseContext,
    State(state): State<AppState>,
    Json(body): Json<InviteRequest>,
) -> Result<(StatusCode, Json<Member>)> {
    let email = Email::parse(&body.email)
        .map_err(|_| AppError::BadRequest("Email tidak valid".to_owned()))?;

    let user = UserRepository::new(state.pool())
        .get_by_email(&email)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("Pengguna dengan email tersebut belum terdaftar".to_owned())
        })?;

    let member = MembershipRepository::new(state.pool())
        .add(ctx.house.id, user.id, body.role)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::Conflict("Pengguna sudah menjadi anggota rumah ini".to_owned())
            }
            other => other.into(),
        })?;

    record_activity(
        &state,
        ctx.house.id,
        NewActivity::by(
            ctx.user.id,
            &ctx.user.display_name,
            ActivityKind::JoinMember,
            &member.display_name,
            format!("Bergabung sebagai {}", member.role.label()),
        ),
    )
    .await;

    Ok((StatusCode::CREATED, Json(member)))
}

/// Change a member's role. The owner always stays admin.
///
/// # Errors
///
/// Returns `404` for an unknown member and `403` when demoting the owner.
pub async fn update_role(
    ctx: HouseContext,
    State(state): State<AppState>,
    Path((_, id)): Path<(String, MembershipId)>,
    Json(body): Json<RoleRequest>,
) -> Result<Json<Member>> {
    let member = find_member(&state, &ctx, id).await?;
    if member.is_owner && body.role != MemberRole::Admin {
        return Err(AppError::Forbidden(
            "Pemilik rumah tidak dapat diturunkan perannya".to_owned(),
        ));
    }
    if member.role == body.role {
        return Ok(Json(member));
    }

    let updated = MembershipRepository::new(state.pool())
        .update_role(ctx.house.id, id, body.role)
        .await?;

    record_activity(
        &state,
        ctx.house.id,
        NewActivity::by(
            ctx.user.id,
            &ctx.user.display_name,
            ActivityKind::ChangeRole,
            &updated.display_name,
            format!(
                "Peran diubah dari {} menjadi {}",
                member.role.label(),
                updated.role.label()
            ),
        ),
    )
    .await;

    Ok(Json(updated))
}

/// Remove a member from the house. The owner cannot be removed.
///
/// # Errors
///
/// Returns `404` for an unknown member and `403` for the owner.
pub async fn remove(
    ctx: HouseContext,
    State(state): State<AppState>,
    Path((_, id)): Path<(String, MembershipId)>,
) -> Result<StatusCode> {
    let member = find_member(&state, &ctx, id).await?;
    if member.is_owner {
        return Err(AppError::Forbidden(
            "Pemilik rumah tidak dapat dihapus".to_owned(),
        ));
    }

    MembershipRepository::new(state.pool())
        .remove(ctx.house.id, id)
        .await?;

    record_activity(
        &state,
        ctx.house.id,
        NewActivity::by(
            ctx.user.id,
            &ctx.user.display_name,
            ActivityKind::RemoveMember,
            &member.display_name,
            "Dikeluarkan dari rumah",
        ),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
