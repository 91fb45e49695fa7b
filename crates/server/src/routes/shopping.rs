//! Shopping list route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use stock_home_core::{ActivityKind, ShoppingEntryId};

use super::record_activity;
use crate::db::{RepositoryError, ShoppingRepository};
use crate::error::{AppError, Result};
use crate::middleware::HouseContext;
use crate::models::{NewActivity, NewShoppingEntry, ShoppingEntry, StockItem};
use crate::services::listing::{Filter, ShoppingFilter, ShoppingQuery};
use crate::state::AppState;

/// Shopping list response.
///
/// The counts cover every live entry, regardless of the filter.
#[derive(Debug, Serialize)]
pub struct ShoppingListResponse {
    pub entries: Vec<ShoppingEntry>,
    pub completed_count: usize,
    pub total_count: usize,
}

/// Completion request body.
#[derive(Debug, Default, Deserialize)]
pub struct CompleteRequest {
    /// Add the bought quantity to the matching stock item.
    #[serde(default)]
    pub restock: bool,
}

/// Completion response.
#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub entry: ShoppingEntry,
    pub restocked: Option<StockItem>,
}

fn validate_new(entry: NewShoppingEntry) -> Result<NewShoppingEntry> {
    let name = entry.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("Nama barang wajib diisi".to_owned()));
    }
    let category = entry.category.trim();
    if category.is_empty() {
        return Err(AppError::BadRequest("Kategori wajib diisi".to_owned()));
    }
    if entry.quantity <= rust_decimal::Decimal::ZERO {
        return Err(AppError::BadRequest("Jumlah harus lebih dari 0".to_owned()));
    }

    Ok(NewShoppingEntry {
        name: name.to_owned(),
        category: category.to_owned(),
        quantity: entry.quantity,
        unit: entry.unit.trim().to_owned(),
        priority: entry.priority,
        notes: entry.notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty()),
    })
}

/// Build the list response: counts over all entries, then the filter.
fn listing(all: Vec<ShoppingEntry>, filter: &ShoppingFilter) -> ShoppingListResponse {
    let total_count = all.len();
    let completed_count = all.iter().filter(|e| e.completed).count();

    ShoppingListResponse {
        entries: filter.apply(all),
        completed_count,
        total_count,
    }
}

/// List the shopping list. Completed entries are hidden unless asked for.
///
/// # Errors
///
/// Returns an error if the query fails.
pub async fn index(
    ctx: HouseContext,
    State(state): State<AppState>,
    Query(query): Query<ShoppingQuery>,
) -> Result<Json<ShoppingListResponse>> {
    let filter = ShoppingFilter::from_query(&query);
    let all = ShoppingRepository::new(state.pool())
        .list(ctx.house.id)
        .await?;

    Ok(Json(listing(all, &filter)))
}

/// Add an entry to the shopping list.
///
/// # Errors
///
/// Returns `400` for missing fields or a non-positive quantity.
pub async fn create(
    ctx: HouseContext,
    State(state): State<AppState>,
    Json(body): Json<NewShoppingEntry>,
) -> Result<(StatusCode, Json<ShoppingEntry>)> {
    let new_entry = validate_new(body)?;

    let entry = ShoppingRepository::new(state.pool())
        .create(ctx.house.id, ctx.user.id, &new_entry)
        .await?;

    record_activity(
        &state,
        ctx.house.id,
        NewActivity::by(
            ctx.user.id,
            &ctx.user.display_name,
            ActivityKind::AddShopping,
            &entry.name,
            format!(
                "Menambahkan {} {} ke daftar belanja",
                entry.quantity.normalize(),
                entry.unit
            ),
        ),
    )
    .await;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Mark an entry as bought, optionally restocking the matching item.
///
/// # Errors
///
/// Returns `404` if the entry is not on this list and `409` if it was
/// already completed.
pub async fn complete(
    ctx: HouseContext,
    State(state): State<AppState>,
    Path((_, id)): Path<(String, ShoppingEntryId)>,
    body: Option<Json<CompleteRequest>>,
) -> Result<Json<CompleteResponse>> {
    let Json(request) = body.unwrap_or_default();

    let completion = ShoppingRepository::new(state.pool())
        .complete(ctx.house.id, id, request.restock)
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::Conflict("Barang ini sudah ditandai dibeli".to_owned())
            }
            other => other.into(),
        })?;

    let detail = match &completion.restocked {
        Some(item) => format!(
            "Dibeli, stok bertambah menjadi {} {}",
            item.quantity.normalize(),
            item.unit
        ),
        None => "Dibeli".to_owned(),
    };
    record_activity(
        &state,
        ctx.house.id,
        NewActivity::by(
            ctx.user.id,
            &ctx.user.display_name,
            ActivityKind::CompleteShopping,
            &completion.entry.name,
            detail,
        ),
    )
    .await;

    Ok(Json(CompleteResponse {
        entry: completion.entry,
        restocked: completion.restocked,
    }))
}

/// Remove an entry from the shopping list (soft delete).
///
/// # Errors
///
/// Returns `404` if the entry is not on this list.
pub async fn delete(
    ctx: HouseContext,
    State(state): State<AppState>,
    Path((_, id)): Path<(String, ShoppingEntryId)>,
) -> Result<StatusCode> {
    let name = ShoppingRepository::new(state.pool())
        .soft_delete(ctx.house.id, id)
        .await?;

    tracing::info!(house_id = %ctx.house.id, entry = %name, "shopping entry removed");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::listing::tests::entry;

    #[test]
    fn test_listing_hides_completed_but_counts_them() {
        let all = vec![entry(1, "Beras", false), entry(2, "Gula", true)];
        let response = listing(all, &ShoppingFilter::from_query(&ShoppingQuery::default()));

        let ids: Vec<_> = response.entries.iter().map(|e| e.id.as_i32()).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(response.completed_count, 1);
        assert_eq!(response.total_count, 2);
    }

    #[test]
    fn test_validate_new_rejects_zero_quantity() {
        let entry = NewShoppingEntry {
            name: "Telur".to_owned(),
            category: "Protein".to_owned(),
            quantity: rust_decimal::Decimal::ZERO,
            unit: "butir".to_owned(),
            priority: stock_home_core::ShoppingPriority::High,
            notes: None,
        };
        assert!(validate_new(entry).is_err());
    }
}
