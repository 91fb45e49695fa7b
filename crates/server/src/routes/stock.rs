//! Stock list route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Serialize;

use stock_home_core::{ActivityKind, StockItemId, StockStatus};

use super::record_activity;
use crate::db::StockItemRepository;
use crate::error::{AppError, Result};
use crate::middleware::HouseContext;
use crate::models::{NewActivity, NewStockItem, StockItem, StockItemChanges};
use crate::services::listing::{Filter, StockFilter, StockQuery};
use crate::state::AppState;

/// A stock item with its derived status.
#[derive(Debug, Serialize)]
pub struct StockItemView {
    #[serde(flatten)]
    pub item: StockItem,
    pub status: StockStatus,
    pub status_label: &'static str,
}

impl From<StockItem> for StockItemView {
    fn from(item: StockItem) -> Self {
        let status = item.status();
        Self {
            item,
            status,
            status_label: status.label(),
        }
    }
}

/// Stock list response.
#[derive(Debug, Serialize)]
pub struct StockListResponse {
    pub items: Vec<StockItemView>,
    pub total_count: usize,
}

fn required(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(message.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn non_negative(value: Decimal, message: &str) -> Result<Decimal> {
    if value.is_sign_negative() {
        return Err(AppError::BadRequest(message.to_owned()));
    }
    Ok(value)
}

/// Trimmed note text, or `None` when nothing is left.
fn note(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn validate_new(item: NewStockItem) -> Result<NewStockItem> {
    Ok(NewStockItem {
        name: required(&item.name, "Nama barang wajib diisi")?,
        category: required(&item.category, "Kategori wajib diisi")?,
        quantity: non_negative(item.quantity, "Jumlah tidak boleh negatif")?,
        unit: required(&item.unit, "Satuan wajib diisi")?,
        minimum: non_negative(item.minimum, "Stok minimum tidak boleh negatif")?,
        expires_on: item.expires_on,
        notes: item.notes.as_deref().and_then(note),
    })
}

fn validate_changes(changes: StockItemChanges) -> Result<StockItemChanges> {
    if changes.is_empty() {
        return Err(AppError::BadRequest("Tidak ada perubahan".to_owned()));
    }
    Ok(StockItemChanges {
        name: changes
            .name
            .map(|n| required(&n, "Nama barang wajib diisi"))
            .transpose()?,
        category: changes
            .category
            .map(|c| required(&c, "Kategori wajib diisi"))
            .transpose()?,
        quantity: changes
            .quantity
            .map(|q| non_negative(q, "Jumlah tidak boleh negatif"))
            .transpose()?,
        unit: changes
            .unit
            .map(|u| required(&u, "Satuan wajib diisi"))
            .transpose()?,
        minimum: changes
            .minimum
            .map(|m| non_negative(m, "Stok minimum tidak boleh negatif"))
            .transpose()?,
        expires_on: changes.expires_on,
        notes: changes.notes.map(|n| n.as_deref().and_then(note)),
    })
}

fn amount(item: &StockItem) -> String {
    format!("{} {}", item.quantity.normalize(), item.unit)
}

/// List stock items, filtered by search, category and status.
///
/// # Errors
///
/// Returns `400` for an unknown status, or an error if the query fails.
pub async fn index(
    ctx: HouseContext,
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> Result<Json<StockListResponse>> {
    let filter = StockFilter::from_query(&query)?;

    let all = StockItemRepository::new(state.pool())
        .list(ctx.house.id)
        .await?;
    let total_count = all.len();
    let items = filter.apply(all).into_iter().map(StockItemView::from).collect();

    Ok(Json(StockListResponse { items, total_count }))
}

/// Add a stock item.
///
/// # Errors
///
/// Returns `400` for missing fields or negative amounts.
pub async fn create(
    ctx: HouseContext,
    State(state): State<AppState>,
    Json(body): Json<NewStockItem>,
) -> Result<(StatusCode, Json<StockItemView>)> {
    let new_item = validate_new(body)?;

    let item = StockItemRepository::new(state.pool())
        .create(ctx.house.id, &new_item)
        .await?;

    record_activity(
        &state,
        ctx.house.id,
        NewActivity::by(
            ctx.user.id,
            &ctx.user.display_name,
            ActivityKind::AddItem,
            &item.name,
            format!("Menambahkan {}", amount(&item)),
        ),
    )
    .await;

    Ok((StatusCode::CREATED, Json(item.into())))
}

/// Update a stock item.
///
/// When the update leaves the item low or empty, a system low-stock alert
/// is appended to the activity log as well.
///
/// # Errors
///
/// Returns `404` if the item is not in this house.
pub async fn update(
    ctx: HouseContext,
    State(state): State<AppState>,
    Path((_, id)): Path<(String, StockItemId)>,
    Json(body): Json<StockItemChanges>,
) -> Result<Json<StockItemView>> {
    let changes = validate_changes(body)?;

    let item = StockItemRepository::new(state.pool())
        .update(ctx.house.id, id, &changes)
        .await?;

    record_activity(
        &state,
        ctx.house.id,
        NewActivity::by(
            ctx.user.id,
            &ctx.user.display_name,
            ActivityKind::EditItem,
            &item.name,
            format!("Memperbarui stok menjadi {}", amount(&item)),
        ),
    )
    .await;

    let status = item.status();
    if status.needs_restock() {
        let detail = match status {
            StockStatus::Empty => format!("Stok {} habis", item.name),
            _ => format!("Stok {} tinggal {}", item.name, amount(&item)),
        };
        record_activity(
            &state,
            ctx.house.id,
            NewActivity::system(ActivityKind::LowStockAlert, &item.name, detail),
        )
        .await;
    }

    Ok(Json(item.into()))
}

/// Delete a stock item.
///
/// # Errors
///
/// Returns `404` if the item is not in this house.
pub async fn delete(
    ctx: HouseContext,
    State(state): State<AppState>,
    Path((_, id)): Path<(String, StockItemId)>,
) -> Result<StatusCode> {
    let item = StockItemRepository::new(state.pool())
        .delete(ctx.house.id, id)
        .await?;

    record_activity(
        &state,
        ctx.house.id,
        NewActivity::by(
            ctx.user.id,
            &ctx.user.display_name,
            ActivityKind::DeleteItem,
            &item.name,
            "Menghapus dari stok",
        ),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_item(name: &str, quantity: i64) -> NewStockItem {
        NewStockItem {
            name: name.to_owned(),
            category: " Sembako ".to_owned(),
            quantity: Decimal::from(quantity),
            unit: "kg".to_owned(),
            minimum: Decimal::from(2),
            expires_on: None,
            notes: Some("   ".to_owned()),
        }
    }

    #[test]
    fn test_validate_new_trims_fields() {
        let item = validate_new(new_item("  Beras ", 5)).unwrap();
        assert_eq!(item.name, "Beras");
        assert_eq!(item.category, "Sembako");
        assert_eq!(item.notes, None);
    }

    #[test]
    fn test_validate_new_rejects_blank_name_and_negative_quantity() {
        assert!(validate_new(new_item("  ", 5)).is_err());
        assert!(validate_new(new_item("Beras", -1)).is_err());
    }

    #[test]
    fn test_validate_changes_rejects_empty_update() {
        assert!(validate_changes(StockItemChanges::default()).is_err());
    }

    #[test]
    fn test_validate_changes_blank_note_clears() {
        let changes = StockItemChanges {
            notes: Some(Some("  ".to_owned())),
            ..StockItemChanges::default()
        };
        assert_eq!(validate_changes(changes).unwrap().notes, Some(None));

        let changes = StockItemChanges {
            notes: Some(Some(" Beli di pasar ".to_owned())),
            expires_on: Some(None),
            ..StockItemChanges::default()
        };
        let changes = validate_changes(changes).unwrap();
        assert_eq!(changes.notes, Some(Some("Beli di pasar".to_owned())));
        assert_eq!(changes.expires_on, Some(None));
    }

    #[test]
    fn test_view_carries_derived_status() {
        let view = StockItemView::from(crate::services::listing::tests::stock(
            1, "Gula", "Sembako", 1, 2,
        ));
        assert_eq!(view.status, StockStatus::Low);
        assert_eq!(view.status_label, "Hampir Habis");
    }
}
