//! House dashboard route handler.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{ActivityRepository, MembershipRepository, ShoppingRepository, StockItemRepository};
use crate::error::Result;
use crate::middleware::HouseContext;
use crate::models::{Activity, House, StockItem};
use crate::services::relative_time::relative_label;
use crate::state::AppState;

/// Number of activities shown on the dashboard.
const RECENT_ACTIVITY_LIMIT: i64 = 5;

/// Headline counts.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_items: i64,
    pub low_stock_items: i64,
    pub active_members: i64,
    pub open_shopping: i64,
}

/// An activity with its relative time label.
#[derive(Debug, Serialize)]
pub struct TimedActivity {
    #[serde(flatten)]
    pub activity: Activity,
    pub time: String,
}

impl TimedActivity {
    pub(crate) fn new(activity: Activity, now: DateTime<Utc>) -> Self {
        let time = relative_label(now, activity.created_at);
        Self { activity, time }
    }
}

/// Dashboard response.
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub house: House,
    pub stats: DashboardStats,
    pub recent_activity: Vec<TimedActivity>,
    pub low_stock: Vec<StockItem>,
}

/// Counts, recent activity and items needing a restock.
///
/// The four counts run as concurrent queries.
///
/// # Errors
///
/// Returns an error if any database query fails.
pub async fn show(
    ctx: HouseContext,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>> {
    let house_id = ctx.house.id;
    let items = StockItemRepository::new(state.pool());
    let members = MembershipRepository::new(state.pool());
    let shopping = ShoppingRepository::new(state.pool());
    let activity = ActivityRepository::new(state.pool());

    let (total_items, low_stock_items, active_members, open_shopping, recent, low_stock) = tokio::join!(
        items.count(house_id),
        items.count_needing_restock(house_id),
        members.count_active(house_id),
        shopping.count_open(house_id),
        activity.recent(house_id, RECENT_ACTIVITY_LIMIT),
        items.list_needing_restock(house_id),
    );

    let now = Utc::now();
    Ok(Json(DashboardResponse {
        house: ctx.house,
        stats: DashboardStats {
            total_items: total_items?,
            low_stock_items: low_stock_items?,
            active_members: active_members?,
            open_shopping: open_shopping?,
        },
        recent_activity: recent?
            .into_iter()
            .map(|a| TimedActivity::new(a, now))
            .collect(),
        low_stock: low_stock?,
    }))
}
