//! Activity timeline, report and notification handlers.
//!
//! All three read the activity log of one house.

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::dashboard::TimedActivity;
use super::profile::load_preferences;
use crate::db::{ActivityRepository, MembershipRepository, ShoppingRepository, StockItemRepository};
use crate::error::{AppError, Result};
use crate::middleware::HouseContext;
use crate::services::listing::{Filter, TimelineFilter, TimelineQuery};
use crate::services::notifications::{Notification, build_feed};
use crate::services::reports::{Report, ReportInput, ReportPeriod, build_report};
use crate::state::AppState;

/// Number of recent activities the notification feed looks at.
const NOTIFICATION_WINDOW: i64 = 50;

/// Timeline response.
#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub activities: Vec<TimedActivity>,
    pub total_count: usize,
}

/// Report query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub period: Option<String>,
}

/// Notification feed response.
#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

/// The activity timeline, filtered by search, category and time window.
///
/// Only activities inside the window are loaded; `total_count` is the
/// number loaded before search and category narrow them.
///
/// # Errors
///
/// Returns `400` for an unknown category or window.
pub async fn timeline(
    ctx: HouseContext,
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<TimelineResponse>> {
    let now = Utc::now();
    let filter = TimelineFilter::from_query(&query, now)?.with_offset(state.config().utc_offset);

    let all = ActivityRepository::new(state.pool())
        .list(ctx.house.id, filter.since())
        .await?;
    let total_count = all.len();

    let activities = filter
        .apply(all)
        .into_iter()
        .map(|a| TimedActivity::new(a, now))
        .collect();

    Ok(Json(TimelineResponse {
        activities,
        total_count,
    }))
}

/// Report for a period (`week`, `month`, `quarter` or `year`; default month).
///
/// # Errors
///
/// Returns `400` for an unknown period.
pub async fn reports(
    ctx: HouseContext,
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Report>> {
    let period = query
        .period
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::parse::<ReportPeriod>)
        .transpose()
        .map_err(AppError::BadRequest)?
        .unwrap_or_default();

    let now = Utc::now();
    let house_id = ctx.house.id;
    let items = StockItemRepository::new(state.pool());
    let shopping = ShoppingRepository::new(state.pool());
    let members = MembershipRepository::new(state.pool());
    let activity = ActivityRepository::new(state.pool());

    let (items, entries, active_members, activities) = tokio::join!(
        items.list(house_id),
        shopping.list(house_id),
        members.count_active(house_id),
        activity.list(house_id, Some(period.start(now))),
    );
    let (items, entries, activities) = (items?, entries?, activities?);

    let report = build_report(
        period,
        now,
        ReportInput {
            items: &items,
            shopping: &entries,
            active_members: usize::try_from(active_members?).unwrap_or_default(),
            activities: &activities,
        },
    );

    Ok(Json(report))
}

/// Notification feed for the house, narrowed by the user's preferences.
///
/// # Errors
///
/// Returns an error if a database query fails.
pub async fn notifications(
    ctx: HouseContext,
    State(state): State<AppState>,
) -> Result<Json<NotificationsResponse>> {
    let house_id = ctx.house.id;
    let items = StockItemRepository::new(state.pool());
    let activity = ActivityRepository::new(state.pool());

    let (low, recent, prefs) = tokio::join!(
        items.list_needing_restock(house_id),
        activity.recent(house_id, NOTIFICATION_WINDOW),
        load_preferences(&state, &ctx.user),
    );

    let notifications = build_feed(
        ctx.house.name.as_str(),
        &low?,
        &recent?,
        prefs?,
        Utc::now(),
    );

    Ok(Json(NotificationsResponse { notifications }))
}
