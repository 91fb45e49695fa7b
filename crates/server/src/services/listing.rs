//! Filtering for the list screens.
//!
//! Loaders fetch a bounded set of a house's records and narrow them here; the
//! timeline additionally pushes its window start into the query. Filters are
//! pure: applying one twice gives the same result as applying it once, and
//! the input order is preserved. An absent filter field matches everything.

use chrono::{DateTime, Duration, FixedOffset, Offset, TimeZone, Utc};
use serde::Deserialize;
use thiserror::Error;

use stock_home_core::{ActivityCategory, MemberRole, StockStatus};

use crate::models::{Activity, Member, ShoppingEntry, StockItem};

/// A query parameter that could not be understood.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Status stok tidak dikenal: {0}")]
    Status(String),
    #[error("Peran tidak dikenal: {0}")]
    Role(String),
    #[error("Kategori aktivitas tidak dikenal: {0}")]
    Category(String),
    #[error("Rentang waktu tidak dikenal: {0}")]
    Window(String),
}

/// A predicate over records of type `T`.
pub trait Filter<T> {
    /// Whether `item` passes the filter.
    fn matches(&self, item: &T) -> bool;

    /// Keep the matching items, in their original order.
    fn apply(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}

/// Case-insensitive substring test. `needle` must already be lowercase.
fn contains_lower(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Normalize a free-text search term. Blank terms mean "no search".
fn search_term(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

/// Normalize a select-style parameter. Blank, `all` and `semua` mean "no filter".
fn choice(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| {
        !s.is_empty() && !s.eq_ignore_ascii_case("all") && !s.eq_ignore_ascii_case("semua")
    })
}

// =============================================================================
// Stock
// =============================================================================

/// Query parameters of the stock list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StockQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

/// Stock list filter: search over name or notes, category, derived status.
#[derive(Debug, Clone, Default)]
pub struct StockFilter {
    search: Option<String>,
    category: Option<String>,
    status: Option<StockStatus>,
}

impl StockFilter {
    /// Build the filter from raw query parameters.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::Status` for an unknown status.
    pub fn from_query(query: &StockQuery) -> Result<Self, FilterError> {
        let status = choice(query.status.as_deref())
            .map(|s| s.parse::<StockStatus>().map_err(|_| FilterError::Status(s.to_owned())))
            .transpose()?;

        Ok(Self {
            search: search_term(query.search.as_deref()),
            category: choice(query.category.as_deref()).map(str::to_lowercase),
            status,
        })
    }
}

impl Filter<StockItem> for StockFilter {
    fn matches(&self, item: &StockItem) -> bool {
        let matches_search = self.search.as_deref().is_none_or(|term| {
            contains_lower(&item.name, term)
                || item
                    .notes
                    .as_deref()
                    .is_some_and(|notes| contains_lower(notes, term))
        });
        let matches_category = self
            .category
            .as_deref()
            .is_none_or(|c| item.category.to_lowercase() == c);
        let matches_status = self.status.is_none_or(|s| item.status() == s);

        matches_search && matches_category && matches_status
    }
}

// =============================================================================
// Shopping
// =============================================================================

/// Query parameters of the shopping list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShoppingQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub show_completed: bool,
}

/// Shopping list filter: search over name, category, completed visibility.
#[derive(Debug, Clone, Default)]
pub struct ShoppingFilter {
    search: Option<String>,
    category: Option<String>,
    show_completed: bool,
}

impl ShoppingFilter {
    /// Build the filter from raw query parameters.
    #[must_use]
    pub fn from_query(query: &ShoppingQuery) -> Self {
        Self {
            search: search_term(query.search.as_deref()),
            category: choice(query.category.as_deref()).map(str::to_lowercase),
            show_completed: query.show_completed,
        }
    }
}

impl Filter<ShoppingEntry> for ShoppingFilter {
    fn matches(&self, entry: &ShoppingEntry) -> bool {
        let matches_search = self
            .search
            .as_deref()
            .is_none_or(|term| contains_lower(&entry.name, term));
        let matches_category = self
            .category
            .as_deref()
            .is_none_or(|c| entry.category.to_lowercase() == c);
        let matches_completed = self.show_completed || !entry.completed;

        matches_search && matches_category && matches_completed
    }
}

// =============================================================================
// Members
// =============================================================================

/// Query parameters of the member list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberQuery {
    pub search: Option<String>,
    pub role: Option<String>,
}

/// Member list filter: search over display name or email, role.
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    search: Option<String>,
    role: Option<MemberRole>,
}

impl MemberFilter {
    /// Build the filter from raw query parameters. Roles parse case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::Role` for an unknown role.
    pub fn from_query(query: &MemberQuery) -> Result<Self, FilterError> {
        let role = choice(query.role.as_deref())
            .map(|s| s.parse::<MemberRole>().map_err(|_| FilterError::Role(s.to_owned())))
            .transpose()?;

        Ok(Self {
            search: search_term(query.search.as_deref()),
            role,
        })
    }
}

impl Filter<Member> for MemberFilter {
    fn matches(&self, member: &Member) -> bool {
        let matches_search = self.search.as_deref().is_none_or(|term| {
            contains_lower(&member.display_name, term) || contains_lower(member.email.as_str(), term)
        });
        let matches_role = self.role.is_none_or(|r| member.role == r);

        matches_search && matches_role
    }
}

// =============================================================================
// Timeline
// =============================================================================

/// How far back the timeline reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    All,
    /// Same calendar day as `now` in the household's UTC offset.
    Today,
    /// The last 7 days.
    Week,
    /// The last 30 days.
    Month,
}

impl TimeWindow {
    /// Earliest instant inside the window ending at `now`, or `None` for
    /// [`TimeWindow::All`].
    #[must_use]
    pub fn start(self, now: DateTime<Utc>, offset: FixedOffset) -> Option<DateTime<Utc>> {
        match self {
            Self::All => None,
            Self::Today => {
                let midnight = now.with_timezone(&offset).date_naive().and_hms_opt(0, 0, 0)?;
                offset
                    .from_local_datetime(&midnight)
                    .single()
                    .map(|local| local.with_timezone(&Utc))
            }
            Self::Week => Some(now - Duration::days(7)),
            Self::Month => Some(now - Duration::days(30)),
        }
    }

    /// Whether `at` falls inside the window ending at `now`.
    #[must_use]
    pub fn contains(self, now: DateTime<Utc>, offset: FixedOffset, at: DateTime<Utc>) -> bool {
        match self {
            Self::Today => {
                at.with_timezone(&offset).date_naive() == now.with_timezone(&offset).date_naive()
            }
            _ => self.start(now, offset).is_none_or(|start| at >= start),
        }
    }
}

impl std::str::FromStr for TimeWindow {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "semua" => Ok(Self::All),
            "today" | "hari ini" | "hari-ini" => Ok(Self::Today),
            "week" | "minggu ini" | "minggu-ini" => Ok(Self::Week),
            "month" | "bulan ini" | "bulan-ini" => Ok(Self::Month),
            _ => Err(FilterError::Window(s.to_owned())),
        }
    }
}

/// Query parameters of the timeline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub window: Option<String>,
}

/// Timeline filter: search over actor, target and detail; category; time window.
#[derive(Debug, Clone)]
pub struct TimelineFilter {
    search: Option<String>,
    category: Option<ActivityCategory>,
    window: TimeWindow,
    now: DateTime<Utc>,
    offset: FixedOffset,
}

impl TimelineFilter {
    /// Build the filter from raw query parameters, evaluating windows against `now`.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::Category` or `FilterError::Window` for unknown values.
    pub fn from_query(query: &TimelineQuery, now: DateTime<Utc>) -> Result<Self, FilterError> {
        let category = choice(query.category.as_deref())
            .map(|s| {
                s.parse::<ActivityCategory>()
                    .map_err(|_| FilterError::Category(s.to_owned()))
            })
            .transpose()?;
        let window = choice(query.window.as_deref())
            .map(str::parse::<TimeWindow>)
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            search: search_term(query.search.as_deref()),
            category,
            window,
            now,
            offset: Utc.fix(),
        })
    }

    /// Evaluate `today` in `offset` instead of UTC.
    #[must_use]
    pub fn with_offset(self, offset: FixedOffset) -> Self {
        Self { offset, ..self }
    }

    /// Lower bound for loading activities, so only the window is fetched.
    #[must_use]
    pub fn since(&self) -> Option<DateTime<Utc>> {
        self.window.start(self.now, self.offset)
    }
}

impl Filter<Activity> for TimelineFilter {
    fn matches(&self, activity: &Activity) -> bool {
        let matches_search = self.search.as_deref().is_none_or(|term| {
            contains_lower(&activity.actor_name, term)
                || contains_lower(&activity.target, term)
                || contains_lower(&activity.detail, term)
        });
        let matches_category = self.category.is_none_or(|c| activity.category == c);
        let matches_window = self.window.contains(self.now, self.offset, activity.created_at);

        matches_search && matches_category && matches_window
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use rust_decimal::Decimal;

    use stock_home_core::{
        ActivityId, ActivityKind, Email, HouseId, MembershipId, MembershipStatus,
        ShoppingEntryId, ShoppingPriority, StockItemId, UserId,
    };

    use super::*;

    pub(crate) fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    pub(crate) fn stock(id: i32, name: &str, category: &str, qty: i64, min: i64) -> StockItem {
        StockItem {
            id: StockItemId::new(id),
            house_id: HouseId::new(1),
            name: name.to_owned(),
            category: category.to_owned(),
            quantity: Decimal::from(qty),
            unit: "pcs".to_owned(),
            minimum: Decimal::from(min),
            expires_on: None,
            notes: None,
            created_at: at(2026, 10, 1, 8),
            updated_at: at(2026, 10, 1, 8),
        }
    }

    pub(crate) fn entry(id: i32, name: &str, completed: bool) -> ShoppingEntry {
        ShoppingEntry {
            id: ShoppingEntryId::new(id),
            house_id: HouseId::new(1),
            name: name.to_owned(),
            category: "Sembako".to_owned(),
            quantity: Decimal::ONE,
            unit: "kg".to_owned(),
            priority: ShoppingPriority::Medium,
            added_by: Some(UserId::new(1)),
            added_by_name: Some("Rani".to_owned()),
            completed,
            completed_at: completed.then(|| at(2026, 10, 2, 9)),
            notes: None,
            created_at: at(2026, 10, 1, 9),
        }
    }

    pub(crate) fn member(id: i32, name: &str, email: &str, role: MemberRole) -> Member {
        Member {
            id: MembershipId::new(id),
            house_id: HouseId::new(1),
            user_id: UserId::new(id),
            display_name: name.to_owned(),
            email: Email::parse(email).unwrap(),
            phone: None,
            role,
            status: MembershipStatus::Active,
            joined_at: at(2026, 1, 1, 0),
            is_owner: id == 1,
        }
    }

    pub(crate) fn activity(
        id: i32,
        actor: &str,
        kind: ActivityKind,
        target: &str,
        created_at: DateTime<Utc>,
    ) -> Activity {
        Activity {
            id: ActivityId::new(id),
            house_id: HouseId::new(1),
            actor_id: Some(UserId::new(1)),
            actor_name: actor.to_owned(),
            kind,
            category: kind.category(),
            target: target.to_owned(),
            detail: String::new(),
            created_at,
        }
    }

    fn ids<T, F: Fn(&T) -> i32>(items: &[T], f: F) -> Vec<i32> {
        items.iter().map(f).collect()
    }

    #[test]
    fn test_stock_search_covers_name_and_notes() {
        let mut beras = stock(1, "Beras", "Sembako", 10, 2);
        beras.notes = Some("Merk Rojolele".to_owned());
        let items = vec![beras, stock(2, "Sabun", "Kebersihan", 3, 1)];

        let by_name = StockFilter::from_query(&StockQuery {
            search: Some("BER".to_owned()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ids(&by_name.apply(items.clone()), |i| i.id.as_i32()), vec![1]);

        let by_notes = StockFilter::from_query(&StockQuery {
            search: Some("rojo".to_owned()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ids(&by_notes.apply(items), |i| i.id.as_i32()), vec![1]);
    }

    #[test]
    fn test_stock_status_uses_derived_status() {
        let items = vec![
            stock(1, "Beras", "Sembako", 10, 2),
            stock(2, "Gula", "Sembako", 1, 2),
            stock(3, "Minyak", "Sembako", 0, 2),
        ];
        let filter = StockFilter::from_query(&StockQuery {
            status: Some("Hampir Habis".to_owned()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ids(&filter.apply(items), |i| i.id.as_i32()), vec![2]);
    }

    #[test]
    fn test_stock_category_and_all_sentinel() {
        let items = vec![
            stock(1, "Beras", "Sembako", 10, 2),
            stock(2, "Teh", "Minuman", 5, 1),
        ];
        let filter = StockFilter::from_query(&StockQuery {
            category: Some("minuman".to_owned()),
            status: Some("Semua".to_owned()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ids(&filter.apply(items), |i| i.id.as_i32()), vec![2]);
    }

    #[test]
    fn test_stock_unknown_status_is_rejected() {
        let err = StockFilter::from_query(&StockQuery {
            status: Some("penuh".to_owned()),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, FilterError::Status("penuh".to_owned()));
    }

    #[test]
    fn test_empty_filter_matches_everything_in_order() {
        let items = vec![
            stock(3, "C", "Sembako", 1, 0),
            stock(1, "A", "Sembako", 1, 0),
            stock(2, "B", "Sembako", 1, 0),
        ];
        let filter = StockFilter::from_query(&StockQuery::default()).unwrap();
        assert_eq!(ids(&filter.apply(items), |i| i.id.as_i32()), vec![3, 1, 2]);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let items = vec![
            stock(1, "Beras", "Sembako", 10, 2),
            stock(2, "Beras Merah", "Sembako", 1, 2),
            stock(3, "Sabun", "Kebersihan", 0, 1),
        ];
        let filter = StockFilter::from_query(&StockQuery {
            search: Some("beras".to_owned()),
            ..Default::default()
        })
        .unwrap();
        let once = filter.apply(items);
        let twice = filter.apply(once.clone());
        assert_eq!(
            ids(&once, |i| i.id.as_i32()),
            ids(&twice, |i| i.id.as_i32())
        );
    }

    #[test]
    fn test_shopping_hides_completed_by_default() {
        let entries = vec![entry(1, "Beras", false), entry(2, "Gula", true)];
        let filter = ShoppingFilter::from_query(&ShoppingQuery::default());
        assert_eq!(ids(&filter.apply(entries), |e| e.id.as_i32()), vec![1]);
    }

    #[test]
    fn test_shopping_show_completed() {
        let entries = vec![entry(1, "Beras", false), entry(2, "Gula", true)];
        let filter = ShoppingFilter::from_query(&ShoppingQuery {
            show_completed: true,
            ..Default::default()
        });
        assert_eq!(ids(&filter.apply(entries), |e| e.id.as_i32()), vec![1, 2]);
    }

    #[test]
    fn test_shopping_search_by_name() {
        let entries = vec![entry(1, "Beras", false), entry(2, "Gula Pasir", false)];
        let filter = ShoppingFilter::from_query(&ShoppingQuery {
            search: Some("pasir".to_owned()),
            ..Default::default()
        });
        assert_eq!(ids(&filter.apply(entries), |e| e.id.as_i32()), vec![2]);
    }

    #[test]
    fn test_member_role_is_case_insensitive() {
        let members = vec![
            member(1, "Rani", "rani@email.com", MemberRole::Admin),
            member(2, "Andi", "andi@email.com", MemberRole::Member),
        ];
        let filter = MemberFilter::from_query(&MemberQuery {
            role: Some("Admin".to_owned()),
            ..Default::default()
        })
        .unwrap();
        let names: Vec<_> = filter
            .apply(members)
            .into_iter()
            .map(|m| m.display_name)
            .collect();
        assert_eq!(names, vec!["Rani"]);
    }

    #[test]
    fn test_member_search_covers_email() {
        let members = vec![
            member(1, "Rani", "rani@email.com", MemberRole::Admin),
            member(2, "Andi", "andi.p@kos.id", MemberRole::Member),
        ];
        let filter = MemberFilter::from_query(&MemberQuery {
            search: Some("kos.id".to_owned()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(ids(&filter.apply(members), |m| m.id.as_i32()), vec![2]);
    }

    #[test]
    fn test_member_unknown_role() {
        assert!(MemberFilter::from_query(&MemberQuery {
            role: Some("owner".to_owned()),
            ..Default::default()
        })
        .is_err());
    }

    #[test]
    fn test_timeline_windows() {
        let now = at(2026, 10, 16, 12);
        let acts = vec![
            activity(1, "Rani", ActivityKind::AddItem, "Beras", at(2026, 10, 16, 1)),
            activity(2, "Andi", ActivityKind::AddShopping, "Gula", at(2026, 10, 12, 9)),
            activity(3, "Sari", ActivityKind::JoinMember, "Sari", at(2026, 9, 25, 9)),
            activity(4, "Budi", ActivityKind::EditItem, "Teh", at(2026, 7, 1, 9)),
        ];

        let window = |w: &str| {
            TimelineFilter::from_query(
                &TimelineQuery {
                    window: Some(w.to_owned()),
                    ..Default::default()
                },
                now,
            )
            .unwrap()
        };

        assert_eq!(ids(&window("today").apply(acts.clone()), |a| a.id.as_i32()), vec![1]);
        assert_eq!(ids(&window("week").apply(acts.clone()), |a| a.id.as_i32()), vec![1, 2]);
        assert_eq!(ids(&window("month").apply(acts.clone()), |a| a.id.as_i32()), vec![1, 2, 3]);
        assert_eq!(ids(&window("all").apply(acts), |a| a.id.as_i32()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_timeline_category_and_search() {
        let now = at(2026, 10, 16, 12);
        let acts = vec![
            activity(1, "Rani", ActivityKind::AddItem, "Beras", now),
            activity(2, "Andi", ActivityKind::AddShopping, "Beras", now),
            activity(3, "Sari", ActivityKind::CompleteShopping, "Gula", now),
        ];
        let filter = TimelineFilter::from_query(
            &TimelineQuery {
                search: Some("beras".to_owned()),
                category: Some("belanja".to_owned()),
                window: None,
            },
            now,
        )
        .unwrap();
        assert_eq!(ids(&filter.apply(acts), |a| a.id.as_i32()), vec![2]);
    }

    #[test]
    fn test_timeline_unknown_window() {
        let err = TimelineFilter::from_query(
            &TimelineQuery {
                window: Some("decade".to_owned()),
                ..Default::default()
            },
            at(2026, 10, 16, 12),
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::Window(_)));
    }

    #[test]
    fn test_today_follows_household_offset() {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        // 16 Oct 23:30 UTC is already 17 Oct 06:30 in UTC+7.
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 23, 30, 0).unwrap();
        let acts = vec![
            activity(1, "Rani", ActivityKind::AddItem, "Beras", at(2026, 10, 16, 18)),
            activity(2, "Andi", ActivityKind::AddItem, "Gula", at(2026, 10, 16, 16)),
        ];
        let query = TimelineQuery {
            window: Some("today".to_owned()),
            ..Default::default()
        };

        let utc = TimelineFilter::from_query(&query, now).unwrap();
        assert_eq!(ids(&utc.apply(acts.clone()), |a| a.id.as_i32()), vec![1, 2]);

        let local = TimelineFilter::from_query(&query, now).unwrap().with_offset(wib);
        assert_eq!(ids(&local.apply(acts), |a| a.id.as_i32()), vec![1]);
        assert_eq!(local.since(), Some(at(2026, 10, 16, 17)));
    }

    #[test]
    fn test_window_start_bounds_the_query() {
        let now = at(2026, 10, 16, 12);
        let utc = Utc.fix();
        assert_eq!(TimeWindow::All.start(now, utc), None);
        assert_eq!(TimeWindow::Today.start(now, utc), Some(at(2026, 10, 16, 0)));
        assert_eq!(TimeWindow::Week.start(now, utc), Some(at(2026, 10, 9, 12)));
        assert_eq!(TimeWindow::Month.start(now, utc), Some(at(2026, 9, 16, 12)));
    }
}
