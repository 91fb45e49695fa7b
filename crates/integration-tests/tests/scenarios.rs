//! Scenario tests over the listing, report and notification services.
//!
//! These run without a server or database.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use stock_home_core::{
    ActivityId, ActivityKind, Email, HouseId, MemberRole, MembershipId, MembershipStatus,
    StockItemId, StockStatus, UserId,
};
use stock_home_server::models::{Activity, Member, NotificationPreferences, StockItem};
use stock_home_server::services::listing::{
    Filter, MemberFilter, MemberQuery, StockFilter, StockQuery, TimelineFilter, TimelineQuery,
};
use stock_home_server::services::notifications::build_feed;
use stock_home_server::services::reports::{ReportInput, ReportPeriod, build_report, percentages};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
}

fn member(id: i32, name: &str, role: MemberRole) -> Member {
    Member {
        id: MembershipId::new(id),
        house_id: HouseId::new(1),
        user_id: UserId::new(id),
        display_name: name.to_owned(),
        email: Email::parse(&format!("{}@email.com", name.to_lowercase())).unwrap(),
        phone: None,
        role,
        status: MembershipStatus::Active,
        joined_at: now(),
        is_owner: id == 1,
    }
}

fn item(id: i32, name: &str, category: &str, quantity: i64, minimum: i64) -> StockItem {
    StockItem {
        id: StockItemId::new(id),
        house_id: HouseId::new(1),
        name: name.to_owned(),
        category: category.to_owned(),
        quantity: Decimal::from(quantity),
        unit: "kg".to_owned(),
        minimum: Decimal::from(minimum),
        expires_on: None,
        notes: None,
        created_at: now() - Duration::days(3),
        updated_at: now() - Duration::days(1),
    }
}

fn activity(id: i32, actor: &str, kind: ActivityKind, target: &str, at: DateTime<Utc>) -> Activity {
    Activity {
        id: ActivityId::new(id),
        house_id: HouseId::new(1),
        actor_id: Some(UserId::new(id)),
        actor_name: actor.to_owned(),
        kind,
        category: kind.category(),
        target: target.to_owned(),
        detail: String::new(),
        created_at: at,
    }
}

#[test]
fn test_admin_role_filter_keeps_only_admins() {
    let members = vec![
        member(1, "Rani", MemberRole::Admin),
        member(2, "Andi", MemberRole::Member),
    ];
    let filter = MemberFilter::from_query(&MemberQuery {
        search: None,
        role: Some("Admin".to_owned()),
    })
    .unwrap();

    let visible: Vec<String> = filter
        .apply(members)
        .into_iter()
        .map(|m| m.display_name)
        .collect();
    assert_eq!(visible, ["Rani"]);
}

#[test]
fn test_stock_filters_combine() {
    let items = vec![
        item(1, "Beras", "Makanan Pokok", 2, 5),
        item(2, "Beras Merah", "Makanan Pokok", 10, 2),
        item(3, "Sabun", "Kebersihan", 0, 1),
    ];
    assert_eq!(items[0].status(), StockStatus::Low);
    assert_eq!(items[2].status(), StockStatus::Empty);

    let filter = StockFilter::from_query(&StockQuery {
        search: Some("beras".to_owned()),
        category: Some("Makanan Pokok".to_owned()),
        status: Some("cukup".to_owned()),
    })
    .unwrap();
    let names: Vec<String> = filter.apply(items).into_iter().map(|i| i.name).collect();
    assert_eq!(names, ["Beras Merah"]);
}

#[test]
fn test_timeline_today_window() {
    let activities = vec![
        activity(1, "Rani", ActivityKind::AddItem, "Beras", now() - Duration::hours(2)),
        activity(2, "Andi", ActivityKind::AddShopping, "Gula", now() - Duration::days(2)),
    ];
    let filter = TimelineFilter::from_query(
        &TimelineQuery {
            search: None,
            category: None,
            window: Some("today".to_owned()),
        },
        now(),
    )
    .unwrap();

    let kept = filter.apply(activities);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept[0].target, "Beras");
}

#[test]
fn test_report_percentages_sum_to_one_hundred() {
    let shares = percentages(&[1, 1, 1]);
    assert_eq!(shares.iter().sum::<u32>(), 100);

    let items = vec![
        item(1, "Beras", "Makanan Pokok", 2, 5),
        item(2, "Minyak", "Makanan Pokok", 3, 1),
        item(3, "Sabun", "Kebersihan", 1, 1),
    ];
    let activities = vec![
        activity(1, "Rani", ActivityKind::EditItem, "Beras", now() - Duration::days(1)),
        activity(2, "Rani", ActivityKind::EditItem, "Beras", now() - Duration::days(2)),
        activity(3, "Andi", ActivityKind::AddItem, "Sabun", now() - Duration::days(3)),
    ];

    let report = build_report(
        ReportPeriod::Month,
        now(),
        ReportInput {
            items: &items,
            shopping: &[],
            active_members: 2,
            activities: &activities,
        },
    );

    assert_eq!(report.summary.total_items, 3);
    assert_eq!(
        report.categories.iter().map(|c| c.percentage).sum::<u32>(),
        100
    );
    assert_eq!(
        report.contributors.iter().map(|c| c.percentage).sum::<u32>(),
        100
    );
    assert_eq!(report.top_items[0].name, "Beras");
    assert_eq!(report.top_items[0].category.as_deref(), Some("Makanan Pokok"));
}

#[test]
fn test_feed_puts_warnings_before_shopping_events() {
    let mut telur = item(2, "Telur", "Protein", 0, 10);
    telur.updated_at = now() - Duration::hours(1);
    let low = vec![item(1, "Beras", "Makanan Pokok", 2, 5), telur];
    let recent = vec![activity(
        3,
        "Andi",
        ActivityKind::AddShopping,
        "Sabun",
        now() - Duration::minutes(5),
    )];

    let feed = build_feed("Rumah A", &low, &recent, NotificationPreferences::default(), now());

    assert_eq!(feed[0].title, "Stok Habis");
    assert!(feed.iter().any(|n| n.title == "Stok Hampir Habis"));
    assert_eq!(feed.last().unwrap().title, "Item Ditambahkan");
}
