//! Per-house notification feed.
//!
//! Notifications are not stored. The feed is derived on every request from
//! the items currently below their minimum and from recent shopping and
//! membership activity, then narrowed by the viewer's notification
//! preferences.

use chrono::{DateTime, Utc};
use serde::Serialize;

use stock_home_core::{ActivityKind, StockStatus};

use super::relative_time::relative_label;
use crate::models::{Activity, NotificationPreferences, StockItem};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Warning,
    Success,
    Info,
}

/// One entry of the notification feed.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub house: String,
    pub at: DateTime<Utc>,
    /// Relative time, e.g. "5 menit lalu".
    pub time: String,
}

fn stock_warning(house: &str, item: &StockItem, now: DateTime<Utc>) -> Option<Notification> {
    let (title, message) = match item.status() {
        StockStatus::Empty => ("Stok Habis", format!("{} sudah habis", item.name)),
        StockStatus::Low => (
            "Stok Hampir Habis",
            format!(
                "{} tinggal sedikit ({} {})",
                item.name,
                item.quantity.normalize(),
                item.unit
            ),
        ),
        StockStatus::Sufficient => return None,
    };

    Some(Notification {
        level: NotificationLevel::Warning,
        title: title.to_owned(),
        message,
        house: house.to_owned(),
        at: item.updated_at,
        time: relative_label(now, item.updated_at),
    })
}

/// Whether `prefs` lets an activity of this kind into the feed.
fn wanted(kind: ActivityKind, prefs: NotificationPreferences) -> bool {
    match kind {
        ActivityKind::CompleteShopping => prefs.shopping_completed,
        ActivityKind::JoinMember => prefs.new_members,
        _ => true,
    }
}

fn activity_event(house: &str, activity: &Activity, now: DateTime<Utc>) -> Option<Notification> {
    let (level, title, message) = match activity.kind {
        ActivityKind::CompleteShopping => (
            NotificationLevel::Success,
            "Pembelian Selesai",
            format!("{} sudah dibeli oleh {}", activity.target, activity.actor_name),
        ),
        ActivityKind::AddShopping => (
            NotificationLevel::Info,
            "Item Ditambahkan",
            format!("{} ditambahkan ke daftar belanja", activity.target),
        ),
        ActivityKind::JoinMember => (
            NotificationLevel::Info,
            "Anggota Baru",
            format!("{} bergabung ke {house}", activity.target),
        ),
        _ => return None,
    };

    Some(Notification {
        level,
        title: title.to_owned(),
        message,
        house: house.to_owned(),
        at: activity.created_at,
        time: relative_label(now, activity.created_at),
    })
}

/// Build the feed for one house.
///
/// Stock warnings come first, then activity events; each group is sorted
/// newest first. Warnings are dropped when `low_stock` is off, purchase
/// confirmations when `shopping_completed` is off and member joins when
/// `new_members` is off.
#[must_use]
pub fn build_feed(
    house: &str,
    items: &[StockItem],
    recent: &[Activity],
    prefs: NotificationPreferences,
    now: DateTime<Utc>,
) -> Vec<Notification> {
    let mut warnings: Vec<Notification> = if prefs.low_stock {
        items
            .iter()
            .filter_map(|item| stock_warning(house, item, now))
            .collect()
    } else {
        Vec::new()
    };

    let mut events: Vec<Notification> = recent
        .iter()
        .filter(|activity| wanted(activity.kind, prefs))
        .filter_map(|activity| activity_event(house, activity, now))
        .collect();

    warnings.sort_by(|a, b| b.at.cmp(&a.at));
    events.sort_by(|a, b| b.at.cmp(&a.at));

    warnings.extend(events);
    warnings
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::listing::tests::{activity, at, stock};

    fn all_on() -> NotificationPreferences {
        NotificationPreferences {
            shopping_completed: true,
            ..NotificationPreferences::default()
        }
    }

    #[test]
    fn test_feed_orders_warnings_first_then_newest() {
        let now = at(2026, 10, 16, 12);
        let mut beras = stock(1, "Beras", "Sembako", 2, 5);
        beras.unit = "kg".to_owned();
        beras.updated_at = at(2026, 10, 16, 11);
        let mut telur = stock(2, "Telur", "Protein", 0, 10);
        telur.updated_at = at(2026, 10, 16, 10);
        let items = vec![telur, beras, stock(3, "Sabun", "Kebersihan", 9, 1)];

        let recent = vec![
            activity(1, "Rani", ActivityKind::AddShopping, "Gula pasir", at(2026, 10, 16, 9)),
            activity(2, "Rani", ActivityKind::CompleteShopping, "Minyak goreng", at(2026, 10, 16, 11)),
            activity(3, "Rani", ActivityKind::EditItem, "Beras", at(2026, 10, 16, 11)),
        ];

        let feed = build_feed("Rumah A", &items, &recent, all_on(), now);
        let titles: Vec<_> = feed.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Stok Hampir Habis", "Stok Habis", "Pembelian Selesai", "Item Ditambahkan"]
        );

        let first = feed.first().unwrap();
        assert_eq!(first.message, "Beras tinggal sedikit (2 kg)");
        assert_eq!(first.time, "1 jam lalu");
        assert_eq!(first.house, "Rumah A");

        let success = feed.get(2).unwrap();
        assert_eq!(success.message, "Minyak goreng sudah dibeli oleh Rani");
        assert_eq!(success.level, NotificationLevel::Success);
    }

    #[test]
    fn test_feed_respects_preferences() {
        let now = at(2026, 10, 16, 12);
        let items = vec![stock(1, "Beras", "Sembako", 0, 5)];
        let recent = vec![
            activity(1, "Rani", ActivityKind::CompleteShopping, "Minyak", now),
            activity(2, "Rani", ActivityKind::AddShopping, "Gula", now),
        ];
        let prefs = NotificationPreferences {
            low_stock: false,
            shopping_completed: false,
            ..NotificationPreferences::default()
        };

        let feed = build_feed("Rumah A", &items, &recent, prefs, now);
        assert_eq!(feed.len(), 1);
        assert_eq!(feed.first().unwrap().level, NotificationLevel::Info);
    }

    #[test]
    fn test_member_joins_follow_new_members_toggle() {
        let now = at(2026, 10, 16, 12);
        let recent = vec![activity(1, "Rani", ActivityKind::JoinMember, "Budi", at(2026, 10, 16, 11))];

        let feed = build_feed("Kos B", &[], &recent, NotificationPreferences::default(), now);
        assert_eq!(feed.len(), 1);
        let joined = feed.first().unwrap();
        assert_eq!(joined.title, "Anggota Baru");
        assert_eq!(joined.message, "Budi bergabung ke Kos B");
        assert_eq!(joined.level, NotificationLevel::Info);

        let muted = NotificationPreferences {
            new_members: false,
            ..NotificationPreferences::default()
        };
        assert!(build_feed("Kos B", &[], &recent, muted, now).is_empty());
    }
}
