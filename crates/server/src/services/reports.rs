//! Household reports.
//!
//! Everything here is computed in memory from rows the route handler has
//! already loaded, so the report logic is testable without a database.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::{Activity, NewActivity, ShoppingEntry, StockItem};

/// Number of entries in the "most active items" ranking.
const TOP_ITEMS: usize = 5;

/// Reporting period, counted back from now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl ReportPeriod {
    /// Length of the period in days.
    #[must_use]
    pub const fn days(self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::Year => 365,
        }
    }

    /// First instant covered by the period ending at `now`.
    #[must_use]
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.days())
    }
}

impl std::str::FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "minggu-ini" => Ok(Self::Week),
            "month" | "bulan-ini" => Ok(Self::Month),
            "quarter" | "3-bulan" => Ok(Self::Quarter),
            "year" | "tahun-ini" => Ok(Self::Year),
            _ => Err(format!("Periode laporan tidak dikenal: {s}")),
        }
    }
}

/// Whole percentages of `counts` using largest-remainder rounding.
///
/// A set with a non-zero total always sums to exactly 100. An all-zero (or
/// empty) set yields zeros. Ties on the remainder go to the earlier index.
#[must_use]
pub fn percentages(counts: &[u64]) -> Vec<u32> {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return vec![0; counts.len()];
    }

    let total = u128::from(total);
    let mut shares: Vec<u32> = Vec::with_capacity(counts.len());
    let mut remainders: Vec<(usize, u128)> = Vec::with_capacity(counts.len());

    for (i, &count) in counts.iter().enumerate() {
        let scaled = u128::from(count) * 100;
        // scaled / total <= 100, so the conversion cannot fail
        shares.push(u32::try_from(scaled / total).unwrap_or(100));
        remainders.push((i, scaled % total));
    }

    let assigned: u32 = shares.iter().sum();
    let missing = 100_u32.saturating_sub(assigned) as usize;

    // Stable sort keeps the earlier index first on equal remainders
    remainders.sort_by(|a, b| b.1.cmp(&a.1));
    for &(i, _) in remainders.iter().take(missing) {
        if let Some(share) = shares.get_mut(i) {
            *share += 1;
        }
    }

    shares
}

/// Headline numbers for the period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total_items: usize,
    pub items_updated: usize,
    pub shopping_added: usize,
    pub shopping_completed: usize,
    pub active_members: usize,
    pub activity_count: usize,
}

/// A labelled count with its share of the whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Share {
    pub name: String,
    pub count: u64,
    pub percentage: u32,
}

/// A stock item ranked by how often it was touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopItem {
    pub name: String,
    pub category: Option<String>,
    pub activity_count: u64,
}

/// Full report for one house and period.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub period: ReportPeriod,
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub summary: ReportSummary,
    pub categories: Vec<Share>,
    pub contributors: Vec<Share>,
    pub top_items: Vec<TopItem>,
}

/// Everything a report is computed from.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub items: &'a [StockItem],
    pub shopping: &'a [ShoppingEntry],
    pub active_members: usize,
    pub activities: &'a [Activity],
}

/// Count occurrences of each key, preserving the order of first appearance.
fn tally<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, u64)> {
    let mut order: Vec<(String, u64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for key in keys {
        if let Some(&i) = index.get(key) {
            if let Some(entry) = order.get_mut(i) {
                entry.1 += 1;
            }
        } else {
            index.insert(key.to_owned(), order.len());
            order.push((key.to_owned(), 1));
        }
    }

    order
}

/// Sort by count descending (name ascending on ties) and attach percentages.
fn into_shares(mut tallied: Vec<(String, u64)>) -> Vec<Share> {
    tallied.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let counts: Vec<u64> = tallied.iter().map(|(_, c)| *c).collect();

    tallied
        .into_iter()
        .zip(percentages(&counts))
        .map(|((name, count), percentage)| Share {
            name,
            count,
            percentage,
        })
        .collect()
}

/// Build the report for `period` ending at `now`.
#[must_use]
pub fn build_report(period: ReportPeriod, now: DateTime<Utc>, input: ReportInput<'_>) -> Report {
    let from = period.start(now);
    let in_period = |at: DateTime<Utc>| at >= from && at <= now;

    let activities: Vec<&Activity> = input
        .activities
        .iter()
        .filter(|a| in_period(a.created_at))
        .collect();

    let summary = ReportSummary {
        total_items: input.items.len(),
        items_updated: input
            .items
            .iter()
            .filter(|i| in_period(i.updated_at))
            .count(),
        shopping_added: input
            .shopping
            .iter()
            .filter(|e| in_period(e.created_at))
            .count(),
        shopping_completed: input
            .shopping
            .iter()
            .filter(|e| e.completed_at.is_some_and(in_period))
            .count(),
        active_members: input.active_members,
        activity_count: activities.len(),
    };

    let categories = into_shares(tally(input.items.iter().map(|i| i.category.as_str())));

    let contributors = into_shares(tally(
        activities
            .iter()
            .filter(|a| a.actor_id.is_some() && a.actor_name != NewActivity::SYSTEM_ACTOR)
            .map(|a| a.actor_name.as_str()),
    ));

    let mut touched = tally(
        activities
            .iter()
            .filter(|a| a.kind.touches_stock())
            .map(|a| a.target.as_str()),
    );
    touched.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let top_items = touched
        .into_iter()
        .take(TOP_ITEMS)
        .map(|(name, activity_count)| {
            let category = input
                .items
                .iter()
                .find(|i| i.name.eq_ignore_ascii_case(&name))
                .map(|i| i.category.clone());
            TopItem {
                name,
                category,
                activity_count,
            }
        })
        .collect();

    Report {
        period,
        from,
        to: now,
        summary,
        categories,
        contributors,
        top_items,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use stock_home_core::ActivityKind;

    use super::*;
    use crate::services::listing::tests::{activity, at, entry, stock};

    #[test]
    fn test_percentages_sum_to_100() {
        for counts in [
            vec![8_u64, 6, 5, 4],
            vec![1, 1, 1],
            vec![18, 12, 10, 7],
            vec![1, 2, 3, 4, 5, 6, 7],
            vec![999, 1],
            vec![5],
        ] {
            let shares = percentages(&counts);
            assert_eq!(shares.iter().sum::<u32>(), 100, "counts {counts:?}");
        }
    }

    #[test]
    fn test_percentages_largest_remainder() {
        // 35, 26, 22, 17 with remainders favouring the first two
        assert_eq!(percentages(&[8, 6, 5, 4]), vec![35, 26, 22, 17]);
        // Equal remainders: earlier index wins
        assert_eq!(percentages(&[1, 1, 1]), vec![34, 33, 33]);
    }

    #[test]
    fn test_percentages_all_zero_and_empty() {
        assert_eq!(percentages(&[0, 0, 0]), vec![0, 0, 0]);
        assert!(percentages(&[]).is_empty());
    }

    #[test]
    fn test_percentages_zero_entries_stay_zero() {
        assert_eq!(percentages(&[0, 3, 0, 1]), vec![0, 75, 0, 25]);
    }

    #[test]
    fn test_period_parse_accepts_both_spellings() {
        assert_eq!("bulan-ini".parse::<ReportPeriod>().unwrap(), ReportPeriod::Month);
        assert_eq!("3-bulan".parse::<ReportPeriod>().unwrap(), ReportPeriod::Quarter);
        assert_eq!("Year".parse::<ReportPeriod>().unwrap(), ReportPeriod::Year);
        assert_eq!("minggu-ini".parse::<ReportPeriod>().unwrap(), ReportPeriod::Week);
        assert!("decade".parse::<ReportPeriod>().is_err());
    }

    #[test]
    fn test_build_report() {
        let now = at(2026, 10, 16, 12);
        let items = vec![
            stock(1, "Beras", "Sembako", 10, 2),
            stock(2, "Gula", "Sembako", 1, 2),
            stock(3, "Sabun", "Kebersihan", 3, 1),
        ];
        let shopping = vec![entry(1, "Minyak", true), entry(2, "Telur", false)];
        let mut system = activity(
            5,
            NewActivity::SYSTEM_ACTOR,
            ActivityKind::LowStockAlert,
            "Gula",
            at(2026, 10, 10, 9),
        );
        system.actor_id = None;
        let activities = vec![
            activity(1, "Rani", ActivityKind::AddItem, "Beras", at(2026, 10, 15, 9)),
            activity(2, "Rani", ActivityKind::EditItem, "Beras", at(2026, 10, 14, 9)),
            activity(3, "Andi", ActivityKind::EditItem, "Gula", at(2026, 10, 13, 9)),
            activity(4, "Andi", ActivityKind::AddShopping, "Telur", at(2026, 10, 12, 9)),
            system,
            activity(6, "Sari", ActivityKind::AddItem, "Teh", at(2026, 1, 1, 9)),
        ];

        let report = build_report(
            ReportPeriod::Month,
            now,
            ReportInput {
                items: &items,
                shopping: &shopping,
                active_members: 4,
                activities: &activities,
            },
        );

        assert_eq!(report.summary.total_items, 3);
        assert_eq!(report.summary.items_updated, 3);
        assert_eq!(report.summary.shopping_added, 2);
        assert_eq!(report.summary.shopping_completed, 1);
        assert_eq!(report.summary.active_members, 4);
        assert_eq!(report.summary.activity_count, 5);

        let categories: Vec<_> = report
            .categories
            .iter()
            .map(|s| (s.name.as_str(), s.count, s.percentage))
            .collect();
        assert_eq!(categories, vec![("Sembako", 2, 67), ("Kebersihan", 1, 33)]);

        let contributors: Vec<_> = report
            .contributors
            .iter()
            .map(|s| (s.name.as_str(), s.count))
            .collect();
        assert_eq!(contributors, vec![("Andi", 2), ("Rani", 2)]);
        assert_eq!(
            report.contributors.iter().map(|s| s.percentage).sum::<u32>(),
            100
        );

        let top = report.top_items.first().unwrap();
        assert_eq!(top.name, "Beras");
        assert_eq!(top.activity_count, 2);
        assert_eq!(top.category.as_deref(), Some("Sembako"));
        assert!(report.top_items.iter().all(|t| t.name != "Telur"));
    }
}
