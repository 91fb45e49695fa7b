//! Human-readable relative timestamps ("5 menit lalu").

use chrono::{DateTime, Utc};

/// Describe how long ago `at` was, relative to `now`.
///
/// Under a minute reads "baru saja"; then minutes, hours and days.
/// Timestamps in the future are treated as "baru saja".
#[must_use]
pub fn relative_label(now: DateTime<Utc>, at: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);

    let minutes = elapsed.num_minutes();
    if minutes < 1 {
        return "baru saja".to_owned();
    }
    if minutes < 60 {
        return format!("{minutes} menit lalu");
    }

    let hours = elapsed.num_hours();
    if hours < 24 {
        return format!("{hours} jam lalu");
    }

    format!("{} hari lalu", elapsed.num_days())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_relative_label_units() {
        let now = Utc::now();
        assert_eq!(relative_label(now, now), "baru saja");
        assert_eq!(relative_label(now, now - Duration::minutes(5)), "5 menit lalu");
        assert_eq!(relative_label(now, now - Duration::minutes(59)), "59 menit lalu");
        assert_eq!(relative_label(now, now - Duration::hours(2)), "2 jam lalu");
        assert_eq!(relative_label(now, now - Duration::hours(49)), "2 hari lalu");
    }

    #[test]
    fn test_relative_label_future_is_now() {
        let now = Utc::now();
        assert_eq!(relative_label(now, now + Duration::hours(1)), "baru saja");
    }
}
