//! Retention window arithmetic for trashed loans

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::fmt;

/// Days a trashed loan stays restorable
pub const RETENTION_WINDOW_DAYS: i64 = 30;

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    window: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::with_days(RETENTION_WINDOW_DAYS)
    }
}

impl RetentionPolicy {
    pub fn with_days(days: i64) -> Self {
        Self {
            window: Duration::days(days),
        }
    }

    pub fn expires_at(&self, deleted_at: DateTime<Utc>) -> DateTime<Utc> {
        deleted_at + self.window
    }

    /// Loans trashed at or before this instant are past the window
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.window
    }

    /// `now - deleted_at < window`
    pub fn can_restore(&self, deleted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - deleted_at < self.window
    }

    pub fn is_expired(&self, deleted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        !self.can_restore(deleted_at, now)
    }

    /// Whole days left before expiry, rounded up
    pub fn remaining(&self, deleted_at: DateTime<Utc>, now: DateTime<Utc>) -> RetentionRemaining {
        let left = self.expires_at(deleted_at) - now;
        if left <= Duration::zero() {
            return RetentionRemaining::Expired;
        }
        let millis = left.num_milliseconds();
        let days = ((millis + DAY_MILLIS - 1) / DAY_MILLIS).max(1);
        RetentionRemaining::DaysLeft(days)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "days", rename_all = "snake_case")]
pub enum RetentionRemaining {
    DaysLeft(i64),
    Expired,
}

impl fmt::Display for RetentionRemaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetentionRemaining::DaysLeft(1) => write!(f, "1 day left"),
            RetentionRemaining::DaysLeft(days) => write!(f, "{} days left", days),
            RetentionRemaining::Expired => write!(f, "Expired"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deleted_at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_restore_window_boundaries() {
        let policy = RetentionPolicy::default();
        let d = deleted_at();

        assert!(policy.can_restore(d, d + Duration::days(29)));
        assert!(policy.can_restore(d, d + Duration::days(30) - Duration::seconds(1)));
        assert!(!policy.can_restore(d, d + Duration::days(30)));
        assert!(!policy.can_restore(d, d + Duration::days(31)));
        assert!(policy.is_expired(d, d + Duration::days(31)));
    }

    #[test]
    fn test_cutoff_matches_expiry() {
        let policy = RetentionPolicy::default();
        let now = deleted_at() + Duration::days(45);
        let cutoff = policy.cutoff(now);
        assert!(policy.is_expired(cutoff, now));
        assert!(policy.can_restore(cutoff + Duration::seconds(1), now));
    }

    #[test]
    fn test_remaining_display() {
        let policy = RetentionPolicy::default();
        let d = deleted_at();

        assert_eq!(policy.remaining(d, d + Duration::days(7)).to_string(), "23 days left");
        assert_eq!(
            policy
                .remaining(d, d + Duration::days(7) + Duration::hours(1))
                .to_string(),
            "23 days left"
        );
        assert_eq!(
            policy.remaining(d, d + Duration::days(29) + Duration::hours(20)),
            RetentionRemaining::DaysLeft(1)
        );
        assert_eq!(
            policy.remaining(d, d + Duration::days(29)).to_string(),
            "1 day left"
        );
        assert_eq!(policy.remaining(d, d + Duration::days(30)).to_string(), "Expired");
        assert_eq!(policy.remaining(d, d + Duration::days(90)), RetentionRemaining::Expired);
    }

    #[test]
    fn test_custom_window() {
        let policy = RetentionPolicy::with_days(7);
        let d = deleted_at();
        assert_eq!(policy.expires_at(d), d + Duration::days(7));
        assert!(!policy.can_restore(d, d + Duration::days(8)));
    }
}
