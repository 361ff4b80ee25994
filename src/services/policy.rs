//! Ban decision.

use chrono::{Days, NaiveDate};

use crate::{config::GuardConfig, models::AttemptRecord};

/// Thresholds deciding when an attempt record is a ban
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BanPolicy {
    pub allowed_failures: u32,
    pub ban_period_days: u32,
}

impl Default for BanPolicy {
    fn default() -> Self {
        Self::from(&GuardConfig::default())
    }
}

impl From<&GuardConfig> for BanPolicy {
    fn from(config: &GuardConfig) -> Self {
        Self {
            allowed_failures: config.allowed_failures,
            ban_period_days: config.ban_period_days,
        }
    }
}

impl BanPolicy {
    pub fn new(allowed_failures: u32, ban_period_days: u32) -> Self {
        Self {
            allowed_failures,
            ban_period_days,
        }
    }

    /// Last day of the ban window, or `None` when the record is under the threshold.
    ///
    /// A window reaching past the end of the calendar is clamped to the last
    /// representable date.
    pub fn banned_until(&self, record: &AttemptRecord) -> Option<NaiveDate> {
        if record.attempts < self.allowed_failures {
            return None;
        }
        Some(
            record
                .last_date
                .checked_add_days(Days::new(u64::from(self.ban_period_days)))
                .unwrap_or(NaiveDate::MAX),
        )
    }

    pub fn is_banned(&self, record: &AttemptRecord, today: NaiveDate) -> bool {
        is_banned(record, self.allowed_failures, self.ban_period_days, today)
    }
}

/// Whether `record` is inside an active ban on `today`.
///
/// Banned iff `attempts >= allowed_failures` and
/// `today <= last_date + ban_period_days`, both ends inclusive.
pub fn is_banned(
    record: &AttemptRecord,
    allowed_failures: u32,
    ban_period_days: u32,
    today: NaiveDate,
) -> bool {
    BanPolicy::new(allowed_failures, ban_period_days)
        .banned_until(record)
        .is_some_and(|until| today <= until)
}
