//! Persisted per-IP attempt history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Failed-login history for a single client IP.
///
/// Serialized as `{"ip": "...", "date": "YYYY-MM-DD", "attempts": n, "notified": bool}`.
/// Whether the IP is banned is never stored; it is always derived by
/// [`crate::services::BanPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Canonical dotted-decimal IPv4 address, unique within the store
    pub ip: String,
    /// Date of the most recent failed attempt
    #[serde(rename = "date")]
    pub last_date: NaiveDate,
    /// Failed attempts recorded on `last_date`
    #[serde(alias = "tries")]
    pub attempts: u32,
    /// Whether the administrator was already told about the current ban episode
    #[serde(default)]
    pub notified: bool,
}

impl AttemptRecord {
    /// First failure for an IP
    pub fn new(ip: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            ip: ip.into(),
            last_date: today,
            attempts: 1,
            notified: false,
        }
    }

    /// Apply one more failed attempt made on `today`.
    ///
    /// Same-day failures increment the counter. A failure on any other date
    /// starts a new daily window with a single attempt and clears `notified`.
    pub fn register_failure(&mut self, today: NaiveDate) {
        if self.last_date == today {
            self.attempts = self.attempts.saturating_add(1);
        } else {
            self.last_date = today;
            self.attempts = 1;
            self.notified = false;
        }
    }
}
