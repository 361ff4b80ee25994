//! Brute-force guard configuration.

use std::path::PathBuf;

use super::{AllowList, EnvLookup, NotificationConfig};

const DEFAULT_ALLOWED_FAILURES: u32 = 10;
const DEFAULT_BAN_PERIOD_DAYS: u32 = 7;
const DEFAULT_STORE_PATH: &str = "data/facecontrol/ip.json";

/// Configuration for the login guard, populated once at startup
#[derive(Debug, Clone)]
pub struct GuardConfig {
    /// Same-day failures needed before an IP is banned (at least 1)
    pub allowed_failures: u32,
    /// Days a ban lasts after the threshold-crossing attempt's date
    pub ban_period_days: u32,
    pub ip_allow_list: AllowList,
    /// Location of the persisted attempt records
    pub store_path: PathBuf,
    /// Apply the guard to administrator logins too
    pub guard_administrator: bool,
    /// Reverse proxies whose forwarding headers identify the client; empty
    /// means the connection peer is always the client
    pub trusted_proxies: AllowList,
    pub notification: NotificationConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            allowed_failures: DEFAULT_ALLOWED_FAILURES,
            ban_period_days: DEFAULT_BAN_PERIOD_DAYS,
            ip_allow_list: AllowList::default(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            guard_administrator: false,
            trusted_proxies: AllowList::default(),
            notification: NotificationConfig::default(),
        }
    }
}

impl GuardConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: EnvLookup<'_>) -> Self {
        let mut allowed_failures = lookup("FACECONTROL_ALLOWED_FAILURES")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_ALLOWED_FAILURES);
        if allowed_failures == 0 {
            tracing::warn!("FACECONTROL_ALLOWED_FAILURES must be at least 1, using 1");
            allowed_failures = 1;
        }

        let ban_period_days = lookup("FACECONTROL_BAN_PERIOD_DAYS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_BAN_PERIOD_DAYS);

        let ip_allow_list = lookup("FACECONTROL_IP_ALLOW_LIST")
            .map(|v| AllowList::parse(&v))
            .unwrap_or_default();

        let store_path = lookup("FACECONTROL_STORE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH));

        let guard_administrator = lookup("FACECONTROL_GUARD_ADMINISTRATOR")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let trusted_proxies = lookup("FACECONTROL_TRUSTED_PROXIES")
            .map(|v| AllowList::parse(&v))
            .unwrap_or_default();

        Self {
            allowed_failures,
            ban_period_days,
            ip_allow_list,
            store_path,
            guard_administrator,
            trusted_proxies,
            notification: NotificationConfig::from_lookup(lookup),
        }
    }

    /// Use a different attempt store location
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = path.into();
        self
    }

    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.ip_allow_list = allow_list;
        self
    }

    pub fn with_trusted_proxies(mut self, trusted_proxies: AllowList) -> Self {
        self.trusted_proxies = trusted_proxies;
        self
    }

    pub fn with_notification(mut self, notification: NotificationConfig) -> Self {
        self.notification = notification;
        self
    }
}
