//! Pre-authentication access gate.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::{
    config::AllowList,
    error::GuardError,
    models::{DenyReason, GateDecision},
    services::{policy::BanPolicy, store::AttemptStore},
};

/// Decides whether a login attempt may proceed to credential checks.
///
/// The gate only reads the store; denials are never recorded as attempts.
#[derive(Debug, Clone)]
pub struct AccessGate {
    store: Arc<AttemptStore>,
    policy: BanPolicy,
    allow_list: AllowList,
}

impl AccessGate {
    pub fn new(store: Arc<AttemptStore>, policy: BanPolicy, allow_list: AllowList) -> Self {
        Self {
            store,
            policy,
            allow_list,
        }
    }

    /// Evaluate the allow-list, then the ban state of `ip` on `today`.
    ///
    /// With a non-empty allow-list an empty `ip` is denied, since membership
    /// cannot be shown. Otherwise an empty `ip` is allowed. An unreadable
    /// store allows the attempt.
    pub fn check(&self, ip: &str, today: NaiveDate) -> GateDecision {
        self.try_check(ip, today).unwrap_or_else(|e| {
            warn!(ip, error = %e, "Attempt store unreadable, ban not enforced");
            GateDecision::Allow
        })
    }

    /// Like [`check`](Self::check), but reports a store that could not be
    /// read instead of allowing.
    pub fn try_check(&self, ip: &str, today: NaiveDate) -> Result<GateDecision, GuardError> {
        if !self.allow_list.permits(ip) {
            debug!(ip, "Client IP is not on the allow-list");
            return Ok(GateDecision::Deny {
                reason: DenyReason::NotAllowListed,
                silent: true,
            });
        }

        if ip.is_empty() {
            return Ok(GateDecision::Allow);
        }

        let records = self.store.try_load()?;
        let Some(record) = records.iter().find(|record| record.ip == ip) else {
            return Ok(GateDecision::Allow);
        };

        Ok(match self.policy.banned_until(record) {
            Some(until) if today <= until => GateDecision::Deny {
                reason: DenyReason::Banned { until },
                silent: true,
            },
            _ => GateDecision::Allow,
        })
    }
}
