//! Failed-login tracking.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error};

use crate::{
    error::GuardError,
    models::{AttemptRecord, FailureOutcome},
    services::{policy::BanPolicy, store::AttemptStore},
};

/// Records failed logins against the attempt store
#[derive(Debug, Clone)]
pub struct AttemptTracker {
    store: Arc<AttemptStore>,
    policy: BanPolicy,
}

impl AttemptTracker {
    pub fn new(store: Arc<AttemptStore>, policy: BanPolicy) -> Self {
        Self { store, policy }
    }

    /// Record one failed login from `ip` on `today`.
    ///
    /// An empty `ip` cannot be attributed and is not tracked. Otherwise the
    /// store is updated under its lock and saved whether or not the IP is now
    /// banned. An unreadable store counts as empty and is overwritten; storage
    /// failures are logged and the returned outcome still reflects the
    /// decision that was made.
    pub fn record_failure(&self, ip: &str, today: NaiveDate) -> FailureOutcome {
        let (outcome, errors) = self.record_failure_detailed(ip, today);
        for e in &errors {
            error!(ip, error = %e, "Attempt store failure while recording login failure");
        }
        outcome
    }

    /// Like [`record_failure`](Self::record_failure), but hands back the
    /// storage errors met on the way instead of logging them.
    pub fn record_failure_detailed(
        &self,
        ip: &str,
        today: NaiveDate,
    ) -> (FailureOutcome, Vec<GuardError>) {
        let mut errors = Vec::new();

        if ip.is_empty() {
            debug!("Login failure without a client IP, not tracked");
            return (FailureOutcome::untracked(), errors);
        }

        let _lock = self.store.lock();
        let mut records = self.store.try_load().unwrap_or_else(|e| {
            errors.push(e);
            Vec::new()
        });
        let outcome = apply_failure(&mut records, ip, today, &self.policy);

        debug!(
            ip,
            attempts = outcome.attempts,
            banned = outcome.banned,
            "Recorded login failure"
        );

        if let Err(e) = self.store.save(&records) {
            errors.push(e);
        }

        (outcome, errors)
    }
}

/// Find-or-create the record for `ip`, apply one failure and evaluate the ban.
///
/// The first failure of a ban episode marks the record `notified` and
/// reports `first_in_episode`.
pub fn apply_failure(
    records: &mut Vec<AttemptRecord>,
    ip: &str,
    today: NaiveDate,
    policy: &BanPolicy,
) -> FailureOutcome {
    let index = match records.iter().position(|record| record.ip == ip) {
        Some(index) => {
            records[index].register_failure(today);
            index
        }
        None => {
            records.push(AttemptRecord::new(ip, today));
            records.len() - 1
        }
    };

    let record = &mut records[index];
    let banned = policy.is_banned(record, today);
    let first_in_episode = banned && !record.notified;
    if first_in_episode {
        record.notified = true;
    }

    FailureOutcome {
        tracked: true,
        attempts: record.attempts,
        banned,
        first_in_episode,
    }
}
