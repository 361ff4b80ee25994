//! Outcomes returned by the guard's extension points.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Why the access gate refused an authentication attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenyReason {
    /// An allow-list is configured and the client IP is not on it
    NotAllowListed,
    /// The client IP is inside an active ban window
    Banned { until: NaiveDate },
}

impl DenyReason {
    /// Label used in metrics and audit logs
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NotAllowListed => "not_allow_listed",
            DenyReason::Banned { .. } => "banned",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NotAllowListed => write!(f, "denied by IP allow-list policy"),
            DenyReason::Banned { until } => write!(f, "banned until {until}"),
        }
    }
}

/// Pre-authentication verdict.
///
/// `silent` asks the host to suppress its usual credential-error messaging,
/// since the refusal is a policy block rather than a bad password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GateDecision {
    Allow,
    Deny { reason: DenyReason, silent: bool },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }
}

/// Result of recording one failed login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FailureOutcome {
    /// False when the failure could not be attributed to an IP
    pub tracked: bool,
    /// Attempts on record for the IP after this failure
    pub attempts: u32,
    /// The IP is now inside an active ban window
    pub banned: bool,
    /// This is the first failure of the ban episode to be reported
    pub first_in_episode: bool,
}

impl FailureOutcome {
    pub fn untracked() -> Self {
        Self::default()
    }
}

/// Which login form an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginArea {
    #[default]
    Site,
    Administrator,
}

/// Request facts the guard needs at every extension point
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoginContext {
    /// Canonical IPv4 address, empty when unresolvable
    pub ip: String,
    pub area: LoginArea,
    pub user_agent: Option<String>,
}

impl LoginContext {
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            ..Default::default()
        }
    }

    pub fn with_area(mut self, area: LoginArea) -> Self {
        self.area = area;
        self
    }

    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }
}
