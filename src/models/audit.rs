//! Audit logging data structures and types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Types of authentication events for audit logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEventType {
    LoginSuccess,
    LoginFailure,
    AccessDenied,
    BruteForceDetected,
    NotificationFailed,
}

/// Outcomes of authentication events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthEventOutcome {
    Success,
    Failure,
    Blocked,
}

/// Structured audit log entry for authentication events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthAuditEvent {
    pub event_type: AuthEventType,
    pub outcome: AuthEventOutcome,
    pub timestamp: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub user_id: Option<String>,
    pub attempts: Option<u32>,
    pub details: Option<String>,
}

impl AuthAuditEvent {
    /// Create a new audit event with basic information
    pub fn new(event_type: AuthEventType, outcome: AuthEventOutcome, ip_address: String) -> Self {
        Self {
            event_type,
            outcome,
            timestamp: Utc::now(),
            ip_address,
            user_agent: None,
            user_id: None,
            attempts: None,
            details: None,
        }
    }

    /// Add user agent information
    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Add user ID information
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    /// Add the attempt counter on record for the IP
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }

    /// Log the audit event using structured logging.
    ///
    /// Blocked and failed events go out at `warn`, everything else at `info`.
    pub fn log(&self) {
        match self.outcome {
            AuthEventOutcome::Success => info!(
                target: "auth_audit",
                event_type = ?self.event_type,
                outcome = ?self.outcome,
                timestamp = %self.timestamp,
                ip_address = %self.ip_address,
                user_agent = ?self.user_agent,
                user_id = ?self.user_id,
                attempts = ?self.attempts,
                details = ?self.details,
                "Authentication audit event"
            ),
            AuthEventOutcome::Failure | AuthEventOutcome::Blocked => warn!(
                target: "auth_audit",
                event_type = ?self.event_type,
                outcome = ?self.outcome,
                timestamp = %self.timestamp,
                ip_address = %self.ip_address,
                user_agent = ?self.user_agent,
                user_id = ?self.user_id,
                attempts = ?self.attempts,
                details = ?self.details,
                "Authentication audit event"
            ),
        }
    }
}
