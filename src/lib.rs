//! Facecontrol - login brute-force guard and IP allow-list gate
//!
//! The guard sits in front of an authentication flow and:
//! - counts failed logins per client IP and calendar day
//! - bans an IP for a number of days once it reaches the failure threshold
//! - optionally restricts logins to a configured IP allow-list
//! - notifies an administrator when a ban starts or a user logs in
//!
//! ## Architecture
//!
//! The codebase is organized into focused modules:
//! - `models/` - Attempt records, gate decisions, request/response and audit types
//! - `services/` - Attempt store, ban policy, tracker, gate and the [`LoginGuard`]
//! - `handlers/` - actix-web host integration around the guard
//! - `utils/` - Client IP resolution
//! - `config/` - Configuration structures and environment loading
//!
//! ## Quick Start
//!
//! ```no_run
//! use facecontrol::{GuardConfig, LoginContext, LoginGuard};
//!
//! let guard = LoginGuard::new(GuardConfig::from_env());
//! let ctx = LoginContext::new("203.0.113.5");
//!
//! if guard.before_authenticate(&ctx).is_allowed() {
//!     // check credentials, then report the result
//!     guard.on_login_failure(&ctx);
//! }
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

pub use config::{AllowList, GuardConfig, MetricsConfig, NotificationConfig, Recipient};
pub use error::GuardError;
pub use handlers::{AppState, create_app, create_openapi_spec, get_metrics, health, login};
pub use models::{
    AttemptRecord, AuthAuditEvent, AuthEventOutcome, AuthEventType, DenyReason, FailureOutcome,
    GateDecision, HealthResponse, LoginArea, LoginContext, LoginRequest, LoginResponse, StoreStatus,
};
pub use services::{
    AccessGate, AttemptStore, AttemptTracker, BanPolicy, Clock, CredentialVerifier, FixedClock,
    GuardMetrics, LogNotifier, LoginGuard, Notification, NotificationError, NotificationTrigger,
    Notifier, StaticCredentials, SystemClock, WebhookNotifier, is_banned,
};
pub use utils::{ClientIpResolver, canonical_ipv4, extract_user_agent};
