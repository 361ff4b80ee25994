//! The guard's extension points.
//!
//! [`LoginGuard`] is what a host authentication pipeline calls into:
//! - [`before_authenticate`](LoginGuard::before_authenticate) before checking credentials
//! - [`on_login_failure`](LoginGuard::on_login_failure) when credentials were rejected
//! - [`on_login_success`](LoginGuard::on_login_success) once the user is authorized
//!
//! None of them ever fail. Storage and delivery problems are logged and
//! counted, and the guard under-enforces rather than blocking a login.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    config::GuardConfig,
    error::GuardError,
    models::{
        AuthAuditEvent, AuthEventOutcome, AuthEventType, FailureOutcome, GateDecision, LoginArea,
        LoginContext,
    },
    services::{
        clock::{Clock, SystemClock},
        gate::AccessGate,
        metrics::GuardMetrics,
        notifier::{LogNotifier, Notification, NotificationError, Notifier},
        policy::BanPolicy,
        store::AttemptStore,
        tracker::AttemptTracker,
    },
};

/// Brute-force guard and allow-list gate for a login flow
pub struct LoginGuard {
    config: GuardConfig,
    store: Arc<AttemptStore>,
    gate: AccessGate,
    tracker: AttemptTracker,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    metrics: Option<GuardMetrics>,
}

impl LoginGuard {
    /// Create a guard over the store at `config.store_path`, with the system
    /// clock and the log notifier
    pub fn new(config: GuardConfig) -> Self {
        let store = Arc::new(AttemptStore::new(config.store_path.clone()));
        let policy = BanPolicy::from(&config);
        let gate = AccessGate::new(store.clone(), policy, config.ip_allow_list.clone());
        let tracker = AttemptTracker::new(store.clone(), policy);

        Self {
            config,
            store,
            gate,
            tracker,
            notifier: Arc::new(LogNotifier),
            clock: Arc::new(SystemClock),
            metrics: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_metrics(mut self, metrics: GuardMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn store(&self) -> &AttemptStore {
        &self.store
    }

    pub fn metrics(&self) -> Option<&GuardMetrics> {
        self.metrics.as_ref()
    }

    /// Pre-authentication check.
    ///
    /// Returns [`GateDecision::Deny`] when the client is not allow-listed or
    /// is inside a ban window. Never mutates the store.
    pub fn before_authenticate(&self, ctx: &LoginContext) -> GateDecision {
        if self.is_exempt(ctx) {
            return GateDecision::Allow;
        }

        let decision = self
            .gate
            .try_check(&ctx.ip, self.clock.today())
            .unwrap_or_else(|e| {
                self.report_storage_error(&ctx.ip, &e);
                GateDecision::Allow
            });

        if let GateDecision::Deny { reason, .. } = &decision {
            if let Some(metrics) = &self.metrics {
                metrics.record_denial(reason.as_str());
            }
            AuthAuditEvent::new(
                AuthEventType::AccessDenied,
                AuthEventOutcome::Blocked,
                ctx.ip.clone(),
            )
            .with_user_agent(ctx.user_agent.clone())
            .with_details(Some(reason.to_string()))
            .log();
        }

        decision
    }

    /// Record a failed login and alert the administrator when it starts a
    /// ban episode.
    pub fn on_login_failure(&self, ctx: &LoginContext) -> FailureOutcome {
        if self.is_exempt(ctx) {
            return FailureOutcome::untracked();
        }

        let (outcome, errors) = self
            .tracker
            .record_failure_detailed(&ctx.ip, self.clock.today());
        for e in &errors {
            self.report_storage_error(&ctx.ip, e);
        }

        if !outcome.tracked {
            return outcome;
        }

        if let Some(metrics) = &self.metrics {
            metrics.login_failures_total.inc();
        }

        if outcome.first_in_episode {
            if let Some(metrics) = &self.metrics {
                metrics.bans_detected_total.inc();
            }
            AuthAuditEvent::new(
                AuthEventType::BruteForceDetected,
                AuthEventOutcome::Blocked,
                ctx.ip.clone(),
            )
            .with_user_agent(ctx.user_agent.clone())
            .with_attempts(outcome.attempts)
            .log();

            if self.config.notification.send_email_on_brute_force {
                let notification =
                    Notification::brute_force(&ctx.ip, &self.config.notification.site_url);
                self.notify(ctx, &notification);
            }
        }

        outcome
    }

    /// Post-authentication hook: alert the administrator of a successful
    /// login when configured to.
    pub fn on_login_success(&self, ctx: &LoginContext, full_name: &str) {
        if self.is_exempt(ctx) || !self.config.notification.send_email_on_login {
            return;
        }

        let notification = Notification::login(full_name, &self.config.notification.site_url);
        self.notify(ctx, &notification);
    }

    fn is_exempt(&self, ctx: &LoginContext) -> bool {
        ctx.area == LoginArea::Administrator && !self.config.guard_administrator
    }

    /// Hand a notification to the notifier; failures are logged, never retried
    fn notify(&self, ctx: &LoginContext, notification: &Notification) {
        let trigger = notification.trigger.as_str();

        let result = match &self.config.notification.sender {
            Some(recipient) => self
                .notifier
                .send(recipient, &notification.subject, &notification.body)
                .map_err(GuardError::from),
            None => Err(GuardError::from(NotificationError::MissingRecipient)),
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_notification(trigger, result.is_ok());
        }

        match result {
            Ok(()) => info!(trigger, "Administrator notification sent"),
            Err(e) => {
                warn!(trigger, error = %e, "Administrator notification failed");
                AuthAuditEvent::new(
                    AuthEventType::NotificationFailed,
                    AuthEventOutcome::Failure,
                    ctx.ip.clone(),
                )
                .with_details(Some(e.to_string()))
                .log();
            }
        }
    }

    /// Log an attempt store failure and count it by operation
    fn report_storage_error(&self, ip: &str, e: &GuardError) {
        let operation = e.storage_operation().unwrap_or("other");
        error!(ip, operation, error = %e, "Attempt store failure, failing open");
        if let Some(metrics) = &self.metrics {
            metrics.record_storage_error(operation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{AllowList, NotificationConfig, Recipient},
        models::DenyReason,
        services::clock::FixedClock,
    };
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl Notifier for RecordingNotifier {
        fn send(
            &self,
            recipient: &Recipient,
            subject: &str,
            _body: &str,
        ) -> Result<(), NotificationError> {
            if self.fail {
                return Err(NotificationError::Rejected("relay down".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((recipient.email.clone(), subject.to_string()));
            Ok(())
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn notifying_config(dir: &TempDir) -> GuardConfig {
        GuardConfig {
            allowed_failures: 3,
            ..GuardConfig::default()
        }
        .with_store_path(dir.path().join("ip.json"))
        .with_notification(NotificationConfig {
            send_email_on_brute_force: true,
            send_email_on_login: true,
            sender: Some(Recipient::new("admin@example.com")),
            site_url: "https://example.com".to_string(),
            webhook_url: None,
        })
    }

    fn create_guard(
        config: GuardConfig,
        notifier: Arc<RecordingNotifier>,
    ) -> (LoginGuard, Arc<FixedClock>, GuardMetrics) {
        let clock = Arc::new(FixedClock::new(date("2024-01-01")));
        let metrics = GuardMetrics::new().unwrap();
        let guard = LoginGuard::new(config)
            .with_notifier(notifier)
            .with_clock(clock.clone())
            .with_metrics(metrics.clone());
        (guard, clock, metrics)
    }

    #[test]
    fn test_brute_force_notification_sent_once_per_episode() {
        let dir = TempDir::new().unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let (guard, _clock, metrics) = create_guard(notifying_config(&dir), notifier.clone());
        let ctx = LoginContext::new("203.0.113.5");

        for _ in 0..6 {
            guard.on_login_failure(&ctx);
        }

        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1, "Brute force attack detected");
        assert_eq!(metrics.bans_detected_total.get(), 1.0);
        assert_eq!(metrics.login_failures_total.get(), 6.0);
    }

    #[test]
    fn test_banned_ip_is_denied_and_counted() {
        let dir = TempDir::new().unwrap();
        let (guard, _clock, metrics) =
            create_guard(notifying_config(&dir), Arc::new(RecordingNotifier::default()));
        let ctx = LoginContext::new("203.0.113.5");

        assert!(guard.before_authenticate(&ctx).is_allowed());
        for _ in 0..3 {
            guard.on_login_failure(&ctx);
        }
        assert!(matches!(
            guard.before_authenticate(&ctx),
            GateDecision::Deny {
                reason: DenyReason::Banned { .. },
                silent: true
            }
        ));
        assert_eq!(
            metrics.gate_denials_total.with_label_values(&["banned"]).get(),
            1.0
        );
    }

    #[test]
    fn test_notification_failure_does_not_change_outcome() {
        let dir = TempDir::new().unwrap();
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let (guard, _clock, metrics) = create_guard(notifying_config(&dir), notifier);
        let ctx = LoginContext::new("203.0.113.5");

        guard.on_login_failure(&ctx);
        guard.on_login_failure(&ctx);
        let outcome = guard.on_login_failure(&ctx);

        assert!(outcome.banned);
        assert_eq!(
            metrics
                .notifications_total
                .with_label_values(&["brute_force", "failed"])
                .get(),
            1.0
        );
    }

    #[test]
    fn test_missing_sender_skips_notification() {
        let dir = TempDir::new().unwrap();
        let mut config = notifying_config(&dir);
        config.notification.sender = None;
        let notifier = Arc::new(RecordingNotifier::default());
        let (guard, _clock, _metrics) = create_guard(config, notifier.clone());

        guard.on_login_success(&LoginContext::new("192.0.2.1"), "Jane");
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_login_notification() {
        let dir = TempDir::new().unwrap();
        let notifier = Arc::new(RecordingNotifier::default());
        let (guard, _clock, _metrics) = create_guard(notifying_config(&dir), notifier.clone());

        guard.on_login_success(&LoginContext::new("192.0.2.1"), "Jane");
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(
            *sent,
            vec![("admin@example.com".to_string(), "Successful login".to_string())]
        );
    }

    #[test]
    fn test_administrator_area_is_exempt_by_default() {
        let dir = TempDir::new().unwrap();
        let config = notifying_config(&dir).with_allow_list(AllowList::parse("198.51.100.1"));
        let notifier = Arc::new(RecordingNotifier::default());
        let (guard, _clock, _metrics) = create_guard(config, notifier.clone());
        let ctx = LoginContext::new("203.0.113.5").with_area(LoginArea::Administrator);

        assert!(guard.before_authenticate(&ctx).is_allowed());
        assert!(!guard.on_login_failure(&ctx).tracked);
        guard.on_login_success(&ctx, "Root");
        assert!(notifier.sent.lock().unwrap().is_empty());
        assert!(!guard.store().path().exists());
    }

    #[test]
    fn test_administrator_area_guarded_when_enabled() {
        let dir = TempDir::new().unwrap();
        let mut config = notifying_config(&dir);
        config.guard_administrator = true;
        let (guard, _clock, _metrics) =
            create_guard(config, Arc::new(RecordingNotifier::default()));
        let ctx = LoginContext::new("203.0.113.5").with_area(LoginArea::Administrator);

        assert!(guard.on_login_failure(&ctx).tracked);
    }

    #[test]
    fn test_ban_expires_with_clock() {
        let dir = TempDir::new().unwrap();
        let mut config = notifying_config(&dir);
        config.ban_period_days = 2;
        let (guard, clock, _metrics) =
            create_guard(config, Arc::new(RecordingNotifier::default()));
        let ctx = LoginContext::new("203.0.113.5");

        for _ in 0..3 {
            guard.on_login_failure(&ctx);
        }
        clock.set(date("2024-01-03"));
        assert!(!guard.before_authenticate(&ctx).is_allowed());
        clock.set(date("2024-01-04"));
        assert!(guard.before_authenticate(&ctx).is_allowed());
    }

    #[test]
    fn test_unreadable_store_fails_open_and_is_counted() {
        let dir = TempDir::new().unwrap();
        let config = notifying_config(&dir);
        std::fs::create_dir_all(&config.store_path).unwrap();
        let (guard, _clock, metrics) =
            create_guard(config, Arc::new(RecordingNotifier::default()));
        let ctx = LoginContext::new("203.0.113.5");

        assert!(guard.before_authenticate(&ctx).is_allowed());
        let read_errors = metrics.storage_errors_total.with_label_values(&["read"]);
        assert_eq!(read_errors.get(), 1.0);

        assert_eq!(guard.on_login_failure(&ctx).attempts, 1);
        assert_eq!(read_errors.get(), 2.0);
        assert_eq!(
            metrics.storage_errors_total.with_label_values(&["write"]).get(),
            1.0
        );
        assert!(metrics.render().unwrap().contains("operation=\"read\""));
    }
}
