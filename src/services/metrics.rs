//! Prometheus metrics for guard activity.

use prometheus::{Counter, CounterVec, Opts, Registry, TextEncoder};

/// Guard metrics collector for Prometheus integration
#[derive(Clone)]
pub struct GuardMetrics {
    pub registry: Registry,
    pub login_failures_total: Counter,
    pub bans_detected_total: Counter,
    pub gate_denials_total: CounterVec,
    pub notifications_total: CounterVec,
    pub storage_errors_total: CounterVec,
}

impl GuardMetrics {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let login_failures_total = Counter::new(
            "facecontrol_login_failures_total",
            "Failed logins attributed to a client IP",
        )?;

        let bans_detected_total = Counter::new(
            "facecontrol_bans_detected_total",
            "Ban episodes started by a failed login",
        )?;

        let gate_denials_total = CounterVec::new(
            Opts::new(
                "facecontrol_gate_denials_total",
                "Login attempts refused before authentication",
            ),
            &["reason"],
        )?;

        let notifications_total = CounterVec::new(
            Opts::new(
                "facecontrol_notifications_total",
                "Administrator notifications by trigger and outcome",
            ),
            &["trigger", "outcome"],
        )?;

        let storage_errors_total = CounterVec::new(
            Opts::new(
                "facecontrol_storage_errors_total",
                "Attempt store failures by operation",
            ),
            &["operation"],
        )?;

        registry.register(Box::new(login_failures_total.clone()))?;
        registry.register(Box::new(bans_detected_total.clone()))?;
        registry.register(Box::new(gate_denials_total.clone()))?;
        registry.register(Box::new(notifications_total.clone()))?;
        registry.register(Box::new(storage_errors_total.clone()))?;

        Ok(Self {
            registry,
            login_failures_total,
            bans_detected_total,
            gate_denials_total,
            notifications_total,
            storage_errors_total,
        })
    }

    pub fn record_denial(&self, reason: &str) {
        self.gate_denials_total.with_label_values(&[reason]).inc();
    }

    pub fn record_notification(&self, trigger: &str, delivered: bool) {
        let outcome = if delivered { "sent" } else { "failed" };
        self.notifications_total
            .with_label_values(&[trigger, outcome])
            .inc();
    }

    pub fn record_storage_error(&self, operation: &str) {
        self.storage_errors_total
            .with_label_values(&[operation])
            .inc();
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode_to_string(&metric_families)
    }
}
