//! Metrics configuration.

use super::EnvLookup;

/// Whether `GET /api/metrics` serves the guard counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl MetricsConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: EnvLookup<'_>) -> Self {
        let enabled = lookup("FACECONTROL_METRICS_ENABLED")
            .and_then(|v| v.trim().to_lowercase().parse().ok())
            .unwrap_or(Self::default().enabled);

        Self { enabled }
    }
}
