//! Administrator notification configuration.

use url::Url;

use super::EnvLookup;

const DEFAULT_SITE_URL: &str = "http://localhost";

/// Administrator account that notifications are addressed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub email: String,
    pub name: Option<String>,
}

impl Recipient {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Configuration for administrator notifications
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub send_email_on_brute_force: bool,
    pub send_email_on_login: bool,
    pub sender: Option<Recipient>,
    /// Site origin inserted in notification bodies
    pub site_url: String,
    pub webhook_url: Option<Url>,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            send_email_on_brute_force: false,
            send_email_on_login: false,
            sender: None,
            site_url: DEFAULT_SITE_URL.to_string(),
            webhook_url: None,
        }
    }
}

impl NotificationConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: EnvLookup<'_>) -> Self {
        let send_email_on_brute_force = lookup("FACECONTROL_SEND_EMAIL_ON_BRUTE_FORCE")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let send_email_on_login = lookup("FACECONTROL_SEND_EMAIL_ON_LOGIN")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let sender = lookup("FACECONTROL_NOTIFY_EMAIL")
            .filter(|email| !email.trim().is_empty())
            .map(|email| Recipient {
                email: email.trim().to_string(),
                name: lookup("FACECONTROL_NOTIFY_NAME"),
            });

        let site_url =
            lookup("FACECONTROL_SITE_URL").unwrap_or_else(|| DEFAULT_SITE_URL.to_string());

        let webhook_url = lookup("FACECONTROL_NOTIFY_WEBHOOK_URL").and_then(|raw| {
            Url::parse(&raw)
                .inspect_err(|e| tracing::warn!(url = %raw, error = %e, "Ignoring invalid webhook URL"))
                .ok()
        });

        Self {
            send_email_on_brute_force,
            send_email_on_login,
            sender,
            site_url,
            webhook_url,
        }
    }
}
