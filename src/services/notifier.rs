//! Administrator notifications.
//!
//! The guard only triggers notifications; delivery belongs to a [`Notifier`]
//! implementation. Failures are reported back so they can be logged, but are
//! never retried.

use serde::Serialize;
use tracing::{info, warn};
use url::Url;

use crate::config::Recipient;

/// Errors that can occur while handing a notification off for delivery
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("no notification recipient is configured")]
    MissingRecipient,

    #[error("no async runtime available to deliver the notification")]
    NoRuntime,

    #[error("delivery failed: {0}")]
    Delivery(#[from] reqwest::Error),

    #[error("{0}")]
    Rejected(String),
}

/// What caused a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationTrigger {
    BruteForce,
    Login,
}

impl NotificationTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationTrigger::BruteForce => "brute_force",
            NotificationTrigger::Login => "login",
        }
    }
}

/// A message addressed to an administrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub trigger: NotificationTrigger,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn brute_force(ip: &str, site_url: &str) -> Self {
        Self {
            trigger: NotificationTrigger::BruteForce,
            subject: "Brute force attack detected".to_string(),
            body: format!(
                "A brute force attack has been detected from IP address {ip} on {site_url}. \
                 Further login attempts from this address are blocked for the ban period."
            ),
        }
    }

    pub fn login(full_name: &str, site_url: &str) -> Self {
        Self {
            trigger: NotificationTrigger::Login,
            subject: "Successful login".to_string(),
            body: format!("{full_name} has logged in on {site_url}."),
        }
    }
}

/// Delivers notifications to an administrator
pub trait Notifier: Send + Sync {
    fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        body: &str,
    ) -> Result<(), NotificationError>;
}

/// Writes notifications to the log instead of delivering them
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        body: &str,
    ) -> Result<(), NotificationError> {
        info!(
            target: "notifications",
            to = %recipient.email,
            name = ?recipient.name,
            subject,
            body,
            "Administrator notification"
        );
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload {
    to: String,
    name: Option<String>,
    subject: String,
    body: String,
}

/// Posts notifications as JSON to a mail relay webhook.
///
/// Delivery happens on a spawned task, so `send` returns as soon as the
/// request is queued. Delivery failures are logged by the task.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    endpoint: Url,
}

impl WebhookNotifier {
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

impl Notifier for WebhookNotifier {
    fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        body: &str,
    ) -> Result<(), NotificationError> {
        let handle =
            tokio::runtime::Handle::try_current().map_err(|_| NotificationError::NoRuntime)?;

        let payload = WebhookPayload {
            to: recipient.email.clone(),
            name: recipient.name.clone(),
            subject: subject.to_string(),
            body: body.to_string(),
        };
        let request = self.client.post(self.endpoint.clone()).json(&payload);
        let endpoint = self.endpoint.clone();

        handle.spawn(async move {
            let result = match request.send().await {
                Ok(response) => response.error_for_status().map(|_| ()),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                warn!(
                    endpoint = %endpoint,
                    error = %NotificationError::Delivery(e),
                    "Webhook notification was not delivered"
                );
            }
        });

        Ok(())
    }
}
