//! Best-effort build status notifications.
//!
//! The dispatcher is chosen once at startup: a [`NotificationDispatcher::Webhook`]
//! when a destination is configured, [`NotificationDispatcher::Disabled`]
//! otherwise. Call sites use the same methods either way.
//!
//! Delivery problems (transport errors, timeouts, non-2xx responses) are
//! logged as warnings and reported through the `bool` return value. They are
//! never raised.

use crate::bundler::logging::Logger;
use serde::Serialize;
use std::time::Duration;

/// Environment variable holding the webhook URL.
pub const WEBHOOK_ENV_VAR: &str = "SLACK_WEBHOOK_URL";

/// Upper bound for a single webhook request.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome class of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Progress or completion.
    Success,
    /// Failure or interruption.
    Failure,
}

impl Severity {
    fn color(self) -> &'static str {
        match self {
            Severity::Success => "good",
            Severity::Failure => "danger",
        }
    }

    fn emoji(self) -> &'static str {
        match self {
            Severity::Success => "✅",
            Severity::Failure => "❌",
        }
    }
}

/// Webhook body: one colored attachment carrying the message.
#[derive(Debug, Serialize)]
struct Payload {
    attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize)]
struct Attachment {
    color: &'static str,
    fields: Vec<Field>,
    footer: &'static str,
    ts: Option<i64>,
}

#[derive(Debug, Serialize)]
struct Field {
    title: &'static str,
    value: String,
    short: bool,
}

impl Payload {
    fn new(message: &str, severity: Severity) -> Self {
        Self {
            attachments: vec![Attachment {
                color: severity.color(),
                fields: vec![Field {
                    title: "Browser Build",
                    value: format!("{} {}", severity.emoji(), message),
                    short: false,
                }],
                footer: "Browser Build System",
                ts: None,
            }],
        }
    }
}

/// Configured webhook sender.
#[derive(Debug, Clone)]
pub struct WebhookSender {
    url: String,
    client: reqwest::Client,
}

impl WebhookSender {
    /// Creates a sender for `url` with the fixed request timeout.
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(NOTIFY_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                log::debug!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            url: url.into(),
            client,
        }
    }

    async fn send(&self, logger: &Logger, message: &str, severity: Severity) -> bool {
        let payload = Payload::new(message, severity);

        let response = self
            .client
            .post(&self.url)
            .timeout(NOTIFY_TIMEOUT)
            .json(&payload)
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                logger.info(&format!("📲 Notification sent: {message}"));
                true
            }
            Ok(resp) => {
                logger.warn(&format!(
                    "Notification failed with status {}",
                    resp.status().as_u16()
                ));
                false
            }
            Err(e) => {
                logger.warn(&format!("Failed to send notification: {e}"));
                false
            }
        }
    }
}

/// Build lifecycle notifier.
#[derive(Debug, Clone)]
pub enum NotificationDispatcher {
    /// No destination configured; every call succeeds without network I/O.
    Disabled,
    /// Posts to a webhook.
    Webhook(WebhookSender),
}

impl NotificationDispatcher {
    /// Selects the dispatcher from an optional URL; blank URLs disable it.
    pub fn from_url(url: Option<String>) -> Self {
        match url {
            Some(url) if !url.trim().is_empty() => Self::Webhook(WebhookSender::new(url.trim())),
            _ => Self::Disabled,
        }
    }

    /// True when a destination is configured.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Webhook(_))
    }

    /// Sends one message. Returns `false` only when a configured
    /// destination could not be reached or rejected the message.
    pub async fn notify(&self, logger: &Logger, message: &str, success: bool) -> bool {
        let severity = if success {
            Severity::Success
        } else {
            Severity::Failure
        };

        match self {
            Self::Disabled => true,
            Self::Webhook(sender) => sender.send(logger, message, severity).await,
        }
    }

    /// Build started for `build_type` on `arch`.
    pub async fn build_started(&self, logger: &Logger, build_type: &str, arch: &str) -> bool {
        let message = format!("Build started - {build_type} build for {arch}");
        self.notify(logger, &message, true).await
    }

    /// A build step finished; `step_name` describes what completed.
    pub async fn build_step(&self, logger: &Logger, step_name: &str) -> bool {
        let message = format!("Running step: {step_name}");
        self.notify(logger, &message, true).await
    }

    /// Build finished successfully after `elapsed`.
    pub async fn build_succeeded(&self, logger: &Logger, elapsed: Duration) -> bool {
        let (mins, secs) = split_duration(elapsed);
        let message = format!("Build completed successfully in {mins}m {secs}s");
        self.notify(logger, &message, true).await
    }

    /// Build failed with `error`.
    pub async fn build_failed(&self, logger: &Logger, error: &str) -> bool {
        let message = format!("Build failed: {error}");
        self.notify(logger, &message, false).await
    }

    /// Build was interrupted by the operator.
    pub async fn build_interrupted(&self, logger: &Logger) -> bool {
        self.notify(logger, "Build was interrupted by user", false)
            .await
    }
}

/// Splits a duration into whole minutes and remaining seconds.
pub fn split_duration(elapsed: Duration) -> (u64, u64) {
    let total = elapsed.as_secs();
    (total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let payload = Payload::new("Build failed: oops", Severity::Failure);
        let value = serde_json::to_value(&payload).unwrap();

        let attachment = &value["attachments"][0];
        assert_eq!(attachment["color"], "danger");
        assert_eq!(attachment["fields"][0]["value"], "❌ Build failed: oops");
        assert_eq!(attachment["fields"][0]["short"], false);
        assert!(attachment["ts"].is_null());
    }

    #[test]
    fn test_blank_url_disables() {
        assert!(!NotificationDispatcher::from_url(None).is_enabled());
        assert!(!NotificationDispatcher::from_url(Some("  ".into())).is_enabled());
        assert!(NotificationDispatcher::from_url(Some("http://example.invalid".into())).is_enabled());
    }

    #[test]
    fn test_split_duration() {
        assert_eq!(split_duration(Duration::from_secs(125)), (2, 5));
        assert_eq!(split_duration(Duration::from_millis(59_999)), (0, 59));
    }
}
