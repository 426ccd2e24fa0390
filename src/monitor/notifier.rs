// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Notification delivery
//!
//! The transport is pluggable: the service only builds a subject/body and hands
//! it to a [`Notifier`] with the configured recipients.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Notification delivery failures
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("Notification transport error: {0}")]
    Transport(String),

    #[error("Notification rejected with status {0}")]
    Rejected(u16),
}

/// Kind of notification, distinguishes content changes from failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ContentChanged,
    CheckFailed,
}

/// A message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// New content was found at `url`
    pub fn content_changed(url: &str, digest: &str) -> Self {
        Self {
            kind: NotificationKind::ContentChanged,
            subject: format!("New content detected on {}", url),
            body: format!("New content found at {}:\n\n{}", url, digest),
        }
    }

    /// A check of `url` failed with `error`
    pub fn check_failed(url: &str, error: &str) -> Self {
        Self {
            kind: NotificationKind::CheckFailed,
            subject: format!("Page check failed for {}", url),
            body: format!("Checking {} failed:\n\n{}", url, error),
        }
    }
}

/// Notification transport
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `notification` to `recipients`
    async fn send(&self, notification: &Notification, recipients: &[String]) -> Result<(), NotifyError>;

    /// Transport name for logging
    fn name(&self) -> &'static str;
}

/// Writes notifications to the log
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification, recipients: &[String]) -> Result<(), NotifyError> {
        match notification.kind {
            NotificationKind::ContentChanged => info!(
                recipients = ?recipients,
                subject = %notification.subject,
                "{}",
                notification.body
            ),
            NotificationKind::CheckFailed => warn!(
                recipients = ?recipients,
                subject = %notification.subject,
                "{}",
                notification.body
            ),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    #[serde(flatten)]
    notification: &'a Notification,
    recipients: &'a [String],
}

/// Posts notifications as JSON to a webhook endpoint
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification, recipients: &[String]) -> Result<(), NotifyError> {
        let payload = WebhookPayload {
            notification,
            recipients,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status.as_u16()));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
