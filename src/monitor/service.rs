// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Periodic monitoring service
//!
//! Drives the checker on a fixed interval and routes outcomes to the notifier.
//! Checks of the target never overlap: a tick that arrives while the previous
//! check is still running is skipped. That per-target lock is the only bound on
//! concurrent checks, so a service holds at most one in flight.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::checker::ChangeChecker;
use super::config::MonitorConfig;
use super::fetcher::HttpFetcher;
use super::notifier::{LogNotifier, Notification, Notifier, WebhookNotifier};
use super::store::FileBaselineStore;
use super::types::{ComparisonOutcome, MonitorError};

/// What happened in one scheduled cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleReport {
    /// Previous check still running
    Skipped,
    /// Check finished
    Completed(ComparisonOutcome),
    /// Check was cancelled before it finished
    Cancelled,
    /// Check failed; an error notification was attempted
    Failed(String),
}

/// Runs checks for one target and sends notifications
pub struct MonitorService {
    config: MonitorConfig,
    checker: ChangeChecker,
    notifier: Arc<dyn Notifier>,
    in_flight: Mutex<()>,
}

impl MonitorService {
    pub fn new(config: MonitorConfig, checker: ChangeChecker, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            config,
            checker,
            notifier,
            in_flight: Mutex::new(()),
        }
    }

    /// Build the HTTP fetcher, file store and notifier described by `config`
    pub fn from_config(config: MonitorConfig) -> Result<Self> {
        config.validate()?;

        let fetcher = Arc::new(HttpFetcher::new(config.fetch_timeout(), &config.user_agent)?);
        let store = Arc::new(FileBaselineStore::new(config.data_dir.clone()));
        let notifier: Arc<dyn Notifier> = match &config.webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url.clone())?),
            None => Arc::new(LogNotifier),
        };
        info!(
            "Monitoring {} every {}s, notifying via {}",
            config.target.url,
            config.check_interval_secs,
            notifier.name()
        );

        Ok(Self::new(config, ChangeChecker::new(fetcher, store), notifier))
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Run a single check cycle, unless one is already in flight
    pub async fn run_cycle(&self, cancel_token: &CancellationToken) -> CycleReport {
        let target = &self.config.target;

        let Ok(_running) = self.in_flight.try_lock() else {
            warn!(url = %target.url, "Previous check still running, skipping this cycle");
            return CycleReport::Skipped;
        };

        match self.checker.check_with_cancellation(target, cancel_token).await {
            Ok(outcome) => {
                if outcome.has_new_text {
                    let notification = Notification::content_changed(&target.url, &outcome.new_text);
                    if let Err(e) = self.notifier.send(&notification, &self.config.recipients).await {
                        error!(url = %target.url, "Failed to send change notification: {}", e);
                    }
                } else if !outcome.new_text.is_empty() {
                    info!(url = %target.url, "{}", outcome.new_text);
                }
                CycleReport::Completed(outcome)
            }
            Err(MonitorError::Cancelled { .. }) => CycleReport::Cancelled,
            Err(e) => {
                error!(url = %target.url, "Check failed: {}", e);
                let notification = Notification::check_failed(&target.url, &e.to_string());
                if let Err(send_err) = self.notifier.send(&notification, &self.config.recipients).await {
                    error!(url = %target.url, "Failed to send error notification: {}", send_err);
                }
                CycleReport::Failed(e.to_string())
            }
        }
    }

    /// Run checks on the configured interval until `cancel_token` fires
    pub async fn run(self: Arc<Self>, cancel_token: CancellationToken) {
        let mut interval = tokio::time::interval(self.config.check_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        if !self.config.run_on_startup {
            // The first tick completes immediately
            interval.tick().await;
        }

        let mut tasks = JoinSet::new();
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                _ = interval.tick() => {
                    let service = self.clone();
                    let token = cancel_token.child_token();
                    tasks.spawn(async move { service.run_cycle(&token).await });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    match joined {
                        Ok(report) => debug!("Cycle finished: {:?}", report),
                        Err(e) => error!("Check task panicked: {}", e),
                    }
                }
            }
        }

        info!("Stopping monitor for {}", self.config.target.url);
        while tasks.join_next().await.is_some() {}
    }
}
