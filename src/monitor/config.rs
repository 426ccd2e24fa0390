// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for page monitoring
//!
//! Built once at startup, validated, then passed by value into the service.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::extractor::ContentSelector;
use super::fetcher::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use super::types::MonitoredTarget;

/// Startup-time configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid {
        name: &'static str,
        reason: String,
    },
}

/// Configuration for monitoring a single page
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Page to watch
    pub target: MonitoredTarget,
    /// Notification recipients
    pub recipients: Vec<String>,
    /// Directory holding baseline records (default: ./data/baselines)
    pub data_dir: PathBuf,
    /// Seconds between checks (default: 3600)
    pub check_interval_secs: u64,
    /// Fetch timeout in seconds (default: 30)
    pub fetch_timeout_secs: u64,
    /// User-Agent header sent with each fetch
    pub user_agent: String,
    /// Optional webhook endpoint for notifications
    pub webhook_url: Option<String>,
    /// Run a check immediately on startup (default: true)
    pub run_on_startup: bool,
}

impl MonitorConfig {
    /// Configuration with defaults for everything but the target
    pub fn new(target: MonitoredTarget) -> Self {
        Self {
            target,
            recipients: Vec::new(),
            data_dir: PathBuf::from("./data/baselines"),
            check_interval_secs: 3600,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            webhook_url: None,
            run_on_startup: true,
        }
    }

    /// Load configuration from environment variables and validate it
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("MONITOR_URL").map_err(|_| ConfigError::Missing("MONITOR_URL"))?;
        let target = MonitoredTarget {
            url,
            content_selector: env::var("MONITOR_SELECTOR").ok().filter(|s| !s.is_empty()),
        };

        let mut config = Self::new(target);

        if let Ok(recipients) = env::var("MONITOR_RECIPIENTS") {
            config.recipients = parse_recipients(&recipients);
        }
        if let Ok(dir) = env::var("MONITOR_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config.check_interval_secs =
            parse_var("MONITOR_INTERVAL_SECS")?.unwrap_or(config.check_interval_secs);
        config.fetch_timeout_secs =
            parse_var("MONITOR_FETCH_TIMEOUT_SECS")?.unwrap_or(config.fetch_timeout_secs);
        if let Ok(agent) = env::var("MONITOR_USER_AGENT") {
            config.user_agent = agent;
        }
        config.webhook_url = env::var("MONITOR_WEBHOOK_URL").ok().filter(|s| !s.is_empty());
        config.run_on_startup = env::var("MONITOR_RUN_ON_STARTUP")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("MONITOR_URL", &self.target.url)?;

        if let Some(selector) = &self.target.content_selector {
            if ContentSelector::parse(selector).is_none() {
                return Err(ConfigError::Invalid {
                    name: "MONITOR_SELECTOR",
                    reason: format!("'{}' names no id, class or tag", selector),
                });
            }
        }
        if self.check_interval_secs == 0 {
            return Err(invalid("MONITOR_INTERVAL_SECS", "must be at least 1"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(invalid("MONITOR_FETCH_TIMEOUT_SECS", "must be at least 1"));
        }
        if self.user_agent.trim().is_empty() {
            return Err(invalid("MONITOR_USER_AGENT", "must not be empty"));
        }
        if self.recipients.iter().any(|r| r.trim().is_empty()) {
            return Err(invalid("MONITOR_RECIPIENTS", "contains an empty recipient"));
        }
        if let Some(webhook) = &self.webhook_url {
            validate_http_url("MONITOR_WEBHOOK_URL", webhook)?;
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

fn validate_http_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(value).map_err(|e| invalid(name, &e.to_string()))?;
    if !["http", "https"].contains(&parsed.scheme()) {
        return Err(invalid(name, "only http and https are supported"));
    }
    Ok(())
}

fn parse_var<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(name, &format!("'{}' is not a valid number", value))),
        Err(_) => Ok(None),
    }
}

/// Split a comma-separated recipient list
pub fn parse_recipients(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}
