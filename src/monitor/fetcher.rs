// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP page fetching with a bounded timeout
//!
//! A non-success status is an expected outcome and is returned as a value.
//! Network-level failures are returned as [`FetchError`].

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default fetch timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Browser-like identification header, avoids naive bot blocking
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Result of a fetch that reached the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Body of a success response
    Content(String),
    /// Server answered with a non-success status
    NonSuccess(u16),
}

impl FetchOutcome {
    pub fn into_content(self) -> Option<String> {
        match self {
            Self::Content(body) => Some(body),
            Self::NonSuccess(_) => None,
        }
    }
}

/// Network-level fetch failures
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Request timed out
    #[error("Timeout fetching: {0}")]
    Timeout(String),
    /// Connection, DNS or body read failure
    #[error("HTTP error: {0}")]
    Http(String),
    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Source of raw page markup
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the page at `url`
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError>;
}

/// `reqwest`-backed fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given timeout and user agent
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Fetcher with the default timeout and user agent
    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(
            Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            DEFAULT_USER_AGENT,
        )
    }

    fn map_error(url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(url.to_string())
        } else {
            FetchError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        debug!("Fetching page: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::map_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "Non-success status, skipping cycle");
            return Ok(FetchOutcome::NonSuccess(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Self::map_error(url, e))?;

        info!("Fetched {} bytes from: {}", body.len(), url);
        Ok(FetchOutcome::Content(body))
    }
}
