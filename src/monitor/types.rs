// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for page change monitoring

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::fetcher::FetchError;
use super::store::StoreError;

/// Delimiter used to join newly found sentences into a digest
pub const DIGEST_DELIMITER: &str = ". ";

/// Informational text returned when a first observation is stored
pub const BASELINE_SAVED_MESSAGE: &str = "Baseline saved — no notification on first check";

/// A page to monitor and how to scope its extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredTarget {
    /// URL of the page
    pub url: String,
    /// Optional content selector (`#id`, `.class` or a tag name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_selector: Option<String>,
}

impl MonitoredTarget {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_selector: None,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.content_selector = Some(selector.into());
        self
    }
}

/// One accepted observation of a page's content.
///
/// `sentences` is always the segmentation of `raw_text` and is never edited on its own.
/// Serialized field names match the on-disk baseline record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSnapshot {
    pub url: String,
    #[serde(rename = "content")]
    pub raw_text: String,
    #[serde(rename = "lastChecked")]
    pub observed_at: DateTime<Utc>,
    pub sentences: Vec<String>,
}

impl ContentSnapshot {
    /// Build a snapshot by segmenting the normalized text
    pub fn capture(url: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        let sentences = super::segmenter::segment(&raw_text);
        Self {
            url: url.into(),
            raw_text,
            observed_at: Utc::now(),
            sentences,
        }
    }
}

/// Result of a single check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonOutcome {
    /// Whether new sentences were found
    pub has_new_text: bool,
    /// Digest of new sentences, or an informational message
    pub new_text: String,
}

impl ComparisonOutcome {
    /// Nothing to report
    pub fn unchanged() -> Self {
        Self {
            has_new_text: false,
            new_text: String::new(),
        }
    }

    /// First observation stored as baseline
    pub fn baseline_saved() -> Self {
        Self {
            has_new_text: false,
            new_text: BASELINE_SAVED_MESSAGE.to_string(),
        }
    }

    /// New sentences found
    pub fn changed(new_sentences: &[String]) -> Self {
        Self {
            has_new_text: true,
            new_text: new_sentences.join(DIGEST_DELIMITER),
        }
    }
}

/// Stages of a check, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStage {
    Fetching,
    Extracting,
    Segmenting,
    Comparing,
    Baselining,
    Reporting,
}

impl std::fmt::Display for CheckStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Segmenting => "segmenting",
            Self::Comparing => "comparing",
            Self::Baselining => "baselining",
            Self::Reporting => "reporting",
        };
        f.write_str(name)
    }
}

/// Faults that abort a check cycle
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Network-level failure while fetching the page
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Baseline could not be written
    #[error("Baseline write failed: {0}")]
    Store(#[from] StoreError),

    /// Check was cancelled before completion
    #[error("Check cancelled for {url}")]
    Cancelled {
        /// URL of the cancelled check
        url: String,
    },
}
