// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Check orchestration
//!
//! One check runs `Fetching → Extracting → Segmenting → Comparing` and ends in
//! either `Baselining` (first observation or new sentences) or `Reporting`.
//! The baseline is only rewritten when something new was found.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::diff::diff;
use super::extractor::{extract, ExtractionSource};
use super::fetcher::PageFetcher;
use super::store::BaselineStore;
use super::types::{CheckStage, ComparisonOutcome, ContentSnapshot, MonitorError, MonitoredTarget};

/// Composes fetcher, extractor, segmenter, diff and store into one check
pub struct ChangeChecker {
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn BaselineStore>,
}

impl ChangeChecker {
    pub fn new(fetcher: Arc<dyn PageFetcher>, store: Arc<dyn BaselineStore>) -> Self {
        Self { fetcher, store }
    }

    pub fn store(&self) -> &Arc<dyn BaselineStore> {
        &self.store
    }

    /// Run one check for `target`
    pub async fn check(&self, target: &MonitoredTarget) -> Result<ComparisonOutcome, MonitorError> {
        self.check_with_cancellation(target, &CancellationToken::new())
            .await
    }

    /// Run one check, aborting the fetch if `cancel_token` fires.
    ///
    /// Cancellation is only observed while fetching; once content is in hand
    /// the check runs to completion so a baseline is never half-written.
    pub async fn check_with_cancellation(
        &self,
        target: &MonitoredTarget,
        cancel_token: &CancellationToken,
    ) -> Result<ComparisonOutcome, MonitorError> {
        let url = target.url.as_str();
        debug!(url = %url, stage = %CheckStage::Fetching, "Starting check");

        let fetched = tokio::select! {
            result = self.fetcher.fetch(url) => result?,
            _ = cancel_token.cancelled() => {
                warn!(url = %url, "Check cancelled during fetch");
                return Err(MonitorError::Cancelled { url: url.to_string() });
            }
        };

        let Some(markup) = fetched.into_content() else {
            return Ok(ComparisonOutcome::unchanged());
        };

        debug!(url = %url, stage = %CheckStage::Extracting);
        let extraction = extract(&markup, target.content_selector.as_deref());
        if extraction.source == ExtractionSource::SelectorMissed {
            warn!(
                url = %url,
                selector = target.content_selector.as_deref().unwrap_or_default(),
                "Content selector not found, compared whole document"
            );
        }

        debug!(url = %url, stage = %CheckStage::Segmenting);
        let current = ContentSnapshot::capture(url, extraction.text);

        debug!(url = %url, stage = %CheckStage::Comparing);
        let Some(previous) = self.store.get(url).await else {
            debug!(url = %url, stage = %CheckStage::Baselining);
            self.store.put(url, &current).await?;
            info!(
                url = %url,
                sentences = current.sentences.len(),
                "First observation stored as baseline"
            );
            return Ok(ComparisonOutcome::baseline_saved());
        };

        let new_sentences = diff(&current.sentences, &previous.sentences);
        if new_sentences.is_empty() {
            debug!(url = %url, stage = %CheckStage::Reporting, "No new content");
            return Ok(ComparisonOutcome::unchanged());
        }

        debug!(url = %url, stage = %CheckStage::Baselining);
        self.store.put(url, &current).await?;
        info!(
            url = %url,
            new_sentences = new_sentences.len(),
            "New content detected, baseline updated"
        );

        debug!(url = %url, stage = %CheckStage::Reporting);
        Ok(ComparisonOutcome::changed(&new_sentences))
    }
}
