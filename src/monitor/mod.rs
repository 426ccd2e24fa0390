// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Page change monitoring
//!
//! Periodically fetches a page and reports sentences that were not present
//! in the stored baseline.
//!
//! ## Architecture
//!
//! ```text
//! MonitorService (interval) → ChangeChecker → PageFetcher → HTML
//!                                  ↓
//!                  extract → segment → diff ← BaselineStore
//!                                  ↓
//!                             Notifier (on change or failure)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let config = MonitorConfig::from_env()?;
//! let service = Arc::new(MonitorService::from_config(config)?);
//! service.run(CancellationToken::new()).await;
//! ```

pub mod checker;
pub mod config;
pub mod diff;
pub mod extractor;
pub mod fetcher;
pub mod notifier;
pub mod segmenter;
pub mod service;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use checker::ChangeChecker;
pub use config::{ConfigError, MonitorConfig};
pub use diff::diff;
pub use extractor::{extract, ContentSelector, Extraction, ExtractionSource};
pub use fetcher::{FetchError, FetchOutcome, HttpFetcher, PageFetcher};
pub use notifier::{LogNotifier, Notification, NotificationKind, Notifier, NotifyError, WebhookNotifier};
pub use segmenter::segment;
pub use service::{CycleReport, MonitorService};
pub use store::{baseline_key, BaselineStore, FileBaselineStore, MemoryBaselineStore, StoreError};
pub use types::{
    ComparisonOutcome, ContentSnapshot, MonitorError, MonitoredTarget, BASELINE_SAVED_MESSAGE,
};
