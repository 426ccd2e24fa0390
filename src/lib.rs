// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod cli;
pub mod monitor;
pub mod version;

// Re-export main types
pub use monitor::{
    BaselineStore, ChangeChecker, ComparisonOutcome, ContentSnapshot, FileBaselineStore,
    HttpFetcher, MonitorConfig, MonitorError, MonitorService, MonitoredTarget, Notifier,
    PageFetcher,
};
