// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Fabstir Page Monitor

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-sentence-diff-2025-10-19";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.1.0";

/// Build date
pub const BUILD_DATE: &str = "2025-10-19";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "selector-scoped-extraction",
    "sentence-diff",
    "file-baselines",
    "skip-if-running",
    "webhook-notifications",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir Page Monitor {} ({})", VERSION_NUMBER, BUILD_DATE)
}

/// Get full version info as JSON
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "build": VERSION,
        "date": BUILD_DATE,
        "features": FEATURES,
    })
}
