// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use fabstir_page_monitor::monitor::{
    BaselineStore, ChangeChecker, ContentSnapshot, FetchError, FetchOutcome, FileBaselineStore,
    MonitoredTarget, PageFetcher, BASELINE_SAVED_MESSAGE,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const URL: &str = "https://example.com/reports?year=2025";

/// Returns whatever page was last set
struct SwitchableFetcher {
    page: Mutex<String>,
}

impl SwitchableFetcher {
    fn new(page: &str) -> Arc<Self> {
        Arc::new(Self {
            page: Mutex::new(page.to_string()),
        })
    }

    fn set(&self, page: &str) {
        *self.page.lock().unwrap() = page.to_string();
    }
}

#[async_trait]
impl PageFetcher for SwitchableFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchOutcome, FetchError> {
        Ok(FetchOutcome::Content(self.page.lock().unwrap().clone()))
    }
}

fn setup(page: &str) -> (TempDir, Arc<SwitchableFetcher>, Arc<FileBaselineStore>, ChangeChecker) {
    let temp_dir = TempDir::new().unwrap();
    let fetcher = SwitchableFetcher::new(page);
    let store = Arc::new(FileBaselineStore::new(temp_dir.path().join("baselines")));
    let checker = ChangeChecker::new(fetcher.clone(), store.clone());
    (temp_dir, fetcher, store, checker)
}

#[tokio::test]
async fn test_first_run_saves_baseline_regardless_of_content() {
    for page in ["", "<p>Short.</p>", "<p>A page with plenty of new and exciting content.</p>"] {
        let (_dir, _fetcher, store, checker) = setup(page);

        let outcome = checker.check(&MonitoredTarget::new(URL)).await.unwrap();
        assert!(!outcome.has_new_text);
        assert_eq!(outcome.new_text, BASELINE_SAVED_MESSAGE);
        assert!(store.record_path(URL).exists());
    }
}

#[tokio::test]
async fn test_identical_page_leaves_record_byte_identical() {
    let page = "<main><p>Nothing changes on this page between checks.</p></main>";
    let (_dir, _fetcher, store, checker) = setup(page);
    let target = MonitoredTarget::new(URL);

    checker.check(&target).await.unwrap();
    let before = std::fs::read(store.record_path(URL)).unwrap();

    let outcome = checker.check(&target).await.unwrap();
    assert!(!outcome.has_new_text);
    assert_eq!(outcome.new_text, "");
    assert_eq!(std::fs::read(store.record_path(URL)).unwrap(), before);
}

#[tokio::test]
async fn test_cosmetic_change_keeps_last_checked() {
    let (_dir, fetcher, store, checker) = setup("<p>The schedule for next week is published.</p>");
    let target = MonitoredTarget::new(URL);

    checker.check(&target).await.unwrap();
    let before = store.get(URL).await.unwrap();

    // Case and whitespace churn only
    fetcher.set("<p>THE   schedule for next week\n is PUBLISHED!</p>");
    let outcome = checker.check(&target).await.unwrap();
    assert!(!outcome.has_new_text);

    let after = store.get(URL).await.unwrap();
    assert_eq!(after.observed_at, before.observed_at);
    assert_eq!(after.raw_text, before.raw_text);
}

#[tokio::test]
async fn test_quarterly_report_scenario() {
    let (_dir, _fetcher, store, checker) = setup(
        "<p>The quarterly report is now available for review.</p>\
         <p>Contact support for any questions regarding access.</p>",
    );
    let previous = ContentSnapshot {
        url: URL.to_string(),
        raw_text: "The quarterly report is now available for review.".to_string(),
        observed_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        sentences: vec!["the quarterly report is now available for review".to_string()],
    };
    store.put(URL, &previous).await.unwrap();

    let outcome = checker.check(&MonitoredTarget::new(URL)).await.unwrap();
    assert!(outcome.has_new_text);
    assert_eq!(outcome.new_text, "contact support for any questions regarding access");

    let rewritten = store.get(URL).await.unwrap();
    assert_eq!(
        rewritten.sentences,
        vec![
            "the quarterly report is now available for review",
            "contact support for any questions regarding access",
        ]
    );
    assert!(rewritten.observed_at > previous.observed_at);
}

#[tokio::test]
async fn test_corrupt_record_rebaselines() {
    let (_dir, _fetcher, store, checker) = setup("<p>Fresh content after a corrupted record.</p>");
    std::fs::create_dir_all(store.base_path()).unwrap();
    std::fs::write(store.record_path(URL), b"\x00\x01garbage").unwrap();

    let outcome = checker.check(&MonitoredTarget::new(URL)).await.unwrap();
    assert_eq!(outcome.new_text, BASELINE_SAVED_MESSAGE);
    assert!(store.get(URL).await.is_some());
}

#[tokio::test]
async fn test_record_schema_on_disk() {
    let (_dir, _fetcher, store, checker) = setup("<p>Record schema check sentence here.</p>");
    checker.check(&MonitoredTarget::new(URL)).await.unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.record_path(URL)).unwrap()).unwrap();
    assert_eq!(json["url"], URL);
    assert_eq!(json["content"], "Record schema check sentence here.");
    assert_eq!(json["sentences"][0], "record schema check sentence here");
    let last_checked = json["lastChecked"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(last_checked).is_ok());
}
