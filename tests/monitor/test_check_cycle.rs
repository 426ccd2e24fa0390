// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, response::Html, routing::get, Router};
use fabstir_page_monitor::monitor::{
    ChangeChecker, CycleReport, FileBaselineStore, HttpFetcher, MonitorConfig, MonitorService,
    MonitoredTarget, Notification, NotificationKind, Notifier, NotifyError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const PAGES: [&str; 3] = [
    r#"<html><head><script>var x = "ignored script text here";</script></head>
       <body><nav>Home</nav><div id="news"><p>Release one is now available for download.</p></div></body></html>"#,
    r#"<html><body><nav>Home</nav><div id="news"><p>Release one is now available for download.</p>
       <p>Release two adds support for scheduled exports.</p></div></body></html>"#,
    r#"<html><body><div id="news"><p>Release two adds support for scheduled exports.</p>
       <p>Release one is now available for download.</p></div></body></html>"#,
];

#[derive(Clone)]
struct PageState {
    version: Arc<AtomicUsize>,
    unavailable: Arc<AtomicUsize>,
}

async fn page(State(state): State<PageState>) -> (StatusCode, Html<&'static str>) {
    if state.unavailable.load(Ordering::SeqCst) > 0 {
        return (StatusCode::SERVICE_UNAVAILABLE, Html("maintenance"));
    }
    let version = state.version.load(Ordering::SeqCst).min(PAGES.len() - 1);
    (StatusCode::OK, Html(PAGES[version]))
}

async fn spawn_server(state: PageState) -> String {
    let app = Router::new().route("/news", get(page)).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/news", addr)
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(Notification, Vec<String>)>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification, recipients: &[String]) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((notification.clone(), recipients.to_vec()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

struct Harness {
    _dir: TempDir,
    state: PageState,
    notifier: Arc<RecordingNotifier>,
    service: MonitorService,
}

async fn harness() -> Harness {
    let state = PageState {
        version: Arc::new(AtomicUsize::new(0)),
        unavailable: Arc::new(AtomicUsize::new(0)),
    };
    let url = spawn_server(state.clone()).await;
    let dir = TempDir::new().unwrap();

    let mut config = MonitorConfig::new(MonitoredTarget::new(url).with_selector("#news"));
    config.data_dir = dir.path().to_path_buf();
    config.recipients = vec!["ops@example.com".to_string()];

    let checker = ChangeChecker::new(
        Arc::new(HttpFetcher::with_defaults().unwrap()),
        Arc::new(FileBaselineStore::new(config.data_dir.clone())),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let service = MonitorService::new(config, checker, notifier.clone());

    Harness {
        _dir: dir,
        state,
        notifier,
        service,
    }
}

#[tokio::test]
async fn test_full_monitoring_lifecycle() {
    let h = harness().await;
    let token = CancellationToken::new();

    // First observation: baseline only
    let report = h.service.run_cycle(&token).await;
    assert!(matches!(report, CycleReport::Completed(ref o) if !o.has_new_text));
    assert!(h.notifier.sent.lock().unwrap().is_empty());

    // Unchanged page
    let report = h.service.run_cycle(&token).await;
    assert!(matches!(report, CycleReport::Completed(ref o) if o.new_text.is_empty()));

    // New sentence appears
    h.state.version.store(1, Ordering::SeqCst);
    let report = h.service.run_cycle(&token).await;
    match report {
        CycleReport::Completed(outcome) => {
            assert!(outcome.has_new_text);
            assert_eq!(outcome.new_text, "release two adds support for scheduled exports");
        }
        other => panic!("unexpected report: {:?}", other),
    }
    {
        let sent = h.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0.kind, NotificationKind::ContentChanged);
        assert_eq!(sent[0].1, vec!["ops@example.com".to_string()]);
    }

    // Reordering alone is not new
    h.state.version.store(2, Ordering::SeqCst);
    let report = h.service.run_cycle(&token).await;
    assert!(matches!(report, CycleReport::Completed(ref o) if !o.has_new_text));
    assert_eq!(h.notifier.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unavailable_page_is_quiet() {
    let h = harness().await;
    h.state.unavailable.store(1, Ordering::SeqCst);

    let report = h.service.run_cycle(&CancellationToken::new()).await;
    match report {
        CycleReport::Completed(outcome) => {
            assert!(!outcome.has_new_text);
            assert_eq!(outcome.new_text, "");
        }
        other => panic!("unexpected report: {:?}", other),
    }
    assert!(h.notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_host_sends_error_notification() {
    let dir = TempDir::new().unwrap();
    let mut config = MonitorConfig::new(MonitoredTarget::new("http://127.0.0.1:9/news"));
    config.data_dir = dir.path().to_path_buf();

    let checker = ChangeChecker::new(
        Arc::new(HttpFetcher::with_defaults().unwrap()),
        Arc::new(FileBaselineStore::new(config.data_dir.clone())),
    );
    let notifier = Arc::new(RecordingNotifier::default());
    let service = MonitorService::new(config, checker, notifier.clone());

    let report = service.run_cycle(&CancellationToken::new()).await;
    assert!(matches!(report, CycleReport::Failed(_)));

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.kind, NotificationKind::CheckFailed);
    assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
}
