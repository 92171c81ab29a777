use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::state::{SessionState, DEFAULT_SYNC_CONFIRMATION};
use super::*;
use crate::core::backend::*;
use crate::core::error::{BackendError, UploadError};
use crate::core::message::MessageRole;
use crate::core::metrics::{BestMonth, MetricsSnapshot, TopProduct, LOADING_PLACEHOLDER};
use crate::core::notice::NoticeLevel;
use crate::core::suggestion::SUGGESTED_QUESTIONS;

fn snapshot(product: &str) -> MetricsSnapshot {
    MetricsSnapshot {
        best_month: BestMonth {
            name: "March".into(),
            value: "R$ 12.000,00".into(),
        },
        top_product: TopProduct {
            name: product.into(),
            quantity: 42,
        },
        distinct_product_count: 7,
        total_revenue: "R$ 98.765,43".into(),
        files_processed: 3,
        records_analyzed: 1200,
        last_updated: "14/10/2026 09:30".into(),
    }
}

fn answer(text: &str) -> AnalyzeReply {
    AnalyzeReply {
        answer: text.into(),
        files_processed: None,
        records_analyzed: None,
    }
}

struct MockBackend {
    analyze: Mutex<Result<AnalyzeReply, BackendError>>,
    sync: Mutex<Result<SyncReply, BackendError>>,
    metrics: Mutex<Result<MetricsSnapshot, BackendError>>,
    upload: Mutex<Result<UploadReply, BackendError>>,
    questions: Mutex<Vec<String>>,
    sync_calls: AtomicUsize,
    metrics_calls: AtomicUsize,
    upload_calls: AtomicUsize,
}

impl MockBackend {
    fn new() -> Self {
        Self {
            analyze: Mutex::new(Ok(answer("Revenue was **R$ 10**"))),
            sync: Mutex::new(Ok(SyncReply {
                message: Some("3 files synced".into()),
            })),
            metrics: Mutex::new(Ok(snapshot("Widget"))),
            upload: Mutex::new(Ok(UploadReply {
                rows_imported: 150,
                message: None,
            })),
            questions: Mutex::new(Vec::new()),
            sync_calls: AtomicUsize::new(0),
            metrics_calls: AtomicUsize::new(0),
            upload_calls: AtomicUsize::new(0),
        }
    }

    fn with_analyze(self, result: Result<AnalyzeReply, BackendError>) -> Self {
        *self.analyze.lock().unwrap() = result;
        self
    }

    fn with_sync(self, result: Result<SyncReply, BackendError>) -> Self {
        *self.sync.lock().unwrap() = result;
        self
    }

    fn with_metrics(self, result: Result<MetricsSnapshot, BackendError>) -> Self {
        *self.metrics.lock().unwrap() = result;
        self
    }

    fn with_upload(self, result: Result<UploadReply, BackendError>) -> Self {
        *self.upload.lock().unwrap() = result;
        self
    }
}

#[async_trait]
impl AnalyticsBackend for MockBackend {
    async fn analyze(&self, question: &str) -> Result<AnalyzeReply, BackendError> {
        self.questions.lock().unwrap().push(question.to_string());
        self.analyze.lock().unwrap().clone()
    }

    async fn sync(&self) -> Result<SyncReply, BackendError> {
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        self.sync.lock().unwrap().clone()
    }

    async fn metrics(&self) -> Result<MetricsSnapshot, BackendError> {
        self.metrics_calls.fetch_add(1, Ordering::SeqCst);
        self.metrics.lock().unwrap().clone()
    }

    async fn upload(&self, _file: UploadFile) -> Result<UploadReply, BackendError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.upload.lock().unwrap().clone()
    }

    async fn health(&self) -> Result<HealthReply, BackendError> {
        Ok(HealthReply {
            status: "ok".into(),
            message: None,
        })
    }

    async fn monthly_metrics(&self) -> Result<MonthlyMetrics, BackendError> {
        Ok(MonthlyMetrics {
            no_data: true,
            months: Vec::new(),
        })
    }

    async fn database_stats(&self) -> Result<DatabaseStats, BackendError> {
        Ok(DatabaseStats {
            total_records: 0,
            last_updated: None,
        })
    }
}

fn controller(mock: MockBackend) -> (Controller, Arc<MockBackend>) {
    let mock = Arc::new(mock);
    let backend: Arc<dyn AnalyticsBackend> = mock.clone();
    (Controller::new(backend, "Hello!"), mock)
}

fn csv(name: &str) -> UploadFile {
    UploadFile {
        file_name: name.into(),
        bytes: b"date,product,quantity\n".to_vec(),
    }
}

// ─── Analyze ─────────────────────────────────────────

#[tokio::test]
async fn test_blank_draft_is_not_sent() {
    let (mut ctl, mock) = controller(MockBackend::new());
    ctl.set_draft("   \n\t");

    assert!(!ctl.submit());
    assert!(ctl.is_idle());
    assert!(!ctl.state().is_analyzing());
    assert_eq!(ctl.state().messages().len(), 1);
    assert!(mock.questions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_appends_turn_and_answer() {
    let (mut ctl, mock) = controller(MockBackend::new());
    ctl.set_draft("  best month?  ");

    assert!(ctl.submit());
    assert!(ctl.state().is_analyzing());
    assert!(ctl.state().draft().is_empty());
    assert_eq!(ctl.state().messages()[1].content(), "best month?");

    ctl.settle().await;

    let messages = ctl.state().messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].content(), "Hello!");
    assert_eq!(messages[1].role(), MessageRole::User);
    assert_eq!(messages[2].role(), MessageRole::Assistant);
    assert_eq!(messages[2].content(), "Revenue was **R$ 10**");
    assert!(!ctl.state().is_analyzing());
    assert_eq!(*mock.questions.lock().unwrap(), vec!["best month?".to_string()]);
}

#[tokio::test]
async fn test_application_error_becomes_assistant_message() {
    let (mut ctl, _) = controller(MockBackend::new().with_analyze(Err(
        BackendError::Application {
            message: "Database not configured".into(),
            details: Some("Run a sync first".into()),
        },
    )));
    ctl.set_draft("total?");
    ctl.submit();
    ctl.settle().await;

    let last = ctl.state().messages().last().unwrap();
    assert_eq!(last.role(), MessageRole::Assistant);
    assert_eq!(last.content(), "Error: Database not configured. Run a sync first");
    assert!(!ctl.state().is_analyzing());

    let notices = ctl.drain_notices();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].is_error());
    assert_eq!(notices[0].text, "Database not configured");
}

#[tokio::test]
async fn test_transport_error_apologizes() {
    let (mut ctl, _) = controller(
        MockBackend::new().with_analyze(Err(BackendError::Transport("refused".into()))),
    );
    ctl.set_draft("total?");
    ctl.submit();
    ctl.settle().await;

    let last = ctl.state().messages().last().unwrap();
    assert!(last.content().starts_with("Sorry"));
    let notices = ctl.drain_notices();
    assert!(notices[0].text.contains("connection"));
}

#[tokio::test]
async fn test_second_submit_while_analyzing_is_ignored() {
    let (mut ctl, mock) = controller(MockBackend::new());
    ctl.set_draft("first");
    assert!(ctl.submit());
    ctl.set_draft("second");
    assert!(!ctl.submit());
    assert_eq!(ctl.state().draft(), "second");

    ctl.settle().await;
    assert_eq!(mock.questions.lock().unwrap().len(), 1);
    assert_eq!(ctl.state().messages().len(), 3);
}

#[tokio::test]
async fn test_files_processed_raises_notice() {
    let (mut ctl, _) = controller(MockBackend::new().with_analyze(Ok(AnalyzeReply {
        answer: "done".into(),
        files_processed: Some(2),
        records_analyzed: Some(340),
    })));
    ctl.set_draft("q");
    ctl.submit();
    ctl.settle().await;

    let notices = ctl.drain_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[0].text, "Analyzed 340 records from 2 spreadsheet(s)");
}

#[test]
fn test_stray_analyze_completion_is_ignored() {
    let mut state = SessionState::new("hi");
    state.finish_analyze(Ok(answer("late")));
    assert_eq!(state.messages().len(), 1);
}

// ─── Suggestions ─────────────────────────────────────

#[tokio::test]
async fn test_suggestions_visibility() {
    let (mut ctl, _) = controller(MockBackend::new());
    assert!(ctl.state().suggestions_visible());

    // No user turn yet
    assert!(!ctl.set_suggestions_visible(false));
    assert!(ctl.state().suggestions_visible());

    ctl.set_draft("q");
    ctl.submit();
    assert!(!ctl.state().suggestions_visible());
    ctl.settle().await;
    assert!(!ctl.state().suggestions_visible());

    assert!(ctl.set_suggestions_visible(true));
    assert!(ctl.state().suggestions_visible());

    ctl.set_draft("again");
    ctl.submit();
    assert!(!ctl.state().suggestions_visible());
    ctl.settle().await;
}

#[tokio::test]
async fn test_submit_suggestion_ignores_draft() {
    let (mut ctl, mock) = controller(MockBackend::new());
    ctl.set_draft("half-typed");

    assert!(ctl.submit_suggestion(3));
    assert!(ctl.state().draft().is_empty());
    ctl.settle().await;

    assert_eq!(
        *mock.questions.lock().unwrap(),
        vec![SUGGESTED_QUESTIONS[2].text.to_string()]
    );
    assert!(!ctl.submit_suggestion(0));
    assert!(!ctl.submit_suggestion(SUGGESTED_QUESTIONS.len() + 1));
}

// ─── Sync and metrics ────────────────────────────────

#[tokio::test]
async fn test_sync_refreshes_metrics_once() {
    let (mut ctl, mock) = controller(MockBackend::new());
    assert!(ctl.trigger_sync());
    assert!(ctl.state().is_syncing());
    assert!(!ctl.trigger_sync());

    ctl.settle().await;

    assert!(!ctl.state().is_syncing());
    assert_eq!(mock.sync_calls.load(Ordering::SeqCst), 1);
    assert_eq!(mock.metrics_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ctl.state().messages().last().unwrap().content(), "3 files synced");
    assert_eq!(ctl.state().metrics(), Some(&snapshot("Widget")));
}

#[tokio::test]
async fn test_failed_sync_skips_metrics() {
    let (mut ctl, mock) = controller(
        MockBackend::new().with_sync(Err(BackendError::Application {
            message: "Excel folder not found".into(),
            details: None,
        })),
    );
    ctl.trigger_sync();
    ctl.settle().await;

    assert!(!ctl.state().is_syncing());
    assert_eq!(mock.metrics_calls.load(Ordering::SeqCst), 0);
    assert_eq!(ctl.state().messages().len(), 1);
    let notices = ctl.drain_notices();
    assert_eq!(notices[0].text, "Error syncing data: Excel folder not found");
}

#[tokio::test]
async fn test_sync_without_message_uses_default() {
    let (mut ctl, _) = controller(MockBackend::new().with_sync(Ok(SyncReply { message: None })));
    ctl.trigger_sync();
    ctl.settle().await;
    assert_eq!(
        ctl.state().messages().last().unwrap().content(),
        DEFAULT_SYNC_CONFIRMATION
    );
}

#[tokio::test]
async fn test_metrics_failure_keeps_snapshot() {
    let (mut ctl, mock) = controller(MockBackend::new());
    ctl.start();
    ctl.settle().await;
    assert_eq!(ctl.state().metrics(), Some(&snapshot("Widget")));

    *mock.metrics.lock().unwrap() = Err(BackendError::Transport("down".into()));
    ctl.refresh_metrics();
    ctl.settle().await;

    assert_eq!(ctl.state().metrics(), Some(&snapshot("Widget")));
    assert!(!ctl.state().metrics_loading());
    assert!(ctl.drain_notices().iter().any(|n| n.is_error()));
}

#[tokio::test]
async fn test_cards_show_placeholder_while_loading() {
    let (mut ctl, _) = controller(
        MockBackend::new().with_metrics(Err(BackendError::Decode("bad".into()))),
    );
    ctl.start();
    assert!(ctl
        .state()
        .metric_cards()
        .iter()
        .all(|c| c.value == LOADING_PLACEHOLDER));

    ctl.settle().await;
    let cards = ctl.state().metric_cards();
    assert_eq!(cards[0].value, "N/A");
    assert_eq!(cards[2].value, "R$ 0,00");
}

#[test]
fn test_stale_metrics_are_discarded() {
    let mut state = SessionState::new("hi");
    let first = state.begin_metrics();
    let second = state.begin_metrics();

    state.finish_metrics(second, Ok(snapshot("Newer")));
    state.finish_metrics(first, Ok(snapshot("Older")));

    assert_eq!(state.metrics().unwrap().top_product.name, "Newer");
    assert!(!state.metrics_loading());
}

// ─── Upload ──────────────────────────────────────────

#[tokio::test]
async fn test_upload_chains_sync_and_metrics() {
    let (mut ctl, mock) = controller(MockBackend::new());
    assert!(ctl.upload(csv("march.csv")));
    assert!(ctl.state().is_uploading());

    ctl.settle().await;

    assert!(!ctl.state().is_uploading());
    assert_eq!(mock.upload_calls.load(Ordering::SeqCst), 1);
    assert_eq!(mock.sync_calls.load(Ordering::SeqCst), 1);
    assert_eq!(mock.metrics_calls.load(Ordering::SeqCst), 1);
    let notices = ctl.drain_notices();
    assert!(notices[0].text.starts_with("150 rows imported"));
}

#[tokio::test]
async fn test_failed_upload_does_not_sync() {
    let (mut ctl, mock) = controller(MockBackend::new().with_upload(Err(BackendError::Api {
        status: 500,
        message: "request failed".into(),
    })));
    ctl.upload(csv("march.xlsx"));
    ctl.settle().await;

    assert_eq!(mock.sync_calls.load(Ordering::SeqCst), 0);
    assert!(ctl.drain_notices()[0].is_error());
}

#[tokio::test]
async fn test_rejected_upload_makes_no_request() {
    let (mut ctl, mock) = controller(MockBackend::new());
    assert!(!ctl.upload(csv("notes.txt")));
    assert!(ctl.is_idle());
    assert_eq!(mock.upload_calls.load(Ordering::SeqCst), 0);

    let tmp = tempfile::tempdir().unwrap();
    assert!(!ctl.upload_path(&tmp.path().join("missing.csv")).await);
    assert_eq!(mock.upload_calls.load(Ordering::SeqCst), 0);
    assert_eq!(ctl.drain_notices().len(), 2);
}

#[test]
fn test_reject_upload_notice_text() {
    let mut state = SessionState::new("hi");
    state.reject_upload(&UploadError::UnsupportedType {
        extension: ".pdf".into(),
    });
    let notices = state.drain_notices();
    assert!(notices[0].text.contains(".pdf"));
    assert!(!state.is_uploading());
}

// ─── Concurrency ─────────────────────────────────────

#[tokio::test]
async fn test_flows_run_concurrently() {
    let (mut ctl, _) = controller(MockBackend::new());
    ctl.set_draft("q");
    assert!(ctl.submit());
    assert!(ctl.trigger_sync());
    assert!(ctl.upload(csv("april.csv")));

    assert!(ctl.state().is_analyzing());
    assert!(ctl.state().is_syncing());
    assert!(ctl.state().is_uploading());

    ctl.settle().await;

    assert!(!ctl.state().is_analyzing());
    assert!(!ctl.state().is_syncing());
    assert!(!ctl.state().is_uploading());
    assert!(ctl.is_idle());
}

#[tokio::test]
async fn test_shutdown_abandons_requests() {
    let (mut ctl, _) = controller(MockBackend::new());
    ctl.set_draft("q");
    ctl.submit();
    ctl.shutdown();

    assert!(ctl.is_idle());
    assert!(ctl.next_completion().await.is_none());
}
