use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::core::backend::{AnalyticsBackend, UploadFile};
use crate::core::notice::Notice;
use crate::core::suggestion;
use crate::session::event::{Completion, Flow};
use crate::session::state::SessionState;
use crate::upload;

/// Drives a [`SessionState`] against an analytics backend.
///
/// Requests run as spawned tasks and report back over a channel; their
/// completions are applied one at a time by [`Controller::apply`], so the
/// state is only ever touched from the owning task.
pub struct Controller {
    state: SessionState,
    backend: Arc<dyn AnalyticsBackend>,
    tx: mpsc::Sender<Completion>,
    rx: mpsc::Receiver<Completion>,
    outstanding: usize,
    cancel: CancellationToken,
}

impl Controller {
    pub fn new(backend: Arc<dyn AnalyticsBackend>, greeting: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel(64);
        Self {
            state: SessionState::new(greeting),
            backend,
            tx,
            rx,
            outstanding: 0,
            cancel: CancellationToken::new(),
        }
    }

    /// Issue the initial metrics load.
    pub fn start(&mut self) {
        tracing::info!(session_id = %self.state.id(), "session started");
        self.refresh_metrics();
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn backend(&self) -> Arc<dyn AnalyticsBackend> {
        Arc::clone(&self.backend)
    }

    pub fn is_idle(&self) -> bool {
        self.outstanding == 0
    }

    // ─── User intents ────────────────────────────────

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.state.set_draft(text);
    }

    pub fn set_suggestions_visible(&mut self, visible: bool) -> bool {
        self.state.set_suggestions_visible(visible)
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.state.push_notice(notice);
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.state.drain_notices()
    }

    /// Send the current draft. Returns false when nothing was sent.
    pub fn submit(&mut self) -> bool {
        match self.state.begin_analyze(None) {
            Some(question) => {
                self.spawn_analyze(question);
                true
            }
            None => false,
        }
    }

    /// Send suggested question `number` (1-based) regardless of the draft.
    pub fn submit_suggestion(&mut self, number: usize) -> bool {
        let Some(suggestion) = suggestion::by_number(number) else {
            return false;
        };
        match self.state.begin_analyze(Some(suggestion.text)) {
            Some(question) => {
                self.spawn_analyze(question);
                true
            }
            None => false,
        }
    }

    pub fn trigger_sync(&mut self) -> bool {
        if !self.state.begin_sync() {
            tracing::debug!(session_id = %self.state.id(), "sync already in flight");
            return false;
        }
        let backend = Arc::clone(&self.backend);
        self.spawn(Flow::Sync, async move { Completion::Sync(backend.sync().await) });
        true
    }

    pub fn refresh_metrics(&mut self) -> u64 {
        let seq = self.state.begin_metrics();
        let backend = Arc::clone(&self.backend);
        self.spawn(Flow::Metrics, async move {
            Completion::Metrics {
                seq,
                result: backend.metrics().await,
            }
        });
        seq
    }

    /// Send an already-admitted file. Returns false while another upload is in flight.
    pub fn upload(&mut self, file: UploadFile) -> bool {
        if let Err(err) = upload::check_admission(&file.file_name, file.bytes.len() as u64) {
            self.state.reject_upload(&err);
            return false;
        }
        if !self.state.begin_upload() {
            self.state
                .push_notice(Notice::info("An upload is already in progress"));
            return false;
        }
        tracing::info!(session_id = %self.state.id(), file = %file.file_name, "uploading spreadsheet");
        let backend = Arc::clone(&self.backend);
        self.spawn(Flow::Upload, async move {
            Completion::Upload(backend.upload(file).await)
        });
        true
    }

    pub async fn upload_path(&mut self, path: &Path) -> bool {
        match upload::load(path).await {
            Ok(file) => self.upload(file),
            Err(err) => {
                tracing::warn!(session_id = %self.state.id(), error = %err, "upload rejected");
                self.state.reject_upload(&err);
                false
            }
        }
    }

    // ─── Completions ─────────────────────────────────

    /// Next completion, or `None` once nothing is outstanding.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if self.outstanding == 0 {
            return None;
        }
        self.rx.recv().await
    }

    /// Like [`Controller::next_completion`] but stays pending while idle,
    /// for use as a `select!` branch.
    pub async fn recv(&mut self) -> Completion {
        match self.next_completion().await {
            Some(completion) => completion,
            None => std::future::pending().await,
        }
    }

    pub fn apply(&mut self, completion: Completion) -> Flow {
        self.outstanding = self.outstanding.saturating_sub(1);
        let flow = completion.flow();
        tracing::debug!(session_id = %self.state.id(), %flow, ok = completion.is_ok(), "request completed");

        match completion {
            Completion::Analyze(result) => self.state.finish_analyze(result),
            Completion::Sync(result) => {
                if self.state.finish_sync(result) {
                    self.refresh_metrics();
                }
            }
            Completion::Metrics { seq, result } => self.state.finish_metrics(seq, result),
            Completion::Upload(result) => {
                if self.state.finish_upload(result) {
                    self.trigger_sync();
                }
            }
        }
        flow
    }

    /// Apply completions until no request is outstanding, follow-ups included.
    pub async fn settle(&mut self) {
        while let Some(completion) = self.next_completion().await {
            self.apply(completion);
        }
    }

    /// Abandon every outstanding request. Late results are never applied.
    pub fn shutdown(&mut self) {
        if self.outstanding > 0 {
            tracing::debug!(session_id = %self.state.id(), outstanding = self.outstanding, "cancelling requests");
        }
        self.cancel.cancel();
        self.outstanding = 0;
        while self.rx.try_recv().is_ok() {}
    }

    fn spawn_analyze(&mut self, question: String) {
        tracing::info!(session_id = %self.state.id(), chars = question.len(), "analyzing question");
        let backend = Arc::clone(&self.backend);
        self.spawn(Flow::Analyze, async move {
            Completion::Analyze(backend.analyze(&question).await)
        });
    }

    fn spawn<F>(&mut self, flow: Flow, request: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        self.outstanding += 1;
        let tx = self.tx.clone();
        let cancel = self.cancel.clone();
        let span = tracing::debug_span!("request", session_id = %self.state.id(), %flow);

        tokio::spawn(
            async move {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::debug!("request abandoned");
                    }
                    completion = request => {
                        let _ = tx.send(completion).await;
                    }
                }
            }
            .instrument(span),
        );
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
