use std::collections::VecDeque;

use crate::core::backend::{AnalyzeReply, SyncReply, UploadReply};
use crate::core::error::{BackendError, UploadError};
use crate::core::message::Message;
use crate::core::metrics::{metric_cards, MetricCard, MetricsSnapshot};
use crate::core::notice::Notice;

pub const DEFAULT_SYNC_CONFIRMATION: &str = "Sync complete!";

const ANALYZE_APOLOGY: &str = "Sorry, something went wrong while processing your question. \
Check that the database is configured correctly.";

/// Conversation and dashboard state for one session.
///
/// Every field changes only through the transition methods below, each of
/// which performs one complete update. `begin_*` methods run when a request
/// is issued and `finish_*` methods when its outcome is observed.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: String,
    messages: Vec<Message>,
    draft: String,
    is_analyzing: bool,
    is_syncing: bool,
    is_uploading: bool,
    suggestions_open: bool,
    metrics: Option<MetricsSnapshot>,
    metrics_pending: usize,
    metrics_issued: u64,
    metrics_applied: u64,
    notices: VecDeque<Notice>,
}

impl SessionState {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            messages: vec![Message::new_assistant(greeting)],
            draft: String::new(),
            is_analyzing: false,
            is_syncing: false,
            is_uploading: false,
            suggestions_open: true,
            metrics: None,
            metrics_pending: 0,
            metrics_issued: 0,
            metrics_applied: 0,
            notices: VecDeque::new(),
        }
    }

    // ─── Reads ───────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_analyzing(&self) -> bool {
        self.is_analyzing
    }

    pub fn is_syncing(&self) -> bool {
        self.is_syncing
    }

    pub fn is_uploading(&self) -> bool {
        self.is_uploading
    }

    pub fn metrics_loading(&self) -> bool {
        self.metrics_pending > 0
    }

    pub fn metrics(&self) -> Option<&MetricsSnapshot> {
        self.metrics.as_ref()
    }

    pub fn metric_cards(&self) -> [MetricCard; 4] {
        metric_cards(self.metrics.as_ref(), self.metrics_loading())
    }

    /// Suggestions are hidden while a question is in flight, whatever the user chose.
    pub fn suggestions_visible(&self) -> bool {
        self.suggestions_open && !self.is_analyzing
    }

    pub fn has_user_turn(&self) -> bool {
        self.messages.iter().any(Message::is_user)
    }

    // ─── Local transitions ───────────────────────────

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Explicit user toggle. Ignored until the conversation has a user turn.
    pub fn set_suggestions_visible(&mut self, visible: bool) -> bool {
        if !self.has_user_turn() {
            return false;
        }
        self.suggestions_open = visible;
        true
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // ─── Analyze flow ────────────────────────────────

    /// Start a turn from `question`, or from the draft when `None`.
    /// Returns the text to send, or `None` when nothing should be sent.
    pub fn begin_analyze(&mut self, question: Option<&str>) -> Option<String> {
        if self.is_analyzing {
            return None;
        }
        let text = question.unwrap_or(&self.draft).trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.messages.push(Message::new_user(text.clone()));
        self.draft.clear();
        self.is_analyzing = true;
        self.suggestions_open = false;
        Some(text)
    }

    pub fn finish_analyze(&mut self, outcome: Result<AnalyzeReply, BackendError>) {
        if !self.is_analyzing {
            tracing::warn!(session_id = %self.id, "analyze completion without a request in flight");
            return;
        }

        match outcome {
            Ok(reply) => {
                self.messages.push(Message::new_assistant(reply.answer));
                if let Some(files) = reply.files_processed.filter(|n| *n > 0) {
                    let records = reply.records_analyzed.unwrap_or(0);
                    self.push_notice(Notice::success(format!(
                        "Analyzed {records} records from {files} spreadsheet(s)"
                    )));
                }
            }
            Err(err) => {
                tracing::warn!(session_id = %self.id, error = %err, "analyze failed");
                let (content, notice) = match &err {
                    BackendError::Application { message, details } => {
                        let content = match details {
                            Some(details) => format!("Error: {message}. {details}"),
                            None => format!("Error: {message}."),
                        };
                        (content, message.clone())
                    }
                    BackendError::Transport(_) => (
                        ANALYZE_APOLOGY.to_string(),
                        "Could not reach the analytics server. Check your connection.".to_string(),
                    ),
                    _ => (
                        ANALYZE_APOLOGY.to_string(),
                        "Error processing your question. Check the configuration.".to_string(),
                    ),
                };
                self.messages.push(Message::new_assistant(content));
                self.push_notice(Notice::error(notice));
            }
        }
        self.is_analyzing = false;
    }

    // ─── Sync flow ───────────────────────────────────

    pub fn begin_sync(&mut self) -> bool {
        if self.is_syncing {
            return false;
        }
        self.is_syncing = true;
        true
    }

    /// Returns whether a metrics refresh must follow.
    pub fn finish_sync(&mut self, outcome: Result<SyncReply, BackendError>) -> bool {
        if !self.is_syncing {
            tracing::warn!(session_id = %self.id, "sync completion without a request in flight");
            return false;
        }
        self.is_syncing = false;

        match outcome {
            Ok(reply) => {
                let text = reply
                    .message
                    .unwrap_or_else(|| DEFAULT_SYNC_CONFIRMATION.to_string());
                self.messages.push(Message::new_assistant(text));
                self.push_notice(Notice::success("Data synced successfully!"));
                true
            }
            Err(err) => {
                tracing::warn!(session_id = %self.id, error = %err, "sync failed");
                let text = match err.backend_message() {
                    Some(message) => format!("Error syncing data: {message}"),
                    None if err.is_transport() => {
                        "Connection error while syncing data".to_string()
                    }
                    None => "Error syncing data".to_string(),
                };
                self.push_notice(Notice::error(text));
                false
            }
        }
    }

    // ─── Metrics sub-flow ────────────────────────────

    /// Register a metrics request and return its sequence number.
    pub fn begin_metrics(&mut self) -> u64 {
        self.metrics_pending += 1;
        self.metrics_issued += 1;
        self.metrics_issued
    }

    pub fn finish_metrics(&mut self, seq: u64, outcome: Result<MetricsSnapshot, BackendError>) {
        self.metrics_pending = self.metrics_pending.saturating_sub(1);

        match outcome {
            Ok(snapshot) if seq > self.metrics_applied => {
                self.metrics = Some(snapshot);
                self.metrics_applied = seq;
            }
            Ok(_) => {
                tracing::debug!(session_id = %self.id, seq, applied = self.metrics_applied, "stale metrics discarded");
            }
            Err(err) => {
                tracing::warn!(session_id = %self.id, error = %err, "metrics failed");
                let text = match err.backend_message() {
                    Some(message) => format!("Error loading metrics: {message}"),
                    None => "Error loading metrics. Check the configuration.".to_string(),
                };
                self.push_notice(Notice::error(text));
            }
        }
    }

    // ─── Upload flow ─────────────────────────────────

    pub fn begin_upload(&mut self) -> bool {
        if self.is_uploading {
            return false;
        }
        self.is_uploading = true;
        true
    }

    /// A file that failed client-side admission. No request was made.
    pub fn reject_upload(&mut self, err: &UploadError) {
        self.push_notice(Notice::error(err.to_string()));
    }

    /// Returns whether a sync must follow.
    pub fn finish_upload(&mut self, outcome: Result<UploadReply, BackendError>) -> bool {
        if !self.is_uploading {
            tracing::warn!(session_id = %self.id, "upload completion without a request in flight");
            return false;
        }
        self.is_uploading = false;

        match outcome {
            Ok(reply) => {
                self.push_notice(Notice::success(format!(
                    "{} rows imported! Data refreshed and ready for analysis.",
                    reply.rows_imported
                )));
                true
            }
            Err(err) => {
                tracing::warn!(session_id = %self.id, error = %err, "upload failed");
                let text = match err.backend_message() {
                    Some(message) => message.to_string(),
                    None if err.is_transport() => "Connection error while uploading".to_string(),
                    None => "Upload failed".to_string(),
                };
                self.push_notice(Notice::error(text));
                false
            }
        }
    }
}
