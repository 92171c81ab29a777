use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::core::backend::*;
use crate::core::error::BackendError;
use crate::core::metrics::MetricsSnapshot;

const ANALYZE_PATH: &str = "/api/analyze";
const SYNC_PATH: &str = "/api/sync-data";
const METRICS_PATH: &str = "/api/metrics";
const UPLOAD_PATH: &str = "/api/upload-data";
const HEALTH_PATH: &str = "/api/health";
const MONTHLY_PATH: &str = "/api/monthly-metrics";
const STATS_PATH: &str = "/api/database-stats";

/// JSON-over-HTTP client for the analytics backend.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<Value, BackendError> {
        tracing::debug!(path, "GET");
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        read_response(path, resp).await
    }

    async fn post(&self, path: &str, body: Option<Value>) -> Result<Value, BackendError> {
        tracing::debug!(path, "POST");
        let mut req = self
            .client
            .post(self.url(path))
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        read_response(path, resp).await
    }
}

async fn read_response(path: &str, resp: Response) -> Result<Value, BackendError> {
    let status = resp.status().as_u16();
    let text = resp
        .text()
        .await
        .map_err(|e| BackendError::Transport(e.to_string()))?;
    tracing::debug!(path, status, bytes = text.len(), "response");
    interpret(status, &text)
}

/// Classify a raw response. An `error` field wins over the status code so the
/// backend's own wording reaches the user.
pub(crate) fn interpret(status: u16, body: &str) -> Result<Value, BackendError> {
    let success = (200..300).contains(&status);
    let json: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) if success => return Err(BackendError::Decode(e.to_string())),
        Err(_) => {
            let message = body.trim();
            return Err(BackendError::Api {
                status,
                message: if message.is_empty() {
                    "request failed".into()
                } else {
                    message.chars().take(200).collect()
                },
            });
        }
    };

    if let Some(message) = non_empty_str(&json["error"]) {
        return Err(BackendError::Application {
            message: message.to_string(),
            details: non_empty_str(&json["details"]).map(str::to_string),
        });
    }
    if !success {
        return Err(BackendError::Api {
            status,
            message: "request failed".into(),
        });
    }
    Ok(json)
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn parse_analyze(json: &Value) -> Result<AnalyzeReply, BackendError> {
    let answer = non_empty_str(&json["answer"])
        .or_else(|| non_empty_str(&json["response"]))
        .ok_or_else(|| BackendError::Decode("response has no answer".into()))?;
    Ok(AnalyzeReply {
        answer: answer.to_string(),
        files_processed: json["files_processed"].as_u64(),
        records_analyzed: json["records_analyzed"].as_u64(),
    })
}

pub(crate) fn parse_sync(json: &Value) -> SyncReply {
    SyncReply {
        message: non_empty_str(&json["message"]).map(str::to_string),
    }
}

pub(crate) fn parse_upload(json: &Value) -> Result<UploadReply, BackendError> {
    let rows_imported = json["rows_imported"]
        .as_u64()
        .ok_or_else(|| BackendError::Decode("response has no rows_imported".into()))?;
    Ok(UploadReply {
        rows_imported,
        message: non_empty_str(&json["message"]).map(str::to_string),
    })
}

fn decode<T: DeserializeOwned>(json: Value) -> Result<T, BackendError> {
    serde_json::from_value(json).map_err(|e| BackendError::Decode(e.to_string()))
}

#[async_trait]
impl AnalyticsBackend for HttpBackend {
    async fn analyze(&self, question: &str) -> Result<AnalyzeReply, BackendError> {
        let body = serde_json::json!({ "message": question });
        let json = self.post(ANALYZE_PATH, Some(body)).await?;
        parse_analyze(&json)
    }

    async fn sync(&self) -> Result<SyncReply, BackendError> {
        let json = self.post(SYNC_PATH, None).await?;
        Ok(parse_sync(&json))
    }

    async fn metrics(&self) -> Result<MetricsSnapshot, BackendError> {
        decode(self.get(METRICS_PATH).await?)
    }

    async fn upload(&self, file: UploadFile) -> Result<UploadReply, BackendError> {
        tracing::debug!(path = UPLOAD_PATH, file = %file.file_name, bytes = file.bytes.len(), "POST multipart");
        let part = Part::bytes(file.bytes).file_name(file.file_name);
        let form = Form::new().part("file", part);
        let resp = self
            .client
            .post(self.url(UPLOAD_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;
        let json = read_response(UPLOAD_PATH, resp).await?;
        parse_upload(&json)
    }

    async fn health(&self) -> Result<HealthReply, BackendError> {
        decode(self.get(HEALTH_PATH).await?)
    }

    async fn monthly_metrics(&self) -> Result<MonthlyMetrics, BackendError> {
        decode(self.get(MONTHLY_PATH).await?)
    }

    async fn database_stats(&self) -> Result<DatabaseStats, BackendError> {
        decode(self.get(STATS_PATH).await?)
    }
}
