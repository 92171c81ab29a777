use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::BackendError;
use crate::core::metrics::MetricsSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeReply {
    pub answer: String,
    pub files_processed: Option<u64>,
    pub records_analyzed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReply {
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadReply {
    pub rows_imported: u64,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReply {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseStats {
    pub total_records: u64,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMetrics {
    #[serde(default)]
    pub no_data: bool,
    #[serde(default)]
    pub months: Vec<MonthSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: String,
    pub total_revenue: String,
    pub total_sales: u64,
    #[serde(default)]
    pub top_products: Vec<ProductQuantity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductQuantity {
    pub name: String,
    pub quantity: u64,
}

/// A spreadsheet that passed client-side admission, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The remote analytics service. Every call resolves exactly once; no call retries.
#[async_trait]
pub trait AnalyticsBackend: Send + Sync {
    async fn analyze(&self, question: &str) -> Result<AnalyzeReply, BackendError>;

    async fn sync(&self) -> Result<SyncReply, BackendError>;

    async fn metrics(&self) -> Result<MetricsSnapshot, BackendError>;

    async fn upload(&self, file: UploadFile) -> Result<UploadReply, BackendError>;

    async fn health(&self) -> Result<HealthReply, BackendError>;

    async fn monthly_metrics(&self) -> Result<MonthlyMetrics, BackendError>;

    async fn database_stats(&self) -> Result<DatabaseStats, BackendError>;
}
