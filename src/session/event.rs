use std::fmt;

use crate::core::backend::{AnalyzeReply, SyncReply, UploadReply};
use crate::core::error::BackendError;
use crate::core::metrics::MetricsSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Analyze,
    Sync,
    Metrics,
    Upload,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Analyze => write!(f, "analyze"),
            Self::Sync => write!(f, "sync"),
            Self::Metrics => write!(f, "metrics"),
            Self::Upload => write!(f, "upload"),
        }
    }
}

/// The outcome of one outstanding request, delivered back to the controller.
#[derive(Debug, Clone)]
pub enum Completion {
    Analyze(Result<AnalyzeReply, BackendError>),
    Sync(Result<SyncReply, BackendError>),
    Metrics {
        seq: u64,
        result: Result<MetricsSnapshot, BackendError>,
    },
    Upload(Result<UploadReply, BackendError>),
}

impl Completion {
    pub fn flow(&self) -> Flow {
        match self {
            Self::Analyze(_) => Flow::Analyze,
            Self::Sync(_) => Flow::Sync,
            Self::Metrics { .. } => Flow::Metrics,
            Self::Upload(_) => Flow::Upload,
        }
    }

    pub fn is_ok(&self) -> bool {
        match self {
            Self::Analyze(r) => r.is_ok(),
            Self::Sync(r) => r.is_ok(),
            Self::Metrics { result, .. } => result.is_ok(),
            Self::Upload(r) => r.is_ok(),
        }
    }
}
