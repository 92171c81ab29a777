mod http;

pub use http::HttpBackend;

use crate::core::backend::AnalyticsBackend;
use crate::core::config::AppConfig;
use crate::core::error::BackendError;
use std::sync::Arc;
use std::time::Duration;

/// Create the backend client described by the configuration.
pub fn create_backend(config: &AppConfig) -> Result<Arc<dyn AnalyticsBackend>, BackendError> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    Ok(Arc::new(HttpBackend::new(config.base_url.clone(), timeout)?))
}
