use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::error::ConfigError;
use crate::core::message::DEFAULT_GREETING;

/// Local development server of the analytics backend
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_working_dir")]
    pub working_dir: PathBuf,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Base URL of the analytics backend; endpoint paths are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// First assistant message of every session
    #[serde(default = "default_greeting")]
    pub greeting: String,

    #[serde(default)]
    pub debug: bool,
}

fn default_working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn default_data_dir() -> String {
    ".alpha-insights".into()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_greeting() -> String {
    DEFAULT_GREETING.into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            data_dir: default_data_dir(),
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            greeting: default_greeting(),
            debug: false,
        }
    }
}

pub fn load_config(working_dir: Option<PathBuf>) -> Result<AppConfig, ConfigError> {
    let wd = working_dir.unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    let mut config = AppConfig::default();
    config.working_dir = wd.clone();

    // Global config first, then the project-local file on top
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join("alpha-insights").join("config.json");
        if let Some(file_config) = read_config_file(&global_path)? {
            merge_config(&mut config, file_config);
        }
    }

    let local_path = wd.join("alpha-insights.json");
    if let Some(file_config) = read_config_file(&local_path)? {
        merge_config(&mut config, file_config);
    }

    apply_env(&mut config)?;

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::File(format!("{}: {e}", path.display())))?;
    let file_config: AppConfig = serde_json::from_str(&content)
        .map_err(|e| ConfigError::Invalid(format!("{}: {e}", path.display())))?;
    Ok(Some(file_config))
}

fn merge_config(base: &mut AppConfig, overlay: AppConfig) {
    if overlay.data_dir != default_data_dir() {
        base.data_dir = overlay.data_dir;
    }
    if overlay.base_url != default_base_url() {
        base.base_url = overlay.base_url;
    }
    if overlay.request_timeout_secs != default_request_timeout() {
        base.request_timeout_secs = overlay.request_timeout_secs;
    }
    if overlay.greeting != default_greeting() {
        base.greeting = overlay.greeting;
    }
    if overlay.debug {
        base.debug = true;
    }
}

fn apply_env(config: &mut AppConfig) -> Result<(), ConfigError> {
    if let Ok(url) = std::env::var("ALPHA_INSIGHTS_URL") {
        if !url.is_empty() {
            config.base_url = url;
        }
    }
    if let Ok(secs) = std::env::var("ALPHA_INSIGHTS_TIMEOUT") {
        if !secs.is_empty() {
            config.request_timeout_secs = secs.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("ALPHA_INSIGHTS_TIMEOUT must be seconds, got '{secs}'"))
            })?;
        }
    }
    Ok(())
}

impl AppConfig {
    pub fn data_path(&self) -> PathBuf {
        self.working_dir.join(&self.data_dir)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be positive".into()));
        }
        Ok(())
    }
}
