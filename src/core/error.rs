use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The request never produced a response (connection refused, DNS, timeout).
    #[error("Connection error: {0}")]
    Transport(String),

    /// Non-success status without an `error` field in the payload.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The backend answered with an explicit `error` field.
    #[error("{message}")]
    Application {
        message: String,
        details: Option<String>,
    },

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Backend-provided message, if the failure carried one.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            Self::Application { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("File too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    #[error("Unsupported file type '{extension}'. Use Excel (.xlsx, .xls) or CSV")]
    UnsupportedType { extension: String },

    #[error("Cannot read file: {0}")]
    Io(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file error: {0}")]
    File(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
