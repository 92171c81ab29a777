//! Client-side admission rules for spreadsheet uploads. A file is checked
//! before any bytes are sent: size first, then extension.

use std::path::Path;

use crate::core::backend::UploadFile;
use crate::core::error::UploadError;

/// 10 MiB
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const ALLOWED_EXTENSIONS: [&str; 3] = [".xlsx", ".xls", ".csv"];

/// Lowercased extension including the dot, taken from the last `.` of the name.
pub fn extension_of(file_name: &str) -> String {
    file_name
        .rfind('.')
        .map(|i| file_name[i..].to_lowercase())
        .unwrap_or_default()
}

pub fn check_admission(file_name: &str, size: u64) -> Result<(), UploadError> {
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            size,
            max: MAX_UPLOAD_BYTES,
        });
    }
    let extension = extension_of(file_name);
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(UploadError::UnsupportedType { extension });
    }
    Ok(())
}

/// Admit a file from disk and read it into memory.
pub async fn load(path: &Path) -> Result<UploadFile, UploadError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| UploadError::Io(format!("{} is not a file", path.display())))?;

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| UploadError::Io(format!("{}: {e}", path.display())))?;
    if !metadata.is_file() {
        return Err(UploadError::Io(format!("{} is not a file", path.display())));
    }
    check_admission(&file_name, metadata.len())?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| UploadError::Io(format!("{}: {e}", path.display())))?;
    tracing::debug!(file = %file_name, bytes = bytes.len(), "upload admitted");
    Ok(UploadFile { file_name, bytes })
}
