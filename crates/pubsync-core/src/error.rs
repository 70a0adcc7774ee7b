use std::path::PathBuf;

use thiserror::Error;

/// All errors that can occur in pubsync-core.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Malformed dataset {path}: {reason}")]
    MalformedDataset { path: PathBuf, reason: String },

    #[error("Fetch from {source_name} failed: {reason}")]
    Fetch { source_name: String, reason: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl SyncError {
    pub fn fetch(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Fetch {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
