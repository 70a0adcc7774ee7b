use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use pubsync_core::{PublicationSource, RawRecord, SyncError};

use crate::error::Result;

const SOURCE_NAME: &str = "json_dump";

/// Replays raw records saved as a JSON array, for offline runs.
///
/// The author id is not consulted: the file is assumed to belong to the
/// profile being synced.
pub struct JsonDumpSource {
    path: PathBuf,
}

impl JsonDumpSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read_records(&self) -> Result<Vec<RawRecord>> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let records: Vec<RawRecord> = serde_json::from_str(&contents)?;
        info!("read {} raw records from {}", records.len(), self.path.display());
        Ok(records)
    }
}

#[async_trait]
impl PublicationSource for JsonDumpSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_publications(&self, _user_id: &str) -> pubsync_core::Result<Vec<RawRecord>> {
        self.read_records()
            .await
            .map_err(|e| SyncError::fetch(SOURCE_NAME, e))
    }
}
