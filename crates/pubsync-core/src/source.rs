use async_trait::async_trait;

use crate::error::Result;
use crate::models::RawRecord;

/// External collaborator that lists an author's publications.
///
/// Implementations make a single attempt per call; any error is surfaced to
/// the pipeline, which answers it with the manual-template fallback.
#[async_trait]
pub trait PublicationSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_publications(&self, user_id: &str) -> Result<Vec<RawRecord>>;
}
