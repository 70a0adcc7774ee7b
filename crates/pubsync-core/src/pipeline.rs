use std::path::PathBuf;

use tracing::{info, warn};

use crate::coerce::coerce_all;
use crate::config::PathsConfig;
use crate::dedup::dedup_by_title;
use crate::error::Result;
use crate::merge::merge_with_existing;
use crate::models::Publication;
use crate::source::PublicationSource;
use crate::store::{load_dataset, write_dataset};
use crate::template::build_manual_template;

/// What a sync run did. Both variants are successful runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The auto dataset was replaced with `count` merged records.
    Updated {
        path: PathBuf,
        count: usize,
        user_id: String,
        source_name: String,
    },
    /// The fetch failed; the auto dataset is untouched and the manual
    /// template was regenerated instead.
    Fallback {
        reason: String,
        auto_path: PathBuf,
        template: TemplateReport,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateReport {
    pub path: PathBuf,
    pub count: usize,
}

/// Drives fetch → coerce → dedup → merge → sort → persist against one data directory.
pub struct Pipeline {
    paths: PathsConfig,
}

impl Pipeline {
    pub fn new(paths: PathsConfig) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &PathsConfig {
        &self.paths
    }

    /// Refresh the auto dataset from `source`.
    ///
    /// A malformed auto or curated file is a hard error. Any failure while
    /// fetching is answered with the template fallback and still returns `Ok`.
    pub async fn run(&self, source: &dyn PublicationSource, user_id: &str) -> Result<SyncOutcome> {
        let auto_path = self.paths.auto_path();
        let existing = load_dataset(&auto_path)?;
        info!(
            "loaded {} existing records from {}",
            existing.len(),
            auto_path.display()
        );

        match self.refresh(source, user_id, &existing).await {
            Ok(merged) => {
                write_dataset(&auto_path, &merged)?;
                info!("wrote {} records to {}", merged.len(), auto_path.display());
                Ok(SyncOutcome::Updated {
                    path: auto_path,
                    count: merged.len(),
                    user_id: user_id.to_string(),
                    source_name: source.name().to_string(),
                })
            }
            Err(e) => {
                warn!("fetch from {} failed, falling back to manual template: {e}", source.name());
                self.fallback_outcome(e.to_string(), auto_path)
            }
        }
    }

    /// Take the fallback path without fetching, for a source that could not
    /// be set up. The auto dataset is still checked and left untouched.
    pub fn fall_back(&self, reason: impl ToString) -> Result<SyncOutcome> {
        let auto_path = self.paths.auto_path();
        load_dataset(&auto_path)?;
        self.fallback_outcome(reason.to_string(), auto_path)
    }

    fn fallback_outcome(&self, reason: String, auto_path: PathBuf) -> Result<SyncOutcome> {
        let template = self.write_manual_template()?;
        Ok(SyncOutcome::Fallback {
            reason,
            auto_path,
            template,
        })
    }

    async fn refresh(
        &self,
        source: &dyn PublicationSource,
        user_id: &str,
        existing: &[Publication],
    ) -> Result<Vec<Publication>> {
        let raws = source.fetch_publications(user_id).await?;
        info!("{} returned {} raw records", source.name(), raws.len());

        let fresh = dedup_by_title(coerce_all(&raws, user_id));
        Ok(merge_with_existing(existing, fresh))
    }

    /// Rebuild the manual template from the curated dataset.
    pub fn write_manual_template(&self) -> Result<TemplateReport> {
        let curated = load_dataset(&self.paths.curated_path())?;
        let template = build_manual_template(&curated);
        let path = self.paths.template_path();
        write_dataset(&path, &template)?;
        info!("wrote manual template with {} entries to {}", template.len(), path.display());
        Ok(TemplateReport {
            path,
            count: template.len(),
        })
    }
}
