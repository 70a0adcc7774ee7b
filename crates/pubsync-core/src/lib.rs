//! pubsync core: publication model, title-keyed merge pipeline, dataset storage, config.

pub mod catalog;
pub mod coerce;
pub mod config;
pub mod dedup;
pub mod error;
pub mod merge;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod sort;
pub mod source;
pub mod store;
pub mod template;

pub use config::{PathsConfig, ScholarConfig, SyncConfig, resolve_user_id};
pub use error::{Result, SyncError};
pub use models::*;

pub use catalog::{CatalogFilter, YearGroup, combine, group_by_year};
pub use coerce::{coerce_record, safe_int};
pub use dedup::dedup_by_title;
pub use merge::merge_with_existing;
pub use normalize::normalize_title;
pub use pipeline::{Pipeline, SyncOutcome, TemplateReport};
pub use sort::sort_publications;
pub use source::PublicationSource;
pub use store::{load_dataset, write_dataset};
