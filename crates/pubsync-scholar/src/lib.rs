//! pubsync sources: Google Scholar profile scraping and raw JSON replays.

pub mod error;
pub mod http;
pub mod sources;

pub use error::{Result, ScholarError};
pub use sources::{GoogleScholarSource, JsonDumpSource};
