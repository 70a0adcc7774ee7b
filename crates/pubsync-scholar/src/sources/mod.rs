pub mod google_scholar;
pub mod json_dump;

pub use google_scholar::{CitationDetails, GoogleScholarSource};
pub use json_dump::JsonDumpSource;
