use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One publication as handed over by an external source, before coercion.
///
/// Every field is optional and numeric fields stay loosely typed: sources
/// report years and citation counts as numbers, strings, or not at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    pub title: Option<String>,
    /// Author list as a single string, `"A and B"` or `"A, B"`.
    pub author: Option<String>,
    pub venue: Option<String>,
    pub journal: Option<String>,
    pub booktitle: Option<String>,
    pub pub_year: Option<Value>,
    pub year: Option<Value>,
    pub num_citations: Option<Value>,
    /// Stable per-publication id within the author profile.
    pub author_pub_id: Option<String>,
}

impl RawRecord {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}
