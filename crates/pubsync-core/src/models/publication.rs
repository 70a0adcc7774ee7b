use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::coerce::{safe_int, split_authors};

/// Keys owned by the canonical record. Anything else on a persisted record is carried.
pub const KNOWN_FIELDS: [&str; 8] = [
    "title",
    "authors",
    "venue",
    "year",
    "citationCount",
    "summary",
    "tags",
    "links",
];

/// Curated keys that are written back verbatim when their persisted value
/// does not fit the typed field.
pub const VERBATIM_FIELDS: [&str; 2] = ["summary", "tags"];

/// The four fixed link slots, in serialization order.
pub const LINK_KEYS: [&str; 4] = ["scholar", "pdf", "arxiv", "code"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub scholar: String,
    #[serde(default)]
    pub pdf: String,
    #[serde(default)]
    pub arxiv: String,
    #[serde(default)]
    pub code: String,
}

impl Links {
    /// Read the fixed keys from a loosely typed `links` object. Non-string values are ignored.
    pub fn from_json(value: Option<&Value>) -> Self {
        let mut links = Self::default();
        let Some(obj) = value.and_then(Value::as_object) else {
            return links;
        };
        for key in LINK_KEYS {
            if let Some(s) = obj.get(key).and_then(Value::as_str) {
                if let Some(slot) = links.slot_mut(key) {
                    *slot = s.to_string();
                }
            }
        }
        links
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "scholar" => Some(&self.scholar),
            "pdf" => Some(&self.pdf),
            "arxiv" => Some(&self.arxiv),
            "code" => Some(&self.code),
            _ => None,
        }
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "scholar" => Some(&mut self.scholar),
            "pdf" => Some(&mut self.pdf),
            "arxiv" => Some(&mut self.arxiv),
            "code" => Some(&mut self.code),
            _ => None,
        }
    }

    /// Copy every non-empty slot of `other` over `self`. Empty slots in `other` never erase.
    pub fn overlay(&mut self, other: &Links) {
        for key in LINK_KEYS {
            let value = other.get(key).unwrap_or_default();
            if value.is_empty() {
                continue;
            }
            if let Some(slot) = self.slot_mut(key) {
                *slot = value.to_string();
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        LINK_KEYS
            .iter()
            .all(|key| self.get(key).is_none_or(str::is_empty))
    }
}

/// Canonical publication record, as stored in the auto and curated datasets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Publication {
    pub title: String,
    pub authors: Vec<String>,
    pub venue: String,
    pub year: Option<i64>,
    pub citation_count: Option<i64>,
    pub summary: String,
    pub tags: Vec<String>,
    pub links: Links,

    /// Unknown keys from a persisted record, passed through merges untouched.
    /// Never holds a key from [`KNOWN_FIELDS`].
    pub carried: Map<String, Value>,

    /// Raw `summary`/`tags` values that did not coerce cleanly. When present
    /// they are serialized in place of the typed field.
    pub verbatim: Map<String, Value>,
}

impl Publication {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Build a record from one element of a dataset file.
    ///
    /// Only type coercion is applied: wrongly typed fetched fields fall back
    /// to their empty value, a mistyped `summary` or `tags` is kept in
    /// `verbatim`, and unknown keys are kept in `carried`. Returns `None` for
    /// anything that is not a JSON object.
    pub fn from_json(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let title = match obj.get("title") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };

        let authors = match obj.get("authors") {
            Some(Value::Array(items)) => string_items(items),
            Some(Value::String(s)) => split_authors(s),
            _ => Vec::new(),
        };

        let mut verbatim = Map::new();

        let summary = match obj.get("summary") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                verbatim.insert("summary".to_string(), other.clone());
                String::new()
            }
        };

        let tags = match obj.get("tags") {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => {
                let raw = value.as_array();
                let tags = raw.map(|items| string_items(items)).unwrap_or_default();
                if raw.is_none_or(|items| items.len() != tags.len()) {
                    verbatim.insert("tags".to_string(), value.clone());
                }
                tags
            }
        };

        let carried = obj
            .iter()
            .filter(|(k, _)| !KNOWN_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect::<Map<_, _>>();

        Some(Self {
            title,
            authors,
            venue: string_field(obj, "venue"),
            year: safe_int(obj.get("year")),
            citation_count: safe_int(obj.get("citationCount")),
            summary,
            tags,
            links: Links::from_json(obj.get("links")),
            carried,
            verbatim,
        })
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

impl Serialize for Publication {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("title", &self.title)?;
        map.serialize_entry("authors", &self.authors)?;
        map.serialize_entry("venue", &self.venue)?;
        map.serialize_entry("year", &self.year)?;
        map.serialize_entry("citationCount", &self.citation_count)?;
        match self.verbatim.get("summary") {
            Some(raw) => map.serialize_entry("summary", raw)?,
            None => map.serialize_entry("summary", &self.summary)?,
        }
        match self.verbatim.get("tags") {
            Some(raw) => map.serialize_entry("tags", raw)?,
            None => map.serialize_entry("tags", &self.tags)?,
        }
        map.serialize_entry("links", &self.links)?;
        for (key, value) in &self.carried {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(ToOwned::to_owned)
        .collect()
}
