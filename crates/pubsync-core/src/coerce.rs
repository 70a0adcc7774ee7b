use serde_json::Value;

use crate::models::{Links, Publication, RawRecord};

const SCHOLAR_CITATION_URL: &str =
    "https://scholar.google.com/citations?view_op=view_citation&hl=en";

/// Best-effort integer coercion for loosely typed numeric fields.
///
/// Absent, null, empty or unparseable input gives `None`, never `0`.
/// Strings are trimmed before parsing; floats are accepted only when they
/// carry no fractional part. Booleans are not numbers here.
pub fn safe_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok()))
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .filter(|f| *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                    .map(|f| f as i64)
            }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Split an author string such as `"A. Smith and B. Jones, C. Wu"` into names.
pub fn split_authors(text: &str) -> Vec<String> {
    text.trim()
        .replace(" and ", ",")
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Profile-scoped citation page for one publication.
pub fn scholar_link(user_id: &str, author_pub_id: &str) -> String {
    format!("{SCHOLAR_CITATION_URL}&user={user_id}&citation_for_view={user_id}:{author_pub_id}")
}

/// Turn a raw source record into a canonical publication.
///
/// Returns `None` when the record has no usable title. Curated fields and
/// every link except `scholar` start empty.
pub fn coerce_record(raw: &RawRecord, user_id: &str) -> Option<Publication> {
    let title = raw.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        return None;
    }

    let authors = raw.author.as_deref().map(split_authors).unwrap_or_default();

    let venue = [&raw.venue, &raw.journal, &raw.booktitle]
        .into_iter()
        .filter_map(|candidate| candidate.as_deref().map(str::trim))
        .find(|candidate| !candidate.is_empty())
        .unwrap_or_default()
        .to_string();

    let year_source = raw
        .pub_year
        .as_ref()
        .filter(|v| is_truthy(v))
        .or(raw.year.as_ref());

    let scholar = raw
        .author_pub_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| scholar_link(user_id, id))
        .unwrap_or_default();

    Some(Publication {
        title: title.to_string(),
        authors,
        venue,
        year: safe_int(year_source),
        citation_count: safe_int(raw.num_citations.as_ref()),
        links: Links {
            scholar,
            ..Links::default()
        },
        ..Publication::default()
    })
}

/// Coerce a whole batch, dropping records without a title.
pub fn coerce_all(raws: &[RawRecord], user_id: &str) -> Vec<Publication> {
    raws.iter()
        .filter_map(|raw| coerce_record(raw, user_id))
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_safe_int_absent_inputs() {
        assert_eq!(safe_int(None), None);
        assert_eq!(safe_int(Some(&json!(null))), None);
        assert_eq!(safe_int(Some(&json!(""))), None);
        assert_eq!(safe_int(Some(&json!("abc"))), None);
        assert_eq!(safe_int(Some(&json!("20.5"))), None);
        assert_eq!(safe_int(Some(&json!(true))), None);
        assert_eq!(safe_int(Some(&json!(2019.5))), None);
    }

    #[test]
    fn test_safe_int_does_not_truncate_fractions() {
        assert_eq!(safe_int(Some(&json!(2019.7))), None);
        assert_eq!(safe_int(Some(&json!(-3.2))), None);
        assert_eq!(safe_int(Some(&json!(2019.0))), Some(2019));
    }

    #[test]
    fn test_safe_int_parses_numbers_and_strings() {
        assert_eq!(safe_int(Some(&json!("2019"))), Some(2019));
        assert_eq!(safe_int(Some(&json!(" 2019 "))), Some(2019));
        assert_eq!(safe_int(Some(&json!(2019))), Some(2019));
        assert_eq!(safe_int(Some(&json!(2019.0))), Some(2019));
        assert_eq!(safe_int(Some(&json!(0))), Some(0));
    }

    #[test]
    fn test_split_authors_handles_and_and_commas() {
        assert_eq!(
            split_authors(" Ada Lovelace and Charles Babbage, Alan Turing ,, "),
            vec!["Ada Lovelace", "Charles Babbage", "Alan Turing"]
        );
        assert!(split_authors("").is_empty());
        assert_eq!(split_authors("Sandy Anderson"), vec!["Sandy Anderson"]);
    }

    #[test]
    fn test_coerce_skips_blank_title() {
        assert!(coerce_record(&RawRecord::titled("   "), "U").is_none());
        assert!(coerce_record(&RawRecord::default(), "U").is_none());
    }

    #[test]
    fn test_coerce_full_record() {
        let raw = RawRecord {
            title: Some("  Deep Things ".into()),
            author: Some("A. One and B. Two".into()),
            venue: Some("  ".into()),
            journal: Some("Journal of Things".into()),
            booktitle: Some("Proc. Things".into()),
            pub_year: Some(json!("2021")),
            year: Some(json!(1999)),
            num_citations: Some(json!(42)),
            author_pub_id: Some("abc123".into()),
        };

        let publication = coerce_record(&raw, "USER1").unwrap();

        assert_eq!(publication.title, "Deep Things");
        assert_eq!(publication.authors, vec!["A. One", "B. Two"]);
        assert_eq!(publication.venue, "Journal of Things");
        assert_eq!(publication.year, Some(2021));
        assert_eq!(publication.citation_count, Some(42));
        assert_eq!(
            publication.links.scholar,
            "https://scholar.google.com/citations?view_op=view_citation&hl=en&user=USER1&citation_for_view=USER1:abc123"
        );
        assert!(publication.summary.is_empty());
        assert!(publication.tags.is_empty());
        assert!(publication.links.pdf.is_empty());
    }

    #[test]
    fn test_coerce_falls_back_to_year_when_pub_year_empty() {
        let raw = RawRecord {
            pub_year: Some(json!("")),
            year: Some(json!("2018")),
            ..RawRecord::titled("T")
        };
        assert_eq!(coerce_record(&raw, "U").unwrap().year, Some(2018));
    }

    #[test]
    fn test_coerce_unparseable_numbers_are_absent() {
        let raw = RawRecord {
            pub_year: Some(json!("n.d.")),
            num_citations: Some(json!("")),
            author_pub_id: Some("  ".into()),
            ..RawRecord::titled("T")
        };

        let publication = coerce_record(&raw, "U").unwrap();

        assert_eq!(publication.year, None);
        assert_eq!(publication.citation_count, None);
        assert_eq!(publication.links.scholar, "");
        assert_eq!(publication.venue, "");
    }

    #[test]
    fn test_coerce_all_drops_untitled() {
        let raws = vec![RawRecord::titled("A"), RawRecord::default(), RawRecord::titled("B")];
        let titles: Vec<_> = coerce_all(&raws, "U").into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }
}
