use std::collections::HashMap;

use crate::models::{Links, Publication};
use crate::normalize::normalize_title;
use crate::sort::sorted;

/// Refresh `existing` with freshly fetched records.
///
/// `fresh` decides membership: prior records with no fresh counterpart are
/// dropped. Fetched fields (authors, venue, year, citation count) come from
/// `fresh`; `summary`, `tags` and carried keys come from the prior record;
/// links are merged per key with non-empty fresh values winning.
pub fn merge_with_existing(existing: &[Publication], fresh: Vec<Publication>) -> Vec<Publication> {
    let prior_by_key: HashMap<String, &Publication> = existing
        .iter()
        .filter(|item| item.has_title())
        .map(|item| (normalize_title(&item.title), item))
        .collect();

    let merged = fresh
        .into_iter()
        .map(|item| {
            let prior = prior_by_key.get(&normalize_title(&item.title)).copied();
            merge_one(prior, item)
        })
        .collect();

    sorted(merged)
}

fn merge_one(prior: Option<&Publication>, fresh: Publication) -> Publication {
    let Some(prior) = prior else {
        return Publication {
            summary: String::new(),
            tags: Vec::new(),
            links: merge_links(None, &fresh.links),
            carried: Default::default(),
            verbatim: Default::default(),
            ..fresh
        };
    };

    Publication {
        title: fresh.title,
        authors: fresh.authors,
        venue: fresh.venue,
        year: fresh.year,
        citation_count: fresh.citation_count,
        summary: prior.summary.clone(),
        tags: prior.tags.clone(),
        links: merge_links(Some(&prior.links), &fresh.links),
        carried: prior.carried.clone(),
        verbatim: prior.verbatim.clone(),
    }
}

fn merge_links(prior: Option<&Links>, fresh: &Links) -> Links {
    let mut links = prior.cloned().unwrap_or_default();
    links.overlay(fresh);
    links
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fresh(title: &str, year: Option<i64>, citations: Option<i64>) -> Publication {
        Publication {
            year,
            citation_count: citations,
            ..Publication::new(title)
        }
    }

    #[test]
    fn test_merge_preserves_curated_fields() {
        let mut prior = Publication::new("A");
        prior.summary = "S".into();
        prior.tags = vec!["t".into()];
        prior.links.pdf = "http://x".into();

        let merged = merge_with_existing(&[prior], vec![fresh("A", Some(2024), Some(5))]);

        assert_eq!(merged.len(), 1);
        let record = &merged[0];
        assert_eq!(record.summary, "S");
        assert_eq!(record.tags, vec!["t"]);
        assert_eq!(record.links.pdf, "http://x");
        assert_eq!(record.year, Some(2024));
        assert_eq!(record.citation_count, Some(5));
    }

    #[test]
    fn test_merge_drops_records_missing_from_fresh() {
        let existing = vec![Publication::new("A"), Publication::new("B")];

        let merged = merge_with_existing(&existing, vec![fresh("A", None, None)]);

        assert_eq!(merged.len(), 1);
        assert!(merged.iter().all(|p| p.title != "B"));
    }

    #[test]
    fn test_merge_matches_on_normalized_title_and_keeps_fresh_title() {
        let mut prior = Publication::new("Graph  Neural Nets");
        prior.summary = "kept".into();

        let merged = merge_with_existing(&[prior], vec![fresh("graph neural nets", None, None)]);

        assert_eq!(merged[0].title, "graph neural nets");
        assert_eq!(merged[0].summary, "kept");
    }

    #[test]
    fn test_merge_fetched_fields_replace_prior_even_when_absent() {
        let mut prior = Publication::new("A");
        prior.authors = vec!["Old Author".into()];
        prior.venue = "Old Venue".into();
        prior.year = Some(2001);
        prior.citation_count = Some(99);

        let merged = merge_with_existing(&[prior], vec![fresh("A", None, None)]);

        assert!(merged[0].authors.is_empty());
        assert_eq!(merged[0].venue, "");
        assert_eq!(merged[0].year, None);
        assert_eq!(merged[0].citation_count, None);
    }

    #[test]
    fn test_merge_links_per_key() {
        let mut prior = Publication::new("A");
        prior.links.scholar = "old-scholar".into();
        prior.links.code = "https://github.com/x/y".into();

        let mut with_link = fresh("A", None, None);
        with_link.links.scholar = "new-scholar".into();
        let merged = merge_with_existing(&[prior.clone()], vec![with_link]);
        assert_eq!(merged[0].links.scholar, "new-scholar");
        assert_eq!(merged[0].links.code, "https://github.com/x/y");

        let merged = merge_with_existing(&[prior], vec![fresh("A", None, None)]);
        assert_eq!(merged[0].links.scholar, "old-scholar");
    }

    #[test]
    fn test_merge_carries_unknown_fields() {
        let prior = Publication::from_json(&json!({
            "title": "A",
            "featured": true,
            "award": "Best Paper"
        }))
        .unwrap();

        let merged = merge_with_existing(&[prior], vec![fresh("A", Some(2020), None)]);

        assert_eq!(merged[0].carried["featured"], json!(true));
        assert_eq!(merged[0].carried["award"], json!("Best Paper"));
    }

    #[test]
    fn test_merge_new_record_starts_without_curated_content() {
        let mut incoming = fresh("New", Some(2023), Some(1));
        incoming.summary = "should not leak".into();
        incoming.tags = vec!["nope".into()];

        let merged = merge_with_existing(&[], vec![incoming]);

        assert_eq!(merged[0].summary, "");
        assert!(merged[0].tags.is_empty());
    }

    #[test]
    fn test_merge_ignores_blank_prior_titles_and_later_duplicates_win() {
        let blank = Publication {
            summary: "orphan".into(),
            ..Publication::new("   ")
        };
        let first = Publication {
            summary: "first".into(),
            ..Publication::new("A")
        };
        let second = Publication {
            summary: "second".into(),
            ..Publication::new("a")
        };

        let merged = merge_with_existing(&[blank, first, second], vec![fresh("A", None, None)]);

        assert_eq!(merged[0].summary, "second");
    }

    #[test]
    fn test_merge_keeps_mistyped_curated_fields() {
        let prior = Publication::from_json(&json!({
            "title": "A",
            "summary": {"en": "x"},
            "tags": "ml"
        }))
        .unwrap();

        let merged = merge_with_existing(&[prior], vec![fresh("A", Some(2020), Some(1))]);

        let written = serde_json::to_value(&merged[0]).unwrap();
        assert_eq!(written["summary"], json!({"en": "x"}));
        assert_eq!(written["tags"], json!("ml"));
        assert_eq!(written["year"], json!(2020));
    }

    #[test]
    fn test_merge_output_is_sorted() {
        let merged = merge_with_existing(
            &[],
            vec![fresh("Old", Some(2010), None), fresh("New", Some(2024), None)],
        );
        assert_eq!(merged[0].title, "New");
    }
}
