//! Read-side view over both datasets: curated entries overlaid on the auto
//! dataset, with the filters and year grouping a publications page needs.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::models::Publication;
use crate::normalize::normalize_title;
use crate::sort::sorted;

pub const UNDATED_LABEL: &str = "Year TBD";

/// Combine curated and auto records into one sorted list.
///
/// A curated record replaces its auto counterpart except for two fields:
/// a missing citation count is taken from auto, and links merge per key
/// with non-empty curated values winning. Auto-only records are kept.
pub fn combine(curated: &[Publication], auto: &[Publication]) -> Vec<Publication> {
    let auto_by_key: HashMap<String, &Publication> = auto
        .iter()
        .map(|item| (normalize_title(&item.title), item))
        .collect();
    let mut used = HashSet::new();

    let mut out: Vec<Publication> = curated
        .iter()
        .map(|manual| {
            let key = normalize_title(&manual.title);
            let auto_item = auto_by_key.get(&key).copied();
            used.insert(key);

            let Some(auto_item) = auto_item else {
                return manual.clone();
            };

            let mut links = auto_item.links.clone();
            links.overlay(&manual.links);
            let mut carried = auto_item.carried.clone();
            carried.extend(manual.carried.clone());

            Publication {
                citation_count: manual.citation_count.or(auto_item.citation_count),
                links,
                carried,
                ..manual.clone()
            }
        })
        .collect();

    out.extend(
        auto.iter()
            .filter(|item| !used.contains(&normalize_title(&item.title)))
            .cloned(),
    );

    sorted(out)
}

/// Conjunctive filter; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub year: Option<i64>,
    pub venue: Option<String>,
    pub tag: Option<String>,
}

impl CatalogFilter {
    pub fn matches(&self, publication: &Publication) -> bool {
        let year_ok = self.year.is_none_or(|y| publication.year == Some(y));
        let venue_ok = self
            .venue
            .as_deref()
            .is_none_or(|v| publication.venue == v);
        let tag_ok = self
            .tag
            .as_deref()
            .is_none_or(|t| publication.tags.iter().any(|tag| tag == t));
        year_ok && venue_ok && tag_ok
    }

    pub fn apply<'a>(&self, publications: &'a [Publication]) -> Vec<&'a Publication> {
        publications.iter().filter(|p| self.matches(p)).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct YearGroup<'a> {
    pub label: String,
    pub publications: Vec<&'a Publication>,
}

/// Group already-sorted publications by year, keeping input order.
/// Undated records end up under [`UNDATED_LABEL`].
pub fn group_by_year<'a>(publications: &[&'a Publication]) -> Vec<YearGroup<'a>> {
    let mut groups: Vec<YearGroup<'a>> = Vec::new();
    for &publication in publications {
        let label = publication
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| UNDATED_LABEL.to_string());
        match groups.last_mut() {
            Some(group) if group.label == label => group.publications.push(publication),
            _ => groups.push(YearGroup {
                label,
                publications: vec![publication],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, year: Option<i64>) -> Publication {
        Publication {
            year,
            ..Publication::new(title)
        }
    }

    #[test]
    fn test_combine_curated_overlays_auto() {
        let mut manual = record("Shared Paper", Some(2022));
        manual.summary = "hand written".into();
        manual.links.pdf = "manual.pdf".into();

        let mut auto_item = record("shared paper", Some(2021));
        auto_item.citation_count = Some(8);
        auto_item.links.scholar = "scholar-url".into();
        auto_item.links.pdf = "auto.pdf".into();

        let combined = combine(&[manual], &[auto_item, record("Auto Only", Some(2020))]);

        assert_eq!(combined.len(), 2);
        let shared = &combined[0];
        assert_eq!(shared.title, "Shared Paper");
        assert_eq!(shared.year, Some(2022));
        assert_eq!(shared.summary, "hand written");
        assert_eq!(shared.citation_count, Some(8));
        assert_eq!(shared.links.scholar, "scholar-url");
        assert_eq!(shared.links.pdf, "manual.pdf");
        assert_eq!(combined[1].title, "Auto Only");
    }

    #[test]
    fn test_filter_is_conjunctive() {
        let mut a = record("A", Some(2022));
        a.venue = "ICML".into();
        a.tags = vec!["rl".into()];
        let mut b = record("B", Some(2022));
        b.venue = "NeurIPS".into();
        let items = vec![a, b, record("C", None)];

        let filter = CatalogFilter {
            year: Some(2022),
            venue: Some("ICML".into()),
            tag: Some("rl".into()),
        };
        let hits = filter.apply(&items);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "A");

        assert_eq!(CatalogFilter::default().apply(&items).len(), 3);
        let by_tag = CatalogFilter {
            tag: Some("missing".into()),
            ..CatalogFilter::default()
        };
        assert!(by_tag.apply(&items).is_empty());
    }

    #[test]
    fn test_group_by_year_labels() {
        let items = sorted(vec![
            record("A", Some(2021)),
            record("B", None),
            record("C", Some(2023)),
            record("D", Some(2021)),
        ]);
        let refs: Vec<&Publication> = items.iter().collect();

        let groups = group_by_year(&refs);

        let labels: Vec<_> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["2023", "2021", UNDATED_LABEL]);
        assert_eq!(groups[1].publications.len(), 2);
    }
}
