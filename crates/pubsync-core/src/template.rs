use crate::models::{Links, Publication};
use crate::sort::sorted;

/// Manual-completion template built from the curated dataset.
///
/// Each curated entry with a title keeps its bibliographic fields; everything
/// the fetch would normally supply or that is curated per-record is blanked.
pub fn build_manual_template(curated: &[Publication]) -> Vec<Publication> {
    let entries = curated
        .iter()
        .filter(|entry| entry.has_title())
        .map(|entry| Publication {
            title: entry.title.trim().to_string(),
            authors: entry.authors.clone(),
            venue: entry.venue.clone(),
            year: entry.year,
            citation_count: None,
            summary: String::new(),
            tags: Vec::new(),
            links: Links::default(),
            carried: Default::default(),
            verbatim: Default::default(),
        })
        .collect();

    sorted(entries)
}
