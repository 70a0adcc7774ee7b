use std::cmp::Reverse;

use crate::models::Publication;

/// Canonical dataset order: newest year first, undated records last, then
/// case-folded title ascending. Stable for equal keys.
pub fn sort_publications(items: &mut [Publication]) {
    items.sort_by_cached_key(|item| {
        (
            item.year.is_none(),
            Reverse(item.year),
            item.title.to_lowercase(),
        )
    });
}

pub fn sorted(mut items: Vec<Publication>) -> Vec<Publication> {
    sort_publications(&mut items);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dated(title: &str, year: Option<i64>) -> Publication {
        Publication {
            year,
            ..Publication::new(title)
        }
    }

    fn keys(items: &[Publication]) -> Vec<(Option<i64>, &str)> {
        items.iter().map(|p| (p.year, p.title.as_str())).collect()
    }

    #[test]
    fn test_sort_descending_year_then_title_undated_last() {
        let out = sorted(vec![
            dated("Z", Some(2020)),
            dated("A", Some(2022)),
            dated("M", None),
            dated("B", Some(2022)),
        ]);

        assert_eq!(
            keys(&out),
            vec![
                (Some(2022), "A"),
                (Some(2022), "B"),
                (Some(2020), "Z"),
                (None, "M")
            ]
        );
    }

    #[test]
    fn test_sort_title_is_case_folded() {
        let out = sorted(vec![dated("beta", Some(2021)), dated("Alpha", Some(2021))]);
        assert_eq!(keys(&out), vec![(Some(2021), "Alpha"), (Some(2021), "beta")]);
    }

    #[test]
    fn test_sort_undated_by_title() {
        let out = sorted(vec![dated("b", None), dated("A", None), dated("c", Some(1990))]);
        assert_eq!(keys(&out), vec![(Some(1990), "c"), (None, "A"), (None, "b")]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut first = dated("Same", Some(2000));
        first.venue = "first".into();
        let mut second = dated("same", Some(2000));
        second.venue = "second".into();

        let out = sorted(vec![first, second]);

        assert_eq!(out[0].venue, "first");
        assert_eq!(out[1].venue, "second");
    }
}
