use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::models::Publication;
use crate::normalize::normalize_title;

/// Collapse records sharing a normalized title. The later record replaces
/// the earlier one wholesale; no fields are combined.
///
/// Keys keep the position of their first occurrence, but callers must not
/// rely on output order: the result is always sorted afterwards.
pub fn dedup_by_title(records: Vec<Publication>) -> Vec<Publication> {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut out: Vec<Publication> = Vec::with_capacity(records.len());

    for record in records {
        let key = normalize_title(&record.title);
        match slots.entry(key) {
            Entry::Occupied(slot) => out[*slot.get()] = record,
            Entry::Vacant(slot) => {
                slot.insert(out.len());
                out.push(record);
            }
        }
    }

    out
}
