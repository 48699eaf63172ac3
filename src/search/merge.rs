use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::storage::{Equivalence, Record};

/// Combine direct matches and join-path matches, one entry per identifier.
///
/// Direct records come first. On a duplicate id the first record seen is kept as is;
/// fields of later copies are not merged in. Records without an id are dropped.
pub fn merge_by_id<T>(direct: Vec<T>, joined: Vec<T>) -> Vec<T>
where
    T: Record,
{
    let mut merged: IndexMap<String, T> = IndexMap::with_capacity(direct.len() + joined.len());

    for record in direct.into_iter().chain(joined) {
        let Some(id) = record.record_id().map(str::to_string) else {
            continue;
        };
        if let Entry::Vacant(slot) = merged.entry(id) {
            slot.insert(record);
        }
    }

    merged.into_values().collect()
}

/// Set `perfume_title` on every record from its expanded parent, or the placeholder
pub fn attach_parent_titles(records: &mut [Equivalence], placeholder: &str) {
    for record in records.iter_mut() {
        record.attach_parent_title(placeholder);
    }
}
