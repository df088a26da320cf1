//! Reference-key collection: the deduplication step of enrichment.

use std::collections::HashSet;

use domain::Enrichable;

/// Return every distinct key referenced by `batch`, in order of first
/// appearance.
///
/// Pure; an empty batch yields an empty list.
pub fn collect_keys<R: Enrichable>(batch: &[R]) -> Vec<R::Key> {
    let mut seen: HashSet<R::Key> = HashSet::with_capacity(batch.len());
    let mut keys = Vec::new();

    for record in batch {
        let key = record.reference_key();
        if seen.insert(key.clone()) {
            keys.push(key);
        }
    }

    keys
}
