//! Writing resolved entities back onto the original batch.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use domain::Enrichable;

use crate::fanout::LookupOutcome;

/// How a record's reference ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The entity was resolved and attached.
    Resolved,
    /// The lookup returned an error (or panicked).
    Failed,
    /// No outcome arrived before the deadline.
    Missing,
}

/// One input record after enrichment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enriched<R> {
    pub record: R,
    pub resolution: Resolution,
}

/// The input batch, same length and order, with entities attached where
/// resolution succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnrichedBatch<R> {
    entries: Vec<Enriched<R>>,
}

impl<R> Default for EnrichedBatch<R> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<R> EnrichedBatch<R> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Enriched<R>] {
        &self.entries
    }

    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.entries.iter().map(|e| &e.record)
    }

    /// Drop the per-record status and keep only the records.
    pub fn into_records(self) -> Vec<R> {
        self.entries.into_iter().map(|e| e.record).collect()
    }

    /// Number of records that ended up with the given resolution.
    pub fn count(&self, resolution: Resolution) -> usize {
        self.entries
            .iter()
            .filter(|e| e.resolution == resolution)
            .count()
    }
}

impl<R> IntoIterator for EnrichedBatch<R> {
    type Item = Enriched<R>;
    type IntoIter = std::vec::IntoIter<Enriched<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Attach resolved entities to `batch`, preserving order and multiplicity.
///
/// Never fails: a key without a successful outcome leaves its records
/// untouched, marked `Failed` if an error outcome arrived and `Missing`
/// otherwise.
pub fn merge<R: Enrichable>(
    batch: Vec<R>,
    outcomes: Vec<LookupOutcome<R::Key, R::Entity>>,
) -> EnrichedBatch<R> {
    let mut resolved: HashMap<R::Key, R::Entity> = HashMap::with_capacity(outcomes.len());
    let mut failed: HashSet<R::Key> = HashSet::new();

    for outcome in outcomes {
        match outcome.result {
            Ok(entity) => {
                resolved.insert(outcome.key, entity);
            }
            Err(_) => {
                failed.insert(outcome.key);
            }
        }
    }

    let entries = batch
        .into_iter()
        .map(|mut record| {
            let key = record.reference_key();
            let resolution = if let Some(entity) = resolved.get(&key) {
                record.attach(entity.clone());
                Resolution::Resolved
            } else if failed.contains(&key) {
                Resolution::Failed
            } else {
                Resolution::Missing
            };
            Enriched { record, resolution }
        })
        .collect();

    EnrichedBatch { entries }
}
