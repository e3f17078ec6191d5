//! The per-query result accumulator.

use serde::{Deserialize, Serialize};

/// One (document, score) result entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// The internal document ID.
    pub doc_id: u64,
    /// The score assigned by the retrieval model.
    pub score: f64,
}

/// An ordered collection of (doc_id, score) pairs, filled during one
/// evaluation pass, then sorted and truncated once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreList {
    entries: Vec<ScoreEntry>,
}

impl ScoreList {
    /// Create an empty score list.
    pub fn new() -> Self {
        ScoreList::default()
    }

    /// Append an entry.
    pub fn add(&mut self, doc_id: u64, score: f64) {
        self.entries.push(ScoreEntry { doc_id, score });
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries in their current order.
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    /// Sort by descending score; equal scores order by ascending
    /// doc_id so results are deterministic.
    pub fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id)));
    }

    /// Keep the first `min(k, len)` entries of the current order.
    pub fn truncate(&mut self, k: usize) {
        self.entries.truncate(k);
    }

    /// Iterate over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, ScoreEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ScoreList {
    type Item = &'a ScoreEntry;
    type IntoIter = std::slice::Iter<'a, ScoreEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
