//! A simple in-memory inverted index.
//!
//! Intended for tests, examples, and small corpora; persistent index
//! storage is outside the engine's scope. Documents are added as
//! pre-tokenized fields, and the index is read-only once handed to the
//! evaluation side (it is `Sync`, so batch drivers can share it behind
//! an `Arc`).

use ahash::AHashMap;

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::posting::{Posting, PostingList};

#[derive(Debug, Default)]
struct FieldIndex {
    postings: AHashMap<String, PostingList>,
    doc_lengths: AHashMap<u64, u64>,
    total_length: u64,
}

/// An in-memory inverted index with per-field posting lists and
/// statistics.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    fields: AHashMap<String, FieldIndex>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        MemoryIndex::default()
    }

    /// Add one field of one document as a token sequence.
    ///
    /// Token offsets become term positions. Documents must be added in
    /// ascending doc_id order per field so posting lists stay sorted.
    pub fn add_document(&mut self, doc_id: u64, field: &str, tokens: &[&str]) {
        let field_index = self.fields.entry(field.to_string()).or_default();

        debug_assert!(
            !field_index.doc_lengths.contains_key(&doc_id),
            "field {field} of document {doc_id} added twice"
        );
        field_index.doc_lengths.insert(doc_id, tokens.len() as u64);
        field_index.total_length += tokens.len() as u64;

        let mut positions: AHashMap<&str, Vec<u32>> = AHashMap::new();
        for (offset, token) in tokens.iter().copied().enumerate() {
            positions.entry(token).or_default().push(offset as u32);
        }
        for (term, positions) in positions {
            field_index
                .postings
                .entry(term.to_string())
                .or_default()
                .push(Posting::new(doc_id, positions));
        }
    }

    fn field(&self, field: &str) -> Option<&FieldIndex> {
        self.fields.get(field)
    }
}

impl IndexReader for MemoryIndex {
    fn postings(&self, field: &str, term: &str) -> Result<Option<PostingList>> {
        Ok(self
            .field(field)
            .and_then(|f| f.postings.get(term))
            .cloned())
    }

    fn doc_length(&self, field: &str, doc_id: u64) -> Result<u64> {
        Ok(self
            .field(field)
            .and_then(|f| f.doc_lengths.get(&doc_id))
            .copied()
            .unwrap_or(0))
    }

    fn avg_doc_length(&self, field: &str) -> Result<f64> {
        Ok(self
            .field(field)
            .filter(|f| !f.doc_lengths.is_empty())
            .map(|f| f.total_length as f64 / f.doc_lengths.len() as f64)
            .unwrap_or(0.0))
    }

    fn doc_count(&self, field: &str) -> Result<u64> {
        Ok(self.field(field).map(|f| f.doc_lengths.len() as u64).unwrap_or(0))
    }

    fn document_frequency(&self, field: &str, term: &str) -> Result<u64> {
        Ok(self
            .field(field)
            .and_then(|f| f.postings.get(term))
            .map(|list| list.len() as u64)
            .unwrap_or(0))
    }

    fn collection_term_frequency(&self, field: &str, term: &str) -> Result<u64> {
        Ok(self
            .field(field)
            .and_then(|f| f.postings.get(term))
            .map(|list| list.total_term_freq())
            .unwrap_or(0))
    }

    fn collection_length(&self, field: &str) -> Result<u64> {
        Ok(self.field(field).map(|f| f.total_length).unwrap_or(0))
    }
}
