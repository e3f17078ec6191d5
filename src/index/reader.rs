//! Read-only index access consumed by the evaluation engine.
//!
//! Index storage is an external collaborator; the engine only needs the
//! per-term posting lookups and corpus statistics below. Readers must be
//! safe to query concurrently from independent evaluations.

use crate::error::Result;
use crate::query::posting::PostingList;

/// Read-only query API over an inverted index.
pub trait IndexReader: Send + Sync + std::fmt::Debug {
    /// Get the posting list for a term in a field, sorted by ascending
    /// doc_id. Returns `None` when the term does not occur in the field.
    fn postings(&self, field: &str, term: &str) -> Result<Option<PostingList>>;

    /// Length (token count) of a document's field. Zero for documents
    /// without the field.
    fn doc_length(&self, field: &str, doc_id: u64) -> Result<u64>;

    /// Average field length over documents carrying the field.
    fn avg_doc_length(&self, field: &str) -> Result<f64>;

    /// Number of documents carrying the field.
    fn doc_count(&self, field: &str) -> Result<u64>;

    /// Number of documents containing the term in the field (df).
    fn document_frequency(&self, field: &str, term: &str) -> Result<u64>;

    /// Total occurrences of the term across the field's collection (ctf).
    fn collection_term_frequency(&self, field: &str, term: &str) -> Result<u64>;

    /// Sum of field lengths across the collection. The denominator of
    /// the language-model background probability.
    fn collection_length(&self, field: &str) -> Result<u64>;
}
