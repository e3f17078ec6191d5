//! The evaluation driver: one forward pass per query.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{KontosError, Result};
use crate::index::reader::IndexReader;
use crate::query::model::RetrievalModel;
use crate::query::node::QueryNode;
use crate::query::score_list::ScoreList;
use crate::query::scorer;

/// Cooperative cancellation flag shared between a caller and in-flight
/// evaluations. Checked once per document-match iteration.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a fresh, non-cancelled token.
    pub fn new() -> Self {
        CancelToken::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Evaluate one operator tree against an index under a retrieval model.
///
/// The tree is validated, compiled, driven through a single forward
/// pass, and discarded. The returned list is unsorted; callers decide
/// when to `sort()` and `truncate()`.
pub fn evaluate(
    node: &QueryNode,
    model: &RetrievalModel,
    reader: &dyn IndexReader,
) -> Result<ScoreList> {
    evaluate_with_cancel(node, model, reader, &CancelToken::new())
}

/// Evaluate with a cancellation token.
pub fn evaluate_with_cancel(
    node: &QueryNode,
    model: &RetrievalModel,
    reader: &dyn IndexReader,
    cancel: &CancelToken,
) -> Result<ScoreList> {
    node.validate()?;

    let mut root = scorer::compile(node, reader)?;
    let mut results = ScoreList::new();

    while root.has_doc_match(model) {
        if cancel.is_cancelled() {
            return Err(KontosError::cancelled("query evaluation cancelled"));
        }
        let doc_id = root.current_doc(model);
        let score = root.score(model, reader)?;
        results.add(doc_id, score);
        root.advance_past(doc_id);
    }

    Ok(results)
}

/// Evaluate a bare list of parsed nodes, wrapping them in the model's
/// default combinator when the parser supplied no explicit root.
pub fn evaluate_terms(
    nodes: Vec<QueryNode>,
    model: &RetrievalModel,
    reader: &dyn IndexReader,
) -> Result<ScoreList> {
    let root = QueryNode::implicit_root(nodes, model.default_combinator())?;
    evaluate(&root, model, reader)
}
