//! Score operators: wrap structural subtrees and turn matched
//! occurrences into numbers under the active retrieval model.
//!
//! The evaluation tree has two layers. Position-carrying nodes are
//! materialized by [`crate::query::positional`] and wrapped in a
//! [`ScoreOp::Leaf`]; AND/OR nodes merge their children's document
//! streams lazily and combine per the model. The model is threaded
//! through every call rather than stored in the tree.

use crate::error::Result;
use crate::index::reader::IndexReader;
use crate::query::model::{RetrievalModel, TermStats};
use crate::query::node::QueryNode;
use crate::query::positional::evaluate_positional;
use crate::query::posting::PostingCursor;

/// A compiled score-operator tree, driven through one forward pass.
#[derive(Debug)]
pub(crate) enum ScoreOp {
    /// A score leaf over a materialized posting stream.
    Leaf(ScoreLeaf),
    /// Conjunction of score operators.
    And(Vec<ScoreOp>),
    /// Disjunction of score operators.
    Or(Vec<ScoreOp>),
}

#[derive(Debug)]
pub(crate) struct ScoreLeaf {
    cursor: PostingCursor,
    field: String,
    stats: TermStats,
}

/// Compile a validated operator tree against an index.
///
/// Statistics are gathered once here, at model-construction boundaries,
/// so evaluation itself only reads document lengths.
pub(crate) fn compile(
    node: &QueryNode,
    reader: &dyn IndexReader,
) -> Result<ScoreOp> {
    match node {
        QueryNode::And(children) => Ok(ScoreOp::And(compile_children(children, reader)?)),
        QueryNode::Or(children) => Ok(ScoreOp::Or(compile_children(children, reader)?)),
        positional => Ok(ScoreOp::Leaf(compile_leaf(positional, reader)?)),
    }
}

fn compile_children(children: &[QueryNode], reader: &dyn IndexReader) -> Result<Vec<ScoreOp>> {
    children.iter().map(|c| compile(c, reader)).collect()
}

fn compile_leaf(node: &QueryNode, reader: &dyn IndexReader) -> Result<ScoreLeaf> {
    let field = node
        .field()
        .unwrap_or(crate::query::node::DEFAULT_FIELD)
        .to_string();
    let cursor = evaluate_positional(node, reader)?;

    // Plain terms take df/ctf from the index; synthesized streams are
    // their own collection statistic.
    let (doc_freq, collection_freq) = match node {
        QueryNode::Term { term, field } => (
            reader.document_frequency(field, term)?,
            reader.collection_term_frequency(field, term)?,
        ),
        _ => (
            cursor.posting_list().len() as u64,
            cursor.posting_list().total_term_freq(),
        ),
    };

    let stats = TermStats {
        doc_freq,
        collection_freq,
        doc_count: reader.doc_count(&field)?,
        avg_doc_len: reader.avg_doc_length(&field)?,
        collection_len: reader.collection_length(&field)?,
    };

    Ok(ScoreLeaf {
        cursor,
        field,
        stats,
    })
}

impl ScoreOp {
    /// Advance children as needed and report whether a current matching
    /// document exists.
    ///
    /// AND requires all children on the same document (align-to-max),
    /// except under models that score absent terms, where any matching
    /// child suffices. OR and SYN-style disjunction accept the minimum
    /// matching document.
    pub(crate) fn has_doc_match(&mut self, model: &RetrievalModel) -> bool {
        match self {
            ScoreOp::Leaf(leaf) => leaf.cursor.has_doc_match(),
            ScoreOp::Or(children) => {
                // Evaluate every child so min-doc inspection below sees
                // settled cursors; `any` would leave later ones stale.
                children
                    .iter_mut()
                    .fold(false, |acc, c| c.has_doc_match(model) || acc)
            }
            ScoreOp::And(children) => {
                if model.needs_default_score() {
                    children
                        .iter_mut()
                        .fold(false, |acc, c| c.has_doc_match(model) || acc)
                } else {
                    align_all(children, model)
                }
            }
        }
    }

    /// The current matched document.
    ///
    /// # Panics
    ///
    /// Panics when called without a preceding successful
    /// `has_doc_match`; that is a programmer error.
    pub(crate) fn current_doc(&self, model: &RetrievalModel) -> u64 {
        match self.current_doc_opt(model) {
            Some(doc_id) => doc_id,
            None => panic!("current_doc called without a document match"),
        }
    }

    fn current_doc_opt(&self, model: &RetrievalModel) -> Option<u64> {
        match self {
            ScoreOp::Leaf(leaf) => leaf.cursor.has_doc_match().then(|| leaf.cursor.current_doc()),
            ScoreOp::Or(children) => children
                .iter()
                .filter_map(|c| c.current_doc_opt(model))
                .min(),
            ScoreOp::And(children) => {
                if model.needs_default_score() {
                    children
                        .iter()
                        .filter_map(|c| c.current_doc_opt(model))
                        .min()
                } else {
                    // Aligned by has_doc_match; every child agrees.
                    children.first().and_then(|c| c.current_doc_opt(model))
                }
            }
        }
    }

    fn matches_at(&self, doc_id: u64, model: &RetrievalModel) -> bool {
        self.current_doc_opt(model) == Some(doc_id)
    }

    /// Move every underlying cursor to the first document strictly
    /// greater than `doc_id`. Forward-only.
    pub(crate) fn advance_past(&mut self, doc_id: u64) {
        match self {
            ScoreOp::Leaf(leaf) => leaf.cursor.advance_past(doc_id),
            ScoreOp::And(children) | ScoreOp::Or(children) => {
                children.iter_mut().for_each(|c| c.advance_past(doc_id));
            }
        }
    }

    fn advance_to(&mut self, doc_id: u64) {
        match self {
            ScoreOp::Leaf(leaf) => leaf.cursor.advance_to(doc_id),
            ScoreOp::And(children) | ScoreOp::Or(children) => {
                children.iter_mut().for_each(|c| c.advance_to(doc_id));
            }
        }
    }

    /// Score the current matched document under the model.
    pub(crate) fn score(&self, model: &RetrievalModel, reader: &dyn IndexReader) -> Result<f64> {
        let doc_id = self.current_doc(model);
        self.score_at(doc_id, model, reader)
    }

    fn score_at(
        &self,
        doc_id: u64,
        model: &RetrievalModel,
        reader: &dyn IndexReader,
    ) -> Result<f64> {
        match self {
            ScoreOp::Leaf(leaf) => leaf.score(model, reader),
            ScoreOp::And(children) => match model {
                RetrievalModel::UnrankedBoolean => Ok(1.0),
                RetrievalModel::RankedBoolean | RetrievalModel::Bm25(_) => {
                    let mut sum = 0.0;
                    for child in children {
                        sum += child.score_at(doc_id, model, reader)?;
                    }
                    Ok(sum)
                }
                RetrievalModel::Dirichlet(_) => {
                    // Absent children still contribute: the language
                    // model accounts for terms the document lacks.
                    let mut sum = 0.0;
                    for child in children {
                        sum += if child.matches_at(doc_id, model) {
                            child.score_at(doc_id, model, reader)?
                        } else {
                            child.default_score(doc_id, model, reader)?
                        };
                    }
                    Ok(sum)
                }
            },
            ScoreOp::Or(children) => match model {
                RetrievalModel::UnrankedBoolean => Ok(1.0),
                RetrievalModel::RankedBoolean => {
                    let mut best = f64::NEG_INFINITY;
                    for child in children {
                        if child.matches_at(doc_id, model) {
                            best = best.max(child.score_at(doc_id, model, reader)?);
                        }
                    }
                    Ok(best.max(0.0))
                }
                RetrievalModel::Bm25(_) => {
                    let mut sum = 0.0;
                    for child in children {
                        if child.matches_at(doc_id, model) {
                            sum += child.score_at(doc_id, model, reader)?;
                        }
                    }
                    Ok(sum)
                }
                RetrievalModel::Dirichlet(_) => {
                    let mut best = f64::NEG_INFINITY;
                    for child in children {
                        let score = if child.matches_at(doc_id, model) {
                            child.score_at(doc_id, model, reader)?
                        } else {
                            child.default_score(doc_id, model, reader)?
                        };
                        best = best.max(score);
                    }
                    Ok(best)
                }
            },
        }
    }

    /// Score for a document this subtree does not match (LM family
    /// only; zero otherwise).
    fn default_score(
        &self,
        doc_id: u64,
        model: &RetrievalModel,
        reader: &dyn IndexReader,
    ) -> Result<f64> {
        if !model.needs_default_score() {
            return Ok(0.0);
        }
        match self {
            ScoreOp::Leaf(leaf) => leaf.default_score(doc_id, model, reader),
            ScoreOp::And(children) => {
                let mut sum = 0.0;
                for child in children {
                    sum += child.default_score(doc_id, model, reader)?;
                }
                Ok(sum)
            }
            ScoreOp::Or(children) => {
                let mut best = f64::NEG_INFINITY;
                for child in children {
                    best = best.max(child.default_score(doc_id, model, reader)?);
                }
                Ok(best)
            }
        }
    }
}

/// Align-to-max document merge: advance every child below the current
/// maximum until all agree on one document or any child is exhausted.
fn align_all(children: &mut [ScoreOp], model: &RetrievalModel) -> bool {
    loop {
        let mut all_match = true;
        for child in children.iter_mut() {
            if !child.has_doc_match(model) {
                all_match = false;
            }
        }
        if !all_match {
            return false;
        }

        let Some(max) = children
            .iter()
            .filter_map(|c| c.current_doc_opt(model))
            .max()
        else {
            return false;
        };

        let mut moved = false;
        for child in children.iter_mut() {
            if child.current_doc(model) < max {
                child.advance_to(max);
                moved = true;
            }
        }
        if !moved {
            return true;
        }
    }
}

impl ScoreLeaf {
    fn score(&self, model: &RetrievalModel, reader: &dyn IndexReader) -> Result<f64> {
        let doc_id = self.cursor.current_doc();
        let doc_len = reader.doc_length(&self.field, doc_id)?;
        Ok(model.leaf_score(self.cursor.current_tf(), doc_len, &self.stats))
    }

    fn default_score(
        &self,
        doc_id: u64,
        model: &RetrievalModel,
        reader: &dyn IndexReader,
    ) -> Result<f64> {
        let doc_len = reader.doc_length(&self.field, doc_id)?;
        Ok(model.default_score(doc_len, &self.stats))
    }
}
