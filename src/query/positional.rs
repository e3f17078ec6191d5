//! Evaluation of position-carrying operators.
//!
//! Term, SYN, NEAR and WINDOW nodes each synthesize a new posting
//! stream from their children's streams. Synthesis is bottom-up and
//! eager: a node's children are materialized first, then consumed by a
//! single forward sweep that never backtracks, producing an immutable
//! [`PostingList`] the parent iterates through a [`PostingCursor`].

use crate::error::{KontosError, Result};
use crate::index::reader::IndexReader;
use crate::query::node::QueryNode;
use crate::query::posting::{Posting, PostingCursor, PostingList};

/// Whether a proximity operator constrains the order of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProximityKind {
    /// Strict left-to-right order, adjacent gap in `(0, n]`.
    Ordered,
    /// Any order, total span `max - min` at most `n`.
    Unordered,
}

/// Materialize a positional node into a cursor over its synthesized
/// posting stream.
///
/// The caller has already validated the tree; a non-positional node
/// here is an internal error.
pub(crate) fn evaluate_positional(
    node: &QueryNode,
    reader: &dyn IndexReader,
) -> Result<PostingCursor> {
    match node {
        QueryNode::Term { term, field } => {
            let list = reader.postings(field, term)?.unwrap_or_default();
            Ok(PostingCursor::new(list))
        }
        QueryNode::Syn(children) => {
            let cursors = evaluate_children(children, reader)?;
            Ok(PostingCursor::new(synonym_union(cursors)))
        }
        QueryNode::Near { n, children } => {
            let cursors = evaluate_children(children, reader)?;
            Ok(PostingCursor::new(proximity_merge(
                cursors,
                *n,
                ProximityKind::Ordered,
            )))
        }
        QueryNode::Window { n, children } => {
            let cursors = evaluate_children(children, reader)?;
            Ok(PostingCursor::new(proximity_merge(
                cursors,
                *n,
                ProximityKind::Unordered,
            )))
        }
        QueryNode::And(_) | QueryNode::Or(_) => Err(KontosError::internal(format!(
            "positional evaluation of a document-level operator: {node:?}"
        ))),
    }
}

fn evaluate_children(
    children: &[QueryNode],
    reader: &dyn IndexReader,
) -> Result<Vec<PostingCursor>> {
    children
        .iter()
        .map(|child| evaluate_positional(child, reader))
        .collect()
}

/// Union of the children's streams: a document matches when any child
/// matches it, and its positions are the deduplicated union of the
/// matching children's positions.
fn synonym_union(mut cursors: Vec<PostingCursor>) -> PostingList {
    let mut result = PostingList::new();

    loop {
        let Some(doc_id) = cursors
            .iter()
            .filter(|c| c.has_doc_match())
            .map(|c| c.current_doc())
            .min()
        else {
            break;
        };

        let mut positions = Vec::new();
        for cursor in cursors.iter_mut() {
            if cursor.has_doc_match() && cursor.current_doc() == doc_id {
                while cursor.has_pos_match() {
                    positions.push(cursor.current_pos());
                    cursor.advance_pos();
                }
            }
        }
        positions.sort_unstable();
        positions.dedup();

        result.push(Posting::new(doc_id, positions));
        for cursor in cursors.iter_mut() {
            cursor.advance_past(doc_id);
        }
    }

    result
}

/// Align every cursor on the same document using the align-to-max rule:
/// repeatedly advance every cursor below the current maximum until all
/// agree, or some cursor is exhausted.
fn align_all(cursors: &mut [PostingCursor]) -> Option<u64> {
    loop {
        if cursors.iter().any(|c| !c.has_doc_match()) {
            return None;
        }
        let max = cursors.iter().map(|c| c.current_doc()).max()?;
        let mut moved = false;
        for cursor in cursors.iter_mut() {
            if cursor.current_doc() < max {
                cursor.advance_to(max);
                moved = true;
            }
        }
        if !moved {
            return Some(max);
        }
    }
}

/// Synthesize the proximity stream: for every document all children
/// share, sweep their position lists once, recording each accepted
/// window and greedily sliding the smallest position on rejection.
fn proximity_merge(mut cursors: Vec<PostingCursor>, n: u32, kind: ProximityKind) -> PostingList {
    let mut result = PostingList::new();
    if cursors.len() < 2 {
        return result;
    }

    while let Some(doc_id) = align_all(&mut cursors) {
        let mut positions = Vec::new();
        let mut locs = vec![0u32; cursors.len()];

        loop {
            // One candidate window per iteration; stop at the first
            // exhausted child.
            let mut exhausted = false;
            for (i, cursor) in cursors.iter().enumerate() {
                if !cursor.has_pos_match() {
                    exhausted = true;
                    break;
                }
                locs[i] = cursor.current_pos();
            }
            if exhausted {
                break;
            }

            if window_accepted(&locs, n, kind) {
                positions.push(window_position(&locs, kind));
                for cursor in cursors.iter_mut() {
                    cursor.advance_pos();
                }
            } else {
                let min_index = min_index(&locs);
                cursors[min_index].advance_pos();
            }
        }

        if !positions.is_empty() {
            result.push(Posting::new(doc_id, positions));
        }
        for cursor in cursors.iter_mut() {
            cursor.advance_past(doc_id);
        }
    }

    result
}

fn window_accepted(locs: &[u32], n: u32, kind: ProximityKind) -> bool {
    match kind {
        // Adjacent pairs in argument order, each gap in (0, n].
        ProximityKind::Ordered => locs
            .windows(2)
            .all(|w| w[1] > w[0] && w[1] - w[0] <= n),
        // Unlike NEAR, WINDOW ignores argument order entirely: only the
        // span between the extreme positions is bounded.
        ProximityKind::Unordered => {
            let min = *locs.iter().min().unwrap_or(&0);
            let max = *locs.iter().max().unwrap_or(&0);
            max - min <= n
        }
    }
}

/// The position recorded for an accepted window: the last child's
/// position for NEAR, the maximum position for WINDOW.
fn window_position(locs: &[u32], kind: ProximityKind) -> u32 {
    match kind {
        ProximityKind::Ordered => *locs.last().unwrap_or(&0),
        ProximityKind::Unordered => *locs.iter().max().unwrap_or(&0),
    }
}

fn min_index(locs: &[u32]) -> usize {
    let mut min_index = 0;
    for (i, &loc) in locs.iter().enumerate().skip(1) {
        if loc < locs[min_index] {
            min_index = i;
        }
    }
    min_index
}
