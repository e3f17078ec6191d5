//! Posting representation and the forward-only cursor protocol.
//!
//! A [`PostingList`] is an immutable, docid-sorted sequence of
//! [`Posting`] entries. Every query operator ultimately iterates one of
//! these through a [`PostingCursor`], which owns a document-level index
//! and a position-level index into the list. Both indices only ever move
//! forward during an evaluation pass; once a cursor has been advanced
//! past a document, that document's data is unreachable for the rest of
//! the pass.

/// A single (document, positions) record for one term or one synthesized
/// operator result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// The document ID.
    pub doc_id: u64,
    /// Occurrence positions within the document, non-decreasing.
    ///
    /// Term postings carry strictly increasing positions; synthesized
    /// proximity postings record one window-end position per accepted
    /// window, and duplicates are not deduplicated.
    pub positions: Vec<u32>,
}

impl Posting {
    /// Create a new posting.
    pub fn new(doc_id: u64, positions: Vec<u32>) -> Self {
        Posting { doc_id, positions }
    }

    /// Term frequency: the number of recorded occurrences.
    pub fn term_freq(&self) -> u64 {
        self.positions.len() as u64
    }
}

/// A docid-sorted sequence of postings.
///
/// Lists are immutable once built; cursors index into them rather than
/// consuming them, so a list can be cloned freely for testing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    postings: Vec<Posting>,
}

impl PostingList {
    /// Create an empty posting list.
    pub fn new() -> Self {
        PostingList {
            postings: Vec::new(),
        }
    }

    /// Create a posting list from a docid-sorted vector.
    pub fn from_postings(postings: Vec<Posting>) -> Self {
        debug_assert!(
            postings.windows(2).all(|w| w[0].doc_id < w[1].doc_id),
            "posting list must be strictly increasing by doc_id"
        );
        PostingList { postings }
    }

    /// Append a posting. The doc_id must be greater than the last one.
    pub fn push(&mut self, posting: Posting) {
        debug_assert!(
            self.postings
                .last()
                .is_none_or(|last| last.doc_id < posting.doc_id),
            "posting list must be strictly increasing by doc_id"
        );
        self.postings.push(posting);
    }

    /// Number of documents in this list (the document frequency).
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Check whether this list is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Total number of recorded positions across all documents.
    pub fn total_term_freq(&self) -> u64 {
        self.postings.iter().map(|p| p.term_freq()).sum()
    }

    /// Get the posting at an index.
    pub fn get(&self, index: usize) -> Option<&Posting> {
        self.postings.get(index)
    }

    /// Iterate over the postings.
    pub fn iter(&self) -> std::slice::Iter<'_, Posting> {
        self.postings.iter()
    }
}

/// Forward-only cursor over a materialized posting list.
///
/// Implements the document-level protocol (`has_doc_match`,
/// `current_doc`, `advance_past`, `advance_to`) and the position-level
/// protocol (`has_pos_match`, `current_pos`, `advance_pos`). The
/// position index resets to the first position whenever the document
/// index moves.
#[derive(Debug, Clone)]
pub struct PostingCursor {
    list: PostingList,
    doc_index: usize,
    pos_index: usize,
}

impl PostingCursor {
    /// Create a cursor positioned at the first posting.
    pub fn new(list: PostingList) -> Self {
        PostingCursor {
            list,
            doc_index: 0,
            pos_index: 0,
        }
    }

    /// Create a cursor that matches no documents.
    pub fn empty() -> Self {
        PostingCursor::new(PostingList::new())
    }

    /// The underlying posting list.
    pub fn posting_list(&self) -> &PostingList {
        &self.list
    }

    /// True iff the cursor currently points at a stored document.
    pub fn has_doc_match(&self) -> bool {
        self.doc_index < self.list.len()
    }

    /// The current document ID.
    ///
    /// # Panics
    ///
    /// Panics if `has_doc_match()` is false; calling this without a
    /// match is a programmer error, not a recoverable condition.
    pub fn current_doc(&self) -> u64 {
        self.current_posting().doc_id
    }

    /// Term frequency in the current document.
    pub fn current_tf(&self) -> u64 {
        self.current_posting().term_freq()
    }

    /// Move to the first document with id strictly greater than `doc_id`.
    ///
    /// Forward-only: a cursor already beyond `doc_id` does not move.
    pub fn advance_past(&mut self, doc_id: u64) {
        let mut moved = false;
        while self.has_doc_match() && self.current_doc() <= doc_id {
            self.doc_index += 1;
            moved = true;
        }
        if moved {
            self.pos_index = 0;
        }
    }

    /// Move to the first document with id greater than or equal to
    /// `doc_id`. Forward-only, like [`advance_past`](Self::advance_past).
    pub fn advance_to(&mut self, doc_id: u64) {
        let mut moved = false;
        while self.has_doc_match() && self.current_doc() < doc_id {
            self.doc_index += 1;
            moved = true;
        }
        if moved {
            self.pos_index = 0;
        }
    }

    /// True iff an unconsumed position remains in the current document.
    pub fn has_pos_match(&self) -> bool {
        self.has_doc_match() && self.pos_index < self.current_posting().positions.len()
    }

    /// The current position within the current document.
    ///
    /// # Panics
    ///
    /// Panics if `has_pos_match()` is false.
    pub fn current_pos(&self) -> u32 {
        if !self.has_pos_match() {
            panic!("current_pos called without a position match");
        }
        self.current_posting().positions[self.pos_index]
    }

    /// Advance the position index by one step.
    pub fn advance_pos(&mut self) {
        self.pos_index += 1;
    }

    fn current_posting(&self) -> &Posting {
        match self.list.get(self.doc_index) {
            Some(posting) => posting,
            None => panic!("current_doc called without a document match"),
        }
    }
}
