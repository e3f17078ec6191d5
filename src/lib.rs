//! # Kontos
//!
//! A structured Boolean/proximity query evaluation engine over inverted
//! indexes, with pluggable retrieval models.
//!
//! ## Features
//!
//! - Forward-only posting cursor protocol shared by all operators
//! - Structural operators: AND, OR, SYN, NEAR/n, WINDOW/n
//! - Retrieval models: unranked/ranked Boolean, BM25, Dirichlet LM
//! - Single-pass evaluation driver with cooperative cancellation
//! - Parallel batch evaluation with per-query failure isolation
//!
//! ```
//! use kontos::index::MemoryIndex;
//! use kontos::query::{QueryNode, RetrievalModel, evaluate};
//!
//! let mut index = MemoryIndex::new();
//! index.add_document(1, "body", &["cat", "dog"]);
//! index.add_document(2, "body", &["cat"]);
//!
//! let query = QueryNode::And(vec![QueryNode::term("cat"), QueryNode::term("dog")]);
//! let mut results = evaluate(&query, &RetrievalModel::UnrankedBoolean, &index).unwrap();
//! results.sort();
//!
//! assert_eq!(results.entries()[0].doc_id, 1);
//! ```

pub mod error;
pub mod index;
pub mod parallel;
pub mod query;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
