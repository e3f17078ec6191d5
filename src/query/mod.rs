//! Query evaluation: operator trees, retrieval models, and the
//! forward-pass driver.

pub mod eval;
pub mod model;
pub mod node;
mod positional;
pub mod posting;
pub mod score_list;
mod scorer;

pub use self::eval::{CancelToken, evaluate, evaluate_terms, evaluate_with_cancel};
pub use self::model::{Bm25Params, Combinator, DirichletParams, ModelSpec, RetrievalModel};
pub use self::node::{DEFAULT_FIELD, QueryNode};
pub use self::posting::{Posting, PostingCursor, PostingList};
pub use self::score_list::{ScoreEntry, ScoreList};
