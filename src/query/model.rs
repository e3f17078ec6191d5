//! Retrieval models: the pluggable scoring strategies.
//!
//! A [`RetrievalModel`] is an immutable parameter set selecting a
//! scoring formula. It is passed down the operator tree by value during
//! evaluation; operators never encode model behavior themselves.

use serde::{Deserialize, Serialize};

use crate::error::{KontosError, Result};

/// The implicit root operator a model selects when the parser's
/// top-level form is a bare list of terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Combinator {
    /// Conjunction root.
    And,
    /// Disjunction root.
    Or,
}

/// BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f64,
    /// Length normalization, in `[0, 1]`.
    pub b: f64,
    /// Query term-frequency saturation.
    pub k3: f64,
}

/// Dirichlet-smoothed language model parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirichletParams {
    /// Dirichlet smoothing mass.
    pub mu: f64,
    /// Mixing weight toward the collection model, in `[0, 1]`.
    pub lambda: f64,
}

/// Per-leaf statistics consumed by the scoring formulas.
///
/// For plain term leaves these come straight from the index; for
/// synthesized streams (SYN/NEAR/WINDOW) the document and collection
/// frequencies are those of the synthesized posting list itself.
#[derive(Debug, Clone, Copy)]
pub struct TermStats {
    /// Number of documents containing the term (df).
    pub doc_freq: u64,
    /// Total occurrences of the term in the collection (ctf).
    pub collection_freq: u64,
    /// Number of documents carrying the field.
    pub doc_count: u64,
    /// Average field length across those documents.
    pub avg_doc_len: f64,
    /// Sum of field lengths across the collection.
    pub collection_len: u64,
}

/// A parameterized retrieval model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetrievalModel {
    /// Boolean, score 1 for every match.
    UnrankedBoolean,
    /// Boolean, score equals term frequency.
    RankedBoolean,
    /// Okapi BM25.
    Bm25(Bm25Params),
    /// Dirichlet-smoothed language model.
    Dirichlet(DirichletParams),
}

impl RetrievalModel {
    /// Create a BM25 model, validating its parameters.
    pub fn bm25(k1: f64, b: f64, k3: f64) -> Result<Self> {
        if !k1.is_finite() || k1 < 0.0 {
            return Err(KontosError::model(format!("BM25 k1 must be >= 0, got {k1}")));
        }
        if !b.is_finite() || !(0.0..=1.0).contains(&b) {
            return Err(KontosError::model(format!(
                "BM25 b must be in [0, 1], got {b}"
            )));
        }
        if !k3.is_finite() || k3 < 0.0 {
            return Err(KontosError::model(format!("BM25 k3 must be >= 0, got {k3}")));
        }
        Ok(RetrievalModel::Bm25(Bm25Params { k1, b, k3 }))
    }

    /// Create a Dirichlet LM model, validating its parameters.
    pub fn dirichlet(mu: f64, lambda: f64) -> Result<Self> {
        if !mu.is_finite() || mu < 0.0 {
            return Err(KontosError::model(format!(
                "Dirichlet mu must be >= 0, got {mu}"
            )));
        }
        if !lambda.is_finite() || !(0.0..=1.0).contains(&lambda) {
            return Err(KontosError::model(format!(
                "Dirichlet lambda must be in [0, 1], got {lambda}"
            )));
        }
        Ok(RetrievalModel::Dirichlet(DirichletParams { mu, lambda }))
    }

    /// The implicit root operator for a bare list of query terms.
    pub fn default_combinator(&self) -> Combinator {
        match self {
            RetrievalModel::UnrankedBoolean | RetrievalModel::RankedBoolean => Combinator::Or,
            RetrievalModel::Bm25(_) | RetrievalModel::Dirichlet(_) => Combinator::And,
        }
    }

    /// Whether compound operators must score children that do not
    /// locally match the current document.
    pub fn needs_default_score(&self) -> bool {
        matches!(self, RetrievalModel::Dirichlet(_))
    }

    /// Score a matched leaf occurrence.
    pub fn leaf_score(&self, tf: u64, doc_len: u64, stats: &TermStats) -> f64 {
        match self {
            RetrievalModel::UnrankedBoolean => {
                if tf > 0 {
                    1.0
                } else {
                    0.0
                }
            }
            RetrievalModel::RankedBoolean => tf as f64,
            RetrievalModel::Bm25(p) => {
                let idf = idf_weight(stats.doc_count, stats.doc_freq);
                let tf = tf as f64;
                let avg_len = if stats.avg_doc_len > 0.0 {
                    stats.avg_doc_len
                } else {
                    1.0
                };
                let norm = p.k1 * (1.0 - p.b + p.b * doc_len as f64 / avg_len);
                let tf_weight = tf * (p.k1 + 1.0) / (tf + norm);
                // The query term weight (k3+1)*qtf / (k3+qtf) is 1 for
                // the single occurrence each leaf represents.
                idf * tf_weight
            }
            RetrievalModel::Dirichlet(p) => {
                let prob_c = collection_prob(stats);
                let smoothed = (tf as f64 + p.mu * prob_c) / (doc_len as f64 + p.mu);
                ((1.0 - p.lambda) * smoothed + p.lambda * prob_c).ln()
            }
        }
    }

    /// Score a leaf that does not match the current document.
    ///
    /// Only the language-model family requires this; Boolean and BM25
    /// contribute nothing for absent terms.
    pub fn default_score(&self, doc_len: u64, stats: &TermStats) -> f64 {
        match self {
            RetrievalModel::Dirichlet(_) => self.leaf_score(0, doc_len, stats),
            _ => 0.0,
        }
    }
}

/// RSJ-style inverse document frequency, clamped at 0 so that the BM25
/// leaf score stays non-negative and monotone decreasing in df.
fn idf_weight(doc_count: u64, doc_freq: u64) -> f64 {
    if doc_count == 0 {
        return 0.0;
    }
    let n = doc_count as f64;
    let df = doc_freq as f64;
    ((n - df + 0.5) / (df + 0.5)).ln().max(0.0)
}

/// Collection background probability for the language model.
///
/// A synthesized stream that never occurs in the collection would make
/// the background probability zero and the log score undefined; back
/// off to half an occurrence in that case.
fn collection_prob(stats: &TermStats) -> f64 {
    let len = stats.collection_len.max(1) as f64;
    if stats.collection_freq == 0 {
        0.5 / len
    } else {
        stats.collection_freq as f64 / len
    }
}

/// Serializable model selection, as read from a parameter file.
///
/// ```
/// use kontos::query::model::ModelSpec;
///
/// let spec: ModelSpec =
///     serde_json::from_str(r#"{"model":"bm25","k_1":1.2,"b":0.75,"k_3":0.0}"#).unwrap();
/// let model = spec.into_model().unwrap();
/// assert!(!model.needs_default_score());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "lowercase")]
pub enum ModelSpec {
    /// Unranked Boolean.
    UnrankedBoolean,
    /// Ranked Boolean.
    RankedBoolean,
    /// BM25 with explicit parameters.
    Bm25 {
        /// k1 parameter.
        k_1: f64,
        /// b parameter.
        b: f64,
        /// k3 parameter.
        k_3: f64,
    },
    /// Dirichlet LM with explicit parameters.
    Indri {
        /// mu parameter.
        mu: f64,
        /// lambda parameter.
        lambda: f64,
    },
}

impl ModelSpec {
    /// Build the retrieval model, validating parameters.
    pub fn into_model(self) -> Result<RetrievalModel> {
        match self {
            ModelSpec::UnrankedBoolean => Ok(RetrievalModel::UnrankedBoolean),
            ModelSpec::RankedBoolean => Ok(RetrievalModel::RankedBoolean),
            ModelSpec::Bm25 { k_1, b, k_3 } => RetrievalModel::bm25(k_1, b, k_3),
            ModelSpec::Indri { mu, lambda } => RetrievalModel::dirichlet(mu, lambda),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> TermStats {
        TermStats {
            doc_freq: 10,
            collection_freq: 40,
            doc_count: 1000,
            avg_doc_len: 12.0,
            collection_len: 12_000,
        }
    }

    #[test]
    fn test_parameter_validation() {
        assert!(RetrievalModel::bm25(1.2, 0.75, 0.0).is_ok());
        assert!(RetrievalModel::bm25(-1.0, 0.75, 0.0).is_err());
        assert!(RetrievalModel::bm25(1.2, 1.5, 0.0).is_err());
        assert!(RetrievalModel::bm25(1.2, 0.75, -2.0).is_err());

        assert!(RetrievalModel::dirichlet(2500.0, 0.4).is_ok());
        assert!(RetrievalModel::dirichlet(-1.0, 0.4).is_err());
        assert!(RetrievalModel::dirichlet(2500.0, 1.4).is_err());
    }

    #[test]
    fn test_default_combinator() {
        assert_eq!(
            RetrievalModel::UnrankedBoolean.default_combinator(),
            Combinator::Or
        );
        assert_eq!(
            RetrievalModel::RankedBoolean.default_combinator(),
            Combinator::Or
        );
        assert_eq!(
            RetrievalModel::bm25(1.2, 0.75, 0.0)
                .unwrap()
                .default_combinator(),
            Combinator::And
        );
        assert_eq!(
            RetrievalModel::dirichlet(2500.0, 0.4)
                .unwrap()
                .default_combinator(),
            Combinator::And
        );
    }

    #[test]
    fn test_boolean_leaf_scores() {
        let stats = stats();
        assert_eq!(RetrievalModel::UnrankedBoolean.leaf_score(3, 10, &stats), 1.0);
        assert_eq!(RetrievalModel::UnrankedBoolean.leaf_score(0, 10, &stats), 0.0);
        assert_eq!(RetrievalModel::RankedBoolean.leaf_score(3, 10, &stats), 3.0);
    }

    #[test]
    fn test_bm25_monotone_in_tf() {
        let model = RetrievalModel::bm25(1.2, 0.75, 0.0).unwrap();
        let stats = stats();

        let mut prev = model.leaf_score(0, 12, &stats);
        for tf in 1..10 {
            let score = model.leaf_score(tf, 12, &stats);
            assert!(score >= prev, "BM25 score decreased at tf={tf}");
            prev = score;
        }
    }

    #[test]
    fn test_bm25_idf_decreasing_in_df() {
        let common = idf_weight(1000, 500);
        let rare = idf_weight(1000, 5);
        assert!(rare > common);
        assert!(common >= 0.0);
    }

    #[test]
    fn test_dirichlet_monotone_in_tf() {
        let model = RetrievalModel::dirichlet(2500.0, 0.4).unwrap();
        let stats = stats();

        let mut prev = model.leaf_score(0, 12, &stats);
        for tf in 1..10 {
            let score = model.leaf_score(tf, 12, &stats);
            assert!(score >= prev, "LM score decreased at tf={tf}");
            prev = score;
        }
    }

    #[test]
    fn test_dirichlet_default_score_matches_zero_tf() {
        let model = RetrievalModel::dirichlet(2500.0, 0.4).unwrap();
        let stats = stats();
        assert_eq!(
            model.default_score(12, &stats),
            model.leaf_score(0, 12, &stats)
        );
        assert!(model.needs_default_score());
    }

    #[test]
    fn test_non_lm_default_score_is_zero() {
        let stats = stats();
        let bm25 = RetrievalModel::bm25(1.2, 0.75, 0.0).unwrap();
        assert_eq!(bm25.default_score(12, &stats), 0.0);
        assert_eq!(RetrievalModel::RankedBoolean.default_score(12, &stats), 0.0);
        assert!(!bm25.needs_default_score());
    }

    #[test]
    fn test_model_spec_json() {
        let spec: ModelSpec = serde_json::from_str(
            r#"{"model":"indri","mu":2500.0,"lambda":0.4}"#,
        )
        .unwrap();
        let model = spec.into_model().unwrap();
        assert_eq!(model, RetrievalModel::dirichlet(2500.0, 0.4).unwrap());

        let bad: ModelSpec =
            serde_json::from_str(r#"{"model":"bm25","k_1":-1.0,"b":0.75,"k_3":0.0}"#).unwrap();
        assert!(bad.into_model().is_err());
    }
}
