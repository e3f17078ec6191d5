//! Operator tree produced by an external query parser.
//!
//! The engine does not parse query strings; it consumes an already-built
//! [`QueryNode`] tree. Child order is preserved everywhere and is
//! semantically meaningful for proximity operators, where it fixes the
//! required left-to-right sequence of terms.

use crate::error::{KontosError, Result};
use crate::query::model::Combinator;

/// The default field a bare term is evaluated against.
pub const DEFAULT_FIELD: &str = "body";

/// A node in the structured query operator tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryNode {
    /// A single term in a field (`term.field`).
    Term {
        /// The term, already normalized by the parser.
        term: String,
        /// The field to evaluate against.
        field: String,
    },
    /// Conjunction: every child must match the document.
    And(Vec<QueryNode>),
    /// Disjunction: at least one child must match the document.
    Or(Vec<QueryNode>),
    /// Synonym union: children's postings merged into one stream,
    /// equal positions deduplicated.
    Syn(Vec<QueryNode>),
    /// Ordered proximity: adjacent children must occur in order with a
    /// positive gap of at most `n`.
    Near {
        /// Maximum allowed gap between adjacent children.
        n: u32,
        /// Children in required left-to-right order.
        children: Vec<QueryNode>,
    },
    /// Unordered proximity: all children must occur with the span of
    /// their positions bounded by `n`, in any order.
    Window {
        /// Maximum allowed span between the smallest and largest
        /// position.
        n: u32,
        /// Children, order not significant for matching.
        children: Vec<QueryNode>,
    },
}

impl QueryNode {
    /// Create a term node in the default field.
    pub fn term<T: Into<String>>(term: T) -> Self {
        QueryNode::Term {
            term: term.into(),
            field: DEFAULT_FIELD.to_string(),
        }
    }

    /// Create a term node in an explicit field.
    pub fn term_in<T: Into<String>, F: Into<String>>(term: T, field: F) -> Self {
        QueryNode::Term {
            term: term.into(),
            field: field.into(),
        }
    }

    /// Wrap a bare list of nodes in the model's default combinator.
    ///
    /// A single node is returned unchanged; an empty list is a query
    /// error.
    pub fn implicit_root(mut nodes: Vec<QueryNode>, combinator: Combinator) -> Result<QueryNode> {
        match nodes.len() {
            0 => Err(KontosError::query("empty query")),
            1 => Ok(nodes.remove(0)),
            _ => Ok(match combinator {
                Combinator::And => QueryNode::And(nodes),
                Combinator::Or => QueryNode::Or(nodes),
            }),
        }
    }

    /// True iff this node synthesizes a posting stream with positions
    /// (as opposed to a document-level score operator).
    pub fn is_positional(&self) -> bool {
        matches!(
            self,
            QueryNode::Term { .. }
                | QueryNode::Syn(_)
                | QueryNode::Near { .. }
                | QueryNode::Window { .. }
        )
    }

    /// The field a positional node draws statistics from.
    ///
    /// Compound positional nodes inherit the field of their first
    /// child. Returns `None` for AND/OR nodes.
    pub fn field(&self) -> Option<&str> {
        match self {
            QueryNode::Term { field, .. } => Some(field),
            QueryNode::Syn(children)
            | QueryNode::Near { children, .. }
            | QueryNode::Window { children, .. } => children.first().and_then(|c| c.field()),
            QueryNode::And(_) | QueryNode::Or(_) => None,
        }
    }

    /// Check the tree's structure before evaluation.
    ///
    /// Rejected trees never reach the evaluation pass: proximity
    /// operators need at least 2 children, compound operators may not be
    /// empty, and SYN/NEAR/WINDOW children must themselves carry
    /// positions.
    pub fn validate(&self) -> Result<()> {
        match self {
            QueryNode::Term { term, field } => {
                if term.is_empty() {
                    return Err(KontosError::query("empty term"));
                }
                if field.is_empty() {
                    return Err(KontosError::query("empty field name"));
                }
                Ok(())
            }
            QueryNode::And(children) | QueryNode::Or(children) => {
                if children.is_empty() {
                    return Err(KontosError::query(format!(
                        "{} operator has no arguments",
                        self.operator_name()
                    )));
                }
                children.iter().try_for_each(QueryNode::validate)
            }
            QueryNode::Syn(children) => {
                if children.is_empty() {
                    return Err(KontosError::query("SYN operator has no arguments"));
                }
                Self::validate_positional_children("SYN", children)
            }
            QueryNode::Near { children, .. } | QueryNode::Window { children, .. } => {
                if children.len() < 2 {
                    return Err(KontosError::query(format!(
                        "{} operator requires at least 2 arguments",
                        self.operator_name()
                    )));
                }
                Self::validate_positional_children(self.operator_name(), children)
            }
        }
    }

    fn validate_positional_children(name: &str, children: &[QueryNode]) -> Result<()> {
        for child in children {
            if !child.is_positional() {
                return Err(KontosError::query(format!(
                    "{name} operator requires positional arguments, got {}",
                    child.operator_name()
                )));
            }
            child.validate()?;
        }
        Ok(())
    }

    fn operator_name(&self) -> &'static str {
        match self {
            QueryNode::Term { .. } => "TERM",
            QueryNode::And(_) => "AND",
            QueryNode::Or(_) => "OR",
            QueryNode::Syn(_) => "SYN",
            QueryNode::Near { .. } => "NEAR",
            QueryNode::Window { .. } => "WINDOW",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_defaults_to_body_field() {
        let node = QueryNode::term("cat");
        assert_eq!(node.field(), Some("body"));

        let node = QueryNode::term_in("cat", "title");
        assert_eq!(node.field(), Some("title"));
    }

    #[test]
    fn test_compound_field_inherited_from_first_child() {
        let node = QueryNode::Near {
            n: 2,
            children: vec![QueryNode::term_in("a", "title"), QueryNode::term("b")],
        };
        assert_eq!(node.field(), Some("title"));
    }

    #[test]
    fn test_validate_accepts_well_formed_tree() {
        let node = QueryNode::And(vec![
            QueryNode::term("cat"),
            QueryNode::Near {
                n: 3,
                children: vec![QueryNode::term("a"), QueryNode::term("b")],
            },
        ]);
        assert!(node.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_proximity() {
        let node = QueryNode::Near {
            n: 1,
            children: vec![QueryNode::term("a")],
        };
        assert!(node.validate().is_err());

        let node = QueryNode::Window {
            n: 4,
            children: vec![],
        };
        assert!(node.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positional_proximity_child() {
        let node = QueryNode::Near {
            n: 1,
            children: vec![
                QueryNode::term("a"),
                QueryNode::Or(vec![QueryNode::term("b")]),
            ],
        };
        assert!(node.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_compound() {
        assert!(QueryNode::And(vec![]).validate().is_err());
        assert!(QueryNode::Or(vec![]).validate().is_err());
        assert!(QueryNode::Syn(vec![]).validate().is_err());
    }

    #[test]
    fn test_implicit_root() {
        let single =
            QueryNode::implicit_root(vec![QueryNode::term("cat")], Combinator::Or).unwrap();
        assert_eq!(single, QueryNode::term("cat"));

        let multi = QueryNode::implicit_root(
            vec![QueryNode::term("cat"), QueryNode::term("dog")],
            Combinator::And,
        )
        .unwrap();
        assert!(matches!(multi, QueryNode::And(ref c) if c.len() == 2));

        assert!(QueryNode::implicit_root(vec![], Combinator::Or).is_err());
    }
}
