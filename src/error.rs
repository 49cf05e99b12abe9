//! Error types for reading and evaluating trees.
//!
//! - `NodeError`: the dictionary form could not be turned into a tree
//! - `EvalError`: a well-formed tree could not be evaluated
//!
//! Both are local to a single call; nothing is retried internally.

use thiserror::Error;

use crate::dice::DiceError;
use crate::dist::DistributionError;

/// Deserialization failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    /// The `"node"` tag names no known variant.
    #[error("unknown node kind '{kind}'")]
    UnknownNodeKind { kind: String },

    /// A required field is absent or has the wrong shape.
    #[error("malformed {kind} node: field '{field}' {reason}")]
    MalformedNode {
        kind: String,
        field: String,
        reason: String,
    },
}

impl NodeError {
    /// Create a malformed node error.
    pub fn malformed(
        kind: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedNode {
            kind: kind.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Evaluation failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A reference names a context entry that is not bound.
    #[error("name '{name}' is not bound in the evaluation context")]
    UnboundName { name: String },

    /// A selector produced a label the results table does not map.
    #[error("no result mapped for outcome '{outcome}'")]
    UnmappedOutcome { outcome: String },

    /// An area descriptor names an unknown shape.
    #[error("unknown area shape '{shape}'")]
    UnknownAreaShape { shape: String },

    /// A distance is not of the form `"<N> feet"`.
    #[error("invalid distance '{text}', expected \"<N> feet\"")]
    InvalidDistance { text: String },

    /// An area descriptor lacks a dimension its shape needs.
    #[error("{shape} area is missing dimension '{dimension}'")]
    MissingDimension { shape: String, dimension: String },

    /// A sub-expression evaluated to the wrong kind of value.
    #[error("{context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: &'static str,
        found: String,
    },

    /// Fewer targets are reachable than the targeting requires.
    #[error("targeting needs at least {required} targets but only {available} are reachable")]
    InsufficientTargets { required: u32, available: u32 },

    /// The roster lacks a value the evaluation needs.
    #[error("roster has no '{field}'")]
    MissingRosterField { field: &'static str },

    /// A roster value is present but unusable.
    #[error("roster field '{field}' must be a positive number of square feet, got {value}")]
    InvalidRosterField { field: &'static str, value: f64 },

    #[error(transparent)]
    Distribution(#[from] DistributionError),

    #[error(transparent)]
    Dice(#[from] DiceError),
}

impl EvalError {
    /// Create a type mismatch error.
    pub fn type_mismatch(
        context: impl Into<String>,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            context: context.into(),
            expected,
            found: found.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_error_display() {
        let err = NodeError::malformed("SaveRoll", "save_dc", "is missing");
        assert_eq!(err.to_string(), "malformed SaveRoll node: field 'save_dc' is missing");
    }

    #[test]
    fn test_eval_error_display() {
        let err = EvalError::UnboundName { name: "target".to_string() };
        assert_eq!(err.to_string(), "name 'target' is not bound in the evaluation context");

        let err = EvalError::InsufficientTargets { required: 3, available: 1 };
        assert!(err.to_string().contains("at least 3"));
    }

    #[test]
    fn test_eval_error_from_dice() {
        let err: EvalError = DiceError::Empty.into();
        assert_eq!(err.to_string(), "empty dice expression");
    }
}
