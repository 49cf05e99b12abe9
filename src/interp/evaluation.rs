//! Values a node evaluates to.

use crate::dist::{Distribution, Outcome};
use crate::error::EvalError;
use crate::node::Literal;

use super::context::Attributes;

/// Result of evaluating a node.
#[derive(Clone, Debug, PartialEq)]
pub enum Evaluation {
    /// A constant passed through unevaluated.
    Literal(Literal),
    /// A whole stat block, from a single-segment reference.
    Target(Attributes),
    /// Resolved targets of a `Targeting` node.
    Targets(Vec<Attributes>),
    /// An exact probability distribution.
    Distribution(Distribution),
}

impl Evaluation {
    /// The absent marker.
    #[must_use]
    pub fn null() -> Self {
        Evaluation::Literal(Literal::Null)
    }

    #[must_use]
    pub fn as_distribution(&self) -> Option<&Distribution> {
        match self {
            Evaluation::Distribution(dist) => Some(dist),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Evaluation::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_targets(&self) -> Option<&[Attributes]> {
        match self {
            Evaluation::Targets(targets) => Some(targets),
            _ => None,
        }
    }

    /// Short description for error messages.
    #[must_use]
    pub fn type_name(&self) -> String {
        match self {
            Evaluation::Literal(literal) => literal.type_name().to_string(),
            Evaluation::Target(_) => "target".to_string(),
            Evaluation::Targets(_) => "target list".to_string(),
            Evaluation::Distribution(_) => "distribution".to_string(),
        }
    }

    /// Coerce to a distribution.
    ///
    /// Integers (including integral floats) and strings become constant
    /// distributions. Anything else is a type mismatch reported against
    /// `context`.
    pub fn into_distribution(self, context: &str) -> Result<Distribution, EvalError> {
        const EXPECTED: &str = "distribution or integer";
        match self {
            Evaluation::Distribution(dist) => Ok(dist),
            Evaluation::Literal(Literal::Text(label)) => {
                Ok(Distribution::constant(Outcome::Label(label)))
            }
            Evaluation::Literal(literal) => match literal.as_int() {
                Some(value) => Ok(Distribution::constant(value)),
                None => Err(EvalError::type_mismatch(context, EXPECTED, literal.type_name())),
            },
            other => Err(EvalError::type_mismatch(context, EXPECTED, other.type_name())),
        }
    }

    /// Coerce to a target list. A single target is a one-element list.
    pub fn into_targets(self, context: &str) -> Result<Vec<Attributes>, EvalError> {
        match self {
            Evaluation::Targets(targets) => Ok(targets),
            Evaluation::Target(target) => Ok(vec![target]),
            other => Err(EvalError::type_mismatch(context, "targets", other.type_name())),
        }
    }
}

impl From<Distribution> for Evaluation {
    fn from(dist: Distribution) -> Self {
        Evaluation::Distribution(dist)
    }
}

impl From<Literal> for Evaluation {
    fn from(literal: Literal) -> Self {
        Evaluation::Literal(literal)
    }
}
