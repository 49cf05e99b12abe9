//! Dice notation.
//!
//! Turns strings like `"2d6 + 3"` into exact distributions:
//! - `tokenize`: characters to tokens
//! - `parse`: tokens to a `DiceExpr` tree
//! - `evaluate`: string straight to a `Distribution`
//!
//! Supported: integers, `NdM` and `dM`, `+`, `-`, `*`, unary minus and
//! parentheses. `d` is case-insensitive and whitespace is ignored.

mod lexer;
mod parser;

use thiserror::Error;

use crate::dist::{Distribution, DistributionError};

pub use lexer::{tokenize, Token};
pub use parser::{parse, DiceExpr};

/// Largest dice count accepted in `NdM`.
///
/// Rolls within the limits can still have more combinations than 128-bit
/// weights hold (`39d10` already does); those evaluate to
/// `DistributionError::WeightOverflow`.
pub const MAX_DICE_COUNT: u32 = 100;

/// Largest die size accepted in `NdM`.
pub const MAX_DIE_SIZE: u32 = 1000;

/// Error when parsing or evaluating dice notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    /// The expression is empty.
    #[error("empty dice expression")]
    Empty,
    /// A character outside the grammar.
    #[error("unexpected character '{ch}' at byte {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    /// A token in the wrong place.
    #[error("unexpected token {token} at position {pos}")]
    UnexpectedToken { token: String, pos: usize },
    /// The expression ended mid-term.
    #[error("unexpected end of dice expression")]
    UnexpectedEnd,
    /// Dice count outside `1..=MAX_DICE_COUNT`.
    #[error("dice count must be between 1 and 100, got {count}")]
    InvalidDiceCount { count: u64 },
    /// Die size outside `1..=MAX_DIE_SIZE`.
    #[error("die size must be between 1 and 1000, got {sides}")]
    InvalidDieSize { sides: u64 },
    /// A literal does not fit in 64 bits.
    #[error("number literal overflow")]
    NumberOverflow,
    #[error(transparent)]
    Distribution(#[from] DistributionError),
}

/// Parse and evaluate a dice expression.
///
/// ```
/// use dndast::dice;
///
/// let dist = dice::evaluate("2d6 + 3").unwrap();
/// assert_eq!(dist.mean(), Some(10.0));
/// ```
pub fn evaluate(source: &str) -> Result<Distribution, DiceError> {
    parse(source)?.distribution()
}
