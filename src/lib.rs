//! # dndast
//!
//! Combat expression trees for tabletop role-playing games, evaluated into
//! exact discrete probability distributions.
//!
//! ## Design Principles
//!
//! 1. **Exact**: Distributions carry integer weights and are never sampled.
//!    Every answer is the true probability, not an estimate.
//!
//! 2. **Data In, Data Out**: Trees are plain values with a canonical
//!    dictionary form, so they can be stored, diffed and sent over the wire.
//!
//! 3. **Explicit Configuration**: The target roster is handed to the
//!    interpreter at construction and never changes afterwards.
//!
//! ## Modules
//!
//! - `dist`: Exact discrete distributions and their combinators
//! - `dice`: Dice notation parser and evaluator
//! - `node`: Tree nodes, canonical dictionary form, deserializer
//! - `interp`: Interpreter, evaluation context, roster, targeting
//! - `error`: Deserialization and evaluation errors

pub mod dist;
pub mod dice;
pub mod node;
pub mod interp;
pub mod error;

// Re-export commonly used types
pub use crate::dist::{Distribution, DistributionError, Outcome};

pub use crate::dice::DiceError;

pub use crate::node::{
    deserialize, Area, AttackRoll, Literal, Node, NodeKind, Operand, OperandList,
    Results, RollSpec, SaveResults, SaveRoll, Targeting,
};

pub use crate::interp::{
    attributes, Attributes, Context, Evaluation, Interpreter,
    Category, Roster, RosterCategory,
};

pub use crate::error::{EvalError, NodeError};
