//! Exact discrete distribution engine.
//!
//! - `Outcome`: an integer or label outcome
//! - `Distribution`: outcome-to-weight table with joint map and convolution
//!
//! ## Design Philosophy
//!
//! Weights are integers and never normalized, so results are exact.
//! Every combinator works on the supports of its inputs; there is no
//! sampling anywhere in the engine.

mod distribution;
mod outcome;

pub use distribution::{Distribution, DistributionError};
pub use outcome::Outcome;
