//! Outcome values carried by a distribution.
//!
//! Outcomes are either integers (damage totals, failure counts) or
//! labels (`"hit"`, `"critical miss"`, `"success"`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single outcome of a distribution.
///
/// Integers order before labels, so a mixed distribution lists its
/// numeric outcomes first. Serde writes integers as JSON numbers and labels
/// as strings, so `3` and `"3"` stay distinct.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outcome {
    /// Numeric outcome.
    Int(i64),
    /// Symbolic outcome.
    Label(String),
}

impl Outcome {
    /// Create a label outcome.
    pub fn label(label: impl Into<String>) -> Self {
        Self::Label(label.into())
    }

    /// Parse a mapping key: integer text becomes `Int`, anything else a `Label`.
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key.trim().parse::<i64>() {
            Ok(value) => Self::Int(value),
            Err(_) => Self::Label(key.to_string()),
        }
    }

    /// Get as integer if this is an `Int` outcome.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Outcome::Int(v) => Some(*v),
            Outcome::Label(_) => None,
        }
    }

    /// Get as label if this is a `Label` outcome.
    #[must_use]
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Outcome::Label(s) => Some(s),
            Outcome::Int(_) => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Int(v) => write!(f, "{}", v),
            Outcome::Label(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Outcome {
    fn from(v: i64) -> Self {
        Outcome::Int(v)
    }
}

impl From<i32> for Outcome {
    fn from(v: i32) -> Self {
        Outcome::Int(v as i64)
    }
}

impl From<&str> for Outcome {
    fn from(v: &str) -> Self {
        Outcome::Label(v.to_string())
    }
}

impl From<String> for Outcome {
    fn from(v: String) -> Self {
        Outcome::Label(v)
    }
}
