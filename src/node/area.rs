//! Area-of-effect descriptors.
//!
//! An area is kept as the raw `{shape, <dimension>: "<N> feet", ...}`
//! mapping it was written as. Shapes are interpreted by the targeting
//! resolver, so an unknown shape is an evaluation error rather than a
//! deserialization error.

use std::collections::BTreeMap;

use serde_json::{Map, Value as Json};

use super::Literal;

/// An area descriptor such as `{shape: "sphere", radius: "20 feet"}`.
#[derive(Clone, Debug, PartialEq)]
pub struct Area {
    /// Shape tag (`cone`, `cube`, `cylinder`, `emanation`, `line`, `sphere`).
    pub shape: String,
    /// Every other field of the descriptor.
    pub dimensions: BTreeMap<String, Literal>,
}

impl Area {
    /// Create an area with no dimensions yet.
    pub fn new(shape: impl Into<String>) -> Self {
        Self {
            shape: shape.into(),
            dimensions: BTreeMap::new(),
        }
    }

    /// Add a dimension (builder pattern).
    #[must_use]
    pub fn with_dimension(mut self, name: impl Into<String>, value: impl Into<Literal>) -> Self {
        self.dimensions.insert(name.into(), value.into());
        self
    }

    /// Look up a dimension by name.
    #[must_use]
    pub fn dimension(&self, name: &str) -> Option<&Literal> {
        self.dimensions.get(name)
    }

    /// The descriptor as a JSON mapping.
    #[must_use]
    pub fn to_json(&self) -> Json {
        let mut map = Map::new();
        map.insert("shape".to_string(), Json::String(self.shape.clone()));
        for (name, value) in &self.dimensions {
            map.insert(name.clone(), value.to_json());
        }
        Json::Object(map)
    }

    /// Read a descriptor. Fails with a reason when `shape` is missing or a
    /// dimension is not a literal.
    pub fn from_json(map: &Map<String, Json>) -> Result<Self, String> {
        let shape = match map.get("shape") {
            Some(Json::String(shape)) => shape.clone(),
            Some(_) => return Err("has a non-string shape".to_string()),
            None => return Err("is missing a shape".to_string()),
        };
        let mut dimensions = BTreeMap::new();
        for (name, value) in map.iter().filter(|(name, _)| name.as_str() != "shape") {
            let literal = Literal::from_json(value)
                .ok_or_else(|| format!("has a non-literal dimension '{}'", name))?;
            dimensions.insert(name.clone(), literal);
        }
        Ok(Self { shape, dimensions })
    }
}
