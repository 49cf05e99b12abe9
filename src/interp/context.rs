//! Name bindings visible to `Reference` nodes.

use rustc_hash::FxHashMap;

use crate::node::Literal;

/// A stat block: attribute name to value.
pub type Attributes = FxHashMap<String, Literal>;

/// Build a stat block from pairs.
pub fn attributes<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Attributes
where
    K: Into<String>,
    V: Into<Literal>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Evaluation context: bound names to stat blocks.
///
/// Contexts are persistent. `with` returns an extended copy and leaves
/// the original untouched, so per-target scopes never leak back into
/// the caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Context {
    bindings: im::HashMap<String, Attributes>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of this context with `name` bound to `attributes`.
    #[must_use]
    pub fn with(&self, name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            bindings: self.bindings.update(name.into(), attributes),
        }
    }

    /// The stat block bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Attributes> {
        self.bindings.get(name)
    }

    /// An attribute of a bound name.
    ///
    /// `None` if either the name or the attribute is absent; callers that
    /// need to tell those apart check `get` first.
    pub fn get_attribute(&self, name: &str, attribute: &str) -> Option<&Literal> {
        self.get(name)?.get(attribute)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Bound names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Attributes)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, Attributes)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
