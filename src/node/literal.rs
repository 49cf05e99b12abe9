//! Literal values and the literal-or-expression operand.
//!
//! ## Literal Types
//!
//! - `Null`: absent value (missing attribute, `Empty` node)
//! - `Bool`, `Int`, `Float`, `Text`: scalars
//! - `List`: sequences such as critical ranges

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as Json};

use super::Node;

/// A constant carried by the tree or by a target's stat block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum Literal {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Literal>),
}

impl Literal {
    /// Convert from JSON. Returns `None` for mappings, at any depth.
    #[must_use]
    pub fn from_json(value: &Json) -> Option<Self> {
        Some(match value {
            Json::Null => Literal::Null,
            Json::Bool(b) => Literal::Bool(*b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Literal::Int(i),
                None => Literal::Float(n.as_f64()?),
            },
            Json::String(s) => Literal::Text(s.clone()),
            Json::Array(items) => {
                Literal::List(items.iter().map(Literal::from_json).collect::<Option<_>>()?)
            }
            Json::Object(_) => return None,
        })
    }

    /// Convert to JSON. Non-finite floats become `null`.
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Literal::Null => Json::Null,
            Literal::Bool(b) => Json::Bool(*b),
            Literal::Int(i) => Json::from(*i),
            Literal::Float(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Literal::Text(s) => Json::String(s.clone()),
            Literal::List(items) => Json::Array(items.iter().map(Literal::to_json).collect()),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// Get as integer. Integral floats count.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(i) => Some(*i),
            Literal::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    /// Get as float if numeric.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Literal::Int(i) => Some(*i as f64),
            Literal::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Literal]> {
        match self {
            Literal::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the literal's type, for error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Null => "null",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Text(_) => "text",
            Literal::List(_) => "list",
        }
    }
}

impl TryFrom<Json> for Literal {
    type Error = String;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        Literal::from_json(&value).ok_or_else(|| "a mapping is not a literal".to_string())
    }
}

impl From<Literal> for Json {
    fn from(literal: Literal) -> Self {
        literal.to_json()
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Int(v as i64)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Bool(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::Text(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::Text(v)
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Literal {
    fn from(v: Vec<T>) -> Self {
        Literal::List(v.into_iter().map(Into::into).collect())
    }
}

/// A field that holds either a constant or a sub-expression.
///
/// Evaluating a `Literal` operand returns the literal itself. A list whose
/// elements include a sub-expression is an `OperandList`, evaluated
/// element-wise into a literal list.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Literal(Literal),
    Expression(Box<Node>),
    List(OperandList),
}

/// List operand with at least one element that is not a literal.
///
/// Only built through `Operand::list`, so a list of plain literals is
/// always `Operand::Literal(Literal::List(..))`.
#[derive(Clone, Debug, PartialEq)]
pub struct OperandList(Vec<Operand>);

impl OperandList {
    #[must_use]
    pub fn as_slice(&self) -> &[Operand] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Operand> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Operand {
    /// A list operand. All-literal lists collapse into a literal list.
    pub fn list(items: impl IntoIterator<Item = Operand>) -> Self {
        let items: Vec<Operand> = items.into_iter().collect();
        if items.iter().all(|item| matches!(item, Operand::Literal(_))) {
            let literals = items
                .into_iter()
                .filter_map(|item| match item {
                    Operand::Literal(literal) => Some(literal),
                    _ => None,
                })
                .collect();
            Operand::Literal(Literal::List(literals))
        } else {
            Operand::List(OperandList(items))
        }
    }

    /// The literal, if this operand is one.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Operand::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// The node, if this operand is an expression.
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Operand::Expression(node) => Some(node),
            _ => None,
        }
    }

    /// The elements, if this is a list holding sub-expressions.
    #[must_use]
    pub fn as_list(&self) -> Option<&OperandList> {
        match self {
            Operand::List(list) => Some(list),
            _ => None,
        }
    }
}

impl From<Node> for Operand {
    fn from(node: Node) -> Self {
        Operand::Expression(Box::new(node))
    }
}

impl From<Literal> for Operand {
    fn from(literal: Literal) -> Self {
        Operand::Literal(literal)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Literal(v.into())
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Literal(v.into())
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Literal(v.into())
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Literal(v.into())
    }
}

impl<T: Into<Literal>> From<Vec<T>> for Operand {
    fn from(v: Vec<T>) -> Self {
        Operand::Literal(v.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(Literal::from_json(&json!(4)), Some(Literal::Int(4)));
        assert_eq!(Literal::from_json(&json!(0.5)), Some(Literal::Float(0.5)));
        assert_eq!(Literal::from_json(&json!("5 feet")), Some("5 feet".into()));
        assert_eq!(Literal::from_json(&json!(null)), Some(Literal::Null));
    }

    #[test]
    fn test_from_json_list() {
        assert_eq!(
            Literal::from_json(&json!([19, 20])),
            Some(Literal::List(vec![Literal::Int(19), Literal::Int(20)]))
        );
    }

    #[test]
    fn test_from_json_rejects_mappings() {
        assert_eq!(Literal::from_json(&json!({"a": 1})), None);
        assert_eq!(Literal::from_json(&json!([1, {"a": 1}])), None);
    }

    #[test]
    fn test_to_json_round_trip() {
        let lit = Literal::List(vec![1.into(), "two".into(), 3.5.into(), Literal::Null]);
        assert_eq!(Literal::from_json(&lit.to_json()), Some(lit));
    }

    #[test]
    fn test_as_int_accepts_integral_float() {
        assert_eq!(Literal::Float(3.0).as_int(), Some(3));
        assert_eq!(Literal::Float(3.5).as_int(), None);
        assert_eq!(Literal::Text("3".into()).as_int(), None);
    }

    #[test]
    fn test_operand_list_collapses_literals() {
        let plain = Operand::list([Operand::from(19), Operand::from(20)]);
        assert_eq!(plain, Operand::from(vec![19, 20]));

        let mixed = Operand::list([Operand::from(19), Operand::from(Node::value(20))]);
        let items = mixed.as_list().map(OperandList::len);
        assert_eq!(items, Some(2));
        assert_eq!(mixed.as_literal(), None);
    }

    #[test]
    fn test_operand_from() {
        assert_eq!(Operand::from(4), Operand::Literal(Literal::Int(4)));
        let node = Node::reference("target.AC");
        assert_eq!(Operand::from(node.clone()).as_node(), Some(&node));
    }
}
