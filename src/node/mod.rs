//! Combat expression trees.
//!
//! A tree describes one combat mechanic: a roll, a choice driven by a
//! roll, or a full attack or saving throw across several targets.
//!
//! - `Node`: the closed set of node variants
//! - `Literal` / `Operand`: constants and literal-or-expression fields
//! - `Area`: pass-through area-of-effect descriptor
//! - `deserialize`: dictionary form to tree
//!
//! Every node has a canonical dictionary form whose `"node"` field is the
//! variant tag; `Node::to_dict` writes it and `deserialize` reads it.
//!
//! ```
//! use dndast::node::{self, Node};
//! use serde_json::json;
//!
//! let tree = node::deserialize(Some(&json!({
//!     "node": "SaveRoll",
//!     "save_dc": 13,
//!     "save_bonus": {"node": "Reference", "value": "target.dexterity_save_bonus"},
//! })))
//! .unwrap();
//! assert_eq!(node::deserialize(Some(&tree.to_dict())).unwrap(), tree);
//! ```

mod area;
mod deserialize;
mod literal;
mod serialize;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dist::Outcome;
use crate::error::NodeError;

pub use area::Area;
pub use deserialize::deserialize;
pub use literal::{Literal, Operand, OperandList};

/// Label-to-payload table used by `Selection` and `Attack`.
pub type Results = BTreeMap<String, Operand>;

/// Variant tag of a node, as written in the `"node"` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Value,
    Reference,
    Roll,
    Damage,
    AttackRoll,
    SaveRoll,
    Selection,
    Targeting,
    Attack,
    Save,
    And,
    Empty,
}

impl NodeKind {
    /// All kinds, in declaration order.
    pub const ALL: [NodeKind; 12] = [
        NodeKind::Value,
        NodeKind::Reference,
        NodeKind::Roll,
        NodeKind::Damage,
        NodeKind::AttackRoll,
        NodeKind::SaveRoll,
        NodeKind::Selection,
        NodeKind::Targeting,
        NodeKind::Attack,
        NodeKind::Save,
        NodeKind::And,
        NodeKind::Empty,
    ];

    /// The `"node"` tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::Value => "Value",
            NodeKind::Reference => "Reference",
            NodeKind::Roll => "Roll",
            NodeKind::Damage => "Damage",
            NodeKind::AttackRoll => "AttackRoll",
            NodeKind::SaveRoll => "SaveRoll",
            NodeKind::Selection => "Selection",
            NodeKind::Targeting => "Targeting",
            NodeKind::Attack => "Attack",
            NodeKind::Save => "Save",
            NodeKind::And => "And",
            NodeKind::Empty => "Empty",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = NodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| NodeError::UnknownNodeKind { kind: s.to_string() })
    }
}

/// What a `Roll` node rolls.
#[derive(Clone, Debug, PartialEq)]
pub enum RollSpec {
    /// Dice notation such as `"1d4 + 1"`.
    Notation(String),
    /// Explicit outcome weights such as `{2: 1, 3: 1, 4: 1, 5: 1}`.
    ///
    /// Integer outcomes sort before labels, so `Int(3)` and `Label("3")`
    /// are distinct entries.
    Weights(BTreeMap<Outcome, u64>),
}

/// A d20 attack roll with four outcomes.
///
/// Outcomes, checked in this order:
/// - `"critical hit"`: d20 in `critical_hit_range`
/// - `"critical miss"`: d20 in `critical_miss_range`
/// - `"hit"`: d20 + `attack_bonus` >= `armor_class`
/// - `"miss"`: otherwise
///
/// A value in both ranges counts as a critical hit.
#[derive(Clone, Debug, PartialEq)]
pub struct AttackRoll {
    pub critical_hit_range: Operand,
    pub critical_miss_range: Operand,
    pub attack_bonus: Operand,
    pub armor_class: Operand,
}

impl AttackRoll {
    /// Create an attack roll with literal critical ranges.
    pub fn new(
        critical_hit_range: impl IntoIterator<Item = i64>,
        critical_miss_range: impl IntoIterator<Item = i64>,
        attack_bonus: impl Into<Operand>,
        armor_class: impl Into<Operand>,
    ) -> Self {
        Self {
            critical_hit_range: range_operand(critical_hit_range),
            critical_miss_range: range_operand(critical_miss_range),
            attack_bonus: attack_bonus.into(),
            armor_class: armor_class.into(),
        }
    }

    /// Standard ranges: critical hit on 20, critical miss on 1.
    pub fn standard(attack_bonus: impl Into<Operand>, armor_class: impl Into<Operand>) -> Self {
        Self::new([20], [1], attack_bonus, armor_class)
    }
}

fn range_operand(range: impl IntoIterator<Item = i64>) -> Operand {
    Operand::Literal(Literal::List(range.into_iter().map(Literal::Int).collect()))
}

/// A d20 saving throw: `"success"` if d20 + `save_bonus` >= `save_dc`, else `"failure"`.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveRoll {
    pub save_dc: Operand,
    pub save_bonus: Operand,
}

impl SaveRoll {
    pub fn new(save_dc: impl Into<Operand>, save_bonus: impl Into<Operand>) -> Self {
        Self {
            save_dc: save_dc.into(),
            save_bonus: save_bonus.into(),
        }
    }
}

/// Which targets an attack or save reaches.
#[derive(Clone, Debug, PartialEq)]
pub struct Targeting {
    /// Range as `"<N> feet"`. Under 10 feet is melee.
    pub range: String,
    /// Optional area of effect.
    pub area: Option<Area>,
    /// Upper bound on targets.
    pub max_targets: u32,
    /// Evaluation fails if fewer targets than this can be reached.
    pub min_targets: u32,
}

impl Targeting {
    /// Create targeting with no area.
    pub fn new(range: impl Into<String>, max_targets: u32) -> Self {
        Self {
            range: range.into(),
            area: None,
            max_targets,
            min_targets: 0,
        }
    }

    /// Set the area of effect (builder pattern).
    #[must_use]
    pub fn with_area(mut self, area: Area) -> Self {
        self.area = Some(area);
        self
    }

    /// Set the minimum target count (builder pattern).
    #[must_use]
    pub fn with_min_targets(mut self, min_targets: u32) -> Self {
        self.min_targets = min_targets;
        self
    }
}

/// Payloads of a `Save` node.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveResults {
    /// Damage dealt to a target that fails.
    pub failure: Operand,
    /// Fraction of that damage dealt to a target that succeeds (floored).
    pub success: f64,
}

/// A node of a combat expression tree.
///
/// Nodes are immutable values with structural equality. Serde support
/// goes through the canonical dictionary form, so a `Node` can be
/// embedded in any serde document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "serde_json::Value", try_from = "serde_json::Value")]
pub enum Node {
    /// A constant.
    Value { value: Literal },
    /// Lookup of `"name"` or `"name.attribute"` in the evaluation context.
    Reference { path: String },
    /// A dice roll or explicit outcome table.
    Roll { spec: RollSpec },
    /// A damage roll. `damage_type` is descriptive only.
    Damage { equation: String, damage_type: String },
    AttackRoll(AttackRoll),
    SaveRoll(SaveRoll),
    /// Maps each outcome label of `selector` to a payload.
    Selection { selector: Box<Node>, results: Results },
    Targeting(Targeting),
    /// An attack roll against every target, payloads summed.
    Attack {
        targeting: Box<Node>,
        attack_roll: AttackRoll,
        results: Results,
    },
    /// A saving throw for every target against one damage roll.
    Save {
        targeting: Box<Node>,
        save_roll: SaveRoll,
        results: SaveResults,
    },
    /// Sum of distributions, or concatenation of lists.
    And { operands: Vec<Node> },
    /// Placeholder for an absent sub-tree.
    Empty,
}

impl Node {
    /// The variant tag.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Value { .. } => NodeKind::Value,
            Node::Reference { .. } => NodeKind::Reference,
            Node::Roll { .. } => NodeKind::Roll,
            Node::Damage { .. } => NodeKind::Damage,
            Node::AttackRoll(_) => NodeKind::AttackRoll,
            Node::SaveRoll(_) => NodeKind::SaveRoll,
            Node::Selection { .. } => NodeKind::Selection,
            Node::Targeting(_) => NodeKind::Targeting,
            Node::Attack { .. } => NodeKind::Attack,
            Node::Save { .. } => NodeKind::Save,
            Node::And { .. } => NodeKind::And,
            Node::Empty => NodeKind::Empty,
        }
    }

    pub fn value(value: impl Into<Literal>) -> Self {
        Node::Value { value: value.into() }
    }

    pub fn reference(path: impl Into<String>) -> Self {
        Node::Reference { path: path.into() }
    }

    /// A roll from dice notation.
    pub fn roll(notation: impl Into<String>) -> Self {
        Node::Roll {
            spec: RollSpec::Notation(notation.into()),
        }
    }

    /// A roll from an explicit outcome table.
    pub fn roll_weights<O: Into<Outcome>>(weights: impl IntoIterator<Item = (O, u64)>) -> Self {
        Node::Roll {
            spec: RollSpec::Weights(weights.into_iter().map(|(o, w)| (o.into(), w)).collect()),
        }
    }

    pub fn damage(equation: impl Into<String>, damage_type: impl Into<String>) -> Self {
        Node::Damage {
            equation: equation.into(),
            damage_type: damage_type.into(),
        }
    }

    pub fn selection<K, V>(selector: Node, results: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Operand>,
    {
        Node::Selection {
            selector: Box::new(selector),
            results: collect_results(results),
        }
    }

    pub fn attack<K, V>(
        targeting: Node,
        attack_roll: AttackRoll,
        results: impl IntoIterator<Item = (K, V)>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<Operand>,
    {
        Node::Attack {
            targeting: Box::new(targeting),
            attack_roll,
            results: collect_results(results),
        }
    }

    pub fn save(
        targeting: Node,
        save_roll: SaveRoll,
        failure: impl Into<Operand>,
        success: f64,
    ) -> Self {
        Node::Save {
            targeting: Box::new(targeting),
            save_roll,
            results: SaveResults {
                failure: failure.into(),
                success,
            },
        }
    }

    /// Two-operand `And`.
    pub fn and(left: Node, right: Node) -> Self {
        Node::And {
            operands: vec![left, right],
        }
    }

    /// `And` over `first` and any number of further operands.
    pub fn all(first: Node, rest: impl IntoIterator<Item = Node>) -> Self {
        Node::And {
            operands: std::iter::once(first).chain(rest).collect(),
        }
    }
}

fn collect_results<K, V>(results: impl IntoIterator<Item = (K, V)>) -> Results
where
    K: Into<String>,
    V: Into<Operand>,
{
    results
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

impl From<AttackRoll> for Node {
    fn from(roll: AttackRoll) -> Self {
        Node::AttackRoll(roll)
    }
}

impl From<SaveRoll> for Node {
    fn from(roll: SaveRoll) -> Self {
        Node::SaveRoll(roll)
    }
}

impl From<Targeting> for Node {
    fn from(targeting: Targeting) -> Self {
        Node::Targeting(targeting)
    }
}
