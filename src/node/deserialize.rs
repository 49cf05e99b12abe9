//! Dictionary form to tree.
//!
//! Reads the `"node"` tag, then the variant's fields. Any field value that
//! is itself a mapping with a `"node"` tag becomes a nested node; other
//! values stay literals. Lists in operand fields are scanned element-wise,
//! so a list may mix literals and nodes. Unknown fields are rejected.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value as Json};

use crate::dist::Outcome;
use crate::error::NodeError;

use super::{
    Area, AttackRoll, Literal, Node, NodeKind, Operand, Results, RollSpec, SaveResults, SaveRoll,
    Targeting,
};

/// Build a tree from its dictionary form.
///
/// `None`, `null` and `{}` give `Node::Empty`.
pub fn deserialize(value: Option<&Json>) -> Result<Node, NodeError> {
    let map = match value {
        None | Some(Json::Null) => return Ok(Node::Empty),
        Some(Json::Object(map)) => map,
        Some(other) => {
            return Err(NodeError::malformed(
                "<unknown>",
                "node",
                format!("expected a mapping, found {}", json_type(other)),
            ))
        }
    };
    if map.is_empty() {
        return Ok(Node::Empty);
    }

    let kind: NodeKind = match map.get("node") {
        Some(Json::String(tag)) => tag.parse()?,
        Some(other) => {
            return Err(NodeError::malformed(
                "<unknown>",
                "node",
                format!("must be a string, found {}", json_type(other)),
            ))
        }
        None => return Err(NodeError::malformed("<unknown>", "node", "is missing")),
    };
    let fields = Fields { kind, map };

    let node = match kind {
        NodeKind::Value => {
            fields.only(&["value"])?;
            Node::Value {
                value: fields.literal("value")?,
            }
        }
        NodeKind::Reference => {
            fields.only(&["value", "path"])?;
            Node::Reference {
                path: fields.string(&["value", "path"])?,
            }
        }
        NodeKind::Roll => {
            fields.only(&["value", "spec"])?;
            Node::Roll {
                spec: fields.roll_spec(&["value", "spec"])?,
            }
        }
        NodeKind::Damage => {
            fields.only(&["equation", "value", "type"])?;
            Node::Damage {
                equation: fields.string(&["equation", "value"])?,
                damage_type: fields.string(&["type"])?,
            }
        }
        NodeKind::AttackRoll => Node::AttackRoll(attack_roll(&fields)?),
        NodeKind::SaveRoll => Node::SaveRoll(save_roll(&fields)?),
        NodeKind::Selection => {
            fields.only(&["selector", "results"])?;
            Node::Selection {
                selector: Box::new(fields.node(&["selector"])?),
                results: fields.results(&["results"])?,
            }
        }
        NodeKind::Targeting => Node::Targeting(targeting(&fields)?),
        NodeKind::Attack => {
            fields.only(&["targeting", "attack_roll", "results"])?;
            let roll = fields.node(&["attack_roll"])?;
            let Node::AttackRoll(attack_roll) = roll else {
                return Err(fields.malformed("attack_roll", "must be an AttackRoll node"));
            };
            Node::Attack {
                targeting: Box::new(fields.node(&["targeting"])?),
                attack_roll,
                results: fields.results(&["results"])?,
            }
        }
        NodeKind::Save => {
            fields.only(&["targeting", "save_roll", "results"])?;
            let roll = fields.node(&["save_roll"])?;
            let Node::SaveRoll(save_roll) = roll else {
                return Err(fields.malformed("save_roll", "must be a SaveRoll node"));
            };
            Node::Save {
                targeting: Box::new(fields.node(&["targeting"])?),
                save_roll,
                results: fields.save_results()?,
            }
        }
        NodeKind::And => and(&fields)?,
        NodeKind::Empty => {
            fields.only(&[])?;
            Node::Empty
        }
    };
    Ok(node)
}

impl TryFrom<Json> for Node {
    type Error = NodeError;

    fn try_from(value: Json) -> Result<Self, Self::Error> {
        deserialize(Some(&value))
    }
}

fn attack_roll(fields: &Fields<'_>) -> Result<AttackRoll, NodeError> {
    const HIT: &[&str] = &["critical_hit_range", "crit_hit_range"];
    const MISS: &[&str] = &["critical_miss_range", "crit_miss_range"];
    fields.only(&[HIT[0], HIT[1], MISS[0], MISS[1], "attack_bonus", "armor_class"])?;
    Ok(AttackRoll {
        critical_hit_range: fields.operand(HIT)?,
        critical_miss_range: fields.operand(MISS)?,
        attack_bonus: fields.operand(&["attack_bonus"])?,
        armor_class: fields.operand(&["armor_class"])?,
    })
}

fn save_roll(fields: &Fields<'_>) -> Result<SaveRoll, NodeError> {
    fields.only(&["save_dc", "save_bonus"])?;
    Ok(SaveRoll {
        save_dc: fields.operand(&["save_dc"])?,
        save_bonus: fields.operand(&["save_bonus"])?,
    })
}

fn targeting(fields: &Fields<'_>) -> Result<Targeting, NodeError> {
    fields.only(&["range", "area", "max_targets", "min_targets"])?;
    let area = match fields.map.get("area") {
        None | Some(Json::Null) => None,
        Some(Json::Object(map)) => {
            Some(Area::from_json(map).map_err(|reason| fields.malformed("area", reason))?)
        }
        Some(other) => {
            return Err(fields.malformed(
                "area",
                format!("must be a mapping or null, found {}", json_type(other)),
            ))
        }
    };
    let max_targets = fields.count("max_targets")?;
    let min_targets = match fields.map.get("min_targets") {
        None => 0,
        Some(_) => fields.count("min_targets")?,
    };
    Ok(Targeting {
        range: fields.string(&["range"])?,
        area,
        max_targets,
        min_targets,
    })
}

fn and(fields: &Fields<'_>) -> Result<Node, NodeError> {
    fields.only(&["left", "right", "nodes"])?;
    if let Some(nodes) = fields.map.get("nodes") {
        let Json::Array(items) = nodes else {
            return Err(fields.malformed("nodes", "must be a list"));
        };
        let operands = items
            .iter()
            .map(|item| deserialize(Some(item)))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Node::And { operands });
    }
    Ok(Node::and(fields.node(&["left"])?, fields.node(&["right"])?))
}

/// Field access for one node's mapping, producing `MalformedNode` errors
/// that name the node kind and field.
struct Fields<'a> {
    kind: NodeKind,
    map: &'a Map<String, Json>,
}

impl<'a> Fields<'a> {
    fn malformed(&self, field: &str, reason: impl Into<String>) -> NodeError {
        NodeError::malformed(self.kind.as_str(), field, reason)
    }

    /// Reject any key other than `"node"` and `allowed`.
    fn only(&self, allowed: &[&str]) -> Result<(), NodeError> {
        match self
            .map
            .keys()
            .find(|key| key.as_str() != "node" && !allowed.contains(&key.as_str()))
        {
            Some(key) => Err(self.malformed(key, "is not a field of this node")),
            None => Ok(()),
        }
    }

    /// First present field among `names` (canonical name first, then aliases).
    fn required(&self, names: &[&str]) -> Result<&'a Json, NodeError> {
        names
            .iter()
            .find_map(|name| self.map.get(*name))
            .ok_or_else(|| self.malformed(names[0], "is missing"))
    }

    fn string(&self, names: &[&str]) -> Result<String, NodeError> {
        match self.required(names)? {
            Json::String(s) => Ok(s.clone()),
            other => Err(self.malformed(
                names[0],
                format!("must be a string, found {}", json_type(other)),
            )),
        }
    }

    fn count(&self, name: &str) -> Result<u32, NodeError> {
        self.required(&[name])?
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| self.malformed(name, "must be a non-negative integer"))
    }

    fn literal(&self, name: &str) -> Result<Literal, NodeError> {
        Literal::from_json(self.required(&[name])?)
            .ok_or_else(|| self.malformed(name, "must be a literal, not a mapping"))
    }

    fn node(&self, names: &[&str]) -> Result<Node, NodeError> {
        let value = self.required(names)?;
        match value {
            Json::Object(_) | Json::Null => deserialize(Some(value)),
            other => Err(self.malformed(
                names[0],
                format!("must be a node, found {}", json_type(other)),
            )),
        }
    }

    fn operand(&self, names: &[&str]) -> Result<Operand, NodeError> {
        operand(self.required(names)?).map_err(|reason| match reason {
            OperandError::Node(err) => err,
            OperandError::Shape(reason) => self.malformed(names[0], reason),
        })
    }

    fn results(&self, names: &[&str]) -> Result<Results, NodeError> {
        let Json::Object(map) = self.required(names)? else {
            return Err(self.malformed(names[0], "must be a mapping of outcome to result"));
        };
        map.iter()
            .map(|(label, value)| -> Result<(String, Operand), NodeError> {
                let payload = operand(value).map_err(|reason| match reason {
                    OperandError::Node(err) => err,
                    OperandError::Shape(reason) => {
                        self.malformed(&format!("{}.{}", names[0], label), reason)
                    }
                })?;
                Ok((label.clone(), payload))
            })
            .collect()
    }

    fn save_results(&self) -> Result<SaveResults, NodeError> {
        let Json::Object(map) = self.required(&["results"])? else {
            return Err(self.malformed("results", "must be a mapping with failure and success"));
        };
        let failure = map
            .get("failure")
            .ok_or_else(|| self.malformed("results.failure", "is missing"))?;
        let failure = operand(failure).map_err(|reason| match reason {
            OperandError::Node(err) => err,
            OperandError::Shape(reason) => self.malformed("results.failure", reason),
        })?;
        let success = map
            .get("success")
            .ok_or_else(|| self.malformed("results.success", "is missing"))?
            .as_f64()
            .ok_or_else(|| self.malformed("results.success", "must be a number"))?;
        if let Some(key) = map.keys().find(|k| !matches!(k.as_str(), "failure" | "success")) {
            return Err(self.malformed(&format!("results.{}", key), "is not a save outcome"));
        }
        Ok(SaveResults { failure, success })
    }

    fn roll_spec(&self, names: &[&str]) -> Result<RollSpec, NodeError> {
        match self.required(names)? {
            Json::String(notation) => Ok(RollSpec::Notation(notation.clone())),
            Json::Object(map) => {
                let mut weights = BTreeMap::new();
                for (key, weight) in map {
                    let weight = weight.as_u64().ok_or_else(|| {
                        self.malformed(
                            names[0],
                            format!("weight of '{}' must be a non-negative integer", key),
                        )
                    })?;
                    weights.insert(Outcome::from_key(key), weight);
                }
                Ok(RollSpec::Weights(weights))
            }
            pairs @ Json::Array(_) => {
                let pairs = <Vec<(Outcome, u64)>>::deserialize(pairs).map_err(|err| {
                    self.malformed(names[0], format!("must hold [outcome, weight] pairs: {err}"))
                })?;
                let mut weights = BTreeMap::new();
                for (outcome, weight) in pairs {
                    if weights.contains_key(&outcome) {
                        let reason = format!("lists outcome '{}' twice", outcome);
                        return Err(self.malformed(names[0], reason));
                    }
                    weights.insert(outcome, weight);
                }
                Ok(RollSpec::Weights(weights))
            }
            other => Err(self.malformed(
                names[0],
                format!("must be dice notation or a weight mapping, found {}", json_type(other)),
            )),
        }
    }
}

enum OperandError {
    Node(NodeError),
    Shape(String),
}

fn operand(value: &Json) -> Result<Operand, OperandError> {
    match value {
        Json::Object(map) if map.is_empty() || map.contains_key("node") => deserialize(Some(value))
            .map(Operand::from)
            .map_err(OperandError::Node),
        Json::Object(_) => Err(OperandError::Shape(
            "is a mapping without a \"node\" tag".to_string(),
        )),
        Json::Array(items) => Ok(Operand::list(
            items.iter().map(operand).collect::<Result<Vec<_>, _>>()?,
        )),
        other => Literal::from_json(other)
            .map(Operand::Literal)
            .ok_or_else(|| OperandError::Shape("is not a literal".to_string())),
    }
}

fn json_type(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "list",
        Json::Object(_) => "mapping",
    }
}
