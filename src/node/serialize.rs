//! Canonical dictionary form of a tree.

use serde_json::{json, Map, Value as Json};

use crate::dist::Outcome;

use super::{AttackRoll, Node, Operand, Results, RollSpec, SaveResults, SaveRoll, Targeting};

impl Node {
    /// The canonical dictionary form.
    ///
    /// Nested nodes are written as nested dictionaries; literals and area
    /// descriptors pass through unchanged.
    #[must_use]
    pub fn to_dict(&self) -> Json {
        let tag = self.kind().as_str();
        match self {
            Node::Value { value } => json!({"node": tag, "value": value.to_json()}),
            Node::Reference { path } => json!({"node": tag, "value": path}),
            Node::Roll { spec } => json!({"node": tag, "value": roll_spec(spec)}),
            Node::Damage {
                equation,
                damage_type,
            } => json!({"node": tag, "equation": equation, "type": damage_type}),
            Node::AttackRoll(roll) => attack_roll(roll),
            Node::SaveRoll(roll) => save_roll(roll),
            Node::Selection { selector, results } => json!({
                "node": tag,
                "selector": selector.to_dict(),
                "results": results_map(results),
            }),
            Node::Targeting(targeting) => targeting_dict(targeting),
            Node::Attack {
                targeting,
                attack_roll: roll,
                results,
            } => json!({
                "node": tag,
                "targeting": targeting.to_dict(),
                "attack_roll": attack_roll(roll),
                "results": results_map(results),
            }),
            Node::Save {
                targeting,
                save_roll: roll,
                results,
            } => json!({
                "node": tag,
                "targeting": targeting.to_dict(),
                "save_roll": save_roll(roll),
                "results": save_results(results),
            }),
            Node::And { operands } => match operands.as_slice() {
                [left, right] => json!({
                    "node": tag,
                    "left": left.to_dict(),
                    "right": right.to_dict(),
                }),
                _ => json!({
                    "node": tag,
                    "nodes": operands.iter().map(Node::to_dict).collect::<Vec<_>>(),
                }),
            },
            Node::Empty => json!({"node": tag}),
        }
    }
}

impl From<Node> for Json {
    fn from(node: Node) -> Self {
        node.to_dict()
    }
}

impl Operand {
    /// Literal as-is, expression as its dictionary, lists element-wise.
    #[must_use]
    pub fn to_json(&self) -> Json {
        match self {
            Operand::Literal(literal) => literal.to_json(),
            Operand::Expression(node) => node.to_dict(),
            Operand::List(items) => Json::Array(items.iter().map(Operand::to_json).collect()),
        }
    }
}

/// Notation as a string. A weight table is a mapping keyed by outcome
/// text, unless some label reads back as an integer; then it is a list of
/// `[outcome, weight]` pairs.
fn roll_spec(spec: &RollSpec) -> Json {
    match spec {
        RollSpec::Notation(notation) => Json::String(notation.clone()),
        RollSpec::Weights(weights) => {
            let keyed = weights
                .keys()
                .all(|outcome| Outcome::from_key(&outcome.to_string()) == *outcome);
            if keyed {
                Json::Object(
                    weights
                        .iter()
                        .map(|(outcome, weight)| (outcome.to_string(), Json::from(*weight)))
                        .collect(),
                )
            } else {
                Json::Array(
                    weights
                        .iter()
                        .map(|(outcome, weight)| json!([outcome, weight]))
                        .collect(),
                )
            }
        }
    }
}

fn attack_roll(roll: &AttackRoll) -> Json {
    json!({
        "node": "AttackRoll",
        "critical_hit_range": roll.critical_hit_range.to_json(),
        "critical_miss_range": roll.critical_miss_range.to_json(),
        "attack_bonus": roll.attack_bonus.to_json(),
        "armor_class": roll.armor_class.to_json(),
    })
}

fn save_roll(roll: &SaveRoll) -> Json {
    json!({
        "node": "SaveRoll",
        "save_dc": roll.save_dc.to_json(),
        "save_bonus": roll.save_bonus.to_json(),
    })
}

fn targeting_dict(targeting: &Targeting) -> Json {
    json!({
        "node": "Targeting",
        "range": targeting.range,
        "area": targeting.area.as_ref().map_or(Json::Null, |area| area.to_json()),
        "max_targets": targeting.max_targets,
        "min_targets": targeting.min_targets,
    })
}

fn results_map(results: &Results) -> Json {
    let map: Map<String, Json> = results
        .iter()
        .map(|(label, payload)| (label.clone(), payload.to_json()))
        .collect();
    Json::Object(map)
}

fn save_results(results: &SaveResults) -> Json {
    json!({
        "failure": results.failure.to_json(),
        "success": results.success,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Area;

    #[test]
    fn test_attack_roll_dict() {
        let tree: Node = AttackRoll::new([19, 20], [1], 4, 12).into();
        assert_eq!(
            tree.to_dict(),
            json!({
                "node": "AttackRoll",
                "critical_hit_range": [19, 20],
                "critical_miss_range": [1],
                "attack_bonus": 4,
                "armor_class": 12,
            })
        );
    }

    #[test]
    fn test_nested_reference_dict() {
        let tree: Node = SaveRoll::new(12, Node::reference("target.dexterity_save_bonus")).into();
        assert_eq!(
            tree.to_dict(),
            json!({
                "node": "SaveRoll",
                "save_dc": 12,
                "save_bonus": {"node": "Reference", "value": "target.dexterity_save_bonus"},
            })
        );
    }

    #[test]
    fn test_selection_dict() {
        let tree = Node::selection(
            AttackRoll::new([19, 20], [1], 4, Node::reference("target.AC")).into(),
            [
                ("critical miss", Operand::from(Node::roll("4d6"))),
                ("miss", Operand::from(0)),
                ("hit", Operand::from(1)),
                ("critical hit", Operand::from(2)),
            ],
        );
        assert_eq!(
            tree.to_dict(),
            json!({
                "node": "Selection",
                "selector": {
                    "node": "AttackRoll",
                    "critical_hit_range": [19, 20],
                    "critical_miss_range": [1],
                    "attack_bonus": 4,
                    "armor_class": {"node": "Reference", "value": "target.AC"},
                },
                "results": {
                    "critical miss": {"node": "Roll", "value": "4d6"},
                    "miss": 0,
                    "hit": 1,
                    "critical hit": 2,
                },
            })
        );
    }

    #[test]
    fn test_roll_weights_dict() {
        let tree = Node::roll_weights([(2i64, 1), (3, 1), (4, 1), (5, 1)]);
        assert_eq!(
            tree.to_dict(),
            json!({"node": "Roll", "value": {"2": 1, "3": 1, "4": 1, "5": 1}})
        );
    }

    #[test]
    fn test_numeric_labels_use_pairs() {
        let tree = Node::roll_weights([(Outcome::label("3"), 1), (Outcome::Int(3), 2)]);
        assert_eq!(
            tree.to_dict(),
            json!({"node": "Roll", "value": [[3, 2], ["3", 1]]})
        );

        let labels = Node::roll_weights([("heads", 1), ("tails", 1)]);
        assert_eq!(
            labels.to_dict(),
            json!({"node": "Roll", "value": {"heads": 1, "tails": 1}})
        );
    }

    #[test]
    fn test_targeting_dict_passes_area_through() {
        let tree: Node = Targeting::new("60 feet", 2)
            .with_area(Area::new("cylinder").with_dimension("radius", "20 feet"))
            .into();
        assert_eq!(
            tree.to_dict(),
            json!({
                "node": "Targeting",
                "range": "60 feet",
                "area": {"shape": "cylinder", "radius": "20 feet"},
                "max_targets": 2,
                "min_targets": 0,
            })
        );
    }

    #[test]
    fn test_and_forms() {
        let pair = Node::and(Node::roll("1d6"), Node::roll("1d4"));
        assert!(pair.to_dict().get("left").is_some());

        let triple = Node::all(Node::roll("1d6"), [Node::roll("1d4"), Node::value(2)]);
        assert_eq!(triple.to_dict()["nodes"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_empty_dict() {
        assert_eq!(Node::Empty.to_dict(), json!({"node": "Empty"}));
    }
}
