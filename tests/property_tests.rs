//! Property tests for the dictionary form and the d20 rolls.

use dndast::interp::{attributes, Context, Interpreter};
use dndast::node::{self, Area, AttackRoll, Literal, Node, Operand, SaveRoll, Targeting};
use dndast::{Distribution, DistributionError, EvalError, Outcome};
use proptest::prelude::*;

// -- Strategy helpers --

fn arb_literal() -> impl Strategy<Value = Literal> {
    prop_oneof![
        (-20i64..40).prop_map(Literal::Int),
        "[a-z ]{1,12}".prop_map(Literal::Text),
        any::<bool>().prop_map(Literal::Bool),
        prop::collection::vec(1i64..=20, 0..4).prop_map(Literal::from),
    ]
}

fn arb_reference() -> impl Strategy<Value = Node> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(Node::reference),
        ("[a-z]{1,8}", "[a-z_]{1,16}")
            .prop_map(|(name, attr)| Node::reference(format!("{name}.{attr}"))),
    ]
}

fn arb_operand() -> impl Strategy<Value = Operand> {
    prop_oneof![
        (-5i64..30).prop_map(Operand::from),
        arb_reference().prop_map(Operand::from),
        "[1-4]d(4|6|8|10)".prop_map(|notation| Operand::from(Node::roll(notation))),
    ]
}

fn arb_range() -> impl Strategy<Value = Operand> {
    let face = prop_oneof![
        3 => (1i64..=20).prop_map(Operand::from),
        1 => (1i64..=20).prop_map(|f| Operand::from(Node::value(f))),
    ];
    prop::collection::vec(face, 0..3).prop_map(Operand::list)
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        (-3i64..=12).prop_map(Outcome::Int),
        "(hit|miss|heads|tails|[0-9]{1,2}| [0-9])".prop_map(Outcome::label),
    ]
}

fn arb_attack_roll() -> impl Strategy<Value = AttackRoll> {
    (arb_range(), arb_range(), arb_operand(), arb_operand()).prop_map(
        |(critical_hit_range, critical_miss_range, attack_bonus, armor_class)| AttackRoll {
            critical_hit_range,
            critical_miss_range,
            attack_bonus,
            armor_class,
        },
    )
}

fn arb_save_roll() -> impl Strategy<Value = SaveRoll> {
    (arb_operand(), arb_operand()).prop_map(|(dc, bonus)| SaveRoll::new(dc, bonus))
}

fn feet(n: u32) -> String {
    format!("{n} feet")
}

fn arb_area() -> impl Strategy<Value = Area> {
    prop_oneof![
        (1u32..60).prop_map(|r| Area::new("sphere").with_dimension("radius", feet(r))),
        (1u32..60).prop_map(|l| Area::new("cone").with_dimension("length", feet(l))),
        (1u32..120, 1u32..10).prop_map(|(l, w)| {
            Area::new("line")
                .with_dimension("length", feet(l))
                .with_dimension("width", feet(w))
        }),
    ]
}

fn arb_targeting() -> impl Strategy<Value = Targeting> {
    (0u32..300, prop::option::of(arb_area()), 0u32..6, 0u32..3).prop_map(
        |(range, area, max_targets, min_targets)| {
            let targeting = Targeting::new(feet(range), max_targets)
                .with_min_targets(min_targets);
            match area {
                Some(area) => targeting.with_area(area),
                None => targeting,
            }
        },
    )
}

fn arb_results() -> impl Strategy<Value = Vec<(String, Operand)>> {
    let labels = vec!["critical hit", "critical miss", "hit", "miss"];
    (prop::sample::subsequence(labels, 1..=4), prop::collection::vec(arb_operand(), 4)).prop_map(
        |(labels, payloads)| {
            labels
                .into_iter()
                .map(String::from)
                .zip(payloads)
                .collect()
        },
    )
}

fn arb_leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        arb_literal().prop_map(Node::value),
        arb_reference(),
        "[1-4]d(4|6|8|10|12)( \\+ [1-5])?".prop_map(Node::roll),
        prop::collection::btree_map(arb_outcome(), 1u64..5, 1..5).prop_map(Node::roll_weights),
        ("[1-4]d(6|8)", "(fire|cold|slashing)").prop_map(|(eq, ty)| Node::damage(eq, ty)),
        arb_attack_roll().prop_map(Node::from),
        arb_save_roll().prop_map(Node::from),
        arb_targeting().prop_map(Node::from),
        Just(Node::Empty),
    ]
}

fn arb_node() -> impl Strategy<Value = Node> {
    arb_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (inner.clone(), arb_results())
                .prop_map(|(selector, results)| Node::selection(selector, results)),
            (arb_targeting(), arb_attack_roll(), arb_results()).prop_map(
                |(targeting, roll, results)| Node::attack(targeting.into(), roll, results)
            ),
            (arb_targeting(), arb_save_roll(), inner.clone(), 0u8..=4).prop_map(
                |(targeting, roll, failure, quarters)| {
                    Node::save(targeting.into(), roll, failure, f64::from(quarters) * 0.25)
                }
            ),
            (inner.clone(), prop::collection::vec(inner, 0..3))
                .prop_map(|(first, rest)| Node::all(first, rest)),
        ]
    })
}

// -- Properties --

proptest! {
    /// Reading back the dictionary form gives the same tree.
    #[test]
    fn prop_dictionary_round_trip(tree in arb_node()) {
        let decoded = node::deserialize(Some(&tree.to_dict())).unwrap();
        prop_assert_eq!(decoded, tree);
    }

    /// The serde path goes through the same dictionary form.
    #[test]
    fn prop_serde_round_trip(tree in arb_node()) {
        let text = serde_json::to_string(&tree).unwrap();
        let decoded: Node = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(decoded, tree);
    }

    /// With disjoint critical ranges every d20 face lands in exactly one label.
    #[test]
    fn prop_attack_roll_weight_total(
        bonus in -5i64..15,
        bonus_sides in 1u32..7,
        armor_class in 5i64..25,
        critical_hit in 18i64..=20,
        critical_miss in 1i64..=2,
    ) {
        let tree: Node = AttackRoll::new(
            critical_hit..=20,
            1..=critical_miss,
            Node::roll(format!("{bonus} + 1d{bonus_sides}")),
            Node::reference("target.armor_class"),
        )
        .into();
        let ctx = Context::new().with("target", attributes([("armor_class", armor_class)]));
        let result = Interpreter::default().evaluate(&tree, &ctx).unwrap();
        let dist = result.as_distribution().unwrap();

        prop_assert_eq!(dist.total(), 20 * u128::from(bonus_sides));
        prop_assert_eq!(
            dist.weight(&Outcome::label("critical hit")),
            u128::from(bonus_sides) * (21 - critical_hit) as u128
        );
        prop_assert_eq!(
            dist.weight(&Outcome::label("critical miss")),
            u128::from(bonus_sides) * critical_miss as u128
        );
    }

    /// Save outcomes always split the twenty faces.
    #[test]
    fn prop_save_roll_splits_faces(dc in 1i64..30, bonus in -5i64..10) {
        let tree: Node = SaveRoll::new(dc, bonus).into();
        let result = Interpreter::default().evaluate(&tree, &Context::new()).unwrap();
        let dist = result.as_distribution().unwrap();

        let successes = (1..=20).filter(|d| d + bonus >= dc).count() as u128;
        prop_assert_eq!(dist.total(), 20);
        prop_assert_eq!(dist.weight(&Outcome::label("success")), successes);
    }

    /// Evaluating twice yields equal distributions.
    #[test]
    fn prop_evaluation_is_idempotent(notation in "[1-3]d(4|6|8) \\+ [0-4]", dc in 5i64..20) {
        let tree = Node::save(
            Targeting::new("60 feet", 3).into(),
            SaveRoll::new(dc, Node::reference("target.dexterity_save_bonus")),
            Node::roll(notation),
            0.5,
        );
        let interp = Interpreter::default();
        let first = interp.evaluate(&tree, &Context::new()).unwrap();
        let second = interp.evaluate(&tree, &Context::new()).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Summing two independent rolls matches the combined notation.
    #[test]
    fn prop_and_matches_notation(a in 1u32..4, b in 1u32..4) {
        let tree = Node::and(Node::roll(format!("{a}d6")), Node::roll(format!("{b}d6")));
        let result = Interpreter::default().evaluate(&tree, &Context::new()).unwrap();
        let expected = dndast::dice::evaluate(&format!("{}d6", a + b)).unwrap();
        prop_assert_eq!(result.as_distribution(), Some(&expected));
    }

    /// Adding to a boundary value either fits exactly or reports overflow.
    #[test]
    fn prop_and_near_integer_limit(offset in 0i64..4, step in 0i64..4) {
        let tree = Node::and(Node::value(i64::MAX - offset), Node::value(step));
        let result = Interpreter::default().evaluate(&tree, &Context::new());
        if step <= offset {
            let expected = Distribution::constant(i64::MAX - offset + step);
            let value = result.unwrap();
            prop_assert_eq!(value.as_distribution(), Some(&expected));
        } else {
            prop_assert_eq!(
                result,
                Err(EvalError::Distribution(DistributionError::IntegerOverflow))
            );
        }
    }
}

#[test]
fn test_adding_zero_is_identity() {
    let dist = Distribution::uniform(6);
    assert_eq!(dist.add(&Distribution::constant(0)).unwrap(), dist);
}
