//! Recursive evaluation of trees.

use std::collections::BTreeMap;

use tracing::trace;

use crate::dice;
use crate::dist::{Distribution, Outcome};
use crate::error::EvalError;
use crate::node::{Literal, Node, Operand, Results, RollSpec};

use super::context::Context;
use super::evaluation::Evaluation;
use super::roster::Roster;
use super::targeting::TargetResolver;

/// Evaluates trees into exact distributions.
///
/// Holds only the roster. Separate `evaluate` calls share nothing, so one
/// interpreter can serve any number of threads.
#[derive(Clone, Debug, Default)]
pub struct Interpreter {
    roster: Roster,
}

impl Interpreter {
    pub fn new(roster: Roster) -> Self {
        Self { roster }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Evaluate a node.
    pub fn evaluate(&self, node: &Node, context: &Context) -> Result<Evaluation, EvalError> {
        trace!(node = %node.kind(), "evaluating");
        match node {
            Node::Value { value } => Ok(Evaluation::Literal(value.clone())),
            Node::Reference { path } => self.reference(path, context),
            Node::Roll { spec } => Ok(roll(spec)?.into()),
            Node::Damage { equation, .. } => Ok(dice::evaluate(equation)?.into()),
            Node::AttackRoll(attack_roll) => Ok(self.attack_roll(attack_roll, context)?.into()),
            Node::SaveRoll(save_roll) => Ok(self.save_roll(save_roll, context)?.into()),
            Node::Selection { selector, results } => {
                Ok(self.selection(selector, results, context)?.into())
            }
            Node::Targeting(targeting) => Ok(Evaluation::Targets(
                TargetResolver::new(&self.roster).resolve(targeting)?,
            )),
            Node::Attack {
                targeting,
                attack_roll,
                results,
            } => Ok(self.attack(targeting, attack_roll, results, context)?.into()),
            Node::Save {
                targeting,
                save_roll,
                results,
            } => Ok(self.save(targeting, save_roll, results, context)?.into()),
            Node::And { operands } => self.and(operands, context),
            Node::Empty => Ok(Evaluation::null()),
        }
    }

    /// Evaluate a field. Literals pass through unevaluated; a list holding
    /// sub-expressions evaluates each element to a literal.
    pub fn evaluate_operand(
        &self,
        operand: &Operand,
        context: &Context,
    ) -> Result<Evaluation, EvalError> {
        match operand {
            Operand::Literal(literal) => Ok(Evaluation::Literal(literal.clone())),
            Operand::Expression(node) => self.evaluate(node, context),
            Operand::List(items) => {
                let literals = items
                    .iter()
                    .map(|item| list_element(self.evaluate_operand(item, context)?))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Evaluation::Literal(Literal::List(literals)))
            }
        }
    }

    /// Evaluate a field that must be a distribution.
    ///
    /// Integer and string literals become constants. `field` names the
    /// field in error messages.
    pub fn evaluate_distribution(
        &self,
        operand: &Operand,
        context: &Context,
        field: &str,
    ) -> Result<Distribution, EvalError> {
        self.evaluate_operand(operand, context)?
            .into_distribution(field)
    }

    fn reference(&self, path: &str, context: &Context) -> Result<Evaluation, EvalError> {
        let (name, attribute) = match path.split_once('.') {
            Some((name, attribute)) => (name, Some(attribute)),
            None => (path, None),
        };
        let bound = context.get(name).ok_or_else(|| EvalError::UnboundName {
            name: name.to_string(),
        })?;
        Ok(match attribute {
            Some(attribute) => {
                Evaluation::Literal(bound.get(attribute).cloned().unwrap_or(Literal::Null))
            }
            None => Evaluation::Target(bound.clone()),
        })
    }

    /// Label-keyed payloads of a results table, each evaluated once.
    pub(super) fn payloads(
        &self,
        results: &Results,
        context: &Context,
    ) -> Result<BTreeMap<String, Distribution>, EvalError> {
        results
            .iter()
            .map(|(label, payload)| {
                let field = format!("results['{label}']");
                let dist = self.evaluate_distribution(payload, context, &field)?;
                Ok((label.clone(), dist))
            })
            .collect()
    }

    fn selection(
        &self,
        selector: &Node,
        results: &Results,
        context: &Context,
    ) -> Result<Distribution, EvalError> {
        let selector = self.evaluate(selector, context)?.into_distribution("selector")?;
        let payloads = self.payloads(results, context)?;
        selector.map(|outcome| select(&payloads, outcome))
    }

    fn and(&self, operands: &[Node], context: &Context) -> Result<Evaluation, EvalError> {
        let mut operands = operands.iter();
        let first = operands
            .next()
            .ok_or_else(|| EvalError::type_mismatch("And", "at least one operand", "none"))?;
        let mut acc = self.evaluate(first, context)?;
        for operand in operands {
            acc = join(acc, self.evaluate(operand, context)?)?;
        }
        Ok(acc)
    }
}

/// Payload for one selector outcome.
pub(super) fn select(
    payloads: &BTreeMap<String, Distribution>,
    outcome: &Outcome,
) -> Result<Distribution, EvalError> {
    let label = outcome.to_string();
    payloads
        .get(&label)
        .cloned()
        .ok_or(EvalError::UnmappedOutcome { outcome: label })
}

fn roll(spec: &RollSpec) -> Result<Distribution, EvalError> {
    match spec {
        RollSpec::Notation(notation) => Ok(dice::evaluate(notation)?),
        RollSpec::Weights(weights) => Ok(Distribution::from_weights(
            weights.iter().map(|(outcome, weight)| (outcome.clone(), *weight)),
        )),
    }
}

/// An evaluated list element. Certain distributions collapse to their outcome.
fn list_element(element: Evaluation) -> Result<Literal, EvalError> {
    match element {
        Evaluation::Literal(literal) => Ok(literal),
        Evaluation::Distribution(dist) => match dist.as_constant() {
            Some(Outcome::Int(value)) => Ok(Literal::Int(*value)),
            Some(Outcome::Label(label)) => Ok(Literal::Text(label.clone())),
            None => Err(EvalError::type_mismatch(
                "list element",
                "literal or certain outcome",
                "distribution",
            )),
        },
        other => Err(EvalError::type_mismatch(
            "list element",
            "literal or certain outcome",
            other.type_name(),
        )),
    }
}

/// Combine two `And` operands.
fn join(left: Evaluation, right: Evaluation) -> Result<Evaluation, EvalError> {
    match (left, right) {
        (Evaluation::Literal(Literal::List(mut a)), Evaluation::Literal(Literal::List(b))) => {
            a.extend(b);
            Ok(Evaluation::Literal(Literal::List(a)))
        }
        (left @ (Evaluation::Target(_) | Evaluation::Targets(_)), right) => {
            let mut targets = left.into_targets("And")?;
            targets.extend(right.into_targets("And")?);
            Ok(Evaluation::Targets(targets))
        }
        (left, right) => {
            let a = left.into_distribution("And")?;
            let b = right.into_distribution("And")?;
            Ok(a.add(&b)?.into())
        }
    }
}
