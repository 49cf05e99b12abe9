//! d20 rolls and multi-target resolution.
//!
//! ## Attack
//!
//! Each target gets its own attack roll with `target` bound to its stat
//! block. The label distribution is mapped through the results table and
//! the per-target payloads are summed as independent distributions.
//!
//! ## Save
//!
//! Each target saves with `target` bound. The failures are counted into a
//! distribution over `F` failed targets out of `T`; one damage roll `d`
//! then deals `F * d + (T - F) * floor(success * d)` in total.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::dist::{Distribution, DistributionError, Outcome};
use crate::error::EvalError;
use crate::node::{AttackRoll, Literal, Node, Operand, Results, SaveResults, SaveRoll};

use super::context::{Attributes, Context};
use super::evaluation::Evaluation;
use super::interpreter::{select, Interpreter};

/// Name bound to the current target while its roll is evaluated.
pub const TARGET: &str = "target";

pub const CRITICAL_HIT: &str = "critical hit";
pub const CRITICAL_MISS: &str = "critical miss";
pub const HIT: &str = "hit";
pub const MISS: &str = "miss";

pub const SUCCESS: &str = "success";
pub const FAILURE: &str = "failure";

impl Interpreter {
    /// Distribution over the four attack labels.
    pub(super) fn attack_roll(
        &self,
        roll: &AttackRoll,
        context: &Context,
    ) -> Result<Distribution, EvalError> {
        let critical_hits =
            self.face_set(&roll.critical_hit_range, context, "critical_hit_range")?;
        let critical_misses =
            self.face_set(&roll.critical_miss_range, context, "critical_miss_range")?;
        let bonus = self.evaluate_distribution(&roll.attack_bonus, context, "attack_bonus")?;
        let armor_class = self.evaluate_distribution(&roll.armor_class, context, "armor_class")?;

        let d20 = Distribution::uniform(20);
        Distribution::combine::<_, EvalError>(&[&d20, &bonus, &armor_class], |tuple| {
            let d20 = int(tuple[0], "d20")?;
            let label = if critical_hits.contains(&d20) {
                CRITICAL_HIT
            } else if critical_misses.contains(&d20) {
                CRITICAL_MISS
            } else if plus(d20, int(tuple[1], "attack_bonus")?)? >= int(tuple[2], "armor_class")? {
                HIT
            } else {
                MISS
            };
            Ok(Distribution::constant(label))
        })
    }

    /// Distribution over `"success"` and `"failure"`.
    pub(super) fn save_roll(
        &self,
        roll: &SaveRoll,
        context: &Context,
    ) -> Result<Distribution, EvalError> {
        let save_dc = self.evaluate_distribution(&roll.save_dc, context, "save_dc")?;
        let bonus = self.evaluate_distribution(&roll.save_bonus, context, "save_bonus")?;

        let d20 = Distribution::uniform(20);
        Distribution::combine::<_, EvalError>(&[&d20, &save_dc, &bonus], |tuple| {
            let total = plus(int(tuple[0], "d20")?, int(tuple[2], "save_bonus")?)?;
            let label = if total >= int(tuple[1], "save_dc")? {
                SUCCESS
            } else {
                FAILURE
            };
            Ok(Distribution::constant(label))
        })
    }

    pub(super) fn attack(
        &self,
        targeting: &Node,
        roll: &AttackRoll,
        results: &Results,
        context: &Context,
    ) -> Result<Distribution, EvalError> {
        let targets = self.targets(targeting, context)?;
        let payloads = self.payloads(results, context)?;

        let mut total = Distribution::constant(0);
        for (index, target) in targets.into_iter().enumerate() {
            let labels = self.attack_roll(roll, &context.with(TARGET, target))?;
            let payload = labels.map(|outcome| select(&payloads, outcome))?;
            debug!(target = index, mean = ?payload.mean(), "attack resolved against target");
            total = total.add(&payload)?;
        }
        Ok(total)
    }

    pub(super) fn save(
        &self,
        targeting: &Node,
        roll: &SaveRoll,
        results: &SaveResults,
        context: &Context,
    ) -> Result<Distribution, EvalError> {
        let targets = self.targets(targeting, context)?;
        let damage = self.evaluate_distribution(&results.failure, context, "results['failure']")?;
        let target_count = targets.len() as i64;

        let mut failures = Distribution::constant(0);
        for (index, target) in targets.into_iter().enumerate() {
            let outcome = self.save_roll(roll, &context.with(TARGET, target))?;
            let failed = outcome.map(failure_indicator)?;
            debug!(
                target = index,
                failure = failed.probability(&Outcome::Int(1)),
                "save resolved for target"
            );
            failures = failures.add(&failed)?;
        }

        let multiplier = results.success;
        Distribution::combine::<_, EvalError>(&[&failures, &damage], |tuple| {
            let failed = int(tuple[0], "failures")?;
            let full = int(tuple[1], "results['failure']")?;
            let reduced = (multiplier * full as f64).floor() as i64;
            let total = plus(times(failed, full)?, times(target_count - failed, reduced)?)?;
            Ok(Distribution::constant(total))
        })
    }

    fn targets(&self, targeting: &Node, context: &Context) -> Result<Vec<Attributes>, EvalError> {
        let targets = self.evaluate(targeting, context)?.into_targets("targeting")?;
        debug!(count = targets.len(), "targets selected");
        Ok(targets)
    }

    /// Die faces listed by a critical range. A single integer is a
    /// one-face range and null is empty.
    fn face_set(
        &self,
        range: &Operand,
        context: &Context,
        field: &str,
    ) -> Result<FxHashSet<i64>, EvalError> {
        let mismatch = |found: String| EvalError::type_mismatch(field, "list of integers", found);
        match self.evaluate_operand(range, context)? {
            Evaluation::Literal(Literal::Null) => Ok(FxHashSet::default()),
            Evaluation::Literal(Literal::List(faces)) => faces
                .iter()
                .map(|face| {
                    face.as_int()
                        .ok_or_else(|| mismatch(face.type_name().to_string()))
                })
                .collect(),
            Evaluation::Literal(single) => match single.as_int() {
                Some(face) => Ok(std::iter::once(face).collect()),
                None => Err(mismatch(single.type_name().to_string())),
            },
            other => Err(mismatch(other.type_name())),
        }
    }
}

fn failure_indicator(outcome: &Outcome) -> Result<Distribution, EvalError> {
    match outcome.as_label() {
        Some(SUCCESS) => Ok(Distribution::constant(0)),
        Some(FAILURE) => Ok(Distribution::constant(1)),
        _ => Err(EvalError::UnmappedOutcome {
            outcome: outcome.to_string(),
        }),
    }
}

fn plus(a: i64, b: i64) -> Result<i64, EvalError> {
    Ok(a.checked_add(b).ok_or(DistributionError::IntegerOverflow)?)
}

fn times(a: i64, b: i64) -> Result<i64, EvalError> {
    Ok(a.checked_mul(b).ok_or(DistributionError::IntegerOverflow)?)
}

fn int(outcome: &Outcome, field: &str) -> Result<i64, EvalError> {
    outcome
        .as_int()
        .ok_or_else(|| EvalError::type_mismatch(field, "integer outcome", outcome.to_string()))
}
