//! Exact discrete distributions.
//!
//! A `Distribution` maps outcomes to integer weights. Weights are never
//! normalized to floats; probabilities are only computed on request.
//!
//! ## Operations
//!
//! - `uniform`: a fair die
//! - `from_weights`: an explicit outcome table
//! - `combine`: joint map over independent inputs
//! - `add`: convolution of two numeric distributions

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};
use thiserror::Error;

use super::Outcome;

/// Errors raised by distribution arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistributionError {
    /// Arithmetic was attempted on a label outcome.
    #[error("outcome '{outcome}' is not numeric")]
    NonNumericOutcome { outcome: Outcome },
    /// The weights of a result no longer sum to a 128-bit value.
    #[error("outcome weights exceed 128 bits")]
    WeightOverflow,
    /// Integer outcome arithmetic left the 64-bit range.
    #[error("integer outcome out of 64-bit range")]
    IntegerOverflow,
}

/// An exact probability mass function over a finite set of outcomes.
///
/// Equality compares probability mass, not raw weights: `{hit: 2}` and
/// `{hit: 1}` are the same distribution.
///
/// The weights of every distribution sum to at most `u128::MAX`; operations
/// whose result would not fit return `DistributionError::WeightOverflow`.
#[derive(Clone, Debug, Default)]
pub struct Distribution {
    weights: BTreeMap<Outcome, u128>,
}

impl Distribution {
    /// A fair die with faces `1..=sides`, each with weight 1.
    #[must_use]
    pub fn uniform(sides: u32) -> Self {
        Self {
            weights: (1..=sides as i64).map(|face| (Outcome::Int(face), 1)).collect(),
        }
    }

    /// A distribution with a single certain outcome.
    pub fn constant(outcome: impl Into<Outcome>) -> Self {
        let mut weights = BTreeMap::new();
        weights.insert(outcome.into(), 1);
        Self { weights }
    }

    /// Build from an explicit outcome table.
    ///
    /// Repeated outcomes accumulate; zero weights are dropped.
    pub fn from_weights<I, O>(weights: I) -> Self
    where
        I: IntoIterator<Item = (O, u64)>,
        O: Into<Outcome>,
    {
        let mut table = BTreeMap::new();
        for (outcome, weight) in weights {
            if weight > 0 {
                // A sum of 64-bit weights cannot outgrow 128 bits.
                *table.entry(outcome.into()).or_insert(0) += u128::from(weight);
            }
        }
        Self { weights: table }
    }

    /// Joint map over independent inputs.
    ///
    /// Calls `combiner` once per outcome tuple of the cartesian product.
    /// The tuple's weight is the product of its input weights. Each call
    /// returns a distribution; constant results contribute their outcome
    /// directly, non-constant results are mixed in exactly by rescaling all
    /// branches to a common total.
    pub fn combine<F, E>(inputs: &[&Distribution], mut combiner: F) -> Result<Self, E>
    where
        F: FnMut(&[&Outcome]) -> Result<Distribution, E>,
        E: From<DistributionError>,
    {
        let supports: SmallVec<[Vec<(&Outcome, u128)>; 4]> = inputs
            .iter()
            .map(|dist| dist.weights.iter().map(|(o, w)| (o, *w)).collect())
            .collect();

        if supports.iter().any(Vec::is_empty) {
            return Ok(Self::default());
        }

        let mut cursor: SmallVec<[usize; 4]> = smallvec![0; supports.len()];
        let mut acc: FxHashMap<Outcome, u128> = FxHashMap::default();
        let mut scale: u128 = 1;
        // Sum of `acc`; every entry is bounded by it.
        let mut mass: u128 = 0;

        'tuples: loop {
            let mut tuple: SmallVec<[&Outcome; 4]> = SmallVec::with_capacity(supports.len());
            let mut weight: u128 = 1;
            for (support, &index) in supports.iter().zip(cursor.iter()) {
                let (outcome, w) = support[index];
                tuple.push(outcome);
                weight = checked_mul(weight, w)?;
            }

            let branch = combiner(&tuple[..])?.reduced();
            let total = branch.total();
            if total > 0 {
                let next = lcm(scale, total)?;
                if next != scale {
                    let factor = next / scale;
                    mass = checked_mul(mass, factor)?;
                    for value in acc.values_mut() {
                        *value *= factor;
                    }
                    scale = next;
                }
                let k = checked_mul(weight, scale / total)?;
                mass = checked_add(mass, checked_mul(total, k)?)?;
                for (outcome, w) in branch.weights {
                    *acc.entry(outcome).or_insert(0) += w * k;
                }
            }

            // Odometer advance, last input fastest.
            let mut pos = cursor.len();
            loop {
                if pos == 0 {
                    break 'tuples;
                }
                pos -= 1;
                cursor[pos] += 1;
                if cursor[pos] < supports[pos].len() {
                    break;
                }
                cursor[pos] = 0;
            }
        }

        Ok(Self {
            weights: acc.into_iter().collect(),
        })
    }

    /// Unary joint map.
    pub fn map<F, E>(&self, mut f: F) -> Result<Self, E>
    where
        F: FnMut(&Outcome) -> Result<Distribution, E>,
        E: From<DistributionError>,
    {
        Self::combine(&[self], |tuple| f(tuple[0]))
    }

    /// Distribution of the sum of two independent numeric distributions.
    pub fn add(&self, other: &Distribution) -> Result<Self, DistributionError> {
        // The result's weights sum to the product of the two totals.
        checked_mul(self.total(), other.total())?;
        let mut acc: FxHashMap<i64, u128> = FxHashMap::default();
        for (a, wa) in &self.weights {
            let x = numeric(a)?;
            for (b, wb) in &other.weights {
                let y = numeric(b)?;
                let sum = x.checked_add(y).ok_or(DistributionError::IntegerOverflow)?;
                *acc.entry(sum).or_insert(0) += wa * wb;
            }
        }
        let weights = acc.into_iter().map(|(v, w)| (Outcome::Int(v), w)).collect();
        Ok(Self { weights }.reduced())
    }

    /// Sum of the weights.
    #[must_use]
    pub fn total(&self) -> u128 {
        self.weights.values().sum()
    }

    /// Raw weight of an outcome (0 if absent).
    #[must_use]
    pub fn weight(&self, outcome: &Outcome) -> u128 {
        self.weights.get(outcome).copied().unwrap_or(0)
    }

    /// Probability of an outcome.
    #[must_use]
    pub fn probability(&self, outcome: &Outcome) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.weight(outcome) as f64 / total as f64
    }

    /// Expected value. `None` if the distribution is empty or has a label outcome.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let mut sum = 0.0;
        for (outcome, weight) in &self.weights {
            sum += outcome.as_int()? as f64 * *weight as f64;
        }
        Some(sum / total as f64)
    }

    /// The same distribution with weights divided by their GCD.
    #[must_use]
    pub fn reduced(&self) -> Self {
        let divisor = self.weights.values().fold(0, |g, w| gcd(g, *w));
        if divisor <= 1 {
            return self.clone();
        }
        Self {
            weights: self
                .weights
                .iter()
                .map(|(o, w)| (o.clone(), w / divisor))
                .collect(),
        }
    }

    /// The only outcome, if this distribution is certain.
    #[must_use]
    pub fn as_constant(&self) -> Option<&Outcome> {
        if self.weights.len() == 1 {
            self.weights.keys().next()
        } else {
            None
        }
    }

    /// Iterate over `(outcome, weight)` pairs in outcome order.
    pub fn iter(&self) -> impl Iterator<Item = (&Outcome, u128)> {
        self.weights.iter().map(|(o, w)| (o, *w))
    }

    /// Iterate over outcomes in order.
    pub fn outcomes(&self) -> impl Iterator<Item = &Outcome> {
        self.weights.keys()
    }

    /// Number of distinct outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// True if there are no outcomes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

fn numeric(outcome: &Outcome) -> Result<i64, DistributionError> {
    outcome.as_int().ok_or_else(|| DistributionError::NonNumericOutcome {
        outcome: outcome.clone(),
    })
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

fn lcm(a: u128, b: u128) -> Result<u128, DistributionError> {
    checked_mul(a / gcd(a, b), b)
}

fn checked_mul(a: u128, b: u128) -> Result<u128, DistributionError> {
    a.checked_mul(b).ok_or(DistributionError::WeightOverflow)
}

fn checked_add(a: u128, b: u128) -> Result<u128, DistributionError> {
    a.checked_add(b).ok_or(DistributionError::WeightOverflow)
}

impl PartialEq for Distribution {
    fn eq(&self, other: &Self) -> bool {
        self.reduced().weights == other.reduced().weights
    }
}

impl Eq for Distribution {}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (outcome, weight)) in self.weights.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", outcome, weight)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, u64)]) -> Distribution {
        Distribution::from_weights(pairs.iter().map(|(l, w)| (*l, *w)))
    }

    #[test]
    fn test_uniform() {
        let d6 = Distribution::uniform(6);
        assert_eq!(d6.len(), 6);
        assert_eq!(d6.total(), 6);
        assert_eq!(d6.mean(), Some(3.5));
    }

    #[test]
    fn test_from_weights_accumulates_and_drops_zero() {
        let dist = Distribution::from_weights([(1i64, 2), (1, 3), (2, 0)]);
        assert_eq!(dist.len(), 1);
        assert_eq!(dist.weight(&Outcome::Int(1)), 5);
    }

    #[test]
    fn test_equality_is_proportional() {
        assert_eq!(labels(&[("hit", 2), ("miss", 4)]), labels(&[("hit", 1), ("miss", 2)]));
        assert_ne!(labels(&[("hit", 2), ("miss", 3)]), labels(&[("hit", 1), ("miss", 2)]));
    }

    #[test]
    fn test_combine_constant_results_keeps_product_weights() {
        let d20 = Distribution::uniform(20);
        let bonus = Distribution::uniform(4);
        let result: Distribution = Distribution::combine(&[&d20, &bonus], |t| {
            let total = t[0].as_int().unwrap_or(0) + t[1].as_int().unwrap_or(0);
            Ok::<_, DistributionError>(Distribution::constant(if total >= 15 {
                "hit"
            } else {
                "miss"
            }))
        })
        .unwrap();
        assert_eq!(result.total(), 80);
    }

    #[test]
    fn test_combine_mixes_nested_distributions() {
        let coin = labels(&[("hit", 1), ("miss", 1)]);
        let result = coin
            .map(|o| {
                Ok::<_, DistributionError>(match o.as_label() {
                    Some("hit") => Distribution::uniform(4),
                    _ => Distribution::constant(0),
                })
            })
            .unwrap();
        // half the mass on 0, the other half spread over 1..=4
        assert_eq!(
            result,
            Distribution::from_weights([(0i64, 4), (1, 1), (2, 1), (3, 1), (4, 1)])
        );
    }

    #[test]
    fn test_combine_propagates_errors() {
        let d4 = Distribution::uniform(4);
        let result = d4.map(|o| {
            if o == &Outcome::Int(3) {
                Err(DistributionError::NonNumericOutcome { outcome: o.clone() })
            } else {
                Ok(Distribution::constant(o.clone()))
            }
        });
        assert_eq!(
            result,
            Err(DistributionError::NonNumericOutcome { outcome: Outcome::Int(3) })
        );
    }

    #[test]
    fn test_combine_with_no_inputs_calls_once() {
        let mut calls = 0;
        let result = Distribution::combine(&[], |_| {
            calls += 1;
            Ok::<_, DistributionError>(Distribution::constant(7))
        })
        .unwrap();
        assert_eq!(calls, 1);
        assert_eq!(result, Distribution::constant(7));
    }

    #[test]
    fn test_add_convolves() {
        let two_d6 = Distribution::uniform(6).add(&Distribution::uniform(6)).unwrap();
        assert_eq!(two_d6.weight(&Outcome::Int(7)), 6);
        assert_eq!(two_d6.weight(&Outcome::Int(2)), 1);
        assert_eq!(two_d6.mean(), Some(7.0));
    }

    #[test]
    fn test_add_rejects_labels() {
        let err = Distribution::constant("hit").add(&Distribution::constant(1)).unwrap_err();
        assert_eq!(
            err,
            DistributionError::NonNumericOutcome { outcome: Outcome::label("hit") }
        );
    }

    #[test]
    fn test_add_reports_weight_overflow() {
        // Total weight u64::MAX: the square fits in 128 bits, the cube does not.
        let wide = Distribution::from_weights([(0i64, u64::MAX - 1), (1, 1)]);
        let square = wide.add(&wide).unwrap();
        assert_eq!(square.total(), u128::from(u64::MAX) * u128::from(u64::MAX));
        assert_eq!(square.add(&wide), Err(DistributionError::WeightOverflow));
    }

    #[test]
    fn test_add_reports_integer_overflow() {
        let max = Distribution::constant(i64::MAX);
        assert_eq!(
            max.add(&Distribution::constant(1)),
            Err(DistributionError::IntegerOverflow)
        );
        assert_eq!(
            Distribution::constant(i64::MIN).add(&Distribution::constant(-1)),
            Err(DistributionError::IntegerOverflow)
        );
    }

    #[test]
    fn test_combine_reports_weight_overflow() {
        let heavy = Distribution::from_weights([("a", u64::MAX), ("b", 1)]);
        let result = Distribution::combine(&[&heavy, &heavy, &heavy], |t| {
            Ok::<_, DistributionError>(Distribution::constant(t[0].clone()))
        });
        assert_eq!(result, Err(DistributionError::WeightOverflow));
    }

    #[test]
    fn test_mean_of_labels_is_none() {
        assert_eq!(Distribution::constant("hit").mean(), None);
        assert_eq!(Distribution::default().mean(), None);
    }

    #[test]
    fn test_display() {
        let dist = labels(&[("hit", 13), ("miss", 7)]);
        assert_eq!(dist.to_string(), "{hit: 13, miss: 7}");
    }
}
