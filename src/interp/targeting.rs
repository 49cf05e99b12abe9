//! Target resolution.
//!
//! Turns a `Targeting` node into concrete target stat blocks:
//! - `parse_feet`: `"<N> feet"` distances
//! - `AreaShape`: a validated area of effect and its ground footprint
//! - `TargetResolver`: count and copy the roster's templates

use std::f64::consts::PI;

use tracing::debug;

use crate::error::EvalError;
use crate::node::{Area, Literal, Targeting};

use super::context::Attributes;
use super::roster::{Category, Roster};

/// Parse a distance such as `"60 feet"`.
///
/// `"foot"` and `"ft"` are accepted as units too.
pub fn parse_feet(text: &str) -> Result<f64, EvalError> {
    let invalid = || EvalError::InvalidDistance {
        text: text.to_string(),
    };
    let mut words = text.split_whitespace();
    let (Some(number), Some(unit), None) = (words.next(), words.next(), words.next()) else {
        return Err(invalid());
    };
    if !matches!(unit, "feet" | "foot" | "ft") {
        return Err(invalid());
    }
    match number.parse::<f64>() {
        Ok(feet) if feet.is_finite() && feet >= 0.0 => Ok(feet),
        _ => Err(invalid()),
    }
}

/// An area of effect with its dimensions in feet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AreaShape {
    Cone { length: f64 },
    Cube { length: f64 },
    Cylinder { radius: f64 },
    Emanation { radius: f64 },
    Line { length: f64, width: f64 },
    Sphere { radius: f64 },
}

impl AreaShape {
    /// Validate a pass-through area descriptor.
    pub fn from_area(area: &Area) -> Result<Self, EvalError> {
        let shape = area.shape.as_str();
        let feet = |dimension: &str| dimension_feet(area, dimension);
        Ok(match shape {
            "cone" => AreaShape::Cone {
                length: feet("length")?,
            },
            "cube" => AreaShape::Cube {
                length: feet("length")?,
            },
            "cylinder" => AreaShape::Cylinder {
                radius: feet("radius")?,
            },
            "emanation" => AreaShape::Emanation {
                radius: feet("radius")?,
            },
            "line" => AreaShape::Line {
                length: feet("length")?,
                width: feet("width")?,
            },
            "sphere" => AreaShape::Sphere {
                radius: feet("radius")?,
            },
            _ => {
                return Err(EvalError::UnknownAreaShape {
                    shape: area.shape.clone(),
                })
            }
        })
    }

    /// Ground area covered, in square feet.
    #[must_use]
    pub fn footprint(&self) -> f64 {
        match *self {
            AreaShape::Cone { length } => 0.5 * length * length,
            AreaShape::Cube { length } => length * length,
            AreaShape::Cylinder { radius }
            | AreaShape::Emanation { radius }
            | AreaShape::Sphere { radius } => PI * radius * radius,
            AreaShape::Line { length, width } => length * width,
        }
    }
}

/// A dimension is either a distance string or a bare number of feet.
fn dimension_feet(area: &Area, dimension: &str) -> Result<f64, EvalError> {
    match area.dimension(dimension) {
        None | Some(Literal::Null) => Err(EvalError::MissingDimension {
            shape: area.shape.clone(),
            dimension: dimension.to_string(),
        }),
        Some(Literal::Text(text)) => parse_feet(text),
        Some(other) => other
            .as_f64()
            .filter(|feet| feet.is_finite() && *feet >= 0.0)
            .ok_or_else(|| EvalError::InvalidDistance {
                text: format!("{other:?}"),
            }),
    }
}

/// Resolves targeting nodes against a roster.
#[derive(Clone, Copy, Debug)]
pub struct TargetResolver<'a> {
    roster: &'a Roster,
}

impl<'a> TargetResolver<'a> {
    pub fn new(roster: &'a Roster) -> Self {
        Self { roster }
    }

    /// Category and number of targets reached.
    ///
    /// The count is the smallest of the node's own cap, the category's
    /// cap and, with an area, how many footprints fit inside it.
    pub fn count(&self, targeting: &Targeting) -> Result<(Category, u32), EvalError> {
        let category = Category::from_range(parse_feet(&targeting.range)?);
        let roster = self.roster.category(category);
        let mut count = targeting.max_targets.min(roster.max_targets);

        if let Some(area) = &targeting.area {
            let footprint = AreaShape::from_area(area)?.footprint();
            let field = category.target_area_key();
            let per_target = roster
                .target_area
                .ok_or(EvalError::MissingRosterField { field })?;
            if !(per_target.is_finite() && per_target > 0.0) {
                return Err(EvalError::InvalidRosterField {
                    field,
                    value: per_target,
                });
            }
            // Saturates at u32::MAX; the other caps bind first.
            let capacity = (footprint / per_target).floor() as u32;
            count = count.min(capacity);
        }

        if count < targeting.min_targets {
            return Err(EvalError::InsufficientTargets {
                required: targeting.min_targets,
                available: count,
            });
        }

        debug!(%category, count, range = %targeting.range, "resolved target count");
        Ok((category, count))
    }

    /// Independent copies of the category template, one per target.
    pub fn resolve(&self, targeting: &Targeting) -> Result<Vec<Attributes>, EvalError> {
        let (category, count) = self.count(targeting)?;
        let template = &self.roster.category(category).target;
        Ok(vec![template.clone(); count as usize])
    }
}
