//! Roster configuration.
//!
//! The roster tells targeting who is out there to be hit:
//! - `RosterCategory`: template, cap and footprint for one category
//! - `Roster`: the melee and ranged categories
//! - `Category`: which of the two a range falls into
//!
//! The serialized form is flat, one key per category field:
//!
//! ```json
//! {
//!     "melee_maxtargets": 2,
//!     "melee_target": {"armor_class": 16},
//!     "melee_targetarea": 25,
//!     "ranged_maxtargets": 4,
//!     "ranged_target": {"armor_class": 13},
//!     "ranged_targetarea": 100
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::context::{attributes, Attributes};

/// Ranges shorter than this many feet are melee.
pub const MELEE_RANGE_FEET: f64 = 10.0;

/// Range category of a targeting node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Melee,
    Ranged,
}

impl Category {
    /// Classify a range in feet.
    #[must_use]
    pub fn from_range(feet: f64) -> Self {
        if feet < MELEE_RANGE_FEET {
            Category::Melee
        } else {
            Category::Ranged
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Melee => "melee",
            Category::Ranged => "ranged",
        }
    }

    /// Serialized key of this category's footprint.
    #[must_use]
    pub const fn target_area_key(self) -> &'static str {
        match self {
            Category::Melee => "melee_targetarea",
            Category::Ranged => "ranged_targetarea",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Targets available in one range category.
#[derive(Clone, Debug, PartialEq)]
pub struct RosterCategory {
    /// Most targets this category can supply.
    pub max_targets: u32,
    /// Stat block copied once per selected target.
    pub target: Attributes,
    /// Ground area one target occupies, in square feet.
    ///
    /// Needed only when an area of effect is aimed at this category.
    pub target_area: Option<f64>,
}

impl RosterCategory {
    pub fn new(max_targets: u32, target: Attributes) -> Self {
        Self {
            max_targets,
            target,
            target_area: None,
        }
    }

    /// Set the per-target footprint (builder pattern).
    #[must_use]
    pub fn with_target_area(mut self, square_feet: f64) -> Self {
        self.target_area = Some(square_feet);
        self
    }
}

/// Target templates and counts for an interpreter.
///
/// Fixed for the lifetime of the interpreter it is handed to.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RosterConfig", into = "RosterConfig")]
pub struct Roster {
    pub melee: RosterCategory,
    pub ranged: RosterCategory,
}

impl Roster {
    pub fn new(melee: RosterCategory, ranged: RosterCategory) -> Self {
        Self { melee, ranged }
    }

    /// Load from the flat JSON layout.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Write the flat JSON layout.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// The category a range falls into.
    #[must_use]
    pub fn category(&self, category: Category) -> &RosterCategory {
        match category {
            Category::Melee => &self.melee,
            Category::Ranged => &self.ranged,
        }
    }

    /// Replace the melee category (builder pattern).
    #[must_use]
    pub fn with_melee(mut self, melee: RosterCategory) -> Self {
        self.melee = melee;
        self
    }

    /// Replace the ranged category (builder pattern).
    #[must_use]
    pub fn with_ranged(mut self, ranged: RosterCategory) -> Self {
        self.ranged = ranged;
        self
    }
}

impl Default for Roster {
    /// A front line of two armored melee combatants and a back line of
    /// four lightly armored ranged ones.
    fn default() -> Self {
        let melee = attributes([
            ("armor_class", 16),
            ("strength_save_bonus", 3),
            ("dexterity_save_bonus", 1),
            ("constitution_save_bonus", 3),
            ("intelligence_save_bonus", -1),
            ("wisdom_save_bonus", 0),
            ("charisma_save_bonus", -1),
        ]);
        let ranged = attributes([
            ("armor_class", 13),
            ("strength_save_bonus", 0),
            ("dexterity_save_bonus", 3),
            ("constitution_save_bonus", 1),
            ("intelligence_save_bonus", 0),
            ("wisdom_save_bonus", 1),
            ("charisma_save_bonus", 0),
        ]);
        Self {
            melee: RosterCategory::new(2, melee).with_target_area(25.0),
            ranged: RosterCategory::new(4, ranged).with_target_area(100.0),
        }
    }
}

/// Flat serialized layout of a roster.
#[derive(Serialize, Deserialize)]
struct RosterConfig {
    melee_maxtargets: u32,
    melee_target: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    melee_targetarea: Option<f64>,
    ranged_maxtargets: u32,
    ranged_target: Attributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ranged_targetarea: Option<f64>,
}

impl From<RosterConfig> for Roster {
    fn from(config: RosterConfig) -> Self {
        Self {
            melee: RosterCategory {
                max_targets: config.melee_maxtargets,
                target: config.melee_target,
                target_area: config.melee_targetarea,
            },
            ranged: RosterCategory {
                max_targets: config.ranged_maxtargets,
                target: config.ranged_target,
                target_area: config.ranged_targetarea,
            },
        }
    }
}

impl From<Roster> for RosterConfig {
    fn from(roster: Roster) -> Self {
        Self {
            melee_maxtargets: roster.melee.max_targets,
            melee_target: roster.melee.target,
            melee_targetarea: roster.melee.target_area,
            ranged_maxtargets: roster.ranged.max_targets,
            ranged_target: roster.ranged.target,
            ranged_targetarea: roster.ranged.target_area,
        }
    }
}
