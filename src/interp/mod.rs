//! Tree evaluation.
//!
//! Evaluates trees against a context of named stat blocks:
//! - `Interpreter`: recursive dispatch over node variants
//! - `Context` / `Attributes`: persistent name bindings
//! - `Roster`: melee and ranged target templates, fixed per interpreter
//! - `TargetResolver`: range and area of effect to concrete targets
//! - `Evaluation`: what a node evaluates to
//!
//! ## Evaluation Rules
//!
//! Literals pass through unevaluated. Rolls and d20 checks produce exact
//! distributions. `Attack` and `Save` evaluate their payloads once, then
//! roll once per target with `target` bound to that target's stat block.
//!
//! ```
//! use dndast::interp::{attributes, Context, Interpreter};
//! use dndast::node::{AttackRoll, Node};
//! use dndast::Outcome;
//!
//! let tree: Node = AttackRoll::new([19, 20], [1], 4, Node::reference("target.AC")).into();
//! let ctx = Context::new().with("target", attributes([("AC", 10)]));
//!
//! let result = Interpreter::default().evaluate(&tree, &ctx).unwrap();
//! let dist = result.as_distribution().unwrap();
//! assert_eq!(dist.weight(&Outcome::label("hit")), 13);
//! ```

mod combat;
mod context;
mod evaluation;
mod interpreter;
mod roster;
mod targeting;

pub use combat::{CRITICAL_HIT, CRITICAL_MISS, FAILURE, HIT, MISS, SUCCESS, TARGET};
pub use context::{attributes, Attributes, Context};
pub use evaluation::Evaluation;
pub use interpreter::Interpreter;
pub use roster::{Category, Roster, RosterCategory, MELEE_RANGE_FEET};
pub use targeting::{parse_feet, AreaShape, TargetResolver};
