//! Turn-based combat: units, damage math, and the turn resolver.

pub mod logic;
pub mod math;
pub mod types;

pub use logic::{hero_to_unit, process_turn};
pub use types::{CombatState, CombatUnit};
