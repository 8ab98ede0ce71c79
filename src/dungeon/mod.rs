//! Dungeon runs: phases, the per-tick phase machine, exploration and
//! monsters.

pub mod exploration;
pub mod logic;
pub mod monsters;
pub mod types;

pub use exploration::{ExplorationProvider, ExploreStep, GridExplorer};
pub use logic::{advance_run, TickContext, TickEffects};
pub use types::{DungeonLayout, DungeonRun, Phase, Position, RunState, RunType};
