//! Game state, orchestration and the tick scheduler.

pub mod constants;
pub mod engine;
pub mod errors;
pub mod events;
pub mod game_state;
pub mod scheduler;
pub mod validation;

pub use engine::{AutoStart, DungeonEngine};
pub use errors::{PartyError, RunError};
pub use events::{CombatLogEvent, LogKind, RewardEvent, RunLifecycleEvent, RunOutcome, TickResult};
pub use game_state::{DungeonSettings, GameState, GameStatistics, PermanentBonuses};
pub use scheduler::{TaskHandle, TickScheduler};
pub use validation::{validate, ValidationIssue};
