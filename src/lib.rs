//! Delve - idle dungeon-crawler simulation core.
//!
//! A party of heroes is sent into auto-playing dungeon runs. Each run is a
//! tick-driven phase machine with an embedded turn-based combat resolver,
//! fed by a memoized stat layer. Rendering and persistence live elsewhere:
//! the core consumes catalogs and emits [`crate::core::events`].

pub mod character;
pub mod combat;
pub mod core;
pub mod dungeon;
pub mod homestead;
pub mod items;
pub mod simulator;

pub use crate::core::engine::DungeonEngine;
pub use crate::core::game_state::GameState;
