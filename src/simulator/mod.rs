//! Headless balance simulator.
//!
//! Runs seeded campaigns of auto-advancing dungeon runs through the real
//! engine on a virtual clock, so the numbers match what a player would see.

mod config;
mod report;
mod runner;

pub use config::SimConfig;
pub use report::{CampaignStats, SimReport};
pub use runner::{run_simulation, simulate_campaign};
