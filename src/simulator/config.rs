//! Simulation configuration.

use crate::character::classes::HeroClass;

/// Configuration for a batch of simulated campaigns.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of independent campaigns to simulate
    pub num_runs: u32,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Dungeon level the first run starts at
    pub start_level: u32,

    /// Stop auto-advancing after clearing this level
    pub target_level: Option<u32>,

    /// Tick speed multiplier (1, 2 or 3)
    pub speed: u32,

    /// Tick budget per campaign before it counts as timed out
    pub max_ticks: u64,

    /// Keep starting runs after each success or defeat
    pub auto_advance: bool,

    /// Classes of the starting party
    pub party: Vec<HeroClass>,

    /// Spend skill points and gold between runs
    pub invest: bool,

    /// Log verbosity (0 = silent, 1 = summary, 2 = per campaign)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_runs: 100,
            seed: None,
            start_level: 1,
            target_level: Some(10),
            speed: 1,
            max_ticks: 200_000,
            auto_advance: true,
            party: vec![
                HeroClass::Warrior,
                HeroClass::Cleric,
                HeroClass::Mage,
                HeroClass::Ranger,
            ],
            invest: true,
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// A handful of short campaigns for smoke testing.
    pub fn quick(seed: u64) -> Self {
        Self {
            num_runs: 5,
            seed: Some(seed),
            target_level: Some(3),
            max_ticks: 20_000,
            verbosity: 0,
            ..Default::default()
        }
    }

    /// Long campaigns that push toward the level cap.
    pub fn endurance() -> Self {
        Self {
            num_runs: 20,
            target_level: None,
            max_ticks: 2_000_000,
            ..Default::default()
        }
    }

    /// A single run without auto-advance, useful to inspect one level.
    pub fn single_level(level: u32) -> Self {
        Self {
            num_runs: 1,
            start_level: level,
            target_level: Some(level),
            auto_advance: false,
            invest: false,
            ..Default::default()
        }
    }
}
