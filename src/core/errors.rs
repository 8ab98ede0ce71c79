//! Error kinds surfaced by party-management and run-control operations.
//!
//! A failed operation leaves every piece of state untouched.

use crate::character::classes::HeroClass;
use crate::items::types::EquipmentSlot;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartyError {
    #[error("hero {0} not found")]
    HeroNotFound(String),

    #[error("skill {0} not found")]
    SkillNotFound(String),

    #[error("{class:?} cannot use {what}")]
    WrongClass { class: HeroClass, what: String },

    #[error("prerequisites not met: {0}")]
    PrerequisitesNotMet(String),

    #[error("not enough skill points (need {needed}, have {available})")]
    InsufficientSkillPoints { needed: u32, available: u32 },

    #[error("not enough gold (need {needed}, have {available})")]
    InsufficientGold { needed: u64, available: u64 },

    #[error("{0:?} slot is already occupied")]
    SlotOccupied(EquipmentSlot),

    #[error("party is full ({max} heroes)")]
    PartyFull { max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("a dungeon run is already active")]
    RunAlreadyActive,

    #[error("dungeon level {level} is locked (highest unlocked: {unlocked})")]
    LevelLocked { level: u32, unlocked: u32 },

    #[error("party has no heroes")]
    EmptyParty,

    #[error("no dungeon run is active")]
    NoActiveRun,
}
