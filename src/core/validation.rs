//! Best-effort data hygiene checks. Findings are reported and logged, never
//! fatal.

use super::constants::{MAX_PARTY_SIZE, SUMMON_ID_PREFIX};
use super::game_state::GameState;
use crate::dungeon::types::RunState;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    DuplicateHeroId(String),
    /// A transient summon leaked into persistent HP tracking.
    SummonInHeroHp(String),
    /// The run tracks HP for a hero that is not in the party.
    UnknownHeroHp(String),
    PartyOverCapacity { size: usize },
    UnlockBelowCleared { cleared: u32, unlocked: u32 },
    /// The run's phase and its combat sub-state disagree.
    CombatPhaseMismatch,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::DuplicateHeroId(id) => write!(f, "duplicate hero id {}", id),
            ValidationIssue::SummonInHeroHp(id) => write!(f, "summon {} tracked in hero HP", id),
            ValidationIssue::UnknownHeroHp(id) => write!(f, "HP tracked for unknown hero {}", id),
            ValidationIssue::PartyOverCapacity { size } => {
                write!(f, "party has {} heroes (max {})", size, MAX_PARTY_SIZE)
            }
            ValidationIssue::UnlockBelowCleared { cleared, unlocked } => write!(
                f,
                "highest unlocked level {} is below highest cleared {}",
                unlocked, cleared
            ),
            ValidationIssue::CombatPhaseMismatch => write!(f, "combat state does not match phase"),
        }
    }
}

pub fn validate(state: &GameState, run: Option<&RunState>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    for hero in &state.party.heroes {
        if !seen.insert(hero.id.as_str()) {
            issues.push(ValidationIssue::DuplicateHeroId(hero.id.clone()));
        }
    }
    if state.party.len() > MAX_PARTY_SIZE {
        issues.push(ValidationIssue::PartyOverCapacity {
            size: state.party.len(),
        });
    }
    if state.highest_cleared > 0 && state.highest_unlocked < state.highest_cleared {
        issues.push(ValidationIssue::UnlockBelowCleared {
            cleared: state.highest_cleared,
            unlocked: state.highest_unlocked,
        });
    }

    if let Some(run) = run {
        for id in run.hero_hp.keys() {
            if id.starts_with(SUMMON_ID_PREFIX) {
                issues.push(ValidationIssue::SummonInHeroHp(id.clone()));
            } else if !seen.contains(id.as_str()) {
                issues.push(ValidationIssue::UnknownHeroHp(id.clone()));
            }
        }
        let in_combat = run.phase == crate::dungeon::types::Phase::Combat;
        if in_combat != run.combat.is_some() {
            issues.push(ValidationIssue::CombatPhaseMismatch);
        }
    }

    for issue in &issues {
        warn!(%issue, "validation");
    }
    issues
}
