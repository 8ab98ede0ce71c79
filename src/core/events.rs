//! Events emitted by the run state machine.
//!
//! The engine never renders or persists anything itself. Each tick returns a
//! [`TickResult`] and the presentation/persistence layers react to it.

use crate::dungeon::types::Phase;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
    Attack,
    Skill,
    Heal,
    Death,
    System,
    Victory,
    Defeat,
}

/// One combat log line with the display identity of the units involved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatLogEvent {
    pub kind: LogKind,
    pub actor: Option<String>,
    pub target: Option<String>,
    pub amount: Option<u32>,
    /// Target HP after the event resolved.
    pub target_hp: Option<u32>,
    pub message: String,
}

impl CombatLogEvent {
    pub fn system(message: impl Into<String>) -> Self {
        Self {
            kind: LogKind::System,
            actor: None,
            target: None,
            amount: None,
            target_hp: None,
            message: message.into(),
        }
    }

    pub fn outcome(victory: bool, message: impl Into<String>) -> Self {
        Self {
            kind: if victory {
                LogKind::Victory
            } else {
                LogKind::Defeat
            },
            ..Self::system(message)
        }
    }

    pub fn death(name: &str) -> Self {
        Self {
            kind: LogKind::Death,
            target: Some(name.to_string()),
            ..Self::system(format!("{} falls!", name))
        }
    }

    /// Damage or healing applied by `actor` to `target`.
    pub fn hit(
        kind: LogKind,
        actor: &str,
        target: &str,
        amount: u32,
        target_hp: u32,
        message: String,
    ) -> Self {
        Self {
            kind,
            actor: Some(actor.to_string()),
            target: Some(target.to_string()),
            amount: Some(amount),
            target_hp: Some(target_hp),
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Success,
    Failure,
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunLifecycleEvent {
    RunStarted { level: u32 },
    PhaseChanged { from: Phase, to: Phase },
    RunCompleted { level: u32, outcome: RunOutcome },
    /// An automatic start of `level` is pending.
    AutoStartScheduled { level: u32, retry: bool },
    AutoStartCancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardEvent {
    GoldAwarded { amount: u64 },
    ExperienceAwarded {
        hero_id: String,
        amount: u64,
        levels_gained: u32,
    },
    DungeonCleared { level: u32 },
    MonsterKilled { is_boss: bool },
    PartyDefeated,
}

/// Everything one tick produced, in chronological order per stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickResult {
    pub sequence: u64,
    /// False when the tick was ignored (stale sequence, paused, or no run).
    pub processed: bool,
    pub logs: Vec<CombatLogEvent>,
    pub lifecycle: Vec<RunLifecycleEvent>,
    pub rewards: Vec<RewardEvent>,
}

impl TickResult {
    pub fn skipped(sequence: u64) -> Self {
        Self {
            sequence,
            ..Default::default()
        }
    }

    pub fn gold_awarded(&self) -> u64 {
        self.rewards
            .iter()
            .map(|r| match r {
                RewardEvent::GoldAwarded { amount } => *amount,
                _ => 0,
            })
            .sum()
    }

    pub fn phase_changes(&self) -> impl Iterator<Item = (Phase, Phase)> + '_ {
        self.lifecycle.iter().filter_map(|e| match e {
            RunLifecycleEvent::PhaseChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
    }
}
