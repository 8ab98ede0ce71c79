//! Dungeon run data structures.

use crate::combat::types::{CombatState, CombatUnit};
use crate::core::constants::{
    BASE_ROOMS_PER_RUN, MAX_ROOMS_PER_RUN, ROOMS_PER_TEN_LEVELS, SUMMON_ID_PREFIX,
};
use crate::core::events::CombatLogEvent;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Phase of a dungeon run. `Setup` is the only entry; `Complete` and
/// `Defeat` are the only exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Exploring,
    Combat,
    Clearing,
    Transitioning,
    Complete,
    Defeat,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Setup => "SETUP",
            Phase::Exploring => "EXPLORING",
            Phase::Combat => "COMBAT",
            Phase::Clearing => "CLEARING",
            Phase::Transitioning => "TRANSITIONING",
            Phase::Complete => "COMPLETE",
            Phase::Defeat => "DEFEAT",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Complete | Phase::Defeat)
    }
}

/// How a run was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunType {
    Manual,
    AutoAdvance,
    AutoRetry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonRun {
    pub level: u32,
    pub total_rooms: u32,
    pub current_room: u32,
    pub run_type: RunType,
}

impl DungeonRun {
    pub fn new(level: u32, run_type: RunType) -> Self {
        Self {
            level,
            total_rooms: rooms_for_level(level),
            current_room: 0,
            run_type,
        }
    }

    pub fn is_last_room(&self) -> bool {
        self.current_room + 1 >= self.total_rooms
    }
}

/// Room count grows by one every ten levels, up to a cap.
pub fn rooms_for_level(level: u32) -> u32 {
    (BASE_ROOMS_PER_RUN + (level / 10) * ROOMS_PER_TEN_LEVELS).min(MAX_ROOMS_PER_RUN)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// One orthogonal step toward `target`, horizontal first.
    pub fn step_toward(&self, target: Position) -> Position {
        if self.x != target.x {
            Position::new(self.x + (target.x - self.x).signum(), self.y)
        } else if self.y != target.y {
            Position::new(self.x, self.y + (target.y - self.y).signum())
        } else {
            *self
        }
    }
}

/// Monsters standing together on one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterGroup {
    pub position: Position,
    pub monsters: Vec<CombatUnit>,
}

impl MonsterGroup {
    pub fn is_alive(&self) -> bool {
        self.monsters.iter().any(|m| m.is_alive())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub width: i32,
    pub height: i32,
    pub entrance: Position,
    pub exit: Position,
    pub groups: Vec<MonsterGroup>,
}

impl Room {
    pub fn living_groups(&self) -> impl Iterator<Item = (usize, &MonsterGroup)> {
        self.groups.iter().enumerate().filter(|(_, g)| g.is_alive())
    }

    pub fn living_monster_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.monsters.iter())
            .filter(|m| m.is_alive())
            .count()
    }
}

/// Opaque layout produced by the exploration provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    pub rooms: Vec<Room>,
}

impl DungeonLayout {
    pub fn room(&self, index: u32) -> Option<&Room> {
        self.rooms.get(index as usize)
    }

    pub fn room_mut(&mut self, index: u32) -> Option<&mut Room> {
        self.rooms.get_mut(index as usize)
    }

    /// Living monsters across every room of the layout.
    pub fn living_monster_count(&self) -> usize {
        self.rooms.iter().map(|r| r.living_monster_count()).sum()
    }
}

/// The live state of one run: the phase machine's entire input and output.
///
/// Serializing and restoring a `RunState` (RNG included) replays the same
/// subsequent ticks as an uninterrupted run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub run: DungeonRun,
    pub phase: Phase,
    /// Ticks spent in the current phase.
    pub tick: u32,
    pub layout: DungeonLayout,
    pub party_position: Position,
    pub target_position: Option<Position>,
    pub combat: Option<CombatState>,
    /// Index of the monster group fought by `combat` in the current room.
    pub combat_group: Option<usize>,
    /// Persistent hero HP across the encounters of this run.
    pub hero_hp: BTreeMap<String, u32>,
    /// Heroes whose phoenix revive has been consumed this run.
    pub phoenix_used: BTreeSet<String>,
    pub log: Vec<CombatLogEvent>,
    /// Units hit during the last combat tick, for hit-flash rendering.
    pub hit_flashes: Vec<String>,
    pub monsters_killed: u32,
    pub rng: ChaCha8Rng,
}

impl RunState {
    pub fn new(run: DungeonRun, seed: u64) -> Self {
        Self {
            run,
            phase: Phase::Setup,
            tick: 0,
            layout: DungeonLayout::default(),
            party_position: Position::default(),
            target_position: None,
            combat: None,
            combat_group: None,
            hero_hp: BTreeMap::new(),
            phoenix_used: BTreeSet::new(),
            log: Vec::new(),
            hit_flashes: Vec::new(),
            monsters_killed: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.layout.room(self.run.current_room)
    }

    /// Records a hero's HP. Transient summons are never tracked.
    pub fn sync_hero_hp(&mut self, hero_id: &str, hp: u32) {
        if hero_id.starts_with(SUMMON_ID_PREFIX) {
            return;
        }
        self.hero_hp.insert(hero_id.to_string(), hp);
    }
}
