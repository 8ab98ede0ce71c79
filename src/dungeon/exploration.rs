//! Exploration collaborator: layout materialization and movement.
//!
//! The phase machine treats layouts as opaque and only asks the provider
//! where to go next and what happened after one step.

use super::monsters::generate_monster;
use super::types::{DungeonLayout, MonsterGroup, Position, Room};
use crate::core::constants::{
    MAX_GROUPS_PER_ROOM, MAX_MONSTERS_PER_GROUP, ROOM_HEIGHT, ROOM_WIDTH,
};
use rand::{Rng, RngCore};

/// Result of one exploration tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExploreStep {
    /// The party moved to a new cell.
    Moved(Position),
    /// The party stands on a living monster group.
    Encounter { group: usize },
    /// The room has no living monsters and the party reached its exit.
    RoomExit,
}

pub trait ExplorationProvider {
    /// Builds the layout for a run. Must be deterministic for a given RNG
    /// state.
    fn generate_layout(&self, level: u32, total_rooms: u32, rng: &mut dyn RngCore)
        -> DungeonLayout;

    /// Where the party should head from `current`: pure, no side effects.
    fn next_target(&self, room: &Room, current: Position, living_monsters: &[Position]) -> Position;

    /// Advances the party one step toward `target` within `room`.
    fn explore(&self, room: &Room, position: Position, target: Position) -> ExploreStep;
}

/// Default provider: rectangular rooms, entrance on the west wall, exit on
/// the east wall, monster groups scattered between them. The last room
/// holds a boss guarding the exit.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridExplorer;

impl GridExplorer {
    fn generate_room(
        &self,
        index: u32,
        level: u32,
        is_final: bool,
        rng: &mut dyn RngCore,
    ) -> Room {
        let entrance = Position::new(0, ROOM_HEIGHT / 2);
        let exit = Position::new(ROOM_WIDTH - 1, ROOM_HEIGHT / 2);
        let boss_position = Position::new(exit.x - 1, exit.y);
        let mut groups = Vec::new();
        let mut taken = vec![entrance, exit, boss_position];

        let group_count = rng.gen_range(1..=MAX_GROUPS_PER_ROOM);
        for g in 0..group_count {
            let position = loop {
                let candidate = Position::new(
                    rng.gen_range(1..ROOM_WIDTH - 1),
                    rng.gen_range(0..ROOM_HEIGHT),
                );
                if !taken.contains(&candidate) {
                    break candidate;
                }
            };
            taken.push(position);
            let size = rng.gen_range(1..=MAX_MONSTERS_PER_GROUP);
            let monsters = (0..size)
                .map(|i| generate_monster(format!("m{}_{}_{}", index, g, i), level, false, rng))
                .collect();
            groups.push(MonsterGroup { position, monsters });
        }

        if is_final {
            let boss = generate_monster(format!("m{}_boss", index), level, true, rng);
            groups.push(MonsterGroup {
                position: boss_position,
                monsters: vec![boss],
            });
        }

        Room {
            width: ROOM_WIDTH,
            height: ROOM_HEIGHT,
            entrance,
            exit,
            groups,
        }
    }
}

impl ExplorationProvider for GridExplorer {
    fn generate_layout(
        &self,
        level: u32,
        total_rooms: u32,
        rng: &mut dyn RngCore,
    ) -> DungeonLayout {
        let rooms = (0..total_rooms)
            .map(|i| self.generate_room(i, level, i + 1 == total_rooms, rng))
            .collect();
        DungeonLayout { rooms }
    }

    /// Nearest living group (ties go to the first listed), else the exit.
    fn next_target(
        &self,
        room: &Room,
        current: Position,
        living_monsters: &[Position],
    ) -> Position {
        living_monsters
            .iter()
            .copied()
            .min_by_key(|p| current.distance(*p))
            .unwrap_or(room.exit)
    }

    fn explore(&self, room: &Room, position: Position, target: Position) -> ExploreStep {
        if let Some((index, _)) = room.living_groups().find(|(_, g)| g.position == position) {
            return ExploreStep::Encounter { group: index };
        }
        if position == room.exit && room.living_groups().next().is_none() {
            return ExploreStep::RoomExit;
        }
        ExploreStep::Moved(position.step_toward(target))
    }
}
