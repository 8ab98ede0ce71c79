//! The per-run phase machine.
//!
//! [`advance_run`] is a transition function over [`RunState`]: it advances at
//! most one phase-relevant step per call and reports what happened. Applying
//! rewards to the wider game state (gold, XP, statistics) and finalizing a
//! finished run is the engine's job.

use super::exploration::{ExplorationProvider, ExploreStep};
use super::types::{Phase, Position, RunState};
use crate::combat::logic::process_turn;
use crate::combat::types::{CombatState, CombatUnit};
use crate::core::constants::{
    CLEARING_WAIT_TICKS, COMPLETION_GOLD_PER_LEVEL, RUN_END_WAIT_TICKS, TRANSITION_WAIT_TICKS,
};
use crate::core::events::{CombatLogEvent, RewardEvent, RunOutcome};
use tracing::debug;

/// Read-only inputs for one tick.
pub struct TickContext<'a> {
    pub explorer: &'a dyn ExplorationProvider,
    /// Hero units at full stats, in roster order. HP is taken from the run.
    pub party: &'a [CombatUnit],
    /// Combined homestead and permanent gold find multiplier.
    pub gold_multiplier: f64,
}

/// What one tick produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEffects {
    pub logs: Vec<CombatLogEvent>,
    pub phase_change: Option<(Phase, Phase)>,
    pub rewards: Vec<RewardEvent>,
    /// XP owed to each surviving hero after a won encounter.
    pub experience: Vec<(String, u64)>,
    /// Set once a terminal phase has finished waiting.
    pub finished: Option<RunOutcome>,
}

/// `floor(100 x level x multiplier)`
pub fn completion_gold(level: u32, gold_multiplier: f64) -> u64 {
    (COMPLETION_GOLD_PER_LEVEL * level as f64 * gold_multiplier).floor() as u64
}

fn transition(state: &mut RunState, to: Phase, effects: &mut TickEffects) {
    let from = state.phase;
    debug!(from = from.name(), to = to.name(), level = state.run.level, "phase change");
    state.phase = to;
    state.tick = 0;
    effects.phase_change = Some((from, to));
}

fn living_group_positions(state: &RunState) -> Vec<Position> {
    state
        .current_room()
        .map(|room| room.living_groups().map(|(_, g)| g.position).collect())
        .unwrap_or_default()
}

fn retarget(state: &mut RunState, ctx: &TickContext) {
    let living = living_group_positions(state);
    state.target_position = state
        .current_room()
        .map(|room| ctx.explorer.next_target(room, state.party_position, &living));
}

/// Advances the run by one tick.
pub fn advance_run(state: &mut RunState, ctx: &TickContext) -> TickEffects {
    let mut effects = TickEffects::default();
    match state.phase {
        Phase::Setup => setup(state, ctx, &mut effects),
        Phase::Exploring => explore(state, ctx, &mut effects),
        Phase::Combat => fight(state, &mut effects),
        Phase::Clearing => clear(state, ctx, &mut effects),
        Phase::Transitioning => {
            if state.tick < TRANSITION_WAIT_TICKS {
                state.tick += 1;
            } else {
                transition(state, Phase::Exploring, &mut effects);
            }
        }
        Phase::Complete | Phase::Defeat => {
            if state.tick < RUN_END_WAIT_TICKS {
                state.tick += 1;
            } else {
                effects.finished = Some(if state.phase == Phase::Complete {
                    RunOutcome::Success
                } else {
                    RunOutcome::Failure
                });
            }
        }
    }
    state.log.extend(effects.logs.iter().cloned());
    effects
}

fn setup(state: &mut RunState, ctx: &TickContext, effects: &mut TickEffects) {
    state.log.clear();
    state.layout = ctx
        .explorer
        .generate_layout(state.run.level, state.run.total_rooms, &mut state.rng);
    state.run.current_room = 0;
    state.party_position = state
        .current_room()
        .map(|room| room.entrance)
        .unwrap_or_default();
    state.target_position = None;
    for unit in ctx.party {
        if !state.hero_hp.contains_key(&unit.id) {
            state.sync_hero_hp(&unit.id, unit.stats.max_hp);
        }
    }
    effects.logs.push(CombatLogEvent::system(format!(
        "The party descends into dungeon level {} ({} rooms).",
        state.run.level, state.run.total_rooms
    )));
    transition(state, Phase::Exploring, effects);
}

fn explore(state: &mut RunState, ctx: &TickContext, effects: &mut TickEffects) {
    if state.target_position.is_none() {
        retarget(state, ctx);
    }
    let Some(room) = state.current_room() else {
        transition(state, Phase::Clearing, effects);
        return;
    };
    let target = state.target_position.unwrap_or(room.exit);

    match ctx.explorer.explore(room, state.party_position, target) {
        ExploreStep::Moved(position) => {
            state.party_position = position;
            if Some(position) == state.target_position {
                state.target_position = None;
            }
        }
        ExploreStep::Encounter { group } => start_combat(state, ctx, group, effects),
        ExploreStep::RoomExit => {
            if state.run.is_last_room() {
                transition(state, Phase::Clearing, effects);
            } else {
                state.run.current_room += 1;
                state.party_position = state
                    .current_room()
                    .map(|room| room.entrance)
                    .unwrap_or_default();
                state.target_position = None;
                effects.logs.push(CombatLogEvent::system(format!(
                    "The party moves on to room {} of {}.",
                    state.run.current_room + 1,
                    state.run.total_rooms
                )));
                transition(state, Phase::Transitioning, effects);
            }
        }
    }
}

fn start_combat(state: &mut RunState, ctx: &TickContext, group: usize, effects: &mut TickEffects) {
    let heroes: Vec<CombatUnit> = ctx
        .party
        .iter()
        .filter_map(|unit| {
            let hp = state
                .hero_hp
                .get(&unit.id)
                .copied()
                .unwrap_or(unit.stats.max_hp)
                .min(unit.stats.max_hp);
            (hp > 0).then(|| {
                let mut unit = unit.clone();
                unit.stats.hp = hp;
                unit
            })
        })
        .collect();
    let monsters: Vec<CombatUnit> = state
        .current_room()
        .and_then(|room| room.groups.get(group))
        .map(|g| g.monsters.iter().filter(|m| m.is_alive()).cloned().collect())
        .unwrap_or_default();

    let names: Vec<&str> = monsters.iter().map(|m| m.name.as_str()).collect();
    effects.logs.push(CombatLogEvent::system(format!(
        "Ambush! {} blocks the way.",
        names.join(", ")
    )));
    state.combat = Some(CombatState::new(heroes, monsters));
    state.combat_group = Some(group);
    transition(state, Phase::Combat, effects);
}

fn fight(state: &mut RunState, effects: &mut TickEffects) {
    let Some(combat) = state.combat.as_mut() else {
        transition(state, Phase::Clearing, effects);
        return;
    };

    let logs = process_turn(combat, &mut state.phoenix_used, &mut state.rng);
    state.hit_flashes = logs
        .iter()
        .filter(|l| l.amount.is_some())
        .filter_map(|l| l.target.clone())
        .collect();
    effects.logs.extend(logs);

    if !combat.is_complete {
        return;
    }
    let Some(combat) = state.combat.take() else {
        return;
    };

    for hero in &combat.heroes {
        state.sync_hero_hp(&hero.id, hero.stats.hp);
    }

    let room_index = state.run.current_room;
    let group = state.combat_group.take();
    if let Some(group) = group.and_then(|g| {
        state
            .layout
            .room_mut(room_index)
            .and_then(|room| room.groups.get_mut(g))
    }) {
        for fought in &combat.monsters {
            if let Some(monster) = group.monsters.iter_mut().find(|m| m.id == fought.id) {
                monster.stats.hp = fought.stats.hp;
            }
        }
    }

    let mut xp = 0;
    for monster in combat.monsters.iter().filter(|m| !m.is_alive()) {
        state.monsters_killed += 1;
        xp += monster.xp_reward;
        effects.rewards.push(RewardEvent::MonsterKilled {
            is_boss: monster.is_boss,
        });
    }

    if combat.victory {
        for hero in combat.heroes.iter().filter(|h| h.is_alive()) {
            effects.experience.push((hero.id.clone(), xp));
        }
        transition(state, Phase::Clearing, effects);
    } else {
        effects.rewards.push(RewardEvent::PartyDefeated);
        transition(state, Phase::Defeat, effects);
    }
}

fn clear(state: &mut RunState, ctx: &TickContext, effects: &mut TickEffects) {
    if state.tick < CLEARING_WAIT_TICKS {
        state.tick += 1;
        return;
    }

    if state.layout.living_monster_count() == 0 {
        let gold = completion_gold(state.run.level, ctx.gold_multiplier);
        effects.rewards.push(RewardEvent::GoldAwarded { amount: gold });
        effects.rewards.push(RewardEvent::DungeonCleared {
            level: state.run.level,
        });
        effects.logs.push(CombatLogEvent::system(format!(
            "Dungeon level {} cleared! +{} gold",
            state.run.level, gold
        )));
        transition(state, Phase::Complete, effects);
    } else {
        state.hit_flashes.clear();
        retarget(state, ctx);
        transition(state, Phase::Exploring, effects);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::attributes::StatBlock;
    use crate::dungeon::exploration::GridExplorer;
    use crate::dungeon::types::{DungeonLayout, DungeonRun, MonsterGroup, Room, RunType};

    fn party() -> Vec<CombatUnit> {
        vec![CombatUnit::new("h1", "Hero", true, &StatBlock::new(500, 60, 20, 20))]
    }

    fn one_room_state(monster_hp: u32) -> RunState {
        let mut monster = CombatUnit::new("m1", "Rat", false, &StatBlock::new(10, 1, 0, 1));
        monster.stats.hp = monster_hp;
        let room = Room {
            width: 3,
            height: 1,
            entrance: Position::new(0, 0),
            exit: Position::new(2, 0),
            groups: vec![MonsterGroup {
                position: Position::new(1, 0),
                monsters: vec![monster],
            }],
        };
        let mut run = DungeonRun::new(4, RunType::Manual);
        run.total_rooms = 1;
        let mut state = RunState::new(run, 11);
        state.layout = DungeonLayout { rooms: vec![room] };
        state
    }

    #[test]
    fn test_completion_gold() {
        assert_eq!(completion_gold(4, 1.0), 400);
        assert_eq!(completion_gold(3, 1.25), 375);
    }

    #[test]
    fn test_setup_materializes_layout() {
        let party = party();
        let ctx = TickContext {
            explorer: &GridExplorer,
            party: &party,
            gold_multiplier: 1.0,
        };
        let mut state = RunState::new(DungeonRun::new(1, RunType::Manual), 5);
        state.log.push(CombatLogEvent::system("stale"));
        let effects = advance_run(&mut state, &ctx);
        assert_eq!(effects.phase_change, Some((Phase::Setup, Phase::Exploring)));
        assert_eq!(state.layout.rooms.len(), 2);
        assert_eq!(state.hero_hp["h1"], 500);
        assert!(state.log.iter().all(|l| l.message != "stale"));
    }

    #[test]
    fn test_clearing_waits_then_completes_once() {
        let party = party();
        let ctx = TickContext {
            explorer: &GridExplorer,
            party: &party,
            gold_multiplier: 1.5,
        };
        let mut state = one_room_state(0);
        state.phase = Phase::Clearing;

        let first = advance_run(&mut state, &ctx);
        assert_eq!((state.phase, state.tick), (Phase::Clearing, 1));
        assert!(first.rewards.is_empty());
        let second = advance_run(&mut state, &ctx);
        assert_eq!((state.phase, state.tick), (Phase::Clearing, 2));
        assert!(second.rewards.is_empty());

        let third = advance_run(&mut state, &ctx);
        assert_eq!(state.phase, Phase::Complete);
        assert_eq!(
            third.rewards,
            vec![
                RewardEvent::GoldAwarded { amount: 600 },
                RewardEvent::DungeonCleared { level: 4 },
            ]
        );

        for _ in 0..RUN_END_WAIT_TICKS {
            let effects = advance_run(&mut state, &ctx);
            assert!(effects.rewards.is_empty());
            assert!(effects.finished.is_none());
        }
        assert_eq!(advance_run(&mut state, &ctx).finished, Some(RunOutcome::Success));
    }

    #[test]
    fn test_partial_clear_returns_to_exploring() {
        let party = party();
        let ctx = TickContext {
            explorer: &GridExplorer,
            party: &party,
            gold_multiplier: 1.0,
        };
        let mut state = one_room_state(10);
        state.phase = Phase::Clearing;
        state.hit_flashes.push("m1".into());
        for _ in 0..CLEARING_WAIT_TICKS {
            advance_run(&mut state, &ctx);
        }
        let effects = advance_run(&mut state, &ctx);
        assert_eq!(effects.phase_change, Some((Phase::Clearing, Phase::Exploring)));
        assert!(effects.rewards.is_empty());
        assert_eq!(state.target_position, Some(Position::new(1, 0)));
        assert!(state.hit_flashes.is_empty());
    }

    #[test]
    fn test_full_room_flow() {
        let party = party();
        let ctx = TickContext {
            explorer: &GridExplorer,
            party: &party,
            gold_multiplier: 1.0,
        };
        let mut state = one_room_state(10);
        state.phase = Phase::Exploring;

        let mut phases = vec![state.phase];
        let mut outcome = None;
        let mut xp = Vec::new();
        for _ in 0..50 {
            let effects = advance_run(&mut state, &ctx);
            xp.extend(effects.experience);
            if let Some((_, to)) = effects.phase_change {
                phases.push(to);
            }
            if effects.finished.is_some() {
                outcome = effects.finished;
                break;
            }
        }
        assert_eq!(outcome, Some(RunOutcome::Success));
        assert_eq!(
            phases,
            vec![Phase::Exploring, Phase::Combat, Phase::Clearing, Phase::Complete]
        );
        assert_eq!(xp, vec![("h1".to_string(), 0)]);
        assert_eq!(state.monsters_killed, 1);
        assert_eq!(state.layout.living_monster_count(), 0);
    }

    #[test]
    fn test_defeat_path() {
        let weak = vec![CombatUnit::new("h1", "Hero", true, &StatBlock::new(1, 1, 0, 1))];
        let ctx = TickContext {
            explorer: &GridExplorer,
            party: &weak,
            gold_multiplier: 1.0,
        };
        let mut state = one_room_state(10);
        state.layout.rooms[0].groups[0].monsters[0].stats =
            crate::combat::types::UnitStats::from_block(&StatBlock::new(1_000, 50, 0, 50), 1_000);
        state.phase = Phase::Exploring;

        let mut rewards = Vec::new();
        for _ in 0..20 {
            let effects = advance_run(&mut state, &ctx);
            rewards.extend(effects.rewards);
            if state.phase == Phase::Defeat {
                break;
            }
        }
        assert_eq!(state.phase, Phase::Defeat);
        assert!(rewards.contains(&RewardEvent::PartyDefeated));
        assert_eq!(state.hero_hp["h1"], 0);
        assert!(state.combat.is_none());
    }
}
