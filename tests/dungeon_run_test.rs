//! Integration test: full dungeon runs through the engine
//!
//! Drives runs tick by tick and checks the phase sequence, rewards and the
//! end-of-run finalizer.

use delve::character::classes::HeroClass;
use delve::character::hero::Hero;
use delve::character::attributes::StatBlock;
use delve::combat::types::CombatUnit;
use delve::core::events::{RewardEvent, RunLifecycleEvent, RunOutcome, TickResult};
use delve::core::game_state::GameState;
use delve::dungeon::exploration::GridExplorer;
use delve::dungeon::logic::{advance_run, completion_gold, TickContext};
use delve::dungeon::types::{
    DungeonLayout, DungeonRun, MonsterGroup, Phase, Position, Room, RunState, RunType,
};
use delve::DungeonEngine;

fn engine(seed: u64, hero_level_xp: u64) -> DungeonEngine {
    let mut engine = DungeonEngine::new(GameState::new(), seed);
    for (i, class) in [HeroClass::Warrior, HeroClass::Cleric, HeroClass::Mage, HeroClass::Ranger]
        .into_iter()
        .enumerate()
    {
        let id = format!("h{}", i + 1);
        engine
            .add_hero(Hero::with_id(id.clone(), id.clone(), class))
            .unwrap();
        engine.grant_experience(&id, hero_level_xp).unwrap();
    }
    engine
}

/// Ticks until the run finishes, returning every result.
fn drive(engine: &mut DungeonEngine, max_ticks: u64) -> Vec<TickResult> {
    let mut results = Vec::new();
    for _ in 0..max_ticks {
        let result = engine.step();
        let done = result
            .lifecycle
            .iter()
            .any(|e| matches!(e, RunLifecycleEvent::RunCompleted { .. }));
        results.push(result);
        if done {
            return results;
        }
    }
    panic!("run did not finish within {} ticks", max_ticks);
}

fn is_legal(from: Phase, to: Phase) -> bool {
    matches!(
        (from, to),
        (Phase::Setup, Phase::Exploring)
            | (Phase::Exploring, Phase::Combat)
            | (Phase::Exploring, Phase::Transitioning)
            | (Phase::Exploring, Phase::Clearing)
            | (Phase::Combat, Phase::Clearing)
            | (Phase::Combat, Phase::Defeat)
            | (Phase::Clearing, Phase::Complete)
            | (Phase::Clearing, Phase::Exploring)
            | (Phase::Transitioning, Phase::Exploring)
    )
}

#[test]
fn test_successful_run_lifecycle() {
    let mut engine = engine(42, 50_000);
    engine.start_run(1).unwrap();
    let results = drive(&mut engine, 5_000);

    let phases: Vec<(Phase, Phase)> = results.iter().flat_map(|r| r.phase_changes()).collect();
    assert_eq!(phases.first(), Some(&(Phase::Setup, Phase::Exploring)));
    assert!(phases.iter().all(|(from, to)| is_legal(*from, *to)), "{:?}", phases);
    assert_eq!(phases.last(), Some(&(Phase::Clearing, Phase::Complete)));

    // Never more than one phase step per tick.
    assert!(results.iter().all(|r| r.phase_changes().count() <= 1));

    let gold: u64 = results.iter().map(|r| r.gold_awarded()).sum();
    assert_eq!(gold, completion_gold(1, 1.0));
    let cleared: Vec<_> = results
        .iter()
        .flat_map(|r| r.rewards.iter())
        .filter(|r| matches!(r, RewardEvent::DungeonCleared { .. }))
        .collect();
    assert_eq!(cleared.len(), 1);

    let state = engine.state();
    assert_eq!(state.gold, gold);
    assert_eq!(state.highest_cleared, 1);
    assert_eq!(state.highest_unlocked, 2);
    assert_eq!(state.stats.dungeons_cleared, 1);
    assert!(state.stats.monsters_killed > 0);
    assert_eq!(state.stats.bosses_killed, 1);
    assert!(!engine.is_running());
    assert_eq!(engine.pending_auto_start(), None);
}

#[test]
fn test_defeat_counts_death_and_keeps_level_locked() {
    let mut state = GameState::new();
    state.highest_unlocked = 80;
    let mut engine = DungeonEngine::new(state, 7);
    engine
        .add_hero(Hero::with_id("h1".into(), "Lone".into(), HeroClass::Mage))
        .unwrap();
    engine.start_run(80).unwrap();
    let results = drive(&mut engine, 5_000);

    let completed = results
        .iter()
        .flat_map(|r| r.lifecycle.iter())
        .find(|e| matches!(e, RunLifecycleEvent::RunCompleted { .. }));
    assert_eq!(
        completed,
        Some(&RunLifecycleEvent::RunCompleted {
            level: 80,
            outcome: RunOutcome::Failure
        })
    );
    assert!(results
        .iter()
        .flat_map(|r| r.rewards.iter())
        .any(|r| *r == RewardEvent::PartyDefeated));
    assert_eq!(engine.state().stats.deaths, 1);
    assert_eq!(engine.state().highest_cleared, 0);
    assert_eq!(engine.state().gold, 0);
}

#[test]
fn test_experience_is_awarded_to_survivors() {
    let mut engine = engine(5, 2_000);
    let before: Vec<(u32, u64)> = engine
        .state()
        .party
        .heroes
        .iter()
        .map(|h| (h.level, h.experience))
        .collect();
    engine.start_run(1).unwrap();
    let results = drive(&mut engine, 5_000);

    let awarded: Vec<&RewardEvent> = results
        .iter()
        .flat_map(|r| r.rewards.iter())
        .filter(|r| matches!(r, RewardEvent::ExperienceAwarded { amount, .. } if *amount > 0))
        .collect();
    assert!(!awarded.is_empty());
    let after: Vec<(u32, u64)> = engine
        .state()
        .party
        .heroes
        .iter()
        .map(|h| (h.level, h.experience))
        .collect();
    assert_ne!(before, after);
}

#[test]
fn test_mid_run_changes_wait_for_the_finalizer() {
    let mut engine = engine(9, 50_000);
    engine.start_run(1).unwrap();
    for _ in 0..3 {
        assert!(engine.step().processed);
    }

    assert_eq!(engine.retire("h4").unwrap(), None);
    assert_eq!(engine.change_class("h3", HeroClass::Rogue), Ok(false));
    assert_eq!(engine.state().party.len(), 4);
    assert_eq!(engine.state().pending_changes.len(), 2);

    drive(&mut engine, 5_000);
    let party = &engine.state().party;
    assert_eq!(party.len(), 3);
    assert!(party.get("h4").is_none());
    assert_eq!(party.get("h3").map(|h| h.class), Some(HeroClass::Rogue));
    assert!(engine.state().pending_changes.is_empty());
}

#[test]
fn test_clearing_pause_then_single_gold_award() {
    let mut dead = CombatUnit::new("m1", "Rat", false, &StatBlock::new(10, 1, 0, 1));
    dead.stats.hp = 0;
    let mut run = DungeonRun::new(3, RunType::Manual);
    run.total_rooms = 1;
    let mut state = RunState::new(run, 1);
    state.layout = DungeonLayout {
        rooms: vec![Room {
            width: 3,
            height: 1,
            entrance: Position::new(0, 0),
            exit: Position::new(2, 0),
            groups: vec![MonsterGroup {
                position: Position::new(1, 0),
                monsters: vec![dead],
            }],
        }],
    };
    state.phase = Phase::Clearing;

    let party: Vec<CombatUnit> = Vec::new();
    let ctx = TickContext {
        explorer: &GridExplorer,
        party: &party,
        gold_multiplier: 1.1,
    };

    let mut gold = 0;
    for expected_tick in 1..=2 {
        let effects = advance_run(&mut state, &ctx);
        assert_eq!(state.phase, Phase::Clearing);
        assert_eq!(state.tick, expected_tick);
        assert!(effects.phase_change.is_none());
    }
    for _ in 0..6 {
        let effects = advance_run(&mut state, &ctx);
        for reward in effects.rewards {
            if let RewardEvent::GoldAwarded { amount } = reward {
                gold += amount;
            }
        }
    }
    assert_eq!(gold, (100.0_f64 * 3.0 * 1.1).floor() as u64);
    assert!(state.phase.is_terminal());
}
