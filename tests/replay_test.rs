//! Integration test: save and resume mid-run
//!
//! A run serialized at any tick and restored into a fresh engine must
//! produce exactly the ticks the uninterrupted run produces.

use delve::character::classes::HeroClass;
use delve::character::hero::Hero;
use delve::core::events::TickResult;
use delve::dungeon::types::RunState;
use delve::{DungeonEngine, GameState};

fn engine(seed: u64) -> DungeonEngine {
    let mut engine = DungeonEngine::new(GameState::new(), seed);
    for (i, class) in [HeroClass::Warrior, HeroClass::Mage, HeroClass::Rogue]
        .into_iter()
        .enumerate()
    {
        let id = format!("h{}", i + 1);
        engine
            .add_hero(Hero::with_id(id.clone(), id.clone(), class))
            .unwrap();
        engine.grant_experience(&id, 8_000).unwrap();
    }
    engine
}

/// Ticks to the end of the run. Sequence numbers belong to each engine's
/// own scheduler, so they are cleared before comparing.
fn run_out(engine: &mut DungeonEngine) -> Vec<TickResult> {
    let mut results = Vec::new();
    for _ in 0..5_000 {
        if !engine.is_running() {
            break;
        }
        results.push(TickResult {
            sequence: 0,
            ..engine.step()
        });
    }
    results
}

fn replay_from(split_at: u64, seed: u64) {
    let mut uninterrupted = engine(seed);
    uninterrupted.start_run(1).unwrap();
    for _ in 0..split_at {
        uninterrupted.step();
    }
    assert!(uninterrupted.is_running(), "run ended before tick {}", split_at);

    let saved_run = serde_json::to_string(uninterrupted.run().unwrap()).unwrap();
    let saved_state = uninterrupted.state().to_json().unwrap();

    let run: RunState = serde_json::from_str(&saved_run).unwrap();
    let state = GameState::from_json(&saved_state).unwrap();
    let mut restored = DungeonEngine::new(state, seed.wrapping_add(1));
    assert!(restored.restore_run(run).unwrap().is_empty());

    let expected = run_out(&mut uninterrupted);
    let actual = run_out(&mut restored);
    assert!(!expected.is_empty());
    assert_eq!(actual, expected);
    assert_eq!(restored.state().gold, uninterrupted.state().gold);
    assert_eq!(restored.state().party, uninterrupted.state().party);
}

#[test]
fn test_replay_during_exploration() {
    replay_from(2, 100);
}

#[test]
fn test_replay_mid_run() {
    replay_from(8, 200);
}

#[test]
fn test_restore_refused_while_running() {
    let mut engine = engine(3);
    engine.start_run(1).unwrap();
    engine.step();
    let snapshot = engine.run().unwrap().clone();
    assert!(engine.restore_run(snapshot).is_err());
}
