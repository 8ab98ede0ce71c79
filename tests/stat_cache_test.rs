//! Integration test: stat cache consistency through the engine
//!
//! Every cached read must match a fresh computation after any party,
//! equipment, skill or homestead change.

use delve::character::attributes::StatBlock;
use delve::character::classes::HeroClass;
use delve::character::derived_stats::compute_stats;
use delve::character::hero::Hero;
use delve::homestead::HomesteadBuilding;
use delve::DungeonEngine;
use delve::GameState;

fn engine() -> DungeonEngine {
    let mut engine = DungeonEngine::new(GameState::new(), 11);
    engine
        .add_hero(Hero::with_id("a".into(), "Aldric".into(), HeroClass::Warrior))
        .unwrap();
    engine
        .add_hero(Hero::with_id("b".into(), "Bryn".into(), HeroClass::Rogue))
        .unwrap();
    engine
}

/// Recomputes a hero's stats without the cache.
fn fresh(engine: &DungeonEngine, hero_id: &str) -> StatBlock {
    let state = engine.state();
    let hero = state.party.get(hero_id).unwrap();
    compute_stats(
        hero,
        &state.party.heroes,
        &state.homestead.compute_bonuses(),
        engine.equipment_catalog(),
        engine.skill_catalog(),
    )
}

fn assert_consistent(engine: &mut DungeonEngine) {
    for id in ["a", "b"] {
        let cached = engine.hero_stats(id).unwrap();
        assert_eq!(cached, fresh(engine, id), "stale stats for {}", id);
    }
}

#[test]
fn test_repeated_reads_are_identical() {
    let mut engine = engine();
    let first = engine.hero_stats("a").unwrap();
    let misses = engine.cache().misses();
    let second = engine.hero_stats("a").unwrap();
    assert_eq!(first, second);
    assert_eq!(engine.cache().misses(), misses);
    assert!(engine.cache().hits() >= 1);
}

#[test]
fn test_equip_only_touches_the_wearer() {
    let mut engine = engine();
    let a_before = engine.hero_stats("a").unwrap();
    let b_before = engine.hero_stats("b").unwrap();

    engine.equip_template("a", "rusty_sword").unwrap();

    let a_after = engine.hero_stats("a").unwrap();
    assert_eq!(a_after.attack, a_before.attack + 4);
    assert_eq!(engine.hero_stats("b").unwrap(), b_before);
    assert_consistent(&mut engine);
}

#[test]
fn test_party_aura_reaches_other_heroes() {
    let mut engine = engine();
    engine.grant_experience("a", 2_000).unwrap();
    engine.learn_skill("a", "iron_skin").unwrap();
    let b_before = engine.hero_stats("b").unwrap();

    engine.learn_skill("a", "shield_wall").unwrap();

    let b_after = engine.hero_stats("b").unwrap();
    assert_eq!(b_after.defense, b_before.defense + 4);
    assert_eq!(b_after.max_hp, b_before.max_hp);
    assert_consistent(&mut engine);
}

#[test]
fn test_level_up_refreshes_stats() {
    let mut engine = engine();
    let before = engine.hero_stats("b").unwrap();
    let levels = engine.grant_experience("b", 500).unwrap();
    assert!(levels > 0);
    let after = engine.hero_stats("b").unwrap();
    assert!(after.max_hp > before.max_hp);
    assert_consistent(&mut engine);
}

#[test]
fn test_homestead_upgrade_is_reflected() {
    let mut engine = engine();
    let before = engine.hero_stats("a").unwrap();
    engine.build(HomesteadBuilding::Barracks).unwrap_err();

    let mut state = engine.into_state();
    state.gold = 1_000;
    let mut engine = DungeonEngine::new(state, 11);
    assert_eq!(engine.hero_stats("a").unwrap(), before);
    assert_eq!(engine.build(HomesteadBuilding::Barracks), Ok(1));

    let after = engine.hero_stats("a").unwrap();
    assert_eq!(after.max_hp, (before.max_hp as f64 * 1.05).floor() as u32);
    assert_consistent(&mut engine);
}

#[test]
fn test_class_change_and_retire_keep_cache_honest() {
    let mut engine = engine();
    engine.equip_template("b", "rusty_sword").unwrap();
    engine.hero_stats("a").unwrap();
    engine.hero_stats("b").unwrap();

    assert_eq!(engine.change_class("b", HeroClass::Mage), Ok(true));
    assert_consistent(&mut engine);
    assert!(!engine.state().stash.is_empty());

    engine.retire("b").unwrap();
    assert_eq!(engine.cache().entries_for("b"), 0);
    assert_eq!(engine.hero_stats("a").unwrap(), fresh(&engine, "a"));
}
