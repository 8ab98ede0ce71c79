//! Campaign runner driving the real engine and scheduler.
//!
//! Each campaign owns a [`DungeonEngine`] and advances its virtual clock one
//! tick interval at a time, so auto-advance and auto-retry go through the
//! same delayed-task path as in the game. Statistics are read off the
//! emitted [`TickResult`](crate::core::events::TickResult)s.

use super::config::SimConfig;
use super::report::{CampaignStats, SimReport};
use crate::character::hero::Hero;
use crate::core::constants::MAX_DUNGEON_LEVEL;
use crate::core::engine::DungeonEngine;
use crate::core::events::{RunLifecycleEvent, RunOutcome};
use crate::core::game_state::{DungeonSettings, GameState};
use crate::homestead::logic::can_afford;
use crate::homestead::types::{tier_cost, HomesteadBuilding};
use crate::items::catalog::builtin_items;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

/// Run every campaign and aggregate the results.
pub fn run_simulation(config: &SimConfig) -> SimReport {
    let mut seeds = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut campaigns = Vec::with_capacity(config.num_runs as usize);
    for index in 0..config.num_runs {
        let stats = simulate_campaign(config, seeds.gen());
        if config.verbosity >= 2 {
            info!(
                campaign = index + 1,
                cleared = stats.highest_cleared,
                deaths = stats.deaths,
                ticks = stats.ticks,
                "campaign finished"
            );
        }
        campaigns.push(stats);
    }
    SimReport::from_campaigns(campaigns)
}

/// One campaign: a fresh party pushed through as many runs as the settings
/// and tick budget allow.
pub fn simulate_campaign(config: &SimConfig, seed: u64) -> CampaignStats {
    let mut state = GameState::new();
    state.highest_unlocked = config.start_level.clamp(1, MAX_DUNGEON_LEVEL);
    state.settings = DungeonSettings {
        auto_advance: config.auto_advance,
        target_level: config.target_level,
    };

    let mut engine = DungeonEngine::new(state, seed);
    for (i, class) in config.party.iter().enumerate() {
        let hero = Hero::with_id(
            format!("hero_{}", i + 1),
            format!("{} {}", class.name(), i + 1),
            *class,
        );
        if let Err(error) = engine.add_hero(hero) {
            warn!(%error, "starting hero rejected");
        }
    }
    if config.invest {
        outfit(&mut engine);
    }
    engine.set_speed(config.speed);

    let mut stats = CampaignStats {
        seed,
        ..Default::default()
    };
    if let Err(error) = engine.start_run(engine.state().highest_unlocked) {
        warn!(%error, "campaign could not start");
        return stats;
    }

    let step = engine.scheduler().interval_ms();
    while stats.ticks < config.max_ticks {
        if let Some(result) = engine.advance(step) {
            stats.ticks += 1;
            stats.gold_earned += result.gold_awarded();
            let finished = result.lifecycle.iter().any(|event| {
                matches!(event, RunLifecycleEvent::RunCompleted { .. })
            });
            stats.runs_won += result
                .lifecycle
                .iter()
                .filter(|event| {
                    matches!(
                        event,
                        RunLifecycleEvent::RunCompleted {
                            outcome: RunOutcome::Success,
                            ..
                        }
                    )
                })
                .count() as u64;
            if finished && config.invest {
                invest(&mut engine);
            }
        }
        if !engine.is_running() && engine.pending_auto_start().is_none() {
            break;
        }
    }

    let state = engine.state();
    stats.highest_cleared = state.highest_cleared;
    stats.runs_started = state.stats.runs_started;
    stats.deaths = state.stats.deaths;
    stats.monsters_killed = state.stats.monsters_killed;
    stats.bosses_killed = state.stats.bosses_killed;
    stats.avg_hero_level = if state.party.is_empty() {
        0.0
    } else {
        state.party.heroes.iter().map(|h| h.level as f64).sum::<f64>() / state.party.len() as f64
    };
    stats.reached_target = config
        .target_level
        .is_some_and(|target| state.highest_cleared >= target);
    stats.timed_out = engine.is_running() || engine.pending_auto_start().is_some();
    stats
}

/// Gives every hero the first catalog item it can use in each slot.
fn outfit(engine: &mut DungeonEngine) {
    let ids: Vec<String> = engine.state().party.heroes.iter().map(|h| h.id.clone()).collect();
    for hero_id in ids {
        for item in builtin_items() {
            // Wrong class and occupied slots are expected here.
            engine.equip_template(&hero_id, &item.id).ok();
        }
    }
}

/// Spends skill points in catalog order and buys the cheapest homestead
/// upgrades the gold allows.
fn invest(engine: &mut DungeonEngine) {
    let heroes: Vec<_> = engine
        .state()
        .party
        .heroes
        .iter()
        .map(|h| (h.id.clone(), h.class))
        .collect();
    for (hero_id, class) in heroes {
        let skills: Vec<String> = engine
            .skill_catalog()
            .skills_for_class(class)
            .iter()
            .map(|s| s.id.clone())
            .collect();
        for skill_id in skills {
            engine.learn_skill(&hero_id, &skill_id).ok();
        }
    }

    loop {
        let state = engine.state();
        let cheapest = HomesteadBuilding::ALL
            .iter()
            .copied()
            .filter(|b| can_afford(*b, &state.homestead, state.gold))
            .filter_map(|b| state.homestead.next_tier(b).map(|tier| (tier_cost(b, tier), b)))
            .min_by_key(|(cost, _)| *cost);
        match cheapest {
            Some((_, building)) if engine.build(building).is_ok() => {}
            _ => break,
        }
    }
}
