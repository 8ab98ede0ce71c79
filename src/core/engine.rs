//! Orchestration layer: owns the game state, the stat cache, the current run
//! and the scheduler, and turns phase machine effects into state changes.
//!
//! The phase machine itself is pure ([`crate::dungeon::logic::advance_run`]);
//! everything with side effects on the wider game (gold, XP, unlocks,
//! statistics, queued party changes, auto-start timers) happens here.

use super::constants::{
    AUTO_ADVANCE_DELAY_MS, MAX_DUNGEON_LEVEL, MAX_PARTY_SIZE, RECRUIT_GOLD_COST,
};
use super::errors::{PartyError, RunError};
use super::events::{RewardEvent, RunLifecycleEvent, RunOutcome, TickResult};
use super::game_state::{DungeonSettings, GameState};
use super::scheduler::{TaskHandle, TickScheduler};
use super::validation::{validate, ValidationIssue};
use crate::character::attributes::StatBlock;
use crate::character::classes::HeroClass;
use crate::character::hero::Hero;
use crate::character::party::PendingPartyChange;
use crate::character::skills::{SkillCatalog, StaticSkillCatalog};
use crate::character::stat_cache::StatCache;
use crate::combat::logic::hero_to_unit;
use crate::combat::types::CombatUnit;
use crate::dungeon::exploration::{ExplorationProvider, GridExplorer};
use crate::dungeon::logic::{advance_run, TickContext};
use crate::dungeon::types::{DungeonRun, RunState, RunType};
use crate::homestead::logic::try_build;
use crate::homestead::types::HomesteadBuilding;
use crate::items::catalog::{EquipmentCatalog, StaticEquipmentCatalog};
use crate::items::types::{EquipmentSlot, Item};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A delayed automatic start of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoStart {
    pub level: u32,
    pub retry: bool,
}

pub struct DungeonEngine {
    state: GameState,
    cache: StatCache,
    equipment: Box<dyn EquipmentCatalog>,
    skills: Box<dyn SkillCatalog>,
    explorer: Box<dyn ExplorationProvider>,
    run: Option<RunState>,
    scheduler: TickScheduler<AutoStart>,
    /// The single pending auto-start, if any. Any other handle that comes
    /// due is stale and ignored.
    auto_start: Option<TaskHandle>,
    last_sequence: u64,
    seeds: ChaCha8Rng,
    /// Lifecycle events raised outside a tick, flushed into the next result.
    outbox: Vec<RunLifecycleEvent>,
}

impl DungeonEngine {
    /// Engine with the built-in catalogs and the grid explorer.
    pub fn new(state: GameState, seed: u64) -> Self {
        Self::with_collaborators(
            state,
            seed,
            Box::new(StaticEquipmentCatalog::new()),
            Box::new(StaticSkillCatalog::new()),
            Box::new(GridExplorer),
        )
    }

    pub fn with_collaborators(
        state: GameState,
        seed: u64,
        equipment: Box<dyn EquipmentCatalog>,
        skills: Box<dyn SkillCatalog>,
        explorer: Box<dyn ExplorationProvider>,
    ) -> Self {
        Self {
            state,
            cache: StatCache::new(),
            equipment,
            skills,
            explorer,
            run: None,
            scheduler: TickScheduler::new(),
            auto_start: None,
            last_sequence: 0,
            seeds: ChaCha8Rng::seed_from_u64(seed),
            outbox: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn cache(&self) -> &StatCache {
        &self.cache
    }

    pub fn scheduler(&self) -> &TickScheduler<AutoStart> {
        &self.scheduler
    }

    pub fn equipment_catalog(&self) -> &dyn EquipmentCatalog {
        self.equipment.as_ref()
    }

    pub fn skill_catalog(&self) -> &dyn SkillCatalog {
        self.skills.as_ref()
    }

    pub fn pending_auto_start(&self) -> Option<TaskHandle> {
        self.auto_start
    }

    pub fn settings(&self) -> DungeonSettings {
        self.state.settings
    }

    pub fn set_settings(&mut self, settings: DungeonSettings) {
        self.state.settings = settings;
    }

    /// Hands the game state back, e.g. for persistence.
    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Current (cached) stats of a hero.
    pub fn hero_stats(&mut self, hero_id: &str) -> Option<StatBlock> {
        let bonuses = self.state.homestead.compute_bonuses();
        let hero = self.state.party.get(hero_id)?;
        Some(self.cache.get_or_compute(
            hero,
            &self.state.party.heroes,
            &bonuses,
            self.equipment.as_ref(),
            self.skills.as_ref(),
        ))
    }

    fn party_units(&mut self) -> Vec<CombatUnit> {
        let bonuses = self.state.homestead.compute_bonuses();
        let heroes = &self.state.party.heroes;
        heroes
            .iter()
            .map(|hero| {
                let stats = self.cache.get_or_compute(
                    hero,
                    heroes,
                    &bonuses,
                    self.equipment.as_ref(),
                    self.skills.as_ref(),
                );
                hero_to_unit(
                    hero,
                    &stats,
                    stats.max_hp,
                    self.skills.as_ref(),
                    self.equipment.as_ref(),
                )
            })
            .collect()
    }

    // ── Run control ──────────────────────────────────────────────────────

    pub fn start_run(&mut self, level: u32) -> Result<(), RunError> {
        self.begin_run(level, RunType::Manual)
    }

    fn begin_run(&mut self, level: u32, run_type: RunType) -> Result<(), RunError> {
        if self.run.is_some() {
            return Err(RunError::RunAlreadyActive);
        }
        if self.state.party.is_empty() {
            return Err(RunError::EmptyParty);
        }
        if !self.state.is_unlocked(level) {
            return Err(RunError::LevelLocked {
                level,
                unlocked: self.state.highest_unlocked,
            });
        }

        self.cancel_auto_start();
        let seed = self.seeds.gen();
        self.run = Some(RunState::new(DungeonRun::new(level, run_type), seed));
        self.state.stats.runs_started += 1;
        info!(level, ?run_type, "run started");
        self.outbox.push(RunLifecycleEvent::RunStarted { level });
        Ok(())
    }

    /// Ends the active run without rewards. Queued party changes are still
    /// applied and pending auto-starts are cancelled.
    pub fn abandon_run(&mut self) -> Result<RunLifecycleEvent, RunError> {
        let run = self.run.take().ok_or(RunError::NoActiveRun)?;
        let mut lifecycle = Vec::new();
        self.finish_run(&run, RunOutcome::Abandoned, &mut lifecycle);
        self.outbox.extend(lifecycle);
        Ok(RunLifecycleEvent::RunCompleted {
            level: run.run.level,
            outcome: RunOutcome::Abandoned,
        })
    }

    /// Resumes a run captured earlier (e.g. from a save).
    /// The restored data is checked first; issues are reported and logged
    /// but never stop the run.
    pub fn restore_run(&mut self, run: RunState) -> Result<Vec<ValidationIssue>, RunError> {
        if self.run.is_some() {
            return Err(RunError::RunAlreadyActive);
        }
        let issues = validate(&self.state, Some(&run));
        self.cancel_auto_start();
        self.run = Some(run);
        Ok(issues)
    }

    fn cancel_auto_start(&mut self) {
        if let Some(handle) = self.auto_start.take() {
            self.scheduler.cancel(handle);
            debug!(?handle, "auto-start cancelled");
            self.outbox.push(RunLifecycleEvent::AutoStartCancelled);
        }
    }

    fn schedule_auto_start(&mut self, task: AutoStart, lifecycle: &mut Vec<RunLifecycleEvent>) {
        if let Some(handle) = self.auto_start.take() {
            self.scheduler.cancel(handle);
            lifecycle.push(RunLifecycleEvent::AutoStartCancelled);
        }
        let handle = self.scheduler.schedule(AUTO_ADVANCE_DELAY_MS, task);
        debug!(?handle, level = task.level, retry = task.retry, "auto-start scheduled");
        self.auto_start = Some(handle);
        lifecycle.push(RunLifecycleEvent::AutoStartScheduled {
            level: task.level,
            retry: task.retry,
        });
    }

    /// Shared end-of-run finalizer.
    fn finish_run(
        &mut self,
        run: &RunState,
        outcome: RunOutcome,
        lifecycle: &mut Vec<RunLifecycleEvent>,
    ) {
        let level = run.run.level;
        match outcome {
            RunOutcome::Success => self.state.record_clear(level),
            RunOutcome::Failure => self.state.stats.deaths += 1,
            RunOutcome::Abandoned => {}
        }
        info!(level, ?outcome, ticks = self.last_sequence, "run finished");
        lifecycle.push(RunLifecycleEvent::RunCompleted { level, outcome });

        // Hero HP only lives in the run, so dropping it restores everyone.
        self.apply_pending_changes();

        let settings = self.state.settings;
        let next = match outcome {
            RunOutcome::Success => {
                let next = level + 1;
                let target_reached = settings.target_level.is_some_and(|t| level >= t);
                (next <= MAX_DUNGEON_LEVEL && !target_reached).then_some(AutoStart {
                    level: next,
                    retry: false,
                })
            }
            RunOutcome::Failure => Some(AutoStart { level, retry: true }),
            RunOutcome::Abandoned => None,
        };
        match next {
            Some(task) if settings.auto_advance && !self.state.party.is_empty() => {
                self.schedule_auto_start(task, lifecycle)
            }
            _ => {
                if let Some(handle) = self.auto_start.take() {
                    self.scheduler.cancel(handle);
                    lifecycle.push(RunLifecycleEvent::AutoStartCancelled);
                }
            }
        }
    }

    fn apply_pending_changes(&mut self) {
        for change in std::mem::take(&mut self.state.pending_changes) {
            let result = match &change {
                PendingPartyChange::Recruit { name, class } => self
                    .state
                    .party
                    .recruit(Hero::new(name.clone(), *class), &mut self.cache)
                    .map_err(|e| {
                        self.state.gold += RECRUIT_GOLD_COST;
                        e
                    }),
                PendingPartyChange::Join { hero } => {
                    self.state.party.recruit((**hero).clone(), &mut self.cache)
                }
                PendingPartyChange::Retire { hero_id } => {
                    self.state.party.retire(hero_id, &mut self.cache).map(|_| ())
                }
                PendingPartyChange::ChangeClass { hero_id, class } => self
                    .state
                    .party
                    .change_class(
                        hero_id,
                        *class,
                        self.skills.as_ref(),
                        self.equipment.as_ref(),
                        &mut self.cache,
                    )
                    .map(|removed| self.state.stash.extend(removed)),
            };
            if let Err(error) = result {
                warn!(?change, %error, "queued party change could not be applied");
            }
        }
    }

    // ── Ticking ──────────────────────────────────────────────────────────

    /// Runs one tick right away, outside the clock. The sequence number comes
    /// from the scheduler, so manual and clock-driven ticks never collide.
    pub fn step(&mut self) -> TickResult {
        let sequence = self.scheduler.next_sequence();
        self.process_tick(sequence)
    }

    /// Runs one tick of the active run. Sequences at or below the last one
    /// processed are ignored, so a tick can never be applied twice.
    fn process_tick(&mut self, sequence: u64) -> TickResult {
        if sequence <= self.last_sequence {
            debug!(sequence, last = self.last_sequence, "stale tick ignored");
            return TickResult::skipped(sequence);
        }
        self.last_sequence = sequence;

        let mut result = TickResult {
            sequence,
            lifecycle: std::mem::take(&mut self.outbox),
            ..Default::default()
        };
        let Some(mut run) = self.run.take() else {
            return result;
        };
        result.processed = true;

        let party = self.party_units();
        let ctx = TickContext {
            explorer: self.explorer.as_ref(),
            party: &party,
            gold_multiplier: self.state.gold_multiplier(),
        };
        let effects = advance_run(&mut run, &ctx);

        result.logs = effects.logs;
        if let Some((from, to)) = effects.phase_change {
            result.lifecycle.push(RunLifecycleEvent::PhaseChanged { from, to });
        }
        for reward in effects.rewards {
            match reward {
                RewardEvent::GoldAwarded { amount } => self.state.gold += amount,
                RewardEvent::DungeonCleared { .. } => self.state.stats.dungeons_cleared += 1,
                RewardEvent::MonsterKilled { is_boss } => {
                    self.state.stats.monsters_killed += 1;
                    if is_boss {
                        self.state.stats.bosses_killed += 1;
                    }
                }
                RewardEvent::ExperienceAwarded { .. } | RewardEvent::PartyDefeated => {}
            }
            result.rewards.push(reward);
        }
        for (hero_id, amount) in effects.experience {
            match self.state.party.grant_experience(&hero_id, amount, &mut self.cache) {
                Ok(levels_gained) => result.rewards.push(RewardEvent::ExperienceAwarded {
                    hero_id,
                    amount,
                    levels_gained,
                }),
                Err(error) => warn!(%error, "experience for unknown hero dropped"),
            }
        }

        match effects.finished {
            Some(outcome) => self.finish_run(&run, outcome, &mut result.lifecycle),
            None => self.run = Some(run),
        }
        result
    }

    /// Moves the clock forward and runs whatever came due: auto-starts
    /// first, then at most one tick.
    pub fn advance(&mut self, elapsed_ms: u64) -> Option<TickResult> {
        self.scheduler.advance(elapsed_ms);
        for (handle, task) in self.scheduler.take_due_tasks() {
            if self.auto_start != Some(handle) {
                continue;
            }
            self.auto_start = None;
            let run_type = if task.retry {
                RunType::AutoRetry
            } else {
                RunType::AutoAdvance
            };
            if let Err(error) = self.begin_run(task.level, run_type) {
                warn!(level = task.level, %error, "auto-start failed");
            }
        }

        let sequence = self.scheduler.poll_tick()?;
        let result = self.process_tick(sequence);
        self.scheduler.complete_tick(sequence);
        Some(result)
    }

    pub fn pause(&mut self) {
        self.scheduler.pause();
    }

    pub fn resume(&mut self) {
        self.scheduler.resume();
    }

    pub fn set_speed(&mut self, speed: u32) -> bool {
        self.scheduler.set_speed(speed)
    }

    // ── Party management ─────────────────────────────────────────────────

    fn require_hero(&self, hero_id: &str) -> Result<(), PartyError> {
        self.state
            .party
            .get(hero_id)
            .map(|_| ())
            .ok_or_else(|| PartyError::HeroNotFound(hero_id.to_string()))
    }

    /// Recruits a new hero for gold. Mid-run the recruit is queued and
    /// `Ok(None)` is returned; otherwise the new hero's id.
    pub fn recruit(&mut self, name: &str, class: HeroClass) -> Result<Option<String>, PartyError> {
        if self.state.party.len() + self.queued_arrivals() >= MAX_PARTY_SIZE {
            return Err(PartyError::PartyFull {
                max: MAX_PARTY_SIZE,
            });
        }
        if self.state.gold < RECRUIT_GOLD_COST {
            return Err(PartyError::InsufficientGold {
                needed: RECRUIT_GOLD_COST,
                available: self.state.gold,
            });
        }

        if self.run.is_some() {
            self.state.gold -= RECRUIT_GOLD_COST;
            self.state.pending_changes.push(PendingPartyChange::Recruit {
                name: name.to_string(),
                class,
            });
            return Ok(None);
        }
        let hero = Hero::new(name.to_string(), class);
        let id = hero.id.clone();
        self.state.party.recruit(hero, &mut self.cache)?;
        self.state.gold -= RECRUIT_GOLD_COST;
        Ok(Some(id))
    }

    /// Adds a hero at no cost (starting roster, imports). Mid-run the hero
    /// is queued and joins when the run ends; `Ok(false)` reports that.
    pub fn add_hero(&mut self, hero: Hero) -> Result<bool, PartyError> {
        if self.run.is_none() {
            self.state.party.recruit(hero, &mut self.cache)?;
            return Ok(true);
        }
        if self.state.party.len() + self.queued_arrivals() >= MAX_PARTY_SIZE {
            return Err(PartyError::PartyFull {
                max: MAX_PARTY_SIZE,
            });
        }
        self.state.pending_changes.push(PendingPartyChange::Join {
            hero: Box::new(hero),
        });
        Ok(false)
    }

    /// Heroes queued to join the roster when the current run ends.
    fn queued_arrivals(&self) -> usize {
        self.state
            .pending_changes
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    PendingPartyChange::Recruit { .. } | PendingPartyChange::Join { .. }
                )
            })
            .count()
    }

    /// Retires a hero. Mid-run the change is queued and `Ok(None)` returned.
    pub fn retire(&mut self, hero_id: &str) -> Result<Option<Hero>, PartyError> {
        self.require_hero(hero_id)?;
        if self.run.is_some() {
            self.state.pending_changes.push(PendingPartyChange::Retire {
                hero_id: hero_id.to_string(),
            });
            return Ok(None);
        }
        self.state.party.retire(hero_id, &mut self.cache).map(Some)
    }

    /// Changes a hero's class. Returns false when the change was queued.
    /// Items the new class cannot use go to the stash.
    pub fn change_class(&mut self, hero_id: &str, class: HeroClass) -> Result<bool, PartyError> {
        self.require_hero(hero_id)?;
        if self.run.is_some() {
            self.state.pending_changes.push(PendingPartyChange::ChangeClass {
                hero_id: hero_id.to_string(),
                class,
            });
            return Ok(false);
        }
        let removed = self.state.party.change_class(
            hero_id,
            class,
            self.skills.as_ref(),
            self.equipment.as_ref(),
            &mut self.cache,
        )?;
        self.state.stash.extend(removed);
        Ok(true)
    }

    pub fn equip(&mut self, hero_id: &str, item: Item) -> Result<(), PartyError> {
        self.state
            .party
            .equip(hero_id, item, self.equipment.as_ref(), &mut self.cache)
    }

    /// Equips a copy of a catalog item template.
    pub fn equip_template(&mut self, hero_id: &str, template_id: &str) -> Result<(), PartyError> {
        let item = self
            .equipment
            .item_template(template_id)
            .cloned()
            .ok_or_else(|| {
                PartyError::PrerequisitesNotMet(format!("unknown item {}", template_id))
            })?;
        self.equip(hero_id, item)
    }

    /// Moves an equipped item to the stash.
    pub fn unequip(&mut self, hero_id: &str, slot: EquipmentSlot) -> Result<(), PartyError> {
        let removed = self.state.party.unequip(hero_id, slot, &mut self.cache)?;
        self.state.stash.extend(removed);
        Ok(())
    }

    pub fn learn_skill(&mut self, hero_id: &str, skill_id: &str) -> Result<(), PartyError> {
        self.state
            .party
            .learn_skill(hero_id, skill_id, self.skills.as_ref(), &mut self.cache)
    }

    pub fn grant_experience(&mut self, hero_id: &str, xp: u64) -> Result<u32, PartyError> {
        self.state.party.grant_experience(hero_id, xp, &mut self.cache)
    }

    /// Buys the next tier of a homestead building. The stat cache key
    /// carries the homestead fingerprint, so no explicit invalidation.
    pub fn build(&mut self, building: HomesteadBuilding) -> Result<u8, PartyError> {
        let tier = try_build(building, &mut self.state.homestead, &mut self.state.gold)?;
        info!(building = building.name(), tier, "homestead upgraded");
        Ok(tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{SUMMON_ID_PREFIX, TICK_INTERVAL_MS};
    use crate::dungeon::types::Phase;

    fn engine_with_party(seed: u64) -> DungeonEngine {
        let mut engine = DungeonEngine::new(GameState::new(), seed);
        engine
            .add_hero(Hero::with_id("h1".into(), "Brom".into(), HeroClass::Warrior))
            .unwrap();
        engine
            .add_hero(Hero::with_id("h2".into(), "Ilsa".into(), HeroClass::Cleric))
            .unwrap();
        engine
    }

    #[test]
    fn test_start_run_guards() {
        let mut empty = DungeonEngine::new(GameState::new(), 1);
        assert_eq!(empty.start_run(1), Err(RunError::EmptyParty));

        let mut engine = engine_with_party(1);
        assert_eq!(
            engine.start_run(3),
            Err(RunError::LevelLocked {
                level: 3,
                unlocked: 1
            })
        );
        engine.start_run(1).unwrap();
        assert_eq!(engine.start_run(1), Err(RunError::RunAlreadyActive));
        assert_eq!(engine.run().map(|r| r.phase), Some(Phase::Setup));
    }

    #[test]
    fn test_stale_sequence_ignored() {
        let mut engine = engine_with_party(2);
        engine.start_run(1).unwrap();
        let first = engine.process_tick(1);
        assert!(first.processed);
        assert_eq!(first.lifecycle[0], RunLifecycleEvent::RunStarted { level: 1 });
        let snapshot = engine.run().cloned();

        let again = engine.process_tick(1);
        assert!(!again.processed);
        assert_eq!(engine.run().cloned(), snapshot);
    }

    #[test]
    fn test_tick_without_run_is_not_processed() {
        let mut engine = engine_with_party(3);
        assert!(!engine.process_tick(1).processed);
    }

    #[test]
    fn test_manual_and_clock_ticks_share_one_sequence() {
        let mut engine = engine_with_party(10);
        engine.start_run(1).unwrap();
        for expected in 1..=5 {
            let result = engine.step();
            assert!(result.processed);
            assert_eq!(result.sequence, expected);
        }
        engine.abandon_run().unwrap();
        engine.start_run(1).unwrap();

        let result = engine.advance(TICK_INTERVAL_MS).unwrap();
        assert!(result.processed);
        assert_eq!(result.sequence, 6);
        assert_eq!(
            result.phase_changes().collect::<Vec<_>>(),
            vec![(Phase::Setup, Phase::Exploring)]
        );

        let next = engine.step();
        assert!(next.processed);
        assert_eq!(next.sequence, 7);
        assert_ne!(engine.run().map(|r| r.phase), Some(Phase::Setup));
    }

    #[test]
    fn test_add_hero_mid_run_waits_for_the_finalizer() {
        let mut engine = engine_with_party(11);
        engine.start_run(1).unwrap();
        let newcomer = Hero::with_id("h3".into(), "Wren".into(), HeroClass::Ranger);
        assert_eq!(engine.add_hero(newcomer), Ok(false));
        assert_eq!(engine.state().party.len(), 2);
        assert_eq!(engine.state().pending_changes.len(), 1);

        // The queued hero counts against the roster cap.
        engine.state.gold = 10_000;
        engine.recruit("Ash", HeroClass::Mage).unwrap();
        assert_eq!(
            engine.recruit("Extra", HeroClass::Rogue),
            Err(PartyError::PartyFull { max: MAX_PARTY_SIZE })
        );

        engine.abandon_run().unwrap();
        assert_eq!(engine.state().party.len(), 4);
        assert!(engine.state().party.get("h3").is_some());
        assert!(engine.state().pending_changes.is_empty());
    }

    #[test]
    fn test_restore_run_reports_leaked_summon_hp() {
        let mut engine = engine_with_party(12);
        let mut run = RunState::new(DungeonRun::new(1, RunType::Manual), 5);
        let summon = format!("{}wolf", SUMMON_ID_PREFIX);
        run.hero_hp.insert(summon.clone(), 10);
        run.hero_hp.insert("h1".into(), 40);

        let issues = engine.restore_run(run).unwrap();
        assert_eq!(issues, vec![ValidationIssue::SummonInHeroHp(summon)]);
        assert!(engine.is_running());
    }

    #[test]
    fn test_queued_recruit_applies_on_abandon() {
        let mut engine = engine_with_party(4);
        engine.state.gold = 1_000;
        engine.start_run(1).unwrap();
        assert_eq!(engine.recruit("Wren", HeroClass::Ranger), Ok(None));
        assert_eq!(engine.state().party.len(), 2);
        assert_eq!(engine.state().gold, 1_000 - RECRUIT_GOLD_COST);

        engine.abandon_run().unwrap();
        assert!(!engine.is_running());
        assert_eq!(engine.state().party.len(), 3);
        assert!(engine.state().pending_changes.is_empty());
        assert_eq!(engine.abandon_run(), Err(RunError::NoActiveRun));
    }

    #[test]
    fn test_recruit_requires_gold_and_room() {
        let mut engine = engine_with_party(5);
        assert!(matches!(
            engine.recruit("Wren", HeroClass::Ranger),
            Err(PartyError::InsufficientGold { .. })
        ));
        engine.state.gold = 10_000;
        engine.recruit("Wren", HeroClass::Ranger).unwrap();
        engine.recruit("Ash", HeroClass::Mage).unwrap();
        assert_eq!(
            engine.recruit("Extra", HeroClass::Rogue),
            Err(PartyError::PartyFull { max: MAX_PARTY_SIZE })
        );
        assert_eq!(engine.state().gold, 10_000 - 2 * RECRUIT_GOLD_COST);
    }

    #[test]
    fn test_equip_changes_only_that_hero() {
        let mut engine = engine_with_party(6);
        let before_h1 = engine.hero_stats("h1").unwrap();
        let before_h2 = engine.hero_stats("h2").unwrap();
        engine.equip_template("h1", "rusty_sword").unwrap();
        let after_h1 = engine.hero_stats("h1").unwrap();
        assert_eq!(after_h1.attack, before_h1.attack + 4);
        assert_eq!(engine.hero_stats("h2").unwrap(), before_h2);
    }

    #[test]
    fn test_abandon_cancels_pending_auto_start() {
        let mut engine = engine_with_party(7);
        engine.set_settings(DungeonSettings {
            auto_advance: true,
            target_level: None,
        });
        let mut lifecycle = Vec::new();
        let run = RunState::new(DungeonRun::new(1, RunType::Manual), 1);
        engine.finish_run(&run, RunOutcome::Failure, &mut lifecycle);
        let handle = engine.pending_auto_start().unwrap();
        assert!(engine.scheduler().is_pending(handle));

        engine.start_run(1).unwrap();
        assert_eq!(engine.pending_auto_start(), None);
        assert!(!engine.scheduler().is_pending(handle));
        engine.abandon_run().unwrap();
        assert_eq!(engine.scheduler().pending_tasks(), 0);
    }

    #[test]
    fn test_advance_drives_ticks() {
        let mut engine = engine_with_party(8);
        engine.start_run(1).unwrap();
        assert!(engine.advance(TICK_INTERVAL_MS - 1).is_none());
        let result = engine.advance(1).unwrap();
        assert_eq!(result.sequence, 1);
        assert_eq!(
            result.phase_changes().collect::<Vec<_>>(),
            vec![(Phase::Setup, Phase::Exploring)]
        );
    }

    #[test]
    fn test_build_spends_gold() {
        let mut engine = engine_with_party(9);
        engine.state.gold = 500;
        let before = engine.hero_stats("h1").unwrap();
        assert_eq!(engine.build(HomesteadBuilding::Barracks), Ok(1));
        assert_eq!(engine.state().gold, 0);
        assert!(engine.hero_stats("h1").unwrap().max_hp > before.max_hp);
    }
}
