//! Turn resolution for one combat encounter.
//!
//! [`process_turn`] advances exactly one unit-turn. All randomness comes from
//! the caller's RNG, so replaying a saved state with the same RNG state
//! reproduces the same turns.

use super::math::{
    calculate_damage, crit_chance, crit_multiplier, mitigate, roll_crit, roll_variance,
};
use super::types::{Ability, AbilityEffect, AbilityState, CombatState, CombatUnit, StatusKind};
use crate::character::attributes::{StatBlock, StatKind};
use crate::character::hero::Hero;
use crate::character::skills::SkillCatalog;
use crate::core::events::{CombatLogEvent, LogKind};
use crate::items::affixes::{
    active_affixes, berserker_bonus, execute_bonus, phoenix_revive, resolve_on_crit,
    resolve_on_damage_taken, resolve_on_hit, resolve_on_kill, resolve_passive,
    resolve_turn_start,
};
use crate::items::catalog::EquipmentCatalog;
use rand::Rng;
use std::collections::BTreeSet;

/// Projects a hero into combat with the given stats and current HP.
/// Abilities are the hero's learned active skills, in learned order.
pub fn hero_to_unit(
    hero: &Hero,
    stats: &StatBlock,
    hp: u32,
    skills: &dyn SkillCatalog,
    equipment: &dyn EquipmentCatalog,
) -> CombatUnit {
    let mut unit = CombatUnit::new(hero.id.clone(), hero.name.clone(), true, stats);
    unit.stats.hp = hp.min(stats.max_hp);
    unit.abilities = hero
        .skills
        .iter()
        .filter_map(|id| skills.skill(id))
        .filter_map(|def| def.ability())
        .cloned()
        .map(AbilityState::ready)
        .collect();
    unit.affixes = active_affixes(hero, equipment);
    unit
}

/// Advances one unit-turn of the encounter and returns the log lines it
/// produced. A completed encounter is left untouched.
pub fn process_turn<R: Rng>(
    combat: &mut CombatState,
    phoenix_used: &mut BTreeSet<String>,
    rng: &mut R,
) -> Vec<CombatLogEvent> {
    let mut logs = Vec::new();
    if combat.is_complete {
        return logs;
    }

    let Some(actor_id) = find_living_actor(combat) else {
        combat.is_complete = true;
        combat.victory = false;
        logs.push(CombatLogEvent::system("No combatant is left standing."));
        return logs;
    };
    let actor_is_hero = combat.unit(&actor_id).is_some_and(|u| u.is_hero);

    if living_ids(combat, !actor_is_hero).is_empty() {
        finish(combat, actor_is_hero, &mut logs);
        return logs;
    }

    if start_turn(combat, &actor_id, phoenix_used, &mut logs) {
        act(combat, &actor_id, phoenix_used, rng, &mut logs);
    }
    if let Some(actor) = combat.unit_mut(&actor_id) {
        actor.tick_durations();
    }

    if combat.living_monsters() == 0 {
        finish(combat, true, &mut logs);
    } else if combat.living_heroes() == 0 {
        finish(combat, false, &mut logs);
    } else {
        combat.advance_turn();
    }
    logs
}

/// Walks the turn order to the next living unit. Bounded by the unit count.
fn find_living_actor(combat: &mut CombatState) -> Option<String> {
    for _ in 0..combat.unit_count() {
        let id = combat.turn_order.get(combat.current_turn_index)?.clone();
        if combat.unit(&id).is_some_and(|u| u.is_alive()) {
            return Some(id);
        }
        combat.advance_turn();
    }
    None
}

fn finish(combat: &mut CombatState, victory: bool, logs: &mut Vec<CombatLogEvent>) {
    combat.is_complete = true;
    combat.victory = victory;
    let message = if victory {
        "Victory! The room falls silent."
    } else {
        "Defeat... the party has fallen."
    };
    logs.push(CombatLogEvent::outcome(victory, message));
}

/// Ids of living units on one side, in roster order.
fn living_ids(combat: &CombatState, heroes: bool) -> Vec<String> {
    let side = if heroes {
        &combat.heroes
    } else {
        &combat.monsters
    };
    side.iter()
        .filter(|u| u.is_alive())
        .map(|u| u.id.clone())
        .collect()
}

fn random_id<R: Rng>(ids: &[String], rng: &mut R) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    Some(ids[rng.gen_range(0..ids.len())].clone())
}

/// Debuff durations shortened by a percentage, floored, never below 1.
fn reduce_duration(duration: u32, reduction_percent: f64) -> u32 {
    if duration == 0 || reduction_percent <= 0.0 {
        return duration;
    }
    let factor = 1.0 - reduction_percent.min(100.0) / 100.0;
    ((duration as f64 * factor).floor() as u32).max(1)
}

/// Regeneration, then damage over time, then the stun check.
/// Returns whether the actor gets to act.
fn start_turn(
    combat: &mut CombatState,
    actor_id: &str,
    phoenix_used: &mut BTreeSet<String>,
    logs: &mut Vec<CombatLogEvent>,
) -> bool {
    {
        let Some(actor) = combat.unit_mut(actor_id) else {
            return false;
        };

        let regen = resolve_turn_start(&actor.affixes);
        if regen > 0.0 {
            let amount = (actor.stats.max_hp as f64 * regen / 100.0).floor() as u32;
            let restored = actor.heal(amount);
            if restored > 0 {
                logs.push(CombatLogEvent::hit(
                    LogKind::Heal,
                    &actor.name,
                    &actor.name,
                    restored,
                    actor.stats.hp,
                    format!("{} regenerates {} HP", actor.name, restored),
                ));
            }
        }

        let ticks: Vec<(StatusKind, u32)> = actor
            .statuses
            .iter()
            .map(|s| (s.kind, s.kind.damage_per_stack(actor.stats.max_hp) * s.stacks))
            .filter(|(_, damage)| *damage > 0)
            .collect();
        for (kind, damage) in ticks {
            if !actor.is_alive() {
                break;
            }
            let dealt = actor.take_damage(damage);
            logs.push(CombatLogEvent {
                kind: LogKind::Attack,
                actor: None,
                target: Some(actor.name.clone()),
                amount: Some(dealt),
                target_hp: Some(actor.stats.hp),
                message: format!("{} takes {} {} damage", actor.name, dealt, kind.name()),
            });
        }
    }

    handle_death(combat, actor_id, None, phoenix_used, logs);

    let Some(actor) = combat.unit(actor_id) else {
        return false;
    };
    if !actor.is_alive() {
        return false;
    }
    if actor.has_status(StatusKind::Stun) {
        logs.push(CombatLogEvent::system(format!("{} is stunned!", actor.name)));
        return false;
    }
    true
}

/// Marks the first ready ability as used and steps every other cooldown down
/// by one. With nothing ready, every cooldown steps down.
fn select_ability(actor: &mut CombatUnit) -> Option<Ability> {
    let chosen = actor
        .abilities
        .iter()
        .position(|a| a.cooldown_remaining == 0);
    for (i, state) in actor.abilities.iter_mut().enumerate() {
        if Some(i) == chosen {
            state.cooldown_remaining = state.ability.cooldown;
        } else {
            state.cooldown_remaining = state.cooldown_remaining.saturating_sub(1);
        }
    }
    chosen.map(|i| actor.abilities[i].ability.clone())
}

fn act<R: Rng>(
    combat: &mut CombatState,
    actor_id: &str,
    phoenix_used: &mut BTreeSet<String>,
    rng: &mut R,
    logs: &mut Vec<CombatLogEvent>,
) {
    let Some(actor) = combat.unit_mut(actor_id) else {
        return;
    };
    let is_hero = actor.is_hero;
    let ability = if is_hero {
        select_ability(actor)
    } else {
        None
    };
    let enemies = living_ids(combat, !is_hero);

    let Some(ability) = ability else {
        if let Some(target) = random_id(&enemies, rng) {
            strike(combat, actor_id, &target, 1.0, None, phoenix_used, rng, logs);
        }
        return;
    };

    let label = Some(ability.name.as_str());
    match ability.effect {
        AbilityEffect::Damage { multiplier } => {
            if let Some(target) = random_id(&enemies, rng) {
                strike(combat, actor_id, &target, multiplier, label, phoenix_used, rng, logs);
            }
        }
        AbilityEffect::AoeDamage { multiplier } => {
            for target in &enemies {
                if combat.unit(target).is_some_and(|u| u.is_alive()) {
                    strike(combat, actor_id, target, multiplier, label, phoenix_used, rng, logs);
                }
            }
        }
        AbilityEffect::HealAll { percentage } => {
            heal_allies(combat, actor_id, is_hero, percentage, &ability.name, logs);
        }
        AbilityEffect::HealSingle { percentage } => {
            let target = combat
                .heroes
                .iter()
                .chain(combat.monsters.iter())
                .filter(|u| u.is_hero == is_hero && u.is_alive())
                .min_by(|a, b| a.hp_fraction().total_cmp(&b.hp_fraction()))
                .map(|u| u.id.clone());
            if let Some(target) = target {
                heal_one(combat, actor_id, &target, percentage, &ability.name, logs);
            }
        }
        AbilityEffect::HealBuff { percentage, buff } => {
            heal_allies(combat, actor_id, is_hero, percentage, &ability.name, logs);
            for id in living_ids(combat, is_hero) {
                if let Some(ally) = combat.unit_mut(&id) {
                    ally.buffs.push(buff);
                }
            }
            logs.push(CombatLogEvent::system(format!(
                "{} empowers the party ({} for {} turns)",
                ability.name,
                buff.stat.abbrev(),
                buff.duration
            )));
        }
        AbilityEffect::Stun {
            multiplier,
            duration,
        } => {
            if let Some(target) = random_id(&enemies, rng) {
                strike(combat, actor_id, &target, multiplier, label, phoenix_used, rng, logs);
                if let Some(unit) = combat.unit_mut(&target) {
                    if unit.is_alive() {
                        let reduction =
                            resolve_passive(&unit.affixes).debuff_duration_reduction_percent;
                        let duration = reduce_duration(duration, reduction);
                        unit.apply_status(StatusKind::Stun, duration, 1);
                        logs.push(CombatLogEvent::system(format!("{} is stunned!", unit.name)));
                    }
                }
            }
        }
        AbilityEffect::Drain {
            multiplier,
            heal_percent,
        } => {
            if let Some(target) = random_id(&enemies, rng) {
                let dealt =
                    strike(combat, actor_id, &target, multiplier, label, phoenix_used, rng, logs);
                let amount = (dealt as f64 * heal_percent / 100.0).floor() as u32;
                if let Some(actor) = combat.unit_mut(actor_id) {
                    if actor.is_alive() {
                        let restored = actor.heal(amount);
                        if restored > 0 {
                            logs.push(CombatLogEvent::hit(
                                LogKind::Heal,
                                &actor.name,
                                &actor.name,
                                restored,
                                actor.stats.hp,
                                format!("{} drains {} HP", actor.name, restored),
                            ));
                        }
                    }
                }
            }
        }
    }
}

fn heal_allies(
    combat: &mut CombatState,
    actor_id: &str,
    side_is_hero: bool,
    percentage: f64,
    label: &str,
    logs: &mut Vec<CombatLogEvent>,
) {
    for id in living_ids(combat, side_is_hero) {
        heal_one(combat, actor_id, &id, percentage, label, logs);
    }
}

/// Heals a unit by a percentage of its own max HP. Only non-zero heals are
/// logged.
fn heal_one(
    combat: &mut CombatState,
    actor_id: &str,
    target_id: &str,
    percentage: f64,
    label: &str,
    logs: &mut Vec<CombatLogEvent>,
) {
    let actor_name = combat
        .unit(actor_id)
        .map(|u| u.name.clone())
        .unwrap_or_default();
    let Some(target) = combat.unit_mut(target_id) else {
        return;
    };
    let amount = (target.stats.max_hp as f64 * percentage / 100.0).floor() as u32;
    let restored = target.heal(amount);
    if restored > 0 {
        logs.push(CombatLogEvent::hit(
            LogKind::Heal,
            &actor_name,
            &target.name,
            restored,
            target.stats.hp,
            format!("{}'s {} heals {} for {}", actor_name, label, target.name, restored),
        ));
    }
}

/// One damaging hit from `attacker_id` to `target_id`, with the full affix
/// pipeline. Returns the damage actually dealt to the target.
#[allow(clippy::too_many_arguments)]
fn strike<R: Rng>(
    combat: &mut CombatState,
    attacker_id: &str,
    target_id: &str,
    multiplier: f64,
    label: Option<&str>,
    phoenix_used: &mut BTreeSet<String>,
    rng: &mut R,
    logs: &mut Vec<CombatLogEvent>,
) -> u32 {
    let (Some(attacker), Some(target)) = (combat.unit(attacker_id), combat.unit(target_id)) else {
        return 0;
    };
    let attacker_name = attacker.name.clone();
    let attacker_is_hero = attacker.is_hero;
    let affixes = attacker.affixes.clone();

    let bonus_percent = execute_bonus(&affixes, target.hp_fraction())
        + berserker_bonus(&affixes, attacker.hp_fraction());
    let attack = attacker.effective_stat(StatKind::Attack) as f64
        * multiplier
        * (1.0 + bonus_percent / 100.0);
    let defense = target.effective_stat(StatKind::Defense);
    let mut damage = calculate_damage(attack, defense, roll_variance(rng));

    let mut crit = None;
    if attacker_is_hero {
        let passive = resolve_passive(&affixes);
        if roll_crit(crit_chance(passive.crit_chance_percent), rng) {
            let on_crit = resolve_on_crit(&affixes);
            let scaled = damage as f64 * crit_multiplier(on_crit.crit_damage_bonus);
            damage = (scaled.floor() as u32).max(1);
            crit = Some(on_crit);
        }
    }

    let defender = resolve_passive(&target.affixes);
    let defended = resolve_on_damage_taken(&target.affixes, damage, target.hp_fraction());
    damage = mitigate(
        damage,
        defender.damage_taken_increase_percent,
        defended.reduction_percent,
    );

    let Some(target) = combat.unit_mut(target_id) else {
        return 0;
    };
    let dealt = target.take_damage(damage);
    let (kind, verb) = match label {
        Some(name) => (LogKind::Skill, format!("uses {} on", name)),
        None => (LogKind::Attack, "hits".to_string()),
    };
    let suffix = if crit.is_some() { " (critical!)" } else { "" };
    logs.push(CombatLogEvent::hit(
        kind,
        &attacker_name,
        &target.name,
        dealt,
        target.stats.hp,
        format!(
            "{} {} {} for {} damage{}",
            attacker_name, verb, target.name, dealt, suffix
        ),
    ));

    let on_hit = resolve_on_hit(&affixes, dealt, rng);
    if target.is_alive() {
        let statuses = on_hit
            .statuses
            .iter()
            .chain(crit.iter().flat_map(|c| c.statuses.iter()));
        for status in statuses {
            let duration =
                reduce_duration(status.duration, defender.debuff_duration_reduction_percent);
            target.apply_status(status.kind, duration, status.stacks);
            logs.push(CombatLogEvent::system(format!(
                "{} is afflicted with {}",
                target.name,
                status.kind.name()
            )));
        }
    }
    let target_name = target.name.clone();

    if let Some(attacker) = combat.unit_mut(attacker_id) {
        if defended.reflect > 0 && attacker.is_alive() {
            let reflected = attacker.take_damage(defended.reflect);
            logs.push(CombatLogEvent::hit(
                LogKind::Attack,
                &target_name,
                &attacker.name,
                reflected,
                attacker.stats.hp,
                format!("{} reflects {} damage", target_name, reflected),
            ));
        }
        if on_hit.lifesteal > 0 && attacker.is_alive() {
            let restored = attacker.heal(on_hit.lifesteal);
            if restored > 0 {
                logs.push(CombatLogEvent::hit(
                    LogKind::Heal,
                    &attacker.name,
                    &attacker.name,
                    restored,
                    attacker.stats.hp,
                    format!("{} steals {} HP", attacker.name, restored),
                ));
            }
        }
    }

    handle_death(combat, target_id, Some(attacker_id), phoenix_used, logs);
    handle_death(combat, attacker_id, Some(target_id), phoenix_used, logs);

    for amount in on_hit.chain_damage {
        let others: Vec<String> = living_ids(combat, !attacker_is_hero)
            .into_iter()
            .filter(|id| id != target_id)
            .collect();
        let Some(chained) = random_id(&others, rng) else {
            break;
        };
        if let Some(unit) = combat.unit_mut(&chained) {
            let arced = unit.take_damage(amount);
            logs.push(CombatLogEvent::hit(
                LogKind::Attack,
                &attacker_name,
                &unit.name,
                arced,
                unit.stats.hp,
                format!("Lightning arcs to {} for {} damage", unit.name, arced),
            ));
        }
        handle_death(combat, &chained, Some(attacker_id), phoenix_used, logs);
    }

    dealt
}

/// Resolves a unit at 0 HP: a one-time phoenix revive for heroes, otherwise
/// a death log and on-kill buffs for the killer. Living units are ignored.
fn handle_death(
    combat: &mut CombatState,
    victim_id: &str,
    killer_id: Option<&str>,
    phoenix_used: &mut BTreeSet<String>,
    logs: &mut Vec<CombatLogEvent>,
) {
    let Some(victim) = combat.unit_mut(victim_id) else {
        return;
    };
    if victim.is_alive() {
        return;
    }

    if victim.is_hero {
        if let Some(fraction) = phoenix_revive(&victim.affixes, &victim.id, phoenix_used) {
            phoenix_used.insert(victim.id.clone());
            let hp = ((victim.stats.max_hp as f64 * fraction).floor() as u32).max(1);
            victim.stats.hp = hp;
            victim.statuses.clear();
            logs.push(CombatLogEvent::hit(
                LogKind::Heal,
                &victim.name,
                &victim.name,
                hp,
                hp,
                format!("{} rises from the ashes!", victim.name),
            ));
            return;
        }
    }

    victim.statuses.clear();
    victim.buffs.clear();
    logs.push(CombatLogEvent::death(&victim.name));

    if let Some(killer) = killer_id.and_then(|id| combat.unit_mut(id)) {
        if killer.is_alive() {
            killer.buffs.extend(resolve_on_kill(&killer.affixes));
        }
    }
}
