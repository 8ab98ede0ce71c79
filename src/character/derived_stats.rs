//! Uncached hero stat resolution.
//!
//! Stages run in a fixed order and each one compounds on the previous
//! result, so reordering them changes the numbers.

use super::attributes::{StatBlock, StatKind};
use super::hero::Hero;
use super::skills::{PassiveEffect, SkillCatalog};
use crate::core::constants::DODGE_TO_SPEED_FACTOR;
use crate::homestead::HomesteadBonuses;
use crate::items::affixes::{active_affixes, resolve_passive};
use crate::items::catalog::EquipmentCatalog;

/// Highest level among the hero and the party roster.
pub fn party_max_level(hero: &Hero, party: &[Hero]) -> u32 {
    party
        .iter()
        .map(|h| h.level)
        .chain(std::iter::once(hero.level))
        .max()
        .unwrap_or(1)
}

/// Computes a hero's stat block from scratch.
///
/// 1. class base + (level - 1) x growth
/// 2. homestead HP/ATK/DEF percentages, floored after each
/// 3. equipped item stats (party-scaling items use the party's top level)
/// 4. passive affixes: max HP percent (floored), flat speed
/// 5. the hero's own passive skills
/// 6. party auras from every member, the hero included
pub fn compute_stats(
    hero: &Hero,
    party: &[Hero],
    homestead: &HomesteadBonuses,
    equipment: &dyn EquipmentCatalog,
    skills: &dyn SkillCatalog,
) -> StatBlock {
    let base = hero.class.base_stats();
    let growth = hero.class.growth();
    let levels = hero.level.saturating_sub(1);

    let mut stats = StatBlock::new(
        base.max_hp + growth.max_hp * levels,
        base.attack + growth.attack * levels,
        base.defense + growth.defense * levels,
        base.speed + growth.speed * levels,
    );

    stats.scale_percent(StatKind::MaxHp, homestead.max_hp_percent);
    stats.scale_percent(StatKind::Attack, homestead.attack_percent);
    stats.scale_percent(StatKind::Defense, homestead.defense_percent);

    let top_level = party_max_level(hero, party);
    for item in hero.equipment.iter_equipped() {
        stats.add(&item.effective_stats(top_level));
    }

    let passive = resolve_passive(&active_affixes(hero, equipment));
    if passive.max_hp_percent != 0.0 {
        stats.scale_percent(StatKind::MaxHp, passive.max_hp_percent);
    }
    stats.speed += passive.flat_speed;

    for effect in hero
        .skills
        .iter()
        .filter_map(|id| skills.skill(id))
        .filter_map(|def| def.passive())
    {
        match *effect {
            PassiveEffect::StatBonus(delta) => stats.add(&delta),
            PassiveEffect::DodgeChance { percent } => {
                stats.speed += (percent * DODGE_TO_SPEED_FACTOR).floor().max(0.0) as u32;
            }
            PassiveEffect::ThreatBonus { amount } => stats.threat += amount,
            PassiveEffect::PartyStatBonus(_) => {}
        }
    }

    let members = party
        .iter()
        .filter(|member| member.id != hero.id)
        .chain(std::iter::once(hero));
    for member in members {
        for def in member.skills.iter().filter_map(|id| skills.skill(id)) {
            if let Some(PassiveEffect::PartyStatBonus(delta)) = def.passive() {
                stats.add(delta);
            }
        }
    }

    stats.max_hp = stats.max_hp.max(1);
    stats
}
