//! Affix trigger resolution.
//!
//! Every function here is a pure scan over a hero's equipped affixes. The
//! combat resolver snapshots a hero's affixes into its combat unit when an
//! encounter starts and calls the slice-based resolvers on each trigger.

use super::catalog::EquipmentCatalog;
use super::types::{AffixDef, AffixEffect, AffixTrigger};
use crate::character::hero::Hero;
use crate::combat::types::{StatusKind, TempBuff};
use rand::Rng;
use std::collections::BTreeSet;

/// Resolves every affix id on the hero's equipped items. Unknown ids are
/// skipped.
pub fn active_affixes(hero: &Hero, catalog: &dyn EquipmentCatalog) -> Vec<AffixDef> {
    hero.equipment
        .iter_equipped()
        .flat_map(|item| item.affixes.iter())
        .filter_map(|id| catalog.affix(id))
        .cloned()
        .collect()
}

/// Affix definitions on the hero's equipment that fire at `trigger`.
pub fn affixes_by_trigger<'a>(
    hero: &Hero,
    catalog: &'a dyn EquipmentCatalog,
    trigger: AffixTrigger,
) -> Vec<&'a AffixDef> {
    hero.equipment
        .iter_equipped()
        .flat_map(|item| item.affixes.iter())
        .filter_map(|id| catalog.affix(id))
        .filter(|affix| affix.trigger == trigger)
        .collect()
}

fn with_trigger(
    affixes: &[AffixDef],
    trigger: AffixTrigger,
) -> impl Iterator<Item = &AffixEffect> {
    affixes
        .iter()
        .filter(move |a| a.trigger == trigger)
        .map(|a| &a.effect)
}

/// Accumulated passive bonuses. Multiple affixes of one kind stack additively.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PassiveAffixBonuses {
    pub crit_chance_percent: f64,
    pub max_hp_percent: f64,
    pub flat_speed: u32,
    pub debuff_duration_reduction_percent: f64,
    pub damage_taken_increase_percent: f64,
}

pub fn resolve_passive(affixes: &[AffixDef]) -> PassiveAffixBonuses {
    let mut bonuses = PassiveAffixBonuses::default();
    for effect in with_trigger(affixes, AffixTrigger::Passive) {
        match *effect {
            AffixEffect::CritChance { percent } => bonuses.crit_chance_percent += percent,
            AffixEffect::MaxHpPercent { percent } => bonuses.max_hp_percent += percent,
            AffixEffect::FlatSpeed { amount } => bonuses.flat_speed += amount,
            AffixEffect::DebuffDurationReduction { percent } => {
                bonuses.debuff_duration_reduction_percent += percent
            }
            AffixEffect::DamageTakenIncrease { percent } => {
                bonuses.damage_taken_increase_percent += percent
            }
            _ => {}
        }
    }
    bonuses
}

/// A status to attach to a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusApplication {
    pub kind: StatusKind,
    pub duration: u32,
    pub stacks: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnHitOutcome {
    pub lifesteal: u32,
    pub statuses: Vec<StatusApplication>,
    pub chain_damage: Vec<u32>,
}

/// Resolves on-hit affixes for a hit that dealt `damage`. Each proc-gated
/// affix rolls independently against its own chance.
pub fn resolve_on_hit<R: Rng>(affixes: &[AffixDef], damage: u32, rng: &mut R) -> OnHitOutcome {
    let mut outcome = OnHitOutcome::default();
    for effect in with_trigger(affixes, AffixTrigger::OnHit) {
        match *effect {
            AffixEffect::Lifesteal { fraction } => {
                outcome.lifesteal += (damage as f64 * fraction).floor() as u32;
            }
            AffixEffect::ApplyStatus {
                status,
                chance,
                duration,
                stacks,
            } => {
                if proc(chance, rng) {
                    outcome.statuses.push(StatusApplication {
                        kind: status,
                        duration,
                        stacks,
                    });
                }
            }
            AffixEffect::ChainDamage { chance, fraction } => {
                if proc(chance, rng) {
                    outcome
                        .chain_damage
                        .push(((damage as f64 * fraction).floor() as u32).max(1));
                }
            }
            _ => {}
        }
    }
    outcome
}

/// Rolls a proc. Chances at or above 1.0 always fire and at or below 0.0
/// never fire, without consuming randomness.
fn proc<R: Rng>(chance: f64, rng: &mut R) -> bool {
    if chance >= 1.0 {
        return true;
    }
    if chance <= 0.0 {
        return false;
    }
    rng.gen::<f64>() < chance
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OnCritOutcome {
    /// Added to the crit multiplier, e.g. 50% -> +0.5.
    pub crit_damage_bonus: f64,
    pub statuses: Vec<StatusApplication>,
}

/// On-crit status application is guaranteed once a crit occurs.
pub fn resolve_on_crit(affixes: &[AffixDef]) -> OnCritOutcome {
    let mut outcome = OnCritOutcome::default();
    for effect in with_trigger(affixes, AffixTrigger::OnCrit) {
        match *effect {
            AffixEffect::CritDamage { percent } => outcome.crit_damage_bonus += percent / 100.0,
            AffixEffect::ApplyStatus {
                status,
                duration,
                stacks,
                ..
            } => outcome.statuses.push(StatusApplication {
                kind: status,
                duration,
                stacks,
            }),
            _ => {}
        }
    }
    outcome
}

/// Temporary buffs granted to the killer.
pub fn resolve_on_kill(affixes: &[AffixDef]) -> Vec<TempBuff> {
    with_trigger(affixes, AffixTrigger::OnKill)
        .filter_map(|effect| match *effect {
            AffixEffect::KillBuff {
                stat,
                amount,
                duration,
            } => Some(TempBuff {
                stat,
                amount,
                duration,
            }),
            _ => None,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OnDamageTakenOutcome {
    pub reflect: u32,
    pub reduction_percent: f64,
}

/// Resolves defensive affixes for a unit taking `damage` while at
/// `hp_fraction` (before the hit). Low-HP reduction is read from both the
/// passive and the on-damage-taken sets and summed.
pub fn resolve_on_damage_taken(
    affixes: &[AffixDef],
    damage: u32,
    hp_fraction: f64,
) -> OnDamageTakenOutcome {
    let mut outcome = OnDamageTakenOutcome::default();
    for effect in with_trigger(affixes, AffixTrigger::OnDamageTaken) {
        match *effect {
            AffixEffect::Reflect { fraction } => {
                outcome.reflect += (damage as f64 * fraction).floor() as u32;
            }
            AffixEffect::DamageReduction { percent } => outcome.reduction_percent += percent,
            _ => {}
        }
    }
    for trigger in [AffixTrigger::Passive, AffixTrigger::OnDamageTaken] {
        for effect in with_trigger(affixes, trigger) {
            if let AffixEffect::LowHpDamageReduction {
                hp_threshold,
                percent,
            } = *effect
            {
                if hp_fraction <= hp_threshold {
                    outcome.reduction_percent += percent;
                }
            }
        }
    }
    outcome
}

/// Percentage of max HP regenerated at the start of the unit's turn.
pub fn resolve_turn_start(affixes: &[AffixDef]) -> f64 {
    with_trigger(affixes, AffixTrigger::OnTurnStart)
        .map(|effect| match *effect {
            AffixEffect::Regeneration { percent } => percent,
            _ => 0.0,
        })
        .sum()
}

/// Bonus damage percent against a target at or below an execute threshold.
pub fn execute_bonus(affixes: &[AffixDef], target_hp_fraction: f64) -> f64 {
    with_trigger(affixes, AffixTrigger::Passive)
        .map(|effect| match *effect {
            AffixEffect::Execute {
                hp_threshold,
                bonus_percent,
            } if target_hp_fraction <= hp_threshold => bonus_percent,
            _ => 0.0,
        })
        .sum()
}

/// Bonus damage percent scaling with the attacker's missing HP.
pub fn berserker_bonus(affixes: &[AffixDef], attacker_hp_fraction: f64) -> f64 {
    let missing = (1.0 - attacker_hp_fraction).clamp(0.0, 1.0);
    with_trigger(affixes, AffixTrigger::Passive)
        .map(|effect| match *effect {
            AffixEffect::Berserker { max_bonus_percent } => max_bonus_percent * missing,
            _ => 0.0,
        })
        .sum()
}

/// HP fraction to revive at, if the hero holds an unconsumed phoenix affix.
pub fn phoenix_revive(
    affixes: &[AffixDef],
    hero_id: &str,
    used: &BTreeSet<String>,
) -> Option<f64> {
    if used.contains(hero_id) {
        return None;
    }
    with_trigger(affixes, AffixTrigger::Passive).find_map(|effect| match *effect {
        AffixEffect::PhoenixRevive { hp_fraction } => Some(hp_fraction),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::attributes::StatKind;
    use crate::character::classes::HeroClass;
    use crate::items::catalog::StaticEquipmentCatalog;
    use crate::items::types::{AffixKind, BuffAmount};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn def(id: &str, trigger: AffixTrigger, effect: AffixEffect) -> AffixDef {
        AffixDef {
            id: id.to_string(),
            name: id.to_string(),
            kind: AffixKind::Prefix,
            trigger,
            effect,
        }
    }

    fn poison(chance: f64) -> AffixEffect {
        AffixEffect::ApplyStatus {
            status: StatusKind::Poison,
            chance,
            duration: 3,
            stacks: 1,
        }
    }

    fn trigger_ids(
        hero: &Hero,
        catalog: &dyn EquipmentCatalog,
        trigger: AffixTrigger,
    ) -> Vec<String> {
        let mut ids: Vec<String> = affixes_by_trigger(hero, catalog, trigger)
            .iter()
            .map(|a| a.id.clone())
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_affixes_by_trigger_filters_equipped_items() {
        let catalog = StaticEquipmentCatalog::new();
        let mut hero = Hero::with_id("w".into(), "w".into(), HeroClass::Warrior);
        for trigger in [AffixTrigger::OnHit, AffixTrigger::Passive] {
            assert!(affixes_by_trigger(&hero, &catalog, trigger).is_empty());
        }

        let mut sword = catalog.item_template("rusty_sword").unwrap().clone();
        sword.affixes = vec!["of_arcing".into(), "no_such_affix".into()];
        hero.equipment.set(sword.slot(), Some(sword));
        let stone = catalog.item_template("bloodstone").unwrap().clone();
        hero.equipment.set(stone.slot(), Some(stone));
        assert!(hero.equipment.armor.is_none());

        assert_eq!(
            trigger_ids(&hero, &catalog, AffixTrigger::OnHit),
            vec!["of_arcing", "vampiric"]
        );
        assert_eq!(trigger_ids(&hero, &catalog, AffixTrigger::Passive), vec!["berserk"]);
        assert!(trigger_ids(&hero, &catalog, AffixTrigger::OnTurnStart).is_empty());

        // The unknown id is skipped rather than surfacing under any trigger.
        let all: usize = [
            AffixTrigger::Passive,
            AffixTrigger::OnHit,
            AffixTrigger::OnCrit,
            AffixTrigger::OnKill,
            AffixTrigger::OnDamageTaken,
            AffixTrigger::OnTurnStart,
        ]
        .into_iter()
        .map(|t| affixes_by_trigger(&hero, &catalog, t).len())
        .sum();
        assert_eq!(all, 3);
        assert_eq!(active_affixes(&hero, &catalog).len(), 3);
    }

    #[test]
    fn test_passive_bonuses_stack_additively() {
        let affixes = vec![
            def("a", AffixTrigger::Passive, AffixEffect::CritChance { percent: 5.0 }),
            def("b", AffixTrigger::Passive, AffixEffect::CritChance { percent: 3.0 }),
            def("c", AffixTrigger::Passive, AffixEffect::FlatSpeed { amount: 2 }),
            def("d", AffixTrigger::Passive, AffixEffect::FlatSpeed { amount: 1 }),
            def("e", AffixTrigger::Passive, AffixEffect::MaxHpPercent { percent: 10.0 }),
            // Wrong trigger: ignored by the passive scan
            def("f", AffixTrigger::OnHit, AffixEffect::CritChance { percent: 50.0 }),
        ];
        let bonuses = resolve_passive(&affixes);
        assert_eq!(bonuses.crit_chance_percent, 8.0);
        assert_eq!(bonuses.flat_speed, 3);
        assert_eq!(bonuses.max_hp_percent, 10.0);
    }

    #[test]
    fn test_on_hit_proc_independence() {
        let sure = def("sure", AffixTrigger::OnHit, poison(1.0));
        let never = def(
            "never",
            AffixTrigger::OnHit,
            AffixEffect::ApplyStatus {
                status: StatusKind::Weaken,
                chance: 0.0,
                duration: 2,
                stacks: 1,
            },
        );
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for affixes in [vec![sure.clone(), never.clone()], vec![never, sure]] {
            for _ in 0..50 {
                let outcome = resolve_on_hit(&affixes, 20, &mut rng);
                assert_eq!(outcome.statuses.len(), 1);
                assert_eq!(outcome.statuses[0].kind, StatusKind::Poison);
            }
        }
    }

    #[test]
    fn test_lifesteal_floors_and_accumulates() {
        let affixes = vec![
            def("a", AffixTrigger::OnHit, AffixEffect::Lifesteal { fraction: 0.15 }),
            def("b", AffixTrigger::OnHit, AffixEffect::Lifesteal { fraction: 0.1 }),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // floor(33 * 0.15) + floor(33 * 0.1) = 4 + 3
        assert_eq!(resolve_on_hit(&affixes, 33, &mut rng).lifesteal, 7);
    }

    #[test]
    fn test_chain_damage_always_procs_at_full_chance() {
        let affixes = vec![def(
            "arc",
            AffixTrigger::OnHit,
            AffixEffect::ChainDamage {
                chance: 1.0,
                fraction: 0.5,
            },
        )];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(resolve_on_hit(&affixes, 21, &mut rng).chain_damage, vec![10]);
    }

    #[test]
    fn test_on_crit_statuses_ignore_chance() {
        let affixes = vec![
            def("brutal", AffixTrigger::OnCrit, AffixEffect::CritDamage { percent: 50.0 }),
            def("embers", AffixTrigger::OnCrit, poison(0.0)),
        ];
        let outcome = resolve_on_crit(&affixes);
        assert_eq!(outcome.crit_damage_bonus, 0.5);
        assert_eq!(outcome.statuses.len(), 1);
    }

    #[test]
    fn test_on_kill_buffs() {
        let affixes = vec![def(
            "slaughter",
            AffixTrigger::OnKill,
            AffixEffect::KillBuff {
                stat: StatKind::Attack,
                amount: BuffAmount::Flat(5),
                duration: 2,
            },
        )];
        let buffs = resolve_on_kill(&affixes);
        assert_eq!(buffs.len(), 1);
        assert_eq!(buffs[0].amount, BuffAmount::Flat(5));
    }

    #[test]
    fn test_low_hp_reduction_sums_both_trigger_sets() {
        let affixes = vec![
            def(
                "passive_stand",
                AffixTrigger::Passive,
                AffixEffect::LowHpDamageReduction {
                    hp_threshold: 0.3,
                    percent: 20.0,
                },
            ),
            def(
                "taken_stand",
                AffixTrigger::OnDamageTaken,
                AffixEffect::LowHpDamageReduction {
                    hp_threshold: 0.5,
                    percent: 10.0,
                },
            ),
            def("ward", AffixTrigger::OnDamageTaken, AffixEffect::DamageReduction { percent: 5.0 }),
            def("thorns", AffixTrigger::OnDamageTaken, AffixEffect::Reflect { fraction: 0.2 }),
        ];
        let healthy = resolve_on_damage_taken(&affixes, 50, 0.9);
        assert_eq!(healthy.reduction_percent, 5.0);
        assert_eq!(healthy.reflect, 10);

        let hurt = resolve_on_damage_taken(&affixes, 50, 0.4);
        assert_eq!(hurt.reduction_percent, 15.0);

        let critical = resolve_on_damage_taken(&affixes, 50, 0.2);
        assert_eq!(critical.reduction_percent, 35.0);
    }

    #[test]
    fn test_turn_start_regeneration() {
        let affixes = vec![
            def("r1", AffixTrigger::OnTurnStart, AffixEffect::Regeneration { percent: 4.0 }),
            def("r2", AffixTrigger::OnTurnStart, AffixEffect::Regeneration { percent: 1.5 }),
        ];
        assert_eq!(resolve_turn_start(&affixes), 5.5);
    }

    #[test]
    fn test_execute_only_below_threshold() {
        let affixes = vec![def(
            "exec",
            AffixTrigger::Passive,
            AffixEffect::Execute {
                hp_threshold: 0.25,
                bonus_percent: 50.0,
            },
        )];
        assert_eq!(execute_bonus(&affixes, 0.5), 0.0);
        assert_eq!(execute_bonus(&affixes, 0.25), 50.0);
        assert_eq!(execute_bonus(&affixes, 0.1), 50.0);
    }

    #[test]
    fn test_berserker_scales_with_missing_hp() {
        let affixes = vec![def(
            "berserk",
            AffixTrigger::Passive,
            AffixEffect::Berserker {
                max_bonus_percent: 60.0,
            },
        )];
        assert_eq!(berserker_bonus(&affixes, 1.0), 0.0);
        assert!((berserker_bonus(&affixes, 0.5) - 30.0).abs() < 1e-9);
        assert_eq!(berserker_bonus(&affixes, 0.0), 60.0);
    }

    #[test]
    fn test_phoenix_respects_used_set() {
        let affixes = vec![def(
            "phoenix",
            AffixTrigger::Passive,
            AffixEffect::PhoenixRevive { hp_fraction: 0.3 },
        )];
        let mut used = BTreeSet::new();
        assert_eq!(phoenix_revive(&affixes, "hero-1", &used), Some(0.3));
        used.insert("hero-1".to_string());
        assert_eq!(phoenix_revive(&affixes, "hero-1", &used), None);
        assert_eq!(phoenix_revive(&affixes, "hero-2", &used), Some(0.3));
    }
}
