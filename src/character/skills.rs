//! Skill definitions and the read-only skill catalog.

use super::attributes::{StatDelta, StatKind};
use super::classes::HeroClass;
use crate::combat::types::{Ability, AbilityEffect, TempBuff};
use crate::items::types::BuffAmount;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PassiveEffect {
    /// Direct additive stat bonus for the owner.
    StatBonus(StatDelta),
    /// Dodge chance, converted to speed by the stat resolver.
    DodgeChance { percent: f64 },
    ThreatBonus { amount: u32 },
    /// Aura applied to every party member, including the owner.
    PartyStatBonus(StatDelta),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkillKind {
    Active(Ability),
    Passive(PassiveEffect),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: String,
    pub name: String,
    pub class: HeroClass,
    pub required_level: u32,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    pub cost: u32,
    pub kind: SkillKind,
}

impl SkillDef {
    pub fn is_party_aura(&self) -> bool {
        matches!(
            self.kind,
            SkillKind::Passive(PassiveEffect::PartyStatBonus(_))
        )
    }

    pub fn ability(&self) -> Option<&Ability> {
        match &self.kind {
            SkillKind::Active(ability) => Some(ability),
            SkillKind::Passive(_) => None,
        }
    }

    pub fn passive(&self) -> Option<&PassiveEffect> {
        match &self.kind {
            SkillKind::Passive(effect) => Some(effect),
            SkillKind::Active(_) => None,
        }
    }
}

/// Read-only lookup of skill definitions.
pub trait SkillCatalog {
    fn skill(&self, id: &str) -> Option<&SkillDef>;

    fn skills_for_class(&self, class: HeroClass) -> Vec<&SkillDef>;
}

/// Built-in skill table.
#[derive(Debug, Clone)]
pub struct StaticSkillCatalog {
    skills: HashMap<String, SkillDef>,
    order: Vec<String>,
}

impl StaticSkillCatalog {
    pub fn new() -> Self {
        Self::from_defs(builtin_skills())
    }

    pub fn from_defs(defs: Vec<SkillDef>) -> Self {
        let order = defs.iter().map(|d| d.id.clone()).collect();
        let skills = defs.into_iter().map(|d| (d.id.clone(), d)).collect();
        Self { skills, order }
    }
}

impl Default for StaticSkillCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillCatalog for StaticSkillCatalog {
    fn skill(&self, id: &str) -> Option<&SkillDef> {
        self.skills.get(id)
    }

    fn skills_for_class(&self, class: HeroClass) -> Vec<&SkillDef> {
        self.order
            .iter()
            .filter_map(|id| self.skills.get(id))
            .filter(|s| s.class == class)
            .collect()
    }
}

fn active(
    id: &str,
    name: &str,
    class: HeroClass,
    required_level: u32,
    cooldown: u32,
    effect: AbilityEffect,
) -> SkillDef {
    SkillDef {
        id: id.to_string(),
        name: name.to_string(),
        class,
        required_level,
        prerequisites: vec![],
        cost: 1,
        kind: SkillKind::Active(Ability {
            id: id.to_string(),
            name: name.to_string(),
            cooldown,
            effect,
        }),
    }
}

fn passive(
    id: &str,
    name: &str,
    class: HeroClass,
    required_level: u32,
    effect: PassiveEffect,
) -> SkillDef {
    SkillDef {
        id: id.to_string(),
        name: name.to_string(),
        class,
        required_level,
        prerequisites: vec![],
        cost: 1,
        kind: SkillKind::Passive(effect),
    }
}

fn requires(mut def: SkillDef, prerequisites: &[&str], cost: u32) -> SkillDef {
    def.prerequisites = prerequisites.iter().map(|p| p.to_string()).collect();
    def.cost = cost;
    def
}

pub fn builtin_skills() -> Vec<SkillDef> {
    use AbilityEffect::*;
    use HeroClass::*;

    vec![
        // Warrior
        active("cleave", "Cleave", Warrior, 1, 3, AoeDamage { multiplier: 0.7 }),
        passive(
            "iron_skin",
            "Iron Skin",
            Warrior,
            2,
            PassiveEffect::StatBonus(StatDelta::new(25, 0, 3, 0)),
        ),
        passive(
            "provoke",
            "Provoke",
            Warrior,
            3,
            PassiveEffect::ThreatBonus { amount: 20 },
        ),
        requires(
            passive(
                "shield_wall",
                "Shield Wall",
                Warrior,
                5,
                PassiveEffect::PartyStatBonus(StatDelta::new(0, 0, 4, 0)),
            ),
            &["iron_skin"],
            2,
        ),
        requires(
            active("shield_bash", "Shield Bash", Warrior, 8, 4, Stun {
                multiplier: 0.8,
                duration: 1,
            }),
            &["cleave"],
            2,
        ),
        // Mage
        active("fireball", "Fireball", Mage, 1, 2, Damage { multiplier: 1.8 }),
        passive(
            "arcane_focus",
            "Arcane Focus",
            Mage,
            2,
            PassiveEffect::StatBonus(StatDelta::new(0, 5, 0, 0)),
        ),
        requires(
            active("meteor", "Meteor", Mage, 6, 4, AoeDamage { multiplier: 1.2 }),
            &["fireball"],
            2,
        ),
        requires(
            passive(
                "mana_shield",
                "Mana Shield",
                Mage,
                8,
                PassiveEffect::PartyStatBonus(StatDelta::new(15, 0, 0, 0)),
            ),
            &["arcane_focus"],
            2,
        ),
        // Cleric
        active("prayer", "Prayer", Cleric, 1, 3, HealAll { percentage: 25.0 }),
        active("mend", "Mend", Cleric, 2, 2, HealSingle { percentage: 40.0 }),
        passive(
            "blessing",
            "Blessing",
            Cleric,
            3,
            PassiveEffect::PartyStatBonus(StatDelta::new(20, 0, 0, 0)),
        ),
        requires(
            active("sanctuary", "Sanctuary", Cleric, 7, 5, HealBuff {
                percentage: 15.0,
                buff: TempBuff {
                    stat: StatKind::Defense,
                    amount: BuffAmount::Percent(30.0),
                    duration: 3,
                },
            }),
            &["prayer"],
            2,
        ),
        // Rogue
        active("backstab", "Backstab", Rogue, 1, 3, Damage { multiplier: 2.2 }),
        passive(
            "evasion",
            "Evasion",
            Rogue,
            2,
            PassiveEffect::DodgeChance { percent: 12.0 },
        ),
        requires(
            active("siphon", "Siphon Strike", Rogue, 5, 3, Drain {
                multiplier: 1.3,
                heal_percent: 50.0,
            }),
            &["backstab"],
            2,
        ),
        // Ranger
        active("volley", "Volley", Ranger, 1, 3, AoeDamage { multiplier: 0.8 }),
        active("pin_shot", "Pinning Shot", Ranger, 3, 4, Stun {
            multiplier: 1.0,
            duration: 1,
        }),
        passive(
            "hunters_mark",
            "Hunter's Mark",
            Ranger,
            4,
            PassiveEffect::PartyStatBonus(StatDelta::new(0, 2, 0, 1)),
        ),
        passive(
            "fleet_foot",
            "Fleet Foot",
            Ranger,
            2,
            PassiveEffect::DodgeChance { percent: 8.0 },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let catalog = StaticSkillCatalog::new();
        let fireball = catalog.skill("fireball").unwrap();
        assert_eq!(fireball.class, HeroClass::Mage);
        assert!(fireball.ability().is_some());
        assert!(catalog.skill("nonexistent").is_none());
    }

    #[test]
    fn test_skill_ids_unique() {
        let defs = builtin_skills();
        let catalog = StaticSkillCatalog::from_defs(defs.clone());
        assert_eq!(catalog.skills.len(), defs.len());
    }

    #[test]
    fn test_prerequisites_exist_and_share_class() {
        let catalog = StaticSkillCatalog::new();
        for def in builtin_skills() {
            for prereq in &def.prerequisites {
                let p = catalog
                    .skill(prereq)
                    .unwrap_or_else(|| panic!("{} missing prereq {}", def.id, prereq));
                assert_eq!(p.class, def.class);
            }
        }
    }

    #[test]
    fn test_party_aura_detection() {
        let catalog = StaticSkillCatalog::new();
        assert!(catalog.skill("blessing").unwrap().is_party_aura());
        assert!(!catalog.skill("iron_skin").unwrap().is_party_aura());
        assert!(!catalog.skill("prayer").unwrap().is_party_aura());
    }

    #[test]
    fn test_every_class_has_a_level_one_ability() {
        let catalog = StaticSkillCatalog::new();
        for class in HeroClass::ALL {
            assert!(
                catalog
                    .skills_for_class(class)
                    .iter()
                    .any(|s| s.required_level == 1 && s.ability().is_some()),
                "{} has no starter ability",
                class.name()
            );
        }
    }
}
