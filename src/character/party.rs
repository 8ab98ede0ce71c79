//! Party roster and party-management operations.
//!
//! Every mutating operation takes the stat cache and invalidates it before
//! returning, so callers never observe stale stats.

use super::classes::HeroClass;
use super::hero::Hero;
use super::progression::apply_experience;
use super::skills::SkillCatalog;
use super::stat_cache::StatCache;
use crate::core::constants::MAX_PARTY_SIZE;
use crate::core::errors::PartyError;
use crate::items::catalog::EquipmentCatalog;
use crate::items::types::{EquipmentSlot, Item};
use serde::{Deserialize, Serialize};

/// Roster change requested while a run was active, applied when it ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PendingPartyChange {
    Recruit { name: String, class: HeroClass },
    /// A ready-made hero joining at no cost.
    Join { hero: Box<Hero> },
    Retire { hero_id: String },
    ChangeClass { hero_id: String, class: HeroClass },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    pub heroes: Vec<Hero>,
}

impl Party {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.heroes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heroes.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.heroes.len() >= MAX_PARTY_SIZE
    }

    pub fn get(&self, hero_id: &str) -> Option<&Hero> {
        self.heroes.iter().find(|h| h.id == hero_id)
    }

    fn get_mut(&mut self, hero_id: &str) -> Result<&mut Hero, PartyError> {
        self.heroes
            .iter_mut()
            .find(|h| h.id == hero_id)
            .ok_or_else(|| PartyError::HeroNotFound(hero_id.to_string()))
    }

    /// Adds a hero to the roster. Composition changed, so every cached entry
    /// goes.
    pub fn recruit(&mut self, hero: Hero, cache: &mut StatCache) -> Result<(), PartyError> {
        if self.is_full() {
            return Err(PartyError::PartyFull {
                max: MAX_PARTY_SIZE,
            });
        }
        self.heroes.push(hero);
        cache.invalidate_all();
        Ok(())
    }

    /// Removes a hero from the roster and hands it back to the caller.
    pub fn retire(&mut self, hero_id: &str, cache: &mut StatCache) -> Result<Hero, PartyError> {
        let index = self
            .heroes
            .iter()
            .position(|h| h.id == hero_id)
            .ok_or_else(|| PartyError::HeroNotFound(hero_id.to_string()))?;
        let hero = self.heroes.remove(index);
        cache.invalidate_all();
        Ok(hero)
    }

    /// Switches a hero's class. Learned skills are cleared and their points
    /// refunded; equipment the new class cannot use is returned.
    pub fn change_class(
        &mut self,
        hero_id: &str,
        class: HeroClass,
        skills: &dyn SkillCatalog,
        equipment: &dyn EquipmentCatalog,
        cache: &mut StatCache,
    ) -> Result<Vec<Item>, PartyError> {
        let hero = self.get_mut(hero_id)?;
        if hero.class == class {
            return Ok(Vec::new());
        }

        let refund: u32 = hero
            .skills
            .iter()
            .filter_map(|id| skills.skill(id))
            .map(|def| def.cost)
            .sum();
        hero.skill_points += refund;
        hero.skills.clear();
        hero.class = class;

        let mut removed = Vec::new();
        for slot in EquipmentSlot::ALL {
            let usable = hero
                .equipment
                .get(slot)
                .as_ref()
                .map_or(true, |item| equipment.can_class_use_equipment(class, item));
            if !usable {
                removed.extend(hero.equipment.take(slot));
            }
        }

        cache.invalidate_all();
        Ok(removed)
    }

    /// Puts an item into its (empty) slot.
    pub fn equip(
        &mut self,
        hero_id: &str,
        item: Item,
        equipment: &dyn EquipmentCatalog,
        cache: &mut StatCache,
    ) -> Result<(), PartyError> {
        let hero = self.get_mut(hero_id)?;
        if !equipment.can_class_use_equipment(hero.class, &item) {
            return Err(PartyError::WrongClass {
                class: hero.class,
                what: item.name.clone(),
            });
        }
        let slot = item.slot();
        if hero.equipment.get(slot).is_some() {
            return Err(PartyError::SlotOccupied(slot));
        }
        hero.equipment.set(slot, Some(item));
        cache.invalidate(hero_id);
        Ok(())
    }

    pub fn unequip(
        &mut self,
        hero_id: &str,
        slot: EquipmentSlot,
        cache: &mut StatCache,
    ) -> Result<Option<Item>, PartyError> {
        let hero = self.get_mut(hero_id)?;
        let item = hero.equipment.take(slot);
        if item.is_some() {
            cache.invalidate(hero_id);
        }
        Ok(item)
    }

    /// Spends skill points on a skill. Learning a party aura invalidates the
    /// whole cache; anything else only the learner's entries.
    pub fn learn_skill(
        &mut self,
        hero_id: &str,
        skill_id: &str,
        skills: &dyn SkillCatalog,
        cache: &mut StatCache,
    ) -> Result<(), PartyError> {
        let def = skills
            .skill(skill_id)
            .ok_or_else(|| PartyError::SkillNotFound(skill_id.to_string()))?;
        let hero = self.get_mut(hero_id)?;

        if def.class != hero.class {
            return Err(PartyError::WrongClass {
                class: hero.class,
                what: def.name.clone(),
            });
        }
        if hero.has_skill(skill_id) {
            return Err(PartyError::PrerequisitesNotMet(format!(
                "{} already learned",
                def.name
            )));
        }
        if hero.level < def.required_level {
            return Err(PartyError::PrerequisitesNotMet(format!(
                "requires level {}",
                def.required_level
            )));
        }
        if let Some(missing) = def.prerequisites.iter().find(|p| !hero.has_skill(p)) {
            return Err(PartyError::PrerequisitesNotMet(format!("requires {}", missing)));
        }
        if hero.skill_points < def.cost {
            return Err(PartyError::InsufficientSkillPoints {
                needed: def.cost,
                available: hero.skill_points,
            });
        }

        hero.skill_points -= def.cost;
        hero.skills.push(skill_id.to_string());
        if def.is_party_aura() {
            cache.invalidate_all();
        } else {
            cache.invalidate(hero_id);
        }
        Ok(())
    }

    /// Awards XP to one hero. Returns the number of levels gained.
    pub fn grant_experience(
        &mut self,
        hero_id: &str,
        xp: u64,
        cache: &mut StatCache,
    ) -> Result<u32, PartyError> {
        let hero = self.get_mut(hero_id)?;
        let levels = apply_experience(hero, xp);
        if levels > 0 {
            cache.invalidate(hero_id);
        }
        Ok(levels)
    }
}
