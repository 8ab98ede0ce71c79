//! Memoized stat resolution.
//!
//! Writers must call [`StatCache::invalidate`] or [`StatCache::invalidate_all`]
//! in the same operation that makes an entry stale.

use super::attributes::StatBlock;
use super::derived_stats::{compute_stats, party_max_level};
use super::hero::Hero;
use super::skills::SkillCatalog;
use crate::core::constants::STAT_CACHE_MAX_ENTRIES;
use crate::homestead::HomesteadBonuses;
use crate::items::catalog::EquipmentCatalog;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatCacheKey {
    pub hero_id: String,
    pub level: u32,
    pub equipment: [Option<String>; 3],
    pub skills: Vec<String>,
    pub homestead: [u64; 3],
    pub aura_version: u64,
    pub party_max_level: u32,
}

#[derive(Debug, Clone)]
pub struct StatCache {
    entries: HashMap<StatCacheKey, StatBlock>,
    /// hero id -> keys cached for that hero
    by_hero: HashMap<String, HashSet<StatCacheKey>>,
    aura_version: u64,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl Default for StatCache {
    fn default() -> Self {
        Self::with_capacity(STAT_CACHE_MAX_ENTRIES)
    }
}

impl StatCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            by_hero: HashMap::new(),
            aura_version: 0,
            max_entries: max_entries.max(1),
            hits: 0,
            misses: 0,
        }
    }

    pub fn key_for(
        &self,
        hero: &Hero,
        party: &[Hero],
        homestead: &HomesteadBonuses,
    ) -> StatCacheKey {
        StatCacheKey {
            hero_id: hero.id.clone(),
            level: hero.level,
            equipment: hero.equipment.identity(),
            skills: hero.skills.clone(),
            homestead: homestead.fingerprint(),
            aura_version: self.aura_version,
            party_max_level: party_max_level(hero, party),
        }
    }

    /// Returns cached stats for the hero, computing and storing them on a miss.
    pub fn get_or_compute(
        &mut self,
        hero: &Hero,
        party: &[Hero],
        homestead: &HomesteadBonuses,
        equipment: &dyn EquipmentCatalog,
        skills: &dyn SkillCatalog,
    ) -> StatBlock {
        let key = self.key_for(hero, party, homestead);
        if let Some(stats) = self.entries.get(&key) {
            self.hits += 1;
            return *stats;
        }
        self.misses += 1;

        let stats = compute_stats(hero, party, homestead, equipment, skills);
        if self.entries.len() >= self.max_entries {
            debug!(entries = self.entries.len(), "stat cache full, evicting all");
            self.entries.clear();
            self.by_hero.clear();
        }
        self.by_hero
            .entry(hero.id.clone())
            .or_default()
            .insert(key.clone());
        self.entries.insert(key, stats);
        stats
    }

    /// Drops every entry cached for one hero.
    pub fn invalidate(&mut self, hero_id: &str) {
        if let Some(keys) = self.by_hero.remove(hero_id) {
            for key in keys {
                self.entries.remove(&key);
            }
        }
    }

    /// Drops everything and bumps the party aura version.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
        self.by_hero.clear();
        self.aura_version += 1;
    }

    pub fn aura_version(&self) -> u64 {
        self.aura_version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries_for(&self, hero_id: &str) -> usize {
        self.by_hero.get(hero_id).map_or(0, |keys| keys.len())
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
