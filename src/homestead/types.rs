//! Homestead data structures and building definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Buildings that feed bonuses into hero stats and run rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HomesteadBuilding {
    Barracks,
    Armory,
    Bulwark,
    CountingHouse,
}

impl HomesteadBuilding {
    pub const ALL: [HomesteadBuilding; 4] = [
        HomesteadBuilding::Barracks,
        HomesteadBuilding::Armory,
        HomesteadBuilding::Bulwark,
        HomesteadBuilding::CountingHouse,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HomesteadBuilding::Barracks => "Barracks",
            HomesteadBuilding::Armory => "Armory",
            HomesteadBuilding::Bulwark => "Bulwark",
            HomesteadBuilding::CountingHouse => "Counting House",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            HomesteadBuilding::Barracks => "Cots, rations and a drill sergeant who never sleeps.",
            HomesteadBuilding::Armory => "Racks of sharpened steel, oiled and ready.",
            HomesteadBuilding::Bulwark => "A practice wall your heroes learned to hide behind.",
            HomesteadBuilding::CountingHouse => "Ledgers, scales, and a nose for loose coin.",
        }
    }

    pub fn max_tier(&self) -> u8 {
        3
    }

    pub fn bonus_type(&self) -> HomesteadBonusType {
        match self {
            HomesteadBuilding::Barracks => HomesteadBonusType::MaxHpPercent,
            HomesteadBuilding::Armory => HomesteadBonusType::AttackPercent,
            HomesteadBuilding::Bulwark => HomesteadBonusType::DefensePercent,
            HomesteadBuilding::CountingHouse => HomesteadBonusType::GoldFindPercent,
        }
    }

    /// Bonus value at T1, T2, T3.
    fn values(&self) -> [f64; 3] {
        match self {
            HomesteadBuilding::Barracks => [5.0, 10.0, 20.0],
            HomesteadBuilding::Armory => [5.0, 10.0, 20.0],
            HomesteadBuilding::Bulwark => [5.0, 10.0, 15.0],
            HomesteadBuilding::CountingHouse => [10.0, 25.0, 50.0],
        }
    }

    /// Get the bonus value for a specific tier (0 = unbuilt)
    pub fn bonus_value(&self, tier: u8) -> f64 {
        if tier == 0 || tier > self.max_tier() {
            return 0.0;
        }
        self.values()[(tier - 1) as usize]
    }

    pub fn format_bonus(&self, tier: u8) -> String {
        if tier == 0 {
            return String::new();
        }
        let value = self.bonus_value(tier);
        match self.bonus_type() {
            HomesteadBonusType::MaxHpPercent => format!("+{:.0}% HP", value),
            HomesteadBonusType::AttackPercent => format!("+{:.0}% ATK", value),
            HomesteadBonusType::DefensePercent => format!("+{:.0}% DEF", value),
            HomesteadBonusType::GoldFindPercent => format!("+{:.0}% Gold", value),
        }
    }
}

/// Gold cost of building a given tier.
pub fn tier_cost(building: HomesteadBuilding, tier: u8) -> u64 {
    let base = match building {
        HomesteadBuilding::CountingHouse => 400,
        _ => 500,
    };
    match tier {
        1 => base,
        2 => base * 4,
        3 => base * 12,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomesteadBonusType {
    MaxHpPercent,
    AttackPercent,
    DefensePercent,
    GoldFindPercent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Homestead {
    pub buildings: HashMap<HomesteadBuilding, u8>,
}

impl Default for Homestead {
    fn default() -> Self {
        let mut buildings = HashMap::new();
        for building in HomesteadBuilding::ALL {
            buildings.insert(building, 0);
        }
        Homestead { buildings }
    }
}

impl Homestead {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the tier of a building (0 = unbuilt, 1-3)
    pub fn tier(&self, building: HomesteadBuilding) -> u8 {
        *self.buildings.get(&building).unwrap_or(&0)
    }

    /// Get the next tier for a building (current + 1), or None if maxed
    pub fn next_tier(&self, building: HomesteadBuilding) -> Option<u8> {
        let tier = self.tier(building);
        if tier < building.max_tier() {
            Some(tier + 1)
        } else {
            None
        }
    }

    pub fn get_bonus(&self, bonus_type: HomesteadBonusType) -> f64 {
        HomesteadBuilding::ALL
            .iter()
            .filter(|b| b.bonus_type() == bonus_type)
            .map(|b| b.bonus_value(self.tier(*b)))
            .sum()
    }

    pub fn compute_bonuses(&self) -> HomesteadBonuses {
        HomesteadBonuses {
            max_hp_percent: self.get_bonus(HomesteadBonusType::MaxHpPercent),
            attack_percent: self.get_bonus(HomesteadBonusType::AttackPercent),
            defense_percent: self.get_bonus(HomesteadBonusType::DefensePercent),
            gold_find_percent: self.get_bonus(HomesteadBonusType::GoldFindPercent),
        }
    }
}

/// Pre-computed homestead bonuses, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HomesteadBonuses {
    pub max_hp_percent: f64,
    pub attack_percent: f64,
    pub defense_percent: f64,
    pub gold_find_percent: f64,
}

impl HomesteadBonuses {
    /// Exact bit patterns of the stat-affecting bonuses, used in stat cache
    /// keys. Gold find does not touch stats and is left out.
    pub fn fingerprint(&self) -> [u64; 3] {
        [
            self.max_hp_percent.to_bits(),
            self.attack_percent.to_bits(),
            self.defense_percent.to_bits(),
        ]
    }
}
