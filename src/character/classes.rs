//! Hero class definitions: base stats, growth, and equipment permissions.

use super::attributes::StatBlock;
use crate::items::types::ItemKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeroClass {
    Warrior,
    Mage,
    Cleric,
    Rogue,
    Ranger,
}

impl HeroClass {
    pub const ALL: [HeroClass; 5] = [
        HeroClass::Warrior,
        HeroClass::Mage,
        HeroClass::Cleric,
        HeroClass::Rogue,
        HeroClass::Ranger,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HeroClass::Warrior => "Warrior",
            HeroClass::Mage => "Mage",
            HeroClass::Cleric => "Cleric",
            HeroClass::Rogue => "Rogue",
            HeroClass::Ranger => "Ranger",
        }
    }

    /// Level 1 stats.
    pub fn base_stats(&self) -> StatBlock {
        match self {
            HeroClass::Warrior => StatBlock::new(120, 12, 8, 8),
            HeroClass::Mage => StatBlock::new(70, 16, 3, 10),
            HeroClass::Cleric => StatBlock::new(90, 9, 5, 9),
            HeroClass::Rogue => StatBlock::new(80, 13, 4, 14),
            HeroClass::Ranger => StatBlock::new(85, 14, 4, 12),
        }
    }

    /// Stats gained per level above 1.
    pub fn growth(&self) -> StatBlock {
        match self {
            HeroClass::Warrior => StatBlock::new(14, 2, 2, 1),
            HeroClass::Mage => StatBlock::new(7, 3, 1, 1),
            HeroClass::Cleric => StatBlock::new(10, 2, 1, 1),
            HeroClass::Rogue => StatBlock::new(9, 3, 1, 2),
            HeroClass::Ranger => StatBlock::new(9, 3, 1, 1),
        }
    }

    pub fn allowed_item_kinds(&self) -> &'static [ItemKind] {
        match self {
            HeroClass::Warrior => &[
                ItemKind::Sword,
                ItemKind::Axe,
                ItemKind::Mace,
                ItemKind::HeavyArmor,
                ItemKind::LightArmor,
                ItemKind::Trinket,
            ],
            HeroClass::Mage => &[ItemKind::Staff, ItemKind::Robe, ItemKind::Trinket],
            HeroClass::Cleric => &[
                ItemKind::Mace,
                ItemKind::Staff,
                ItemKind::Robe,
                ItemKind::HeavyArmor,
                ItemKind::Trinket,
            ],
            HeroClass::Rogue => &[
                ItemKind::Dagger,
                ItemKind::Sword,
                ItemKind::LightArmor,
                ItemKind::Trinket,
            ],
            HeroClass::Ranger => &[
                ItemKind::Bow,
                ItemKind::Dagger,
                ItemKind::LightArmor,
                ItemKind::Trinket,
            ],
        }
    }

    pub fn can_use(&self, kind: ItemKind) -> bool {
        self.allowed_item_kinds().contains(&kind)
    }
}
