use crate::character::attributes::{StatDelta, StatKind};
use crate::combat::types::StatusKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Weapon,
    Armor,
    Accessory,
}

impl EquipmentSlot {
    pub const ALL: [EquipmentSlot; 3] = [
        EquipmentSlot::Weapon,
        EquipmentSlot::Armor,
        EquipmentSlot::Accessory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EquipmentSlot::Weapon => "Weapon",
            EquipmentSlot::Armor => "Armor",
            EquipmentSlot::Accessory => "Accessory",
        }
    }
}

/// Item family, used for class restrictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Sword,
    Axe,
    Staff,
    Mace,
    Dagger,
    Bow,
    HeavyArmor,
    LightArmor,
    Robe,
    Trinket,
}

impl ItemKind {
    pub fn slot(&self) -> EquipmentSlot {
        match self {
            ItemKind::Sword
            | ItemKind::Axe
            | ItemKind::Staff
            | ItemKind::Mace
            | ItemKind::Dagger
            | ItemKind::Bow => EquipmentSlot::Weapon,
            ItemKind::HeavyArmor | ItemKind::LightArmor | ItemKind::Robe => EquipmentSlot::Armor,
            ItemKind::Trinket => EquipmentSlot::Accessory,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common = 0,
    Magic = 1,
    Rare = 2,
    Epic = 3,
    Legendary = 4,
}

impl Rarity {
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Magic => "Magic",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Identity used by the stat cache key; two items with the same id are
    /// assumed to carry the same stats.
    pub id: String,
    pub name: String,
    pub kind: ItemKind,
    pub rarity: Rarity,
    pub item_level: u32,
    pub stats: StatDelta,
    /// Affix definition ids, resolved through the equipment catalog.
    #[serde(default)]
    pub affixes: Vec<String>,
    /// Special items whose stats follow the party's highest level.
    #[serde(default)]
    pub scales_with_party: bool,
}

impl Item {
    pub fn slot(&self) -> EquipmentSlot {
        self.kind.slot()
    }

    /// Stat contribution when worn in a party whose highest level is
    /// `party_max_level`.
    pub fn effective_stats(&self, party_max_level: u32) -> StatDelta {
        if !self.scales_with_party {
            return self.stats;
        }
        let ratio = party_max_level.max(1) as f64 / self.item_level.max(1) as f64;
        let rescale = |v: i32| (v as f64 * ratio).floor() as i32;
        StatDelta::new(
            rescale(self.stats.max_hp),
            rescale(self.stats.attack),
            rescale(self.stats.defense),
            rescale(self.stats.speed),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AffixKind {
    Prefix,
    Suffix,
}

/// Moment in combat resolution at which an affix may activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AffixTrigger {
    Passive,
    OnHit,
    OnCrit,
    OnKill,
    OnDamageTaken,
    OnTurnStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BuffAmount {
    Flat(i32),
    Percent(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AffixEffect {
    // Passive accumulators
    CritChance { percent: f64 },
    MaxHpPercent { percent: f64 },
    FlatSpeed { amount: u32 },
    DebuffDurationReduction { percent: f64 },
    DamageTakenIncrease { percent: f64 },
    LowHpDamageReduction { hp_threshold: f64, percent: f64 },
    // Passive specials, computed on demand
    Execute { hp_threshold: f64, bonus_percent: f64 },
    Berserker { max_bonus_percent: f64 },
    PhoenixRevive { hp_fraction: f64 },
    // On hit
    Lifesteal { fraction: f64 },
    ApplyStatus {
        status: StatusKind,
        chance: f64,
        duration: u32,
        stacks: u32,
    },
    ChainDamage { chance: f64, fraction: f64 },
    // On crit
    CritDamage { percent: f64 },
    // On kill
    KillBuff {
        stat: StatKind,
        amount: BuffAmount,
        duration: u32,
    },
    // On damage taken
    Reflect { fraction: f64 },
    DamageReduction { percent: f64 },
    // On turn start
    Regeneration { percent: f64 },
}

/// Static affix definition. Read-only reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffixDef {
    pub id: String,
    pub name: String,
    pub kind: AffixKind,
    pub trigger: AffixTrigger,
    pub effect: AffixEffect,
}
