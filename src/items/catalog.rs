//! Read-only equipment catalog: item templates and affix definitions.

use super::types::{
    AffixDef, AffixEffect, AffixKind, AffixTrigger, BuffAmount, Item, ItemKind, Rarity,
};
use crate::character::attributes::{StatDelta, StatKind};
use crate::character::classes::HeroClass;
use crate::combat::types::StatusKind;
use std::collections::HashMap;

pub trait EquipmentCatalog {
    fn affix(&self, id: &str) -> Option<&AffixDef>;

    fn item_template(&self, id: &str) -> Option<&Item>;

    fn can_class_use_equipment(&self, class: HeroClass, item: &Item) -> bool {
        class.can_use(item.kind)
    }
}

/// Built-in affix and item tables.
#[derive(Debug, Clone, Default)]
pub struct StaticEquipmentCatalog {
    affixes: HashMap<String, AffixDef>,
    items: HashMap<String, Item>,
}

impl StaticEquipmentCatalog {
    pub fn new() -> Self {
        let mut catalog = Self::default();
        for affix in builtin_affixes() {
            catalog.add_affix(affix);
        }
        for item in builtin_items() {
            catalog.add_item(item);
        }
        catalog
    }

    pub fn add_affix(&mut self, affix: AffixDef) {
        self.affixes.insert(affix.id.clone(), affix);
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.insert(item.id.clone(), item);
    }
}

impl EquipmentCatalog for StaticEquipmentCatalog {
    fn affix(&self, id: &str) -> Option<&AffixDef> {
        self.affixes.get(id)
    }

    fn item_template(&self, id: &str) -> Option<&Item> {
        self.items.get(id)
    }
}

fn affix(
    id: &str,
    name: &str,
    kind: AffixKind,
    trigger: AffixTrigger,
    effect: AffixEffect,
) -> AffixDef {
    AffixDef {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        trigger,
        effect,
    }
}

pub fn builtin_affixes() -> Vec<AffixDef> {
    use AffixKind::{Prefix, Suffix};
    use AffixTrigger::*;

    vec![
        affix("keen", "Keen", Prefix, Passive, AffixEffect::CritChance { percent: 8.0 }),
        affix("stalwart", "Stalwart", Prefix, Passive, AffixEffect::MaxHpPercent { percent: 10.0 }),
        affix("swift", "Swift", Prefix, Passive, AffixEffect::FlatSpeed { amount: 3 }),
        affix(
            "of_clarity",
            "of Clarity",
            Suffix,
            Passive,
            AffixEffect::DebuffDurationReduction { percent: 50.0 },
        ),
        affix(
            "reckless",
            "Reckless",
            Prefix,
            Passive,
            AffixEffect::DamageTakenIncrease { percent: 15.0 },
        ),
        affix(
            "of_the_last_stand",
            "of the Last Stand",
            Suffix,
            Passive,
            AffixEffect::LowHpDamageReduction {
                hp_threshold: 0.3,
                percent: 20.0,
            },
        ),
        affix(
            "of_endurance",
            "of Endurance",
            Suffix,
            OnDamageTaken,
            AffixEffect::LowHpDamageReduction {
                hp_threshold: 0.5,
                percent: 10.0,
            },
        ),
        affix(
            "executioners",
            "Executioner's",
            Prefix,
            Passive,
            AffixEffect::Execute {
                hp_threshold: 0.25,
                bonus_percent: 50.0,
            },
        ),
        affix(
            "berserk",
            "Berserk",
            Prefix,
            Passive,
            AffixEffect::Berserker {
                max_bonus_percent: 60.0,
            },
        ),
        affix(
            "of_the_phoenix",
            "of the Phoenix",
            Suffix,
            Passive,
            AffixEffect::PhoenixRevive { hp_fraction: 0.3 },
        ),
        affix("vampiric", "Vampiric", Prefix, OnHit, AffixEffect::Lifesteal { fraction: 0.15 }),
        affix(
            "venomous",
            "Venomous",
            Prefix,
            OnHit,
            AffixEffect::ApplyStatus {
                status: StatusKind::Poison,
                chance: 0.25,
                duration: 3,
                stacks: 1,
            },
        ),
        affix(
            "of_arcing",
            "of Arcing",
            Suffix,
            OnHit,
            AffixEffect::ChainDamage {
                chance: 0.2,
                fraction: 0.5,
            },
        ),
        affix(
            "brutal",
            "Brutal",
            Prefix,
            OnCrit,
            AffixEffect::CritDamage { percent: 50.0 },
        ),
        affix(
            "of_embers",
            "of Embers",
            Suffix,
            OnCrit,
            AffixEffect::ApplyStatus {
                status: StatusKind::Burn,
                chance: 1.0,
                duration: 2,
                stacks: 1,
            },
        ),
        affix(
            "of_slaughter",
            "of Slaughter",
            Suffix,
            OnKill,
            AffixEffect::KillBuff {
                stat: StatKind::Attack,
                amount: BuffAmount::Percent(20.0),
                duration: 3,
            },
        ),
        affix(
            "thorned",
            "Thorned",
            Prefix,
            OnDamageTaken,
            AffixEffect::Reflect { fraction: 0.2 },
        ),
        affix(
            "of_warding",
            "of Warding",
            Suffix,
            OnDamageTaken,
            AffixEffect::DamageReduction { percent: 10.0 },
        ),
        affix(
            "of_regrowth",
            "of Regrowth",
            Suffix,
            OnTurnStart,
            AffixEffect::Regeneration { percent: 4.0 },
        ),
    ]
}

fn item(
    id: &str,
    name: &str,
    kind: ItemKind,
    rarity: Rarity,
    stats: StatDelta,
    affixes: &[&str],
) -> Item {
    Item {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        rarity,
        item_level: 1,
        stats,
        affixes: affixes.iter().map(|a| a.to_string()).collect(),
        scales_with_party: false,
    }
}

#[rustfmt::skip]
pub fn builtin_items() -> Vec<Item> {
    let mut heirloom = item(
        "heirloom_blade",
        "Heirloom Blade",
        ItemKind::Sword,
        Rarity::Legendary,
        StatDelta::new(0, 6, 0, 1),
        &["keen"],
    );
    heirloom.scales_with_party = true;

    vec![
        item("rusty_sword", "Rusty Sword", ItemKind::Sword, Rarity::Common, StatDelta::new(0, 4, 0, 0), &[]),
        item("oak_staff", "Oak Staff", ItemKind::Staff, Rarity::Common, StatDelta::new(0, 5, 0, 0), &[]),
        item("iron_mace", "Iron Mace", ItemKind::Mace, Rarity::Common, StatDelta::new(0, 4, 1, 0), &[]),
        item("shiv", "Shiv", ItemKind::Dagger, Rarity::Magic, StatDelta::new(0, 3, 0, 2), &["venomous"]),
        item("short_bow", "Short Bow", ItemKind::Bow, Rarity::Common, StatDelta::new(0, 5, 0, 1), &[]),
        item("chainmail", "Chainmail", ItemKind::HeavyArmor, Rarity::Common, StatDelta::new(20, 0, 5, -1), &[]),
        item("leather_vest", "Leather Vest", ItemKind::LightArmor, Rarity::Common, StatDelta::new(10, 0, 3, 0), &[]),
        item("apprentice_robe", "Apprentice Robe", ItemKind::Robe, Rarity::Magic, StatDelta::new(8, 1, 1, 0), &["of_regrowth"]),
        item("thorn_plate", "Thorn Plate", ItemKind::HeavyArmor, Rarity::Rare, StatDelta::new(30, 0, 7, -1), &["thorned", "of_warding"]),
        item("phoenix_feather", "Phoenix Feather", ItemKind::Trinket, Rarity::Epic, StatDelta::new(10, 0, 0, 0), &["of_the_phoenix"]),
        item("bloodstone", "Bloodstone", ItemKind::Trinket, Rarity::Rare, StatDelta::new(0, 2, 0, 0), &["vampiric", "berserk"]),
        item("swift_band", "Swift Band", ItemKind::Trinket, Rarity::Magic, StatDelta::new(0, 0, 0, 1), &["swift"]),
        heirloom,
    ]
}
