//! Monster generation scaled by dungeon level.

use crate::character::attributes::StatBlock;
use crate::combat::types::CombatUnit;
use crate::core::constants::{
    BOSS_MULTIPLIERS, BOSS_XP_MULTIPLIER, MONSTER_BASE_STATS, MONSTER_STAT_STEPS,
    MONSTER_XP_PER_LEVEL,
};
use rand::{Rng, RngCore};

const MONSTER_NAMES: [&str; 8] = [
    "Cave Rat",
    "Goblin",
    "Skeleton",
    "Kobold",
    "Slime",
    "Cultist",
    "Ghoul",
    "Dire Bat",
];

const BOSS_NAMES: [&str; 4] = ["Goblin Warlord", "Bone Tyrant", "Lich Acolyte", "Brood Mother"];

/// Stats of a monster at `level`.
pub fn monster_stats(level: u32, is_boss: bool) -> StatBlock {
    let steps = level.max(1) - 1;
    let (hp, atk, def, spd) = MONSTER_BASE_STATS;
    let (hp_step, atk_step, def_step, spd_step) = MONSTER_STAT_STEPS;
    let mut stats = StatBlock::new(
        hp + hp_step * steps,
        atk + atk_step * steps,
        def + def_step * steps,
        spd + spd_step * steps / 2,
    );
    if is_boss {
        let (hp_mult, atk_mult, def_mult) = BOSS_MULTIPLIERS;
        stats.max_hp = (stats.max_hp as f64 * hp_mult) as u32;
        stats.attack = (stats.attack as f64 * atk_mult) as u32;
        stats.defense = (stats.defense as f64 * def_mult) as u32;
    }
    stats
}

pub fn monster_xp(level: u32, is_boss: bool) -> u64 {
    let xp = MONSTER_XP_PER_LEVEL * level.max(1) as u64;
    if is_boss {
        xp * BOSS_XP_MULTIPLIER
    } else {
        xp
    }
}

/// Rolls one monster. Speed varies by up to 2 either way so turn order is
/// not fully tied.
pub fn generate_monster(
    id: String,
    level: u32,
    is_boss: bool,
    rng: &mut dyn RngCore,
) -> CombatUnit {
    let mut stats = monster_stats(level, is_boss);
    stats.speed = (stats.speed as i64 + rng.gen_range(-2..=2)).max(1) as u32;
    let name = if is_boss {
        BOSS_NAMES[rng.gen_range(0..BOSS_NAMES.len())]
    } else {
        MONSTER_NAMES[rng.gen_range(0..MONSTER_NAMES.len())]
    };

    let mut unit = CombatUnit::new(id, name, false, &stats);
    unit.is_boss = is_boss;
    unit.xp_reward = monster_xp(level, is_boss);
    unit
}
