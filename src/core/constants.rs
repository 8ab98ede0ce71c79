// Tick and timing
pub const TICK_INTERVAL_MS: u64 = 500;
pub const AUTO_ADVANCE_DELAY_MS: u64 = 1_500;
pub const SPEED_MULTIPLIERS: [u32; 3] = [1, 2, 3];

// Phase waits (in ticks)
pub const CLEARING_WAIT_TICKS: u32 = 2;
pub const TRANSITION_WAIT_TICKS: u32 = 1;
pub const RUN_END_WAIT_TICKS: u32 = 3;

// Dungeon progression
pub const MAX_DUNGEON_LEVEL: u32 = 100;
pub const COMPLETION_GOLD_PER_LEVEL: f64 = 100.0;
pub const BASE_ROOMS_PER_RUN: u32 = 2;
pub const ROOMS_PER_TEN_LEVELS: u32 = 1;
pub const MAX_ROOMS_PER_RUN: u32 = 6;

// Damage formula: floor(max(1, attack - DEFENSE_FACTOR * defense) * variance)
pub const DEFENSE_FACTOR: f64 = 0.5;
pub const DAMAGE_VARIANCE_MIN: f64 = 0.8;
pub const DAMAGE_VARIANCE_MAX: f64 = 1.2;

// Crits (heroes only)
pub const BASE_CRIT_CHANCE_PERCENT: f64 = 5.0;
pub const BASE_CRIT_MULTIPLIER: f64 = 1.5;

// Mitigation
pub const MAX_DAMAGE_REDUCTION_PERCENT: f64 = 75.0;
pub const WEAKEN_ATTACK_PENALTY: f64 = 0.25;

// Passive skill conversion: 1 speed per 2% dodge
pub const DODGE_TO_SPEED_FACTOR: f64 = 0.5;

// Party
pub const MAX_PARTY_SIZE: usize = 4;
pub const RECRUIT_GOLD_COST: u64 = 250;
pub const SUMMON_ID_PREFIX: &str = "summon_";

// Leveling
pub const MAX_HERO_LEVEL: u32 = 60;
pub const XP_CURVE_BASE: f64 = 100.0;
pub const XP_CURVE_EXPONENT: f64 = 1.5;
pub const SKILL_POINTS_PER_LEVEL: u32 = 1;

// Monsters: stats at level L = base + (L - 1) * step
pub const MONSTER_BASE_STATS: (u32, u32, u32, u32) = (40, 9, 3, 8);
pub const MONSTER_STAT_STEPS: (u32, u32, u32, u32) = (12, 3, 1, 1);
pub const MONSTER_XP_PER_LEVEL: u64 = 10;
pub const BOSS_MULTIPLIERS: (f64, f64, f64) = (3.0, 1.5, 1.5);
pub const BOSS_XP_MULTIPLIER: u64 = 5;

// Stat cache
pub const STAT_CACHE_MAX_ENTRIES: usize = 512;

// Default grid explorer
pub const ROOM_WIDTH: i32 = 7;
pub const ROOM_HEIGHT: i32 = 5;
pub const MAX_GROUPS_PER_ROOM: u32 = 2;
pub const MAX_MONSTERS_PER_GROUP: u32 = 3;
