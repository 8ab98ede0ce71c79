use crate::character::attributes::{StatBlock, StatKind};
use crate::core::constants::WEAKEN_ATTACK_PENALTY;
use crate::items::types::{AffixDef, BuffAmount};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Skips the unit's next action.
    Stun,
    /// Damage per stack at turn start.
    Poison,
    /// Damage per stack at turn start.
    Burn,
    /// Reduces attack while active.
    Weaken,
}

impl StatusKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatusKind::Stun => "Stun",
            StatusKind::Poison => "Poison",
            StatusKind::Burn => "Burn",
            StatusKind::Weaken => "Weaken",
        }
    }

    /// Damage dealt per stack at the start of the afflicted unit's turn.
    pub fn damage_per_stack(&self, max_hp: u32) -> u32 {
        match self {
            StatusKind::Poison => (max_hp / 25).max(1),
            StatusKind::Burn => (max_hp / 20).max(1),
            StatusKind::Stun | StatusKind::Weaken => 0,
        }
    }
}

/// Status effect instance attached to a unit; decremented once per unit-turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub duration: u32,
    pub stacks: u32,
}

/// Temporary stat modifier with a duration in unit-turns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempBuff {
    pub stat: StatKind,
    pub amount: BuffAmount,
    pub duration: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AbilityEffect {
    /// Single target; multiplies the attack term before the damage formula.
    Damage { multiplier: f64 },
    /// Damage formula applied independently to every living enemy.
    AoeDamage { multiplier: f64 },
    /// Heals every living ally by a percentage of their own max HP.
    HealAll { percentage: f64 },
    /// Heals the living ally with the lowest HP fraction.
    HealSingle { percentage: f64 },
    /// Heals every living ally and grants them a timed buff.
    HealBuff { percentage: f64, buff: TempBuff },
    /// Single-target damage that stuns the target.
    Stun { multiplier: f64, duration: u32 },
    /// Single-target damage; heals the actor for a share of damage dealt.
    Drain { multiplier: f64, heal_percent: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub id: String,
    pub name: String,
    pub cooldown: u32,
    pub effect: AbilityEffect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilityState {
    pub ability: Ability,
    pub cooldown_remaining: u32,
}

impl AbilityState {
    pub fn ready(ability: Ability) -> Self {
        Self {
            ability,
            cooldown_remaining: 0,
        }
    }
}

/// Live stats of a unit inside an encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub max_hp: u32,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    pub threat: u32,
}

impl UnitStats {
    pub fn from_block(block: &StatBlock, hp: u32) -> Self {
        Self {
            max_hp: block.max_hp,
            hp: hp.min(block.max_hp),
            attack: block.attack,
            defense: block.defense,
            speed: block.speed,
            threat: block.threat,
        }
    }
}

/// Runtime projection of a hero or monster into one encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatUnit {
    pub id: String,
    pub name: String,
    pub is_hero: bool,
    #[serde(default)]
    pub is_boss: bool,
    pub stats: UnitStats,
    #[serde(default)]
    pub abilities: Vec<AbilityState>,
    #[serde(default)]
    pub statuses: Vec<StatusEffect>,
    #[serde(default)]
    pub buffs: Vec<TempBuff>,
    /// Affixes of the unit's equipment, resolved when the encounter starts.
    #[serde(default)]
    pub affixes: Vec<AffixDef>,
    #[serde(default)]
    pub xp_reward: u64,
}

impl CombatUnit {
    /// A unit at full HP with no abilities, statuses or affixes.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        is_hero: bool,
        stats: &StatBlock,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_hero,
            is_boss: false,
            stats: UnitStats::from_block(stats, stats.max_hp),
            abilities: Vec::new(),
            statuses: Vec::new(),
            buffs: Vec::new(),
            affixes: Vec::new(),
            xp_reward: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.stats.hp > 0
    }

    pub fn hp_fraction(&self) -> f64 {
        if self.stats.max_hp == 0 {
            return 0.0;
        }
        self.stats.hp as f64 / self.stats.max_hp as f64
    }

    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.stats.hp);
        self.stats.hp -= dealt;
        dealt
    }

    /// Heals up to max HP and returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let restored = amount.min(self.stats.max_hp.saturating_sub(self.stats.hp));
        self.stats.hp += restored;
        restored
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.statuses.iter().any(|s| s.kind == kind)
    }

    /// Adds stacks to an existing status of the same kind (keeping the longer
    /// duration), or attaches a new one.
    pub fn apply_status(&mut self, kind: StatusKind, duration: u32, stacks: u32) {
        if duration == 0 {
            return;
        }
        if let Some(existing) = self.statuses.iter_mut().find(|s| s.kind == kind) {
            existing.stacks = existing.stacks.saturating_add(stacks.max(1));
            existing.duration = existing.duration.max(duration);
        } else {
            self.statuses.push(StatusEffect {
                kind,
                duration,
                stacks: stacks.max(1),
            });
        }
    }

    /// Decrements every status and buff by one turn, dropping expired ones.
    pub fn tick_durations(&mut self) {
        for status in &mut self.statuses {
            status.duration = status.duration.saturating_sub(1);
        }
        self.statuses.retain(|s| s.duration > 0);
        for buff in &mut self.buffs {
            buff.duration = buff.duration.saturating_sub(1);
        }
        self.buffs.retain(|b| b.duration > 0);
    }

    /// Current value of a stat after timed buffs and Weaken.
    pub fn effective_stat(&self, stat: StatKind) -> u32 {
        let base = match stat {
            StatKind::MaxHp => self.stats.max_hp,
            StatKind::Attack => self.stats.attack,
            StatKind::Defense => self.stats.defense,
            StatKind::Speed => self.stats.speed,
        } as f64;
        let mut flat = 0.0;
        let mut percent = 0.0;
        for buff in self.buffs.iter().filter(|b| b.stat == stat) {
            match buff.amount {
                BuffAmount::Flat(v) => flat += v as f64,
                BuffAmount::Percent(p) => percent += p,
            }
        }
        let mut value = (base + flat) * (1.0 + percent / 100.0);
        if stat == StatKind::Attack && self.has_status(StatusKind::Weaken) {
            value *= 1.0 - WEAKEN_ATTACK_PENALTY;
        }
        value.floor().max(0.0) as u32
    }
}

/// One combat encounter. Active until `is_complete`, then terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    pub heroes: Vec<CombatUnit>,
    pub monsters: Vec<CombatUnit>,
    /// Unit ids sorted by descending speed at initialization. Never re-sorted.
    pub turn_order: Vec<String>,
    pub current_turn_index: usize,
    pub round: u32,
    pub is_complete: bool,
    pub victory: bool,
}

impl CombatState {
    pub fn new(heroes: Vec<CombatUnit>, monsters: Vec<CombatUnit>) -> Self {
        let mut order: Vec<(&str, u32)> = heroes
            .iter()
            .chain(monsters.iter())
            .map(|u| (u.id.as_str(), u.stats.speed))
            .collect();
        // Stable: ties keep heroes before monsters, in roster order.
        order.sort_by(|a, b| b.1.cmp(&a.1));
        let turn_order = order.into_iter().map(|(id, _)| id.to_string()).collect();

        Self {
            heroes,
            monsters,
            turn_order,
            current_turn_index: 0,
            round: 1,
            is_complete: false,
            victory: false,
        }
    }

    pub fn unit(&self, id: &str) -> Option<&CombatUnit> {
        self.heroes
            .iter()
            .chain(self.monsters.iter())
            .find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: &str) -> Option<&mut CombatUnit> {
        self.heroes
            .iter_mut()
            .chain(self.monsters.iter_mut())
            .find(|u| u.id == id)
    }

    pub fn living_heroes(&self) -> usize {
        self.heroes.iter().filter(|u| u.is_alive()).count()
    }

    pub fn living_monsters(&self) -> usize {
        self.monsters.iter().filter(|u| u.is_alive()).count()
    }

    pub fn unit_count(&self) -> usize {
        self.heroes.len() + self.monsters.len()
    }

    /// Advances to the next slot in the turn order, counting a new round on
    /// wraparound.
    pub fn advance_turn(&mut self) {
        if self.turn_order.is_empty() {
            return;
        }
        self.current_turn_index += 1;
        if self.current_turn_index >= self.turn_order.len() {
            self.current_turn_index = 0;
            self.round += 1;
        }
    }
}
