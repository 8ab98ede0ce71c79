use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StatKind {
    MaxHp,
    Attack,
    Defense,
    Speed,
}

impl StatKind {
    pub fn all() -> [StatKind; 4] {
        [
            StatKind::MaxHp,
            StatKind::Attack,
            StatKind::Defense,
            StatKind::Speed,
        ]
    }

    pub fn abbrev(&self) -> &str {
        match self {
            StatKind::MaxHp => "HP",
            StatKind::Attack => "ATK",
            StatKind::Defense => "DEF",
            StatKind::Speed => "SPD",
        }
    }
}

/// Derived combat attributes of a unit. Computed, never hand-edited.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StatBlock {
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub speed: u32,
    #[serde(default)]
    pub threat: u32,
}

impl StatBlock {
    pub fn new(max_hp: u32, attack: u32, defense: u32, speed: u32) -> Self {
        Self {
            max_hp,
            attack,
            defense,
            speed,
            threat: 0,
        }
    }

    pub fn get(&self, stat: StatKind) -> u32 {
        match stat {
            StatKind::MaxHp => self.max_hp,
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Speed => self.speed,
        }
    }

    pub fn set(&mut self, stat: StatKind, value: u32) {
        match stat {
            StatKind::MaxHp => self.max_hp = value,
            StatKind::Attack => self.attack = value,
            StatKind::Defense => self.defense = value,
            StatKind::Speed => self.speed = value,
        }
    }

    /// Adds a (possibly negative) delta to each stat, clamping at zero.
    pub fn add(&mut self, delta: &StatDelta) {
        for stat in StatKind::all() {
            let value = self.get(stat) as i64 + delta.get(stat) as i64;
            self.set(stat, value.max(0) as u32);
        }
    }

    /// Multiplies one stat by `1 + percent / 100`, flooring the result.
    pub fn scale_percent(&mut self, stat: StatKind, percent: f64) {
        let scaled = (self.get(stat) as f64 * (1.0 + percent / 100.0)).floor();
        self.set(stat, scaled.max(0.0) as u32);
    }
}

/// Additive stat contribution from items, skills and auras.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct StatDelta {
    #[serde(default)]
    pub max_hp: i32,
    #[serde(default)]
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
    #[serde(default)]
    pub speed: i32,
}

impl StatDelta {
    pub fn new(max_hp: i32, attack: i32, defense: i32, speed: i32) -> Self {
        Self {
            max_hp,
            attack,
            defense,
            speed,
        }
    }

    pub fn get(&self, stat: StatKind) -> i32 {
        match stat {
            StatKind::MaxHp => self.max_hp,
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Speed => self.speed,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}
