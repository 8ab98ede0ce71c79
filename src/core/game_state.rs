use crate::character::party::{Party, PendingPartyChange};
use crate::core::constants::MAX_DUNGEON_LEVEL;
use crate::homestead::types::Homestead;
use crate::items::types::Item;
use serde::{Deserialize, Serialize};

/// Player choices that control what happens after a run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonSettings {
    pub auto_advance: bool,
    /// Stop auto-advancing once this level has been cleared.
    #[serde(default)]
    pub target_level: Option<u32>,
}

/// Bonuses that survive everything (earned outside of runs).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PermanentBonuses {
    pub gold_find_percent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    pub dungeons_cleared: u64,
    pub deaths: u64,
    pub monsters_killed: u64,
    pub bosses_killed: u64,
    pub runs_started: u64,
}

/// Main game state containing all player progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub party: Party,
    pub gold: u64,
    /// Items removed from heroes (class changes, unequips) wait here.
    #[serde(default)]
    pub stash: Vec<Item>,
    #[serde(default)]
    pub homestead: Homestead,
    #[serde(default)]
    pub permanent: PermanentBonuses,
    #[serde(default)]
    pub stats: GameStatistics,
    /// Highest level cleared so far (0 = none).
    pub highest_cleared: u32,
    /// Highest level the player may start.
    pub highest_unlocked: u32,
    #[serde(default)]
    pub settings: DungeonSettings,
    /// Roster changes requested mid-run.
    #[serde(default)]
    pub pending_changes: Vec<PendingPartyChange>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            party: Party::new(),
            gold: 0,
            stash: Vec::new(),
            homestead: Homestead::new(),
            permanent: PermanentBonuses::default(),
            stats: GameStatistics::default(),
            highest_cleared: 0,
            highest_unlocked: 1,
            settings: DungeonSettings::default(),
            pending_changes: Vec::new(),
        }
    }

    /// `1 + (homestead% + permanent%) / 100`
    pub fn gold_multiplier(&self) -> f64 {
        let homestead = self.homestead.compute_bonuses().gold_find_percent;
        1.0 + (homestead + self.permanent.gold_find_percent) / 100.0
    }

    pub fn is_unlocked(&self, level: u32) -> bool {
        level >= 1 && level <= self.highest_unlocked.min(MAX_DUNGEON_LEVEL)
    }

    /// Records a cleared level and unlocks the next one, up to the cap.
    pub fn record_clear(&mut self, level: u32) {
        self.highest_cleared = self.highest_cleared.max(level);
        self.highest_unlocked = self
            .highest_unlocked
            .max((level + 1).min(MAX_DUNGEON_LEVEL));
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::homestead::types::HomesteadBuilding;

    #[test]
    fn test_new_state() {
        let state = GameState::new();
        assert_eq!(state.highest_unlocked, 1);
        assert!(state.is_unlocked(1));
        assert!(!state.is_unlocked(2));
        assert!(!state.is_unlocked(0));
        assert_eq!(state.gold_multiplier(), 1.0);
    }

    #[test]
    fn test_gold_multiplier_combines_sources() {
        let mut state = GameState::new();
        state.homestead.buildings.insert(HomesteadBuilding::CountingHouse, 1);
        state.permanent.gold_find_percent = 15.0;
        assert!((state.gold_multiplier() - 1.25).abs() < 1e-9);
    }

    #[test]
    fn test_record_clear_caps_unlock() {
        let mut state = GameState::new();
        state.record_clear(1);
        assert_eq!((state.highest_cleared, state.highest_unlocked), (1, 2));
        state.record_clear(MAX_DUNGEON_LEVEL);
        assert_eq!(state.highest_unlocked, MAX_DUNGEON_LEVEL);
        state.record_clear(3);
        assert_eq!(state.highest_cleared, MAX_DUNGEON_LEVEL);
    }

    #[test]
    fn test_json_roundtrip_keeps_settings() {
        let mut state = GameState::new();
        state.settings = DungeonSettings {
            auto_advance: true,
            target_level: Some(7),
        };
        state.gold = 42;
        let restored = GameState::from_json(&state.to_json().unwrap()).unwrap();
        assert_eq!(restored, state);
    }
}
