use super::classes::HeroClass;
use crate::items::equipment::Equipment;
use serde::{Deserialize, Serialize};

/// Persistent party member.
///
/// IMPORTANT: any mutation of `level`, `equipment` or `skills` must be paired
/// with a stat cache invalidation in the same operation. Go through
/// [`crate::core::engine::DungeonEngine`] rather than mutating directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub id: String,
    pub name: String,
    pub class: HeroClass,
    pub level: u32,
    pub experience: u64,
    pub equipment: Equipment,
    /// Learned skill ids, in the order they were learned.
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub skill_points: u32,
}

impl Hero {
    /// Creates a level 1 hero with a fresh unique id.
    pub fn new(name: String, class: HeroClass) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), name, class)
    }

    pub fn with_id(id: String, name: String, class: HeroClass) -> Self {
        Self {
            id,
            name,
            class,
            level: 1,
            experience: 0,
            equipment: Equipment::new(),
            skills: Vec::new(),
            skill_points: 0,
        }
    }

    pub fn has_skill(&self, skill_id: &str) -> bool {
        self.skills.iter().any(|s| s == skill_id)
    }
}
