//! Heroes, classes, skills, the party roster and stat resolution.

pub mod attributes;
pub mod classes;
pub mod derived_stats;
pub mod hero;
pub mod party;
pub mod progression;
pub mod skills;
pub mod stat_cache;

pub use attributes::{StatBlock, StatDelta, StatKind};
pub use classes::HeroClass;
pub use derived_stats::compute_stats;
pub use hero::Hero;
pub use party::{Party, PendingPartyChange};
pub use skills::{SkillCatalog, SkillDef, StaticSkillCatalog};
pub use stat_cache::StatCache;
