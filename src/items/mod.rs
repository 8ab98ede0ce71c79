//! Item system: types, equipment, catalog, and affix resolution.

pub mod affixes;
pub mod catalog;
pub mod equipment;
pub mod types;

pub use catalog::{EquipmentCatalog, StaticEquipmentCatalog};
pub use equipment::Equipment;
pub use types::*;
