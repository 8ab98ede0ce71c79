//! Homestead build/upgrade logic.

use super::types::{tier_cost, Homestead, HomesteadBuilding};
use crate::core::errors::PartyError;

/// Check if the player can afford the next tier of a building
pub fn can_afford(building: HomesteadBuilding, homestead: &Homestead, gold: u64) -> bool {
    match homestead.next_tier(building) {
        Some(next) => gold >= tier_cost(building, next),
        None => false,
    }
}

/// Attempt to build/upgrade a building, spending gold.
/// Returns the new tier on success; nothing changes on failure.
pub fn try_build(
    building: HomesteadBuilding,
    homestead: &mut Homestead,
    gold: &mut u64,
) -> Result<u8, PartyError> {
    let next = homestead.next_tier(building).ok_or_else(|| {
        PartyError::PrerequisitesNotMet(format!("{} is fully built", building.name()))
    })?;
    let cost = tier_cost(building, next);
    if *gold < cost {
        return Err(PartyError::InsufficientGold {
            needed: cost,
            available: *gold,
        });
    }
    *gold -= cost;
    homestead.buildings.insert(building, next);
    Ok(next)
}
