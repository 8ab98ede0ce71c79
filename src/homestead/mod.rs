//! Homestead buildings: gold-bought tiers that boost every hero and the
//! gold a completed run pays out.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::PartyError;

    #[test]
    fn test_try_build_spends_gold() {
        let mut homestead = Homestead::new();
        let mut gold = 10_000;
        let tier = try_build(HomesteadBuilding::Barracks, &mut homestead, &mut gold).unwrap();
        assert_eq!(tier, 1);
        assert_eq!(gold, 10_000 - tier_cost(HomesteadBuilding::Barracks, 1));
        assert_eq!(homestead.tier(HomesteadBuilding::Barracks), 1);
    }

    #[test]
    fn test_try_build_insufficient_gold_leaves_state() {
        let mut homestead = Homestead::new();
        let mut gold = 10;
        let err = try_build(HomesteadBuilding::Armory, &mut homestead, &mut gold).unwrap_err();
        assert_eq!(
            err,
            PartyError::InsufficientGold {
                needed: 500,
                available: 10
            }
        );
        assert_eq!(gold, 10);
        assert_eq!(homestead.tier(HomesteadBuilding::Armory), 0);
    }

    #[test]
    fn test_try_build_maxed() {
        let mut homestead = Homestead::new();
        homestead.buildings.insert(HomesteadBuilding::Bulwark, 3);
        let mut gold = u64::MAX;
        assert!(matches!(
            try_build(HomesteadBuilding::Bulwark, &mut homestead, &mut gold),
            Err(PartyError::PrerequisitesNotMet(_))
        ));
        assert!(!can_afford(HomesteadBuilding::Bulwark, &homestead, gold));
    }

    #[test]
    fn test_can_afford() {
        let homestead = Homestead::new();
        assert!(can_afford(HomesteadBuilding::CountingHouse, &homestead, 400));
        assert!(!can_afford(HomesteadBuilding::CountingHouse, &homestead, 399));
    }
}
