use super::hero::Hero;
use crate::core::constants::{
    MAX_HERO_LEVEL, SKILL_POINTS_PER_LEVEL, XP_CURVE_BASE, XP_CURVE_EXPONENT,
};

/// Calculates the XP required to reach the next level
pub fn xp_for_next_level(level: u32) -> u64 {
    (XP_CURVE_BASE * f64::powf(level as f64, XP_CURVE_EXPONENT)) as u64
}

/// Applies XP to the hero and processes any level-ups.
/// Returns the number of levels gained.
///
/// The caller owns stat cache invalidation when this returns non-zero.
pub fn apply_experience(hero: &mut Hero, xp: u64) -> u32 {
    if hero.level >= MAX_HERO_LEVEL {
        return 0;
    }
    hero.experience = hero.experience.saturating_add(xp);

    let mut levelups = 0;
    while hero.level < MAX_HERO_LEVEL {
        let xp_needed = xp_for_next_level(hero.level);
        if hero.experience < xp_needed {
            break;
        }
        hero.experience -= xp_needed;
        hero.level += 1;
        hero.skill_points += SKILL_POINTS_PER_LEVEL;
        levelups += 1;
    }

    if hero.level >= MAX_HERO_LEVEL {
        hero.experience = 0;
    }
    levelups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::classes::HeroClass;

    fn hero() -> Hero {
        Hero::with_id("h".into(), "Hale".into(), HeroClass::Ranger)
    }

    #[test]
    fn test_xp_curve() {
        assert_eq!(xp_for_next_level(1), 100);
        assert_eq!(xp_for_next_level(4), 800);
        assert!(xp_for_next_level(10) > xp_for_next_level(9));
    }

    #[test]
    fn test_apply_experience_below_threshold() {
        let mut h = hero();
        assert_eq!(apply_experience(&mut h, 99), 0);
        assert_eq!(h.level, 1);
        assert_eq!(h.experience, 99);
    }

    #[test]
    fn test_apply_experience_multiple_levels() {
        let mut h = hero();
        // 100 (1->2) + 282 (2->3) + 10 left over
        assert_eq!(apply_experience(&mut h, 392), 2);
        assert_eq!(h.level, 3);
        assert_eq!(h.experience, 10);
        assert_eq!(h.skill_points, 2);
    }

    #[test]
    fn test_apply_experience_caps_at_max_level() {
        let mut h = hero();
        h.level = MAX_HERO_LEVEL - 1;
        let gained = apply_experience(&mut h, u64::MAX / 2);
        assert_eq!(gained, 1);
        assert_eq!(h.level, MAX_HERO_LEVEL);
        assert_eq!(h.experience, 0);
        assert_eq!(apply_experience(&mut h, 1_000), 0);
    }
}
