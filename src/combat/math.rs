//! Combat math shared by every damage source.
//!
//! These pure functions calculate combat outcomes without side effects.

use crate::core::constants::{
    BASE_CRIT_CHANCE_PERCENT, BASE_CRIT_MULTIPLIER, DAMAGE_VARIANCE_MAX, DAMAGE_VARIANCE_MIN,
    DEFENSE_FACTOR, MAX_DAMAGE_REDUCTION_PERCENT,
};
use rand::Rng;

/// Uniform variance in [0.8, 1.2].
pub fn roll_variance(rng: &mut impl Rng) -> f64 {
    rng.gen_range(DAMAGE_VARIANCE_MIN..=DAMAGE_VARIANCE_MAX)
}

/// `floor(max(1, attack - 0.5 x defense) x variance)`, never below 1.
///
/// `attack` already carries any ability multiplier.
pub fn calculate_damage(attack: f64, defense: u32, variance: f64) -> u32 {
    let raw = (attack - DEFENSE_FACTOR * defense as f64).max(1.0);
    ((raw * variance).floor() as u32).max(1)
}

/// Roll for critical hit.
pub fn roll_crit(crit_chance_percent: f64, rng: &mut impl Rng) -> bool {
    rng.gen::<f64>() * 100.0 < crit_chance_percent
}

pub fn crit_chance(bonus_percent: f64) -> f64 {
    BASE_CRIT_CHANCE_PERCENT + bonus_percent
}

pub fn crit_multiplier(bonus: f64) -> f64 {
    BASE_CRIT_MULTIPLIER + bonus
}

/// Applies a defender's damage-taken increase and damage reduction.
/// Reduction is capped; the result never drops below 1.
pub fn mitigate(damage: u32, taken_increase_percent: f64, reduction_percent: f64) -> u32 {
    let reduction = reduction_percent.clamp(0.0, MAX_DAMAGE_REDUCTION_PERCENT);
    let scaled =
        damage as f64 * (1.0 + taken_increase_percent / 100.0) * (1.0 - reduction / 100.0);
    (scaled.floor() as u32).max(1)
}
