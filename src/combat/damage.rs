//! Damage calculation
//!
//! Melee is a d5 plus the attacker's power, with a small chance of a
//! second d5. Defense scales the result down hyperbolically.

use rand::Rng;

/// Chance that a melee hit adds a second die
pub const CRIT_CHANCE: f64 = 0.05;
const DIE_SIDES: i32 = 5;

/// Result of a melee roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackResult {
    /// Damage before defense
    pub raw_damage: i32,
    /// Damage actually dealt
    pub damage: i32,
    pub is_crit: bool,
}

/// Damage remaining after defense: `round(raw * 5 / (5 + defense))`.
/// Halves round to the even neighbour.
pub fn effective_damage(raw: i32, defense: i32) -> i32 {
    let scale = 5.0 / (5.0 + defense.max(0) as f64);
    (raw as f64 * scale).round_ties_even() as i32
}

/// Roll a melee attack
pub fn roll_melee(power: i32, defense: i32, rng: &mut impl Rng) -> AttackResult {
    let mut raw_damage = rng.gen_range(1..=DIE_SIDES) + power;
    let is_crit = rng.gen_bool(CRIT_CHANCE);
    if is_crit {
        raw_damage += rng.gen_range(1..=DIE_SIDES);
    }
    AttackResult {
        raw_damage,
        damage: effective_damage(raw_damage, defense),
        is_crit,
    }
}

/// Auspicious-room bonus: 5% more, rounded up
pub fn auspicious_bonus(stat: i32) -> i32 {
    (stat as f64 * 1.05).ceil() as i32
}
