//! Combat system

pub mod damage;
pub mod status;

pub use damage::{auspicious_bonus, effective_damage, roll_melee, AttackResult, CRIT_CHANCE};
pub use status::{StatusTick, POISON_DEATH_CHANCE};
