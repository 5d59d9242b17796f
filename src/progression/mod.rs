//! Progression systems

pub mod xp;

pub use xp::{LevelUpChoice, HP_PER_LEVEL};
