//! Experience and leveling
//!
//! Kills feed `CharLevel::add_xp`; once the threshold is passed the player
//! picks one of three upgrades, each of which spends one level's worth of xp.

use serde::{Deserialize, Serialize};

use crate::ecs::{CharLevel, Fighter};

pub const HP_PER_LEVEL: i32 = 20;

/// Upgrade picked on level up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelUpChoice {
    MaxHp,
    Power,
    Defense,
}

impl LevelUpChoice {
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '1' => Some(LevelUpChoice::MaxHp),
            '2' => Some(LevelUpChoice::Power),
            '3' => Some(LevelUpChoice::Defense),
            _ => None,
        }
    }
}

impl CharLevel {
    pub fn new(xp_given: u32) -> Self {
        Self {
            level: 1,
            current_xp: 0,
            level_up_base: 10,
            level_up_factor: 150,
            xp_given,
        }
    }

    pub fn xp_to_next(&self) -> u32 {
        self.level_up_base + self.level * self.level_up_factor
    }

    /// Strictly more xp than the threshold is required
    pub fn requires_level_up(&self) -> bool {
        self.current_xp > self.xp_to_next()
    }

    /// Gain xp, returning log lines
    pub fn add_xp(&mut self, xp: u32) -> Vec<String> {
        if xp == 0 || self.level_up_base == 0 {
            return Vec::new();
        }
        self.current_xp += xp;
        let mut messages = vec![format!("You gain {} experience points.", xp)];
        if self.requires_level_up() {
            messages.push(format!("You advance to level {}!", self.level + 1));
        }
        messages
    }

    /// Apply an upgrade and spend one level's worth of xp
    pub fn level_up(&mut self, choice: LevelUpChoice, fighter: &mut Fighter) -> &'static str {
        let message = match choice {
            LevelUpChoice::MaxHp => {
                fighter.max_hp += HP_PER_LEVEL;
                fighter.set_hp(fighter.hp() + HP_PER_LEVEL);
                "Your health improves!"
            }
            LevelUpChoice::Power => {
                fighter.base_power += 1;
                "You feel stronger!"
            }
            LevelUpChoice::Defense => {
                fighter.base_defense += 1;
                "Your movements are getting swifter!"
            }
        };
        self.current_xp = self.current_xp.saturating_sub(self.xp_to_next());
        self.level += 1;
        log::debug!("Level up to {} via {:?}", self.level, choice);
        message
    }
}
