//! Status effect timers
//!
//! Counters tick down once per turn. Poison hurts on every tick and
//! petrification kills when its counter runs out.

use rand::Rng;

use crate::ecs::StatusTimers;

/// Chance per poison tick of dying outright
pub const POISON_DEATH_CHANCE: f64 = 0.001;

/// What one tick did to an entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusTick {
    /// Damage from poison this tick
    pub poison_damage: i32,
    /// Poison killed outright
    pub poison_death: bool,
    /// Poison wore off this tick
    pub recovered: bool,
    /// Turning to stone completed
    pub petrified: bool,
    /// Levitation wore off this tick
    pub landed: bool,
}

impl StatusTick {
    /// Whether this tick kills regardless of hit points
    pub fn is_fatal(&self) -> bool {
        self.poison_death || self.petrified
    }
}

fn count_down(timer: &mut i32) -> bool {
    if *timer > 0 {
        *timer -= 1;
        *timer == 0
    } else {
        false
    }
}

impl StatusTimers {
    /// Advance every timer by one turn.
    ///
    /// `asleep == -1` is left alone: such sleepers stay down until woken.
    /// Confusion is consumed by the confused entity's own moves instead.
    pub fn tick(&mut self, rng: &mut impl Rng) -> StatusTick {
        let mut result = StatusTick::default();

        result.landed = count_down(&mut self.levitating);
        count_down(&mut self.asleep);
        count_down(&mut self.blinded);
        count_down(&mut self.paralyzed);

        if self.poisoned > 0 {
            result.poison_damage = rng.gen_range(2..=6);
            result.poison_death = rng.gen_bool(POISON_DEATH_CHANCE);
            result.recovered = count_down(&mut self.poisoned);
        }
        result.petrified = count_down(&mut self.turning_to_stone);
        result
    }

    /// Clear sleep, including indefinite sleep
    pub fn wake(&mut self) -> bool {
        let was_asleep = self.is_asleep();
        self.asleep = 0;
        was_asleep
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_poison_tick_damages_and_counts_down() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut timers = StatusTimers {
            poisoned: 3,
            ..Default::default()
        };
        let tick = timers.tick(&mut rng);
        assert!((2..=6).contains(&tick.poison_damage));
        assert_eq!(timers.poisoned, 2);
        assert!(!tick.recovered);

        timers.poisoned = 1;
        let tick = timers.tick(&mut rng);
        assert!(tick.poison_damage >= 2);
        assert_eq!(timers.poisoned, 0);
        assert!(tick.recovered);

        let tick = timers.tick(&mut rng);
        assert_eq!(tick.poison_damage, 0);
        assert!(!tick.recovered);
    }

    #[test]
    fn test_indefinite_sleep_survives_ticks() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut timers = StatusTimers {
            asleep: -1,
            paralyzed: 1,
            ..Default::default()
        };
        timers.tick(&mut rng);
        assert_eq!(timers.asleep, -1);
        assert_eq!(timers.paralyzed, 0);
        assert!(timers.wake());
        assert!(!timers.wake());
        assert!(timers.can_act());
    }

    #[test]
    fn test_turning_to_stone_is_fatal_at_zero() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut timers = StatusTimers {
            turning_to_stone: 2,
            ..Default::default()
        };
        assert!(!timers.tick(&mut rng).is_fatal());
        assert!(timers.tick(&mut rng).petrified);
        assert!(!timers.tick(&mut rng).petrified);
    }
}
