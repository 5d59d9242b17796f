//! ECS Components
//!
//! All components used by the simulation's entity-component system.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::entities::MonsterKind;
use crate::items::{Equipment, Inventory, Item};
use crate::world::LevelId;

// ============================================================================
// Position & Movement
// ============================================================================

/// Position on a level grid. `(0, 0)` is an ordinary, valid location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by a delta
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Chebyshev distance (allows diagonal)
    pub fn chebyshev_distance(&self, other: &Position) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Raw delta towards another position (not normalized)
    pub fn direction_to(&self, other: &Position) -> Position {
        Position::new(other.x - self.x, other.y - self.y)
    }

    /// The 8 surrounding positions
    pub fn neighbors(&self) -> impl Iterator<Item = Position> + '_ {
        Direction::ALL.iter().map(move |d| *self + d.delta())
    }

    pub fn is_adjacent(&self, other: &Position) -> bool {
        self != other && self.chebyshev_distance(other) <= 1
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// One of the 8 compass directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    pub fn delta(&self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
            Direction::NorthEast => Position::new(1, -1),
            Direction::NorthWest => Position::new(-1, -1),
            Direction::SouthEast => Position::new(1, 1),
            Direction::SouthWest => Position::new(-1, 1),
        }
    }

    /// The direction whose delta is exactly `delta`
    pub fn from_delta(delta: Position) -> Option<Direction> {
        Direction::ALL.iter().copied().find(|d| d.delta() == delta)
    }

    pub fn is_cardinal(&self) -> bool {
        matches!(self, Direction::North | Direction::South | Direction::East | Direction::West)
    }

    /// Parse a vi-key (`hjklyubn`)
    pub fn from_key(key: char) -> Option<Direction> {
        match key {
            'h' => Some(Direction::West),
            'j' => Some(Direction::South),
            'k' => Some(Direction::North),
            'l' => Some(Direction::East),
            'y' => Some(Direction::NorthWest),
            'u' => Some(Direction::NorthEast),
            'b' => Some(Direction::SouthWest),
            'n' => Some(Direction::SouthEast),
            _ => None,
        }
    }
}

/// The level an entity is placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OnLevel(pub LevelId);

// ============================================================================
// Rendering
// ============================================================================

/// Visual representation of an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Renderable {
    /// Character to display
    pub glyph: char,
    /// Foreground color (RGB)
    pub fg: (u8, u8, u8),
    /// Render order (higher = on top)
    pub render_order: i32,
}

impl Renderable {
    pub fn new(glyph: char, fg: (u8, u8, u8)) -> Self {
        Self {
            glyph,
            fg,
            render_order: 0,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.render_order = order;
        self
    }
}

/// Draw priorities
pub mod render_order {
    pub const CORPSE: i32 = 1;
    pub const ITEM: i32 = 2;
    pub const ACTOR: i32 = 3;
}

// ============================================================================
// Identity & Naming
// ============================================================================

/// Name component for entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Marks an entity as the player
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Player;

/// Marks a monster and remembers its kind (for stat lookups and hooks)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub kind: MonsterKind,
}

/// What a peaceful character offers the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NpcRole {
    /// Buys and sells items for gold
    Merchant,
    QuestGiver,
}

/// Marks a peaceful special character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    pub role: NpcRole,
}

/// Hostile AI state. Removed when the entity dies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hostile {
    /// Cached path towards the last seen target
    pub path: Vec<Position>,
}

/// Occupies its tile exclusively
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BlocksMovement;

/// Inert leftovers of a dead living entity
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Remains;

// ============================================================================
// Combat Stats
// ============================================================================

/// Hit points and base combat stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub max_hp: i32,
    hp: i32,
    pub base_defense: i32,
    pub base_power: i32,
    dead: bool,
}

impl Fighter {
    pub fn new(hp: i32, defense: i32, power: i32) -> Self {
        Self {
            max_hp: hp,
            hp,
            base_defense: defense,
            base_power: power,
            dead: false,
        }
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    /// Set hp, clamped to `[0, max_hp]`.
    /// Returns true only on the call that brings a living fighter to 0.
    pub fn set_hp(&mut self, value: i32) -> bool {
        self.hp = value.clamp(0, self.max_hp);
        if self.hp == 0 && !self.dead {
            self.dead = true;
            return true;
        }
        false
    }

    /// Apply damage. Returns true if this damage killed the fighter.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        self.set_hp(self.hp - amount)
    }

    /// Heal, returning the amount actually recovered
    pub fn heal(&mut self, amount: i32) -> i32 {
        if self.dead || self.hp == self.max_hp {
            return 0;
        }
        let before = self.hp;
        self.set_hp(self.hp + amount);
        self.hp - before
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }
}

/// Character progression
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CharLevel {
    pub level: u32,
    pub current_xp: u32,
    pub level_up_base: u32,
    pub level_up_factor: u32,
    /// Experience awarded to the player for killing this entity
    pub xp_given: u32,
}

/// Turn-based status timers. Zero means inactive; `asleep == -1` sleeps until woken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTimers {
    pub asleep: i32,
    pub poisoned: i32,
    pub paralyzed: i32,
    pub confused: i32,
    pub blinded: i32,
    pub turning_to_stone: i32,
    pub levitating: i32,
}

impl StatusTimers {
    pub fn is_asleep(&self) -> bool {
        self.asleep != 0
    }

    /// Whether the entity can take an action this turn
    pub fn can_act(&self) -> bool {
        !self.is_asleep() && self.paralyzed <= 0
    }
}

// ============================================================================
// Items & Containers
// ============================================================================

/// An item lying on the floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundItem {
    pub item: Item,
}

/// Carried items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryComponent {
    pub inventory: Inventory,
}

/// Equipped items (ids into the owner's inventory)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentComponent {
    pub equipment: Equipment,
}

/// A door placed where a corridor meets a room wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub closed: bool,
    pub locked: bool,
}

impl Door {
    pub fn glyph(&self) -> char {
        if self.closed {
            '+'
        } else {
            '\''
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_a_real_location() {
        let origin = Position::new(0, 0);
        let some: Option<Position> = Some(origin);
        assert_eq!(some, Some(Position::new(0, 0)));
        assert_ne!(some, None);
        assert!(origin.is_adjacent(&Position::new(1, 1)));
    }

    #[test]
    fn test_chebyshev_and_direction() {
        let a = Position::new(2, 3);
        let b = Position::new(5, 1);
        assert_eq!(a.chebyshev_distance(&b), 3);
        assert_eq!(a.direction_to(&b), Position::new(3, -2));
        assert_eq!(a + Position::new(3, -2), b);
        assert_eq!(a.neighbors().count(), 8);
    }

    #[test]
    fn test_hp_clamps_and_dies_once() {
        let mut f = Fighter::new(10, 0, 1);
        assert!(!f.take_damage(4));
        assert_eq!(f.hp(), 6);
        assert_eq!(f.heal(100), 4);
        assert_eq!(f.hp(), 10);
        assert!(f.take_damage(50));
        assert_eq!(f.hp(), 0);
        // Further damage never re-triggers death
        assert!(!f.take_damage(5));
        assert!(!f.set_hp(0));
        assert_eq!(f.heal(5), 0);
        assert!(f.is_dead());
    }

    #[test]
    fn test_hp_stays_in_bounds_for_mixed_sequence() {
        let mut f = Fighter::new(20, 0, 1);
        let mut deaths = 0;
        for (i, delta) in [3, -30, 7, 12, -4, 25, -1, 40, 2, -2].iter().enumerate() {
            let died = if *delta > 0 {
                f.take_damage(*delta)
            } else {
                f.heal(-delta);
                false
            };
            if died {
                deaths += 1;
            }
            assert!(f.hp() >= 0 && f.hp() <= f.max_hp, "step {}", i);
        }
        assert_eq!(deaths, 1);
    }

    #[test]
    fn test_status_can_act() {
        let mut s = StatusTimers::default();
        assert!(s.can_act());
        s.asleep = -1;
        assert!(!s.can_act());
        s.asleep = 0;
        s.paralyzed = 2;
        assert!(!s.can_act());
    }
}
