//! Rectangular rooms
//!
//! Walls sit on `x1`, `x2`, `y1`, `y2`; the interior is strictly inside.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ecs::Position;

/// A rectangular room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    /// Turns of combat bonus left for occupants
    pub auspicious: u32,
    /// Wall cells where a corridor attaches
    pub entries: Vec<Position>,
}

impl Room {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
            auspicious: 0,
            entries: Vec::new(),
        }
    }

    pub fn center(&self) -> Position {
        Position::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    /// Overlap test with a 1-tile margin
    pub fn intersects(&self, other: &Room) -> bool {
        self.x1 - 1 <= other.x2
            && self.x2 + 1 >= other.x1
            && self.y1 - 1 <= other.y2
            && self.y2 + 1 >= other.y1
    }

    /// Inside the rectangle, walls included
    pub fn contains(&self, pos: Position) -> bool {
        self.x1 <= pos.x && pos.x <= self.x2 && self.y1 <= pos.y && pos.y <= self.y2
    }

    /// Strictly inside the walls
    pub fn interior_contains(&self, pos: Position) -> bool {
        self.x1 < pos.x && pos.x < self.x2 && self.y1 < pos.y && pos.y < self.y2
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.contains(pos) && !self.interior_contains(pos)
    }

    pub fn interior(&self) -> impl Iterator<Item = Position> + '_ {
        (self.y1 + 1..self.y2).flat_map(move |y| (self.x1 + 1..self.x2).map(move |x| Position::new(x, y)))
    }

    /// Interior cells that do not touch a wall
    pub fn safe_interior(&self) -> Vec<Position> {
        let mut cells = Vec::new();
        for y in self.y1 + 2..self.y2 - 1 {
            for x in self.x1 + 2..self.x2 - 1 {
                cells.push(Position::new(x, y));
            }
        }
        cells
    }

    /// Random interior cell
    pub fn random_interior(&self, rng: &mut impl Rng) -> Position {
        Position::new(
            rng.gen_range(self.x1 + 1..=(self.x2 - 1).max(self.x1 + 1)),
            rng.gen_range(self.y1 + 1..=(self.y2 - 1).max(self.y1 + 1)),
        )
    }

    pub fn interval_x(&self) -> Interval {
        Interval::new(self.x1, self.x2)
    }

    pub fn interval_y(&self) -> Interval {
        Interval::new(self.y1, self.y2)
    }

    /// Facing wall columns: `(other's near wall, own near wall)`
    pub fn closest_x(&self, other: &Room) -> (i32, i32) {
        if other.x1 > self.x2 {
            (other.x1, self.x2)
        } else {
            (other.x2, self.x1)
        }
    }

    /// Facing wall rows: `(other's near wall, own near wall)`
    pub fn closest_y(&self, other: &Room) -> (i32, i32) {
        if other.y1 > self.y2 {
            (other.y1, self.y2)
        } else {
            (other.y2, self.y1)
        }
    }
}

/// Closed integer interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub a: i32,
    pub b: i32,
}

impl Interval {
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Shrunk by 2 on both ends
    pub fn inner(&self) -> Interval {
        Interval::new(self.a + 2, self.b - 2)
    }

    pub fn intersection(&self, other: &Interval) -> Option<Interval> {
        let c = self.a.max(other.a);
        let d = self.b.min(other.b);
        (d >= c).then(|| Interval::new(c, d))
    }

    pub fn inner_intersection(&self, other: &Interval) -> Option<Interval> {
        self.inner().intersection(&other.inner())
    }

    pub fn random(&self, rng: &mut impl Rng) -> i32 {
        rng.gen_range(self.a..=self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersects_uses_margin() {
        let a = Room::new(3, 3, 6, 6); // walls 3..=9
        let touching = Room::new(10, 3, 6, 6); // one cell gap column would be 10
        assert!(a.intersects(&touching));
        let apart = Room::new(11, 3, 6, 6);
        assert!(!a.intersects(&apart));
        assert!(!apart.intersects(&a));
    }

    #[test]
    fn test_interior_and_walls() {
        let r = Room::new(0, 0, 4, 4);
        assert_eq!(r.interior().count(), 9);
        assert!(r.is_wall(Position::new(0, 2)));
        assert!(r.is_wall(Position::new(4, 4)));
        assert!(!r.is_wall(Position::new(2, 2)));
        assert_eq!(r.safe_interior(), vec![Position::new(2, 2)]);
    }

    #[test]
    fn test_interval_inner_intersection() {
        let a = Interval::new(3, 12);
        let b = Interval::new(8, 20);
        assert_eq!(a.inner_intersection(&b), Some(Interval::new(10, 10)));
        let c = Interval::new(11, 20);
        assert_eq!(a.inner_intersection(&c), None);
    }

    #[test]
    fn test_closest_walls() {
        let left = Room::new(3, 3, 6, 6);
        let right = Room::new(25, 4, 6, 6);
        assert_eq!(left.closest_x(&right), (25, 9));
        assert_eq!(right.closest_x(&left), (9, 25));
    }
}
