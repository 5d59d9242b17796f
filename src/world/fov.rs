//! Field of View calculation
//!
//! Symmetric shadowcasting: if A can see B then B can see A. Slopes are
//! kept as integer fractions so results never depend on float rounding.

use super::Map;
use crate::ecs::Position;

/// Compute field of view from a position with given radius.
///
/// Clears the previous visible mask, marks the new one (which also
/// accumulates into `explored`) and returns the visible positions.
pub fn compute_fov(map: &mut Map, origin: Position, radius: i32) -> Vec<Position> {
    let mut visible = Vec::new();

    map.clear_visibility();

    if map.contains(origin) {
        map.set_visible(origin.x, origin.y, true);
        visible.push(origin);
    }

    for quadrant in [Quadrant::North, Quadrant::East, Quadrant::South, Quadrant::West] {
        let first = Row {
            depth: 1,
            start: Slope::new(-1, 1),
            end: Slope::new(1, 1),
        };
        scan(map, &mut visible, origin, radius, quadrant, first);
    }

    visible
}

#[derive(Debug, Clone, Copy)]
enum Quadrant {
    North,
    East,
    South,
    West,
}

impl Quadrant {
    fn transform(&self, origin: Position, depth: i32, col: i32) -> Position {
        match self {
            Quadrant::North => Position::new(origin.x + col, origin.y - depth),
            Quadrant::South => Position::new(origin.x + col, origin.y + depth),
            Quadrant::East => Position::new(origin.x + depth, origin.y + col),
            Quadrant::West => Position::new(origin.x - depth, origin.y + col),
        }
    }
}

/// `num / den`, `den > 0`
#[derive(Debug, Clone, Copy)]
struct Slope {
    num: i32,
    den: i32,
}

impl Slope {
    fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Slope through the leading edge of a tile
    fn of_tile(depth: i32, col: i32) -> Self {
        Self::new(2 * col - 1, 2 * depth)
    }
}

#[derive(Debug, Clone, Copy)]
struct Row {
    depth: i32,
    start: Slope,
    end: Slope,
}

impl Row {
    fn min_col(&self) -> i32 {
        // round half up of depth * start
        let n = self.depth * self.start.num;
        let d = self.start.den;
        (2 * n + d).div_euclid(2 * d)
    }

    fn max_col(&self) -> i32 {
        // round half down of depth * end
        let n = self.depth * self.end.num;
        let d = self.end.den;
        -((d - 2 * n).div_euclid(2 * d))
    }

    fn is_symmetric(&self, col: i32) -> bool {
        col * self.start.den >= self.depth * self.start.num
            && col * self.end.den <= self.depth * self.end.num
    }

    fn next(&self) -> Row {
        Row {
            depth: self.depth + 1,
            ..*self
        }
    }
}

/// Scan one row of a quadrant, recursing into the rows behind it
fn scan(
    map: &mut Map,
    visible: &mut Vec<Position>,
    origin: Position,
    radius: i32,
    quadrant: Quadrant,
    mut row: Row,
) {
    if row.depth > radius {
        return;
    }

    let mut prev_wall: Option<bool> = None;

    for col in row.min_col()..=row.max_col() {
        let pos = quadrant.transform(origin, row.depth, col);
        let is_wall = map.is_opaque(pos.x, pos.y);

        if is_wall || row.is_symmetric(col) {
            let d = pos - origin;
            if d.x * d.x + d.y * d.y <= radius * radius && map.contains(pos) {
                map.set_visible(pos.x, pos.y, true);
                visible.push(pos);
            }
        }

        if prev_wall == Some(true) && !is_wall {
            row.start = Slope::of_tile(row.depth, col);
        }
        if prev_wall == Some(false) && is_wall {
            let mut next = row.next();
            next.end = Slope::of_tile(row.depth, col);
            scan(map, visible, origin, radius, quadrant, next);
        }

        prev_wall = Some(is_wall);
    }

    if prev_wall == Some(false) {
        scan(map, visible, origin, radius, quadrant, row.next());
    }
}
