//! Corridor shapes
//!
//! Straight, Z-shaped and L-shaped lines of cells. Every shape is a
//! 4-connected run from one end to the other.

use crate::ecs::Position;

/// Horizontal run at row `y` between two columns (inclusive, ascending)
pub fn horizontal(x1: i32, x2: i32, y: i32) -> Vec<Position> {
    (x1.min(x2)..=x1.max(x2)).map(|x| Position::new(x, y)).collect()
}

/// Vertical run at column `x` between two rows (inclusive, ascending)
pub fn vertical(y1: i32, y2: i32, x: i32) -> Vec<Position> {
    (y1.min(y2)..=y1.max(y2)).map(|y| Position::new(x, y)).collect()
}

/// Z-shaped line: split along the longer axis at its midpoint
pub fn z_line(a: Position, b: Position) -> Vec<Position> {
    let mut cells = Vec::new();
    if (a.x - b.x).abs() > (a.y - b.y).abs() {
        let (a, b) = if a.x > b.x { (b, a) } else { (a, b) };
        let m = a.x + (b.x - a.x) / 2;
        cells.extend(horizontal(a.x, m, a.y));
        cells.extend(vertical(a.y, b.y, m));
        cells.extend(horizontal(m, b.x, b.y));
    } else {
        let (a, b) = if a.y > b.y { (b, a) } else { (a, b) };
        let m = a.y + (b.y - a.y) / 2;
        cells.extend(vertical(a.y, m, a.x));
        cells.extend(horizontal(a.x, b.x, m));
        cells.extend(vertical(m, b.y, b.x));
    }
    cells
}

/// L-shaped line: horizontal from the leftmost end, then vertical
pub fn l_line(a: Position, b: Position) -> Vec<Position> {
    let (a, b) = if a.x > b.x { (b, a) } else { (a, b) };
    let mut cells = horizontal(a.x, b.x, a.y);
    cells.extend(vertical(a.y, b.y, b.x));
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_connected(cells: &[Position]) -> bool {
        // Every cell touches another cell of the line
        cells.len() < 2
            || cells.iter().all(|c| {
                cells
                    .iter()
                    .any(|o| o != c && (c.x - o.x).abs() + (c.y - o.y).abs() <= 1)
            })
    }

    #[test]
    fn test_z_line_wide() {
        let cells = z_line(Position::new(20, 10), Position::new(4, 5));
        assert!(cells.contains(&Position::new(4, 5)));
        assert!(cells.contains(&Position::new(20, 10)));
        // Vertical jog at the midpoint column
        assert!(cells.contains(&Position::new(12, 7)));
        assert!(is_connected(&cells));
    }

    #[test]
    fn test_z_line_tall() {
        let cells = z_line(Position::new(5, 2), Position::new(8, 20));
        assert!(cells.contains(&Position::new(6, 11)));
        assert!(is_connected(&cells));
    }

    #[test]
    fn test_l_line_corner() {
        let cells = l_line(Position::new(10, 3), Position::new(2, 9));
        assert!(cells.contains(&Position::new(10, 9)));
        assert!(cells.contains(&Position::new(2, 9)));
        assert!(cells.contains(&Position::new(10, 3)));
        assert!(is_connected(&cells));
    }
}
