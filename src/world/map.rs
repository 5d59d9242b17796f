//! Map data structure
//!
//! The 2D grid representing one dungeon level, together with its rooms,
//! staircases and the visibility masks the renderer reads.

use serde::{Deserialize, Serialize};

use super::room::Room;
use super::tile::{Tile, TileType};
use super::LevelId;
use crate::ecs::Position;

/// Which way a staircase leads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Branch {
    Up,
    Left,
    Right,
}

/// A staircase on a level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stairs {
    pub pos: Position,
    /// For up stairs: where the player stood on the level above
    pub above: Option<Position>,
    pub branch: Branch,
    /// Level reached through these stairs, once it exists
    pub target: Option<LevelId>,
}

impl Stairs {
    pub fn down(pos: Position, branch: Branch) -> Self {
        Self {
            pos,
            above: None,
            branch,
            target: None,
        }
    }

    pub fn up(pos: Position, above: Option<Position>) -> Self {
        Self {
            pos,
            above,
            branch: Branch::Up,
            target: None,
        }
    }
}

/// A dungeon level map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Map {
    pub width: i32,
    pub height: i32,
    pub depth: u32,
    pub tiles: Vec<Tile>,
    /// Currently in the player's field of view
    pub visible: Vec<bool>,
    /// Ever seen
    pub explored: Vec<bool>,
    pub rooms: Vec<Room>,
    pub hidden_rooms: Vec<Room>,
    pub up: Option<Stairs>,
    pub left: Option<Stairs>,
    pub right: Option<Stairs>,
}

impl Map {
    /// Create a new map filled with walls
    pub fn new(width: i32, height: i32, depth: u32) -> Self {
        let size = (width * height) as usize;
        Self {
            width,
            height,
            depth,
            tiles: vec![Tile::default(); size],
            visible: vec![false; size],
            explored: vec![false; size],
            rooms: Vec::new(),
            hidden_rooms: Vec::new(),
            up: None,
            left: None,
            right: None,
        }
    }

    /// Convert 2D coordinates to 1D index
    #[inline]
    pub fn xy_to_idx(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Convert 1D index to 2D coordinates
    #[inline]
    pub fn idx_to_xy(&self, idx: usize) -> (i32, i32) {
        let idx = idx as i32;
        (idx % self.width, idx / self.width)
    }

    /// Check if coordinates are within bounds
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.in_bounds(pos.x, pos.y)
    }

    /// Get tile at position
    pub fn get_tile(&self, x: i32, y: i32) -> Option<&Tile> {
        if self.in_bounds(x, y) {
            Some(&self.tiles[self.xy_to_idx(x, y)])
        } else {
            None
        }
    }

    /// Set a stock tile at position
    pub fn set_tile(&mut self, x: i32, y: i32, tile_type: TileType) {
        self.set_raw_tile(x, y, tile_type.tile());
    }

    pub fn set_raw_tile(&mut self, x: i32, y: i32, tile: Tile) {
        if self.in_bounds(x, y) {
            let idx = self.xy_to_idx(x, y);
            self.tiles[idx] = tile;
        }
    }

    pub fn tile_type_at(&self, pos: Position) -> Option<TileType> {
        self.get_tile(pos.x, pos.y).and_then(|t| t.tile_type())
    }

    /// Check if a position is walkable
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.get_tile(x, y).map_or(false, |t| t.is_walkable())
    }

    /// Check if a position blocks line of sight
    pub fn is_opaque(&self, x: i32, y: i32) -> bool {
        self.get_tile(x, y).map_or(true, |t| !t.is_transparent())
    }

    pub fn is_visible(&self, pos: Position) -> bool {
        self.in_bounds(pos.x, pos.y) && self.visible[self.xy_to_idx(pos.x, pos.y)]
    }

    pub fn is_explored(&self, pos: Position) -> bool {
        self.in_bounds(pos.x, pos.y) && self.explored[self.xy_to_idx(pos.x, pos.y)]
    }

    /// Set tile visibility; seen tiles stay explored
    pub fn set_visible(&mut self, x: i32, y: i32, visible: bool) {
        if self.in_bounds(x, y) {
            let idx = self.xy_to_idx(x, y);
            self.visible[idx] = visible;
            self.explored[idx] |= visible;
        }
    }

    /// Clear all visibility (before recalculating FOV)
    pub fn clear_visibility(&mut self) {
        self.visible.iter_mut().for_each(|v| *v = false);
    }

    /// Carve a room's interior to floor
    pub fn carve_room(&mut self, room: &Room) {
        for pos in room.interior() {
            self.set_tile(pos.x, pos.y, TileType::Floor);
        }
    }

    /// Room (walls included) containing a position
    pub fn find_room(&self, pos: Position) -> Option<usize> {
        self.rooms.iter().position(|r| r.contains(pos))
    }

    pub fn is_auspicious(&self, pos: Position) -> bool {
        self.find_room(pos)
            .map_or(false, |i| self.rooms[i].auspicious > 0)
    }

    /// Per-turn decay of room buffs
    pub fn make_turn(&mut self) {
        for room in &mut self.rooms {
            room.auspicious = room.auspicious.saturating_sub(1);
        }
    }

    pub fn stairs(&self, branch: Branch) -> Option<&Stairs> {
        match branch {
            Branch::Up => self.up.as_ref(),
            Branch::Left => self.left.as_ref(),
            Branch::Right => self.right.as_ref(),
        }
    }

    pub fn stairs_mut(&mut self, branch: Branch) -> Option<&mut Stairs> {
        match branch {
            Branch::Up => self.up.as_mut(),
            Branch::Left => self.left.as_mut(),
            Branch::Right => self.right.as_mut(),
        }
    }

    /// The down staircase at a position, if any
    pub fn down_stairs_at(&self, pos: Position) -> Option<&Stairs> {
        [self.left.as_ref(), self.right.as_ref()]
            .into_iter()
            .flatten()
            .find(|s| s.pos == pos)
    }

    /// Straight walk from `start` in `dir` until walkable terrain is hit.
    ///
    /// Returns the non-walkable cells walked over (start included), or
    /// `None` if the walk leaves the map, exceeds 100 steps, or would join
    /// at a cell whose perpendicular neighbours are already open.
    pub fn find_walkable(&self, start: Position, dir: Position) -> Option<Vec<Position>> {
        let mut path = vec![start];
        let mut pos = start;
        for _ in 0..100 {
            let prev = pos;
            pos = pos + dir;
            if !self.contains(pos) {
                return None;
            }
            if self.is_walkable(pos.x, pos.y) {
                let side_open = if dir.x == 0 {
                    self.is_walkable(prev.x + 1, prev.y) || self.is_walkable(prev.x - 1, prev.y)
                } else {
                    self.is_walkable(prev.x, prev.y + 1) || self.is_walkable(prev.x, prev.y - 1)
                };
                return if side_open { None } else { Some(path) };
            }
            path.push(pos);
        }
        None
    }

    /// Positions of every walkable cell
    pub fn walkable_positions(&self) -> Vec<Position> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.is_walkable())
            .map(|(idx, _)| {
                let (x, y) = self.idx_to_xy(idx);
                Position::new(x, y)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor_map() -> Map {
        let mut map = Map::new(20, 10, 0);
        for x in 2..18 {
            map.set_tile(x, 2, TileType::Floor);
        }
        map
    }

    #[test]
    fn test_bounds_and_walkable() {
        let map = corridor_map();
        assert!(map.is_walkable(5, 2));
        assert!(!map.is_walkable(5, 3));
        assert!(!map.is_walkable(-1, 2));
        assert!(map.is_opaque(100, 100));
    }

    #[test]
    fn test_explored_accumulates() {
        let mut map = corridor_map();
        map.set_visible(3, 2, true);
        map.clear_visibility();
        assert!(!map.is_visible(Position::new(3, 2)));
        assert!(map.is_explored(Position::new(3, 2)));
    }

    #[test]
    fn test_find_walkable_straight_up() {
        let map = corridor_map();
        let path = map.find_walkable(Position::new(8, 7), Position::new(0, -1));
        assert_eq!(
            path,
            Some(vec![
                Position::new(8, 7),
                Position::new(8, 6),
                Position::new(8, 5),
                Position::new(8, 4),
                Position::new(8, 3),
            ])
        );
    }

    #[test]
    fn test_find_walkable_rejects_open_sides() {
        let mut map = corridor_map();
        map.set_tile(9, 3, TileType::Floor);
        assert_eq!(map.find_walkable(Position::new(8, 7), Position::new(0, -1)), None);
        // Walking off the map fails
        assert_eq!(map.find_walkable(Position::new(1, 5), Position::new(-1, 0)), None);
    }

    #[test]
    fn test_auspicious_decay() {
        let mut map = corridor_map();
        let mut room = Room::new(1, 1, 5, 3);
        room.auspicious = 2;
        map.rooms.push(room);
        assert!(map.is_auspicious(Position::new(3, 2)));
        map.make_turn();
        map.make_turn();
        map.make_turn();
        assert!(!map.is_auspicious(Position::new(3, 2)));
    }
}
