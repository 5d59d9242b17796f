//! Staircase placement
//!
//! Down stairs go on safe interior cells of random rooms. Two attempts are
//! made; when both succeed the stairs are ordered by position into left
//! and right. Up stairs are mandatory below the root level.

use rand::seq::SliceRandom;
use rand::Rng;

use super::populate::is_free;
use super::{GenContext, GenerationError};
use crate::ecs::Position;
use crate::world::{Branch, LevelId, Map, Stairs, TileType};

const STAIR_TRIES: usize = 50;
const DOWN_STAIRS_CHANCE: f64 = 0.9;

/// Pick a free safe-interior cell of a random room, avoiding `exclude`
fn pick_cell(
    ctx: &mut GenContext<'_>,
    map: &Map,
    level: LevelId,
    exclude: &[Position],
    reserved: &[Position],
) -> Option<Position> {
    for _ in 0..STAIR_TRIES {
        let room = map.rooms.choose(ctx.rng)?;
        let cells: Vec<Position> = room
            .safe_interior()
            .into_iter()
            .filter(|p| !exclude.contains(p))
            .collect();
        let Some(pos) = cells.choose(ctx.rng).copied() else {
            continue;
        };
        if is_free(ctx, level, pos, reserved) {
            return Some(pos);
        }
    }
    None
}

/// Place down stairs (unless `allow_down` is false) and, below the root, up stairs
pub(super) fn place_stairs(
    ctx: &mut GenContext<'_>,
    map: &mut Map,
    level: LevelId,
    allow_down: bool,
    came_from: Option<Position>,
    reserved: &[Position],
) -> Result<(), GenerationError> {
    let mut down: Vec<Position> = Vec::new();

    if allow_down {
        if ctx.rng.gen_bool(DOWN_STAIRS_CHANCE) {
            if let Some(pos) = pick_cell(ctx, map, level, &down, reserved) {
                down.push(pos);
            }
        }
        if down.is_empty() || ctx.rng.gen_bool(DOWN_STAIRS_CHANCE) {
            if let Some(pos) = pick_cell(ctx, map, level, &down, reserved) {
                down.push(pos);
            }
        }
    }

    match down.as_mut_slice() {
        [a, b] => {
            if *b < *a {
                std::mem::swap(a, b);
            }
            map.left = Some(Stairs::down(*a, Branch::Left));
            map.right = Some(Stairs::down(*b, Branch::Right));
        }
        [a] => {
            if ctx.rng.gen_bool(0.5) {
                map.left = Some(Stairs::down(*a, Branch::Left));
            } else {
                map.right = Some(Stairs::down(*a, Branch::Right));
            }
        }
        _ => log::debug!("No down stairs on depth {}", map.depth),
    }
    for pos in &down {
        map.set_tile(pos.x, pos.y, TileType::StairsDown);
    }

    if map.depth > 0 {
        let pos = pick_cell(ctx, map, level, &down, reserved).ok_or(
            GenerationError::NoUpStairsLocation { depth: map.depth },
        )?;
        map.set_tile(pos.x, pos.y, TileType::StairsUp);
        map.up = Some(Stairs::up(pos, came_from));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::generation::tests::TestSession;
    use crate::world::Room;

    fn two_room_map(depth: u32) -> Map {
        let mut map = Map::new(60, 30, depth);
        for room in [Room::new(2, 2, 10, 10), Room::new(30, 5, 10, 10)] {
            map.carve_room(&room);
            map.rooms.push(room);
        }
        map
    }

    #[test]
    fn test_left_sorts_before_right() {
        for seed in 0..30 {
            let mut session = TestSession::new(seed);
            let mut ctx = session.ctx();
            let mut map = two_room_map(2);
            let came_from = Some(Position::new(0, 0));
            assert!(place_stairs(&mut ctx, &mut map, LevelId(1), true, came_from, &[]).is_ok());
            if let (Some(l), Some(r)) = (&map.left, &map.right) {
                assert!(l.pos < r.pos);
                assert_ne!(l.pos, r.pos);
            }
            let up = map.up.as_ref().map(|s| (s.above, s.branch));
            assert_eq!(up, Some((came_from, Branch::Up)));
            let up_tile = map.up.as_ref().and_then(|s| map.tile_type_at(s.pos));
            assert_eq!(up_tile, Some(TileType::StairsUp));
        }
    }

    #[test]
    fn test_no_down_stairs_at_level_cap() {
        let mut session = TestSession::new(3);
        let mut ctx = session.ctx();
        let mut map = two_room_map(0);
        assert!(place_stairs(&mut ctx, &mut map, LevelId(0), false, None, &[]).is_ok());
        assert!(map.left.is_none() && map.right.is_none() && map.up.is_none());
    }

    #[test]
    fn test_missing_up_stairs_is_fatal() {
        let mut session = TestSession::new(3);
        let mut ctx = session.ctx();
        let mut map = Map::new(20, 20, 4);
        // Too small for a safe interior cell
        let room = Room::new(2, 2, 3, 3);
        map.carve_room(&room);
        map.rooms.push(room);
        let result = place_stairs(&mut ctx, &mut map, LevelId(0), true, None, &[]);
        assert!(matches!(result, Err(GenerationError::NoUpStairsLocation { depth: 4 })));
    }
}
