//! Hidden room carving
//!
//! A tiny sealed room joined to the rest of the level by a straight
//! passage whose last cell looks like wall until searched for.

use rand::Rng;

use crate::ecs::Position;
use crate::world::{Map, Room, TileType};

const HIDDEN_ROOM_TRIES: usize = 50;
const HIDDEN_ROOM_SIZE: i32 = 3;

/// Straight passage from the room's walls to walkable terrain, trying
/// north, west, east and south in that order
fn find_passage(map: &Map, room: &Room) -> Option<Vec<Position>> {
    let candidates = [
        (Position::new(room.x1 + 1, room.y1), Position::new(0, -1)),
        (Position::new(room.x1, room.y1 + 1), Position::new(-1, 0)),
        (Position::new(room.x2, room.y2 - 1), Position::new(1, 0)),
        (Position::new(room.x2 - 1, room.y2), Position::new(0, 1)),
    ];
    candidates
        .iter()
        .find_map(|(start, dir)| map.find_walkable(*start, *dir))
}

/// Try to carve a hidden room. Returns the room on success.
pub fn carve_hidden_room(map: &mut Map, rng: &mut impl Rng) -> Option<Room> {
    let max_x = map.width - HIDDEN_ROOM_SIZE - 2;
    let max_y = map.height - HIDDEN_ROOM_SIZE - 2;
    if max_x < 3 || max_y < 3 {
        return None;
    }

    for _ in 0..HIDDEN_ROOM_TRIES {
        let x = rng.gen_range(3..=max_x);
        let y = rng.gen_range(3..=max_y);
        let room = Room::new(x, y, HIDDEN_ROOM_SIZE, HIDDEN_ROOM_SIZE);
        if map.rooms.iter().any(|r| room.intersects(r)) {
            continue;
        }
        let sealed = (room.y1..=room.y2)
            .flat_map(|y| (room.x1..=room.x2).map(move |x| (x, y)))
            .all(|(x, y)| !map.is_walkable(x, y));
        if !sealed {
            continue;
        }
        let Some(path) = find_passage(map, &room) else {
            continue;
        };

        let (last, rest) = path.split_last()?;
        for pos in rest {
            map.set_tile(pos.x, pos.y, TileType::Floor);
        }
        map.set_tile(last.x, last.y, TileType::HiddenPassage);
        map.carve_room(&room);
        log::debug!("Hidden room at ({}, {}), passage ends at ({}, {})", x, y, last.x, last.y);
        map.hidden_rooms.push(room.clone());
        return Some(room);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hidden_room_joins_existing_floor() {
        let mut map = Map::new(40, 30, 1);
        // One long hall across the middle
        let hall = Room::new(1, 12, 37, 4);
        map.carve_room(&hall);
        map.rooms.push(hall);

        let mut rng = StdRng::seed_from_u64(12);
        let room = carve_hidden_room(&mut map, &mut rng);
        let Some(room) = room else {
            panic!("expected a hidden room");
        };

        assert_eq!(room.interior().count(), 4);
        assert!(room.interior().all(|p| map.is_walkable(p.x, p.y)));
        let passages: Vec<Position> = (0..map.tiles.len())
            .map(|i| {
                let (x, y) = map.idx_to_xy(i);
                Position::new(x, y)
            })
            .filter(|p| map.tile_type_at(*p) == Some(TileType::HiddenPassage))
            .collect();
        assert_eq!(passages.len(), 1);
        // The passage is not walkable until revealed
        assert!(passages.iter().all(|p| !map.is_walkable(p.x, p.y)));
    }

    #[test]
    fn test_no_hidden_room_without_floor() {
        let mut map = Map::new(30, 30, 1);
        let mut rng = StdRng::seed_from_u64(1);
        assert!(carve_hidden_room(&mut map, &mut rng).is_none());
        assert!(map.hidden_rooms.is_empty());
    }
}
