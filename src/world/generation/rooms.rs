//! Room and corridor dungeon generator
//!
//! Rooms are rolled inside six fixed slots and each new room is joined to
//! the previous one. A straight corridor is preferred when the rooms face
//! each other; otherwise a Z-bend, then an L-bend. Corridors may not run
//! alongside existing ones.

use std::collections::HashSet;

use rand::Rng;

use super::tunnels::{horizontal, l_line, vertical, z_line};
use super::{populate, GenContext};
use crate::ecs::Position;
use crate::entities::spawn_door;
use crate::world::{LevelId, Map, Room, TileType};

/// `(x range, y range)` of the top-left corner per slot
pub const ROOM_SLOTS: [((i32, i32), (i32, i32)); 6] = [
    ((3, 23), (3, 8)),
    ((25, 45), (3, 8)),
    ((55, 75), (3, 8)),
    ((55, 75), (16, 21)),
    ((25, 45), (16, 21)),
    ((3, 23), (16, 21)),
];

const SLOT_SKIP_CHANCE: f64 = 0.1;
const STRAIGHT_RETRIES: usize = 50;
const DOOR_CHANCE: f64 = 0.5;
const LOCKED_DOOR_CHANCE: f64 = 0.2;

/// Corridor cells carved so far on a level
#[derive(Debug, Default)]
pub struct Tunnels {
    cells: HashSet<Position>,
}

impl Tunnels {
    /// Existing corridor cell that a new tunnel would touch.
    ///
    /// Cells inside either room's interior are ignored: they are room floor.
    pub fn collision(&self, tunnel: &[Position], r1: &Room, r2: &Room) -> Option<Position> {
        tunnel
            .iter()
            .filter(|c| !r1.interior_contains(**c) && !r2.interior_contains(**c))
            .find_map(|c| {
                std::iter::once(*c)
                    .chain(c.neighbors())
                    .find(|n| self.cells.contains(n))
            })
    }

    fn record(&mut self, tunnel: &[Position], r1: &Room, r2: &Room) {
        self.cells.extend(
            tunnel
                .iter()
                .filter(|c| !r1.interior_contains(**c) && !r2.interior_contains(**c)),
        );
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Find a corridor from `r1` to `r2` that does not collide, or `None`
pub fn route(r1: &Room, r2: &Room, tunnels: &Tunnels, rng: &mut impl Rng) -> Option<Vec<Position>> {
    if let Some(rows) = r1.interval_y().inner_intersection(&r2.interval_y()) {
        let (x1, x2) = r1.closest_x(r2);
        for _ in 0..STRAIGHT_RETRIES {
            let mut y = rows.random(rng);
            let tunnel = horizontal(x1, x2, y);
            let Some(hit) = tunnels.collision(&tunnel, r1, r2) else {
                return Some(tunnel);
            };
            // jog one row away from the corridor we ran into
            if hit.y > y {
                y -= 1;
            } else if hit.y < y {
                y += 1;
            }
            let tunnel = horizontal(x1, x2, y);
            if tunnels.collision(&tunnel, r1, r2).is_none() {
                return Some(tunnel);
            }
        }
        log::debug!("Straight corridor failed after {} tries, bending", STRAIGHT_RETRIES);
    } else if let Some(cols) = r1.interval_x().inner_intersection(&r2.interval_x()) {
        let x = cols.random(rng);
        let (y1, y2) = r1.closest_y(r2);
        let tunnel = vertical(y1, y2, x);
        if tunnels.collision(&tunnel, r1, r2).is_none() {
            return Some(tunnel);
        }
    }
    bend(r1, r2, tunnels)
}

/// Z-bend between centers, then L-bend
fn bend(r1: &Room, r2: &Room, tunnels: &Tunnels) -> Option<Vec<Position>> {
    let z = z_line(r1.center(), r2.center());
    if tunnels.collision(&z, r1, r2).is_none() {
        return Some(z);
    }
    let l = l_line(r1.center(), r2.center());
    if tunnels.collision(&l, r1, r2).is_none() {
        return Some(l);
    }
    None
}

/// Carve a routed corridor, maybe add a door at `r1`'s wall and record entries
fn carve_tunnel(
    ctx: &mut GenContext<'_>,
    map: &mut Map,
    level: LevelId,
    tunnel: &[Position],
    r1: usize,
    r2: &mut Room,
) {
    if ctx.rng.gen_bool(DOOR_CHANCE) {
        if let Some(pos) = tunnel.iter().find(|p| map.rooms[r1].is_wall(**p)) {
            let locked = ctx.rng.gen_bool(LOCKED_DOOR_CHANCE);
            spawn_door(ctx.world, *pos, level, locked);
        }
    }
    for pos in tunnel {
        map.set_tile(pos.x, pos.y, TileType::Floor);
        if map.rooms[r1].is_wall(*pos) {
            map.rooms[r1].entries.push(*pos);
        } else if r2.is_wall(*pos) {
            r2.entries.push(*pos);
        }
    }
}

/// Place, connect and populate rooms. Returns the first room's center.
pub(super) fn place_rooms(
    ctx: &mut GenContext<'_>,
    map: &mut Map,
    level: LevelId,
    reserved: &mut Vec<Position>,
) -> Option<Position> {
    let config = ctx.config;
    let mut tunnels = Tunnels::default();
    let mut first_center = None;

    for ((x_lo, x_hi), (y_lo, y_hi)) in ROOM_SLOTS.iter().copied().take(config.max_rooms) {
        if ctx.rng.gen_bool(SLOT_SKIP_CHANCE) {
            continue;
        }
        let w = ctx.rng.gen_range(config.room_min_size..=config.room_max_size);
        let h = ctx.rng.gen_range(config.room_min_size..=config.room_max_size);
        let x = ctx.rng.gen_range(x_lo..=x_hi);
        let y = ctx.rng.gen_range(y_lo..=y_hi);
        let w = w.min(map.width - x - 1).max(0);
        let h = h.min(map.height - y - 1).max(0);
        if w < 2 || h < 2 {
            continue;
        }

        let mut room = Room::new(x, y, w, h);
        if map.rooms.iter().any(|other| room.intersects(other)) {
            continue;
        }

        if let Some(prev) = map.rooms.len().checked_sub(1) {
            let Some(tunnel) = route(&map.rooms[prev], &room, &tunnels, ctx.rng) else {
                log::debug!("No corridor to room at ({}, {}), skipping it", x, y);
                continue;
            };
            carve_tunnel(ctx, map, level, &tunnel, prev, &mut room);
            tunnels.record(&tunnel, &map.rooms[prev], &room);
        } else {
            first_center = Some(room.center());
            if map.depth == 0 {
                reserved.push(room.center());
            }
        }

        map.carve_room(&room);
        map.rooms.push(room);
        let index = map.rooms.len() - 1;
        populate::populate_room(ctx, map, level, index, reserved);
        populate::place_special(ctx, map, level, index, reserved);
    }

    first_center
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_facing_rooms_get_straight_corridor() {
        let mut rng = StdRng::seed_from_u64(2);
        let a = Room::new(3, 3, 8, 8);
        let b = Room::new(25, 4, 8, 8);
        let tunnel = route(&a, &b, &Tunnels::default(), &mut rng).unwrap_or_default();
        assert!(!tunnel.is_empty());
        let y = tunnel[0].y;
        assert!(tunnel.iter().all(|p| p.y == y));
        assert_eq!(tunnel.first().map(|p| p.x), Some(11));
        assert_eq!(tunnel.last().map(|p| p.x), Some(25));
    }

    #[test]
    fn test_stacked_rooms_get_vertical_corridor() {
        let mut rng = StdRng::seed_from_u64(4);
        let a = Room::new(5, 3, 10, 6);
        let b = Room::new(7, 16, 10, 6);
        let tunnel = route(&a, &b, &Tunnels::default(), &mut rng).unwrap_or_default();
        let x = tunnel[0].x;
        assert!(tunnel.iter().all(|p| p.x == x));
        assert_eq!(tunnel.first().map(|p| p.y), Some(9));
        assert_eq!(tunnel.last().map(|p| p.y), Some(16));
    }

    #[test]
    fn test_corridor_fallback_to_l_bend() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = Room::new(3, 3, 6, 6); // center (6, 6)
        let b = Room::new(30, 20, 6, 6); // center (33, 23)
        // Existing corridor crossing the Z-bend's vertical jog at x = 19
        let mut tunnels = Tunnels::default();
        let blocker = Room::new(0, 0, 0, 0);
        tunnels.record(&vertical(10, 16, 19), &blocker, &blocker);

        let z = z_line(a.center(), b.center());
        assert!(tunnels.collision(&z, &a, &b).is_some());
        let l = l_line(a.center(), b.center());
        assert!(tunnels.collision(&l, &a, &b).is_none());

        assert_eq!(route(&a, &b, &tunnels, &mut rng), Some(l));
    }

    #[test]
    fn test_corridor_fallback_gives_up_when_both_bends_collide() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = Room::new(3, 3, 6, 6);
        let b = Room::new(30, 20, 6, 6);
        let mut tunnels = Tunnels::default();
        let blocker = Room::new(0, 0, 0, 0);
        tunnels.record(&vertical(10, 16, 19), &blocker, &blocker);
        tunnels.record(&horizontal(15, 22, 10), &blocker, &blocker);
        tunnels.record(&vertical(10, 16, 33), &blocker, &blocker);
        assert_eq!(route(&a, &b, &tunnels, &mut rng), None);
    }
}
