//! Room population
//!
//! Fills a freshly carved room with monsters and items drawn from the
//! depth-weighted spawn tables, plus any unique placement registered for
//! the room.

use hecs::Entity;
use rand::seq::SliceRandom;
use rand::Rng;

use super::GenContext;
use crate::data::{choose_at_random, placement_for, SpecialSpawn, ITEM_CHANCES, MONSTER_CHANCES};
use crate::ecs::{queries, Position};
use crate::entities::{roll_companions, spawn_ground_item, spawn_monster, MonsterKind};
use crate::items::{Item, ItemKind};
use crate::world::{LevelId, Map};

const ASLEEP_CHANCE: f64 = 0.5;
const LOCKED_BOX_CHANCE: f64 = 0.95;
const SPECIAL_TRIES: usize = 50;

/// Whether a cell may receive a new entity
pub(super) fn is_free(ctx: &GenContext<'_>, level: LevelId, pos: Position, reserved: &[Position]) -> bool {
    !reserved.contains(&pos) && !queries::is_occupied(ctx.world, level, pos)
}

/// Create an item; boxes are usually locked and hold up to two random items
pub fn create_item(ctx: &mut GenContext<'_>, kind: ItemKind, depth: u32) -> Item {
    let mut item = ctx.ids.create(kind);
    if item.is_container() {
        item.locked = ctx.rng.gen_bool(LOCKED_BOX_CHANCE);
        let count = ctx.rng.gen_range(0..=2);
        for kind in choose_at_random(ITEM_CHANCES, depth, count, ctx.rng) {
            if kind != ItemKind::Box {
                item.contents.push(ctx.ids.create(kind));
            }
        }
    }
    item
}

/// Spawn a monster with its kind's loadout, random table items and a lightning scroll
pub fn spawn_living(
    ctx: &mut GenContext<'_>,
    kind: MonsterKind,
    pos: Position,
    level: LevelId,
    depth: u32,
) -> Entity {
    let mut items: Vec<Item> = kind
        .def()
        .loadout
        .iter()
        .map(|k| ctx.ids.create(*k))
        .collect();
    let count = ctx.rng.gen_range(0..=2);
    for item_kind in choose_at_random(ITEM_CHANCES, depth, count, ctx.rng) {
        items.push(ctx.ids.create(item_kind));
    }
    items.push(ctx.ids.create(ItemKind::LightningScroll));
    let asleep = ctx.rng.gen_bool(ASLEEP_CHANCE);
    spawn_monster(ctx.world, kind, pos, level, items, asleep)
}

/// Roll 0-2 monsters and 0-2 items into a room, skipping occupied cells
pub(super) fn populate_room(
    ctx: &mut GenContext<'_>,
    map: &Map,
    level: LevelId,
    room: usize,
    reserved: &[Position],
) {
    let depth = map.depth;
    let n_monsters = ctx.rng.gen_range(0..=2);
    let monsters = choose_at_random(MONSTER_CHANCES, depth, n_monsters, ctx.rng);
    let n_items = ctx.rng.gen_range(0..=2);
    let items = choose_at_random(ITEM_CHANCES, depth, n_items, ctx.rng);

    for kind in monsters {
        let pos = map.rooms[room].random_interior(ctx.rng);
        if !is_free(ctx, level, pos, reserved) {
            continue;
        }
        spawn_living(ctx, kind, pos, level, depth);

        let companions = roll_companions(kind, ctx.rng);
        if companions > 0 {
            let mut spots: Vec<Position> = pos
                .neighbors()
                .filter(|p| map.is_walkable(p.x, p.y) && is_free(ctx, level, *p, reserved))
                .collect();
            spots.truncate(companions);
            for spot in spots {
                spawn_living(ctx, kind, spot, level, depth);
            }
        }
    }

    for kind in items {
        let pos = map.rooms[room].random_interior(ctx.rng);
        if !is_free(ctx, level, pos, reserved) {
            continue;
        }
        let item = create_item(ctx, kind, depth);
        spawn_ground_item(ctx.world, item, pos, level);
    }
}

/// Spawn the unique entity registered for this room, once per session
pub(super) fn place_special(
    ctx: &mut GenContext<'_>,
    map: &Map,
    level: LevelId,
    room: usize,
    reserved: &[Position],
) {
    let Some(placement) = placement_for(map.depth, room + 1) else {
        return;
    };
    if ctx.used_specials.contains(&placement.id) {
        return;
    }
    for _ in 0..SPECIAL_TRIES {
        let pos = map.rooms[room].random_interior(ctx.rng);
        if !is_free(ctx, level, pos, reserved) {
            continue;
        }
        match placement.spawn {
            SpecialSpawn::Monster(kind) => {
                spawn_living(ctx, kind, pos, level, map.depth);
            }
            SpecialSpawn::Item(kind) => {
                let item = create_item(ctx, kind, map.depth);
                spawn_ground_item(ctx.world, item, pos, level);
            }
        }
        ctx.used_specials.insert(placement.id);
        log::info!("Placed special {:?} at ({}, {})", placement.id, pos.x, pos.y);
        return;
    }
}

/// Random walkable, unoccupied cell of a map
pub(super) fn random_free_cell(
    ctx: &mut GenContext<'_>,
    map: &Map,
    level: LevelId,
    tries: usize,
) -> Option<Position> {
    let cells = map.walkable_positions();
    for _ in 0..tries {
        let pos = *cells.choose(ctx.rng)?;
        if is_free(ctx, level, pos, &[]) {
            return Some(pos);
        }
    }
    None
}
