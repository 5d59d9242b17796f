//! ECS Systems
//!
//! World-level helpers the hostile AI runs on: gear scavenging, target
//! selection, waking and path planning. None of them touch the message log;
//! callers report what happened.

use hecs::{Entity, World};

use super::components::{
    EquipmentComponent, GroundItem, Hostile, InventoryComponent, Name, OnLevel, Player, Position,
    StatusTimers,
};
use super::queries;
use crate::world::{path_to, CostGrid, LevelId, Map, CROWDING_PENALTY};

/// Radius around an attacker in which sleepers wake up
pub const WAKE_RADIUS: i32 = 15;

/// Whether `actor` treats `target` as an enemy
pub fn is_hostile_to(world: &World, actor: Entity, target: Entity) -> bool {
    let actor_is_player = world.get::<&Player>(actor).is_ok();
    let target_is_player = world.get::<&Player>(target).is_ok();
    let actor_hostile = world.get::<&Hostile>(actor).is_ok();
    let target_hostile = world.get::<&Hostile>(target).is_ok();
    (actor_is_player && target_hostile) || (actor_hostile && target_is_player)
}

fn name_of(world: &World, entity: Entity) -> String {
    world
        .get::<&Name>(entity)
        .map(|n| n.0.clone())
        .unwrap_or_else(|_| "something".to_string())
}

/// Pick up gear lying under `actor` that fits a free slot. Returns item names.
pub fn pick_up_equippables(world: &mut World, actor: Entity) -> Vec<&'static str> {
    let Some((pos, level)) = placement(world, actor) else {
        return Vec::new();
    };
    let wanted: Vec<(Entity, crate::items::SlotKind)> = {
        let Ok(equipment) = world.get::<&EquipmentComponent>(actor) else {
            return Vec::new();
        };
        if equipment.equipment.fully_equipped() {
            return Vec::new();
        }
        world
            .query::<(&Position, &OnLevel, &GroundItem)>()
            .iter()
            .filter(|(_, (p, on, _))| **p == pos && on.0 == level)
            .filter_map(|(e, (_, _, ground))| ground.item.kind.slot().map(|slot| (e, slot)))
            .filter(|(_, slot)| equipment.equipment.slot_available(*slot))
            .collect()
    };

    let mut picked = Vec::new();
    for (ground_entity, _) in wanted {
        let item = match world.get::<&GroundItem>(ground_entity) {
            Ok(ground) => ground.item.clone(),
            Err(_) => continue,
        };
        let added = match world.get::<&mut InventoryComponent>(actor) {
            Ok(mut inv) => inv.inventory.add(item.clone()).is_ok(),
            Err(_) => false,
        };
        if !added {
            break;
        }
        if let Err(e) = world.despawn(ground_entity) {
            log::debug!("Ground item {:?} already gone: {}", ground_entity, e);
        }
        picked.push(item.name());
    }
    picked
}

/// Equip the first carried item that fits a free slot. Returns its name.
pub fn equip_first_available(world: &mut World, actor: Entity) -> Option<&'static str> {
    let inv = world.get::<&InventoryComponent>(actor).ok()?;
    let mut equipment = world.get::<&mut EquipmentComponent>(actor).ok()?;
    if equipment.equipment.fully_equipped() {
        return None;
    }
    let item = inv.inventory.iter().find(|item| {
        item.kind
            .slot()
            .map_or(false, |slot| equipment.equipment.slot_available(slot))
            && !equipment.equipment.is_equipped(item.id)
    })?;
    equipment.equipment.equip(item)?;
    Some(item.name())
}

/// Closest living enemy of `caster` standing in a lit cell within `range`
pub fn closest_visible_enemy(
    world: &World,
    map: &Map,
    caster: Entity,
    range: i32,
) -> Option<Entity> {
    let (origin, level) = placement(world, caster)?;
    queries::living_on_level(world, level)
        .into_iter()
        .filter(|e| *e != caster && is_hostile_to(world, caster, *e))
        .filter_map(|e| {
            let pos = *world.get::<&Position>(e).ok()?;
            let distance = origin.chebyshev_distance(&pos);
            (map.is_visible(pos) && distance <= range).then_some((distance, e))
        })
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, e)| e)
}

/// Wake every sleeper within `radius` of `origin`, except `exclude`.
/// Returns the names of those woken.
pub fn wake_nearby(
    world: &mut World,
    level: LevelId,
    origin: Position,
    radius: i32,
    exclude: Entity,
) -> Vec<String> {
    let sleepers: Vec<Entity> = world
        .query::<(&Position, &OnLevel, &StatusTimers)>()
        .iter()
        .filter(|(e, (pos, on, status))| {
            *e != exclude
                && on.0 == level
                && status.is_asleep()
                && origin.chebyshev_distance(pos) <= radius
        })
        .map(|(e, _)| e)
        .collect();

    let mut woken = Vec::new();
    for entity in sleepers {
        if let Ok(mut status) = world.get::<&mut StatusTimers>(entity) {
            status.wake();
        }
        woken.push(name_of(world, entity));
    }
    woken
}

/// Cost-weighted path avoiding crowds, excluding the start
pub fn plan_path(world: &World, map: &Map, level: LevelId, from: Position, to: Position) -> Vec<Position> {
    let mut grid = CostGrid::from_map(map);
    for pos in queries::blocking_positions(world, level) {
        grid.add_cost(pos, CROWDING_PENALTY);
    }
    path_to(&grid, from, to)
}

/// Replace the cached chase path of a hostile entity
pub fn set_path(world: &mut World, entity: Entity, path: Vec<Position>) {
    if let Ok(mut hostile) = world.get::<&mut Hostile>(entity) {
        log::debug!("{:?} plans a path of {} steps", entity, path.len());
        hostile.path = path;
    }
}

/// Next step of the cached chase path, consuming it
pub fn next_step(world: &mut World, entity: Entity) -> Option<Position> {
    let mut hostile = world.get::<&mut Hostile>(entity).ok()?;
    if hostile.path.is_empty() {
        None
    } else {
        Some(hostile.path.remove(0))
    }
}

fn placement(world: &World, entity: Entity) -> Option<(Position, LevelId)> {
    let pos = *world.get::<&Position>(entity).ok()?;
    let level = world.get::<&OnLevel>(entity).ok()?.0;
    Some((pos, level))
}
