//! Map objects: items on the floor and doors

use hecs::{Entity, World};

use crate::ecs::{
    render_order, BlocksMovement, Door, GroundItem, Name, OnLevel, Position, Renderable,
};
use crate::items::Item;
use crate::world::LevelId;

pub const DOOR_COLOR: (u8, u8, u8) = (205, 25, 205);

/// Place an item on the ground
pub fn spawn_ground_item(world: &mut World, item: Item, pos: Position, level: LevelId) -> Entity {
    let props = item.kind.props();
    world.spawn((
        Name::new(props.name),
        pos,
        OnLevel(level),
        Renderable::new(props.glyph, props.color).with_order(render_order::ITEM),
        GroundItem { item },
    ))
}

/// Place a closed door. Closed doors block movement.
pub fn spawn_door(world: &mut World, pos: Position, level: LevelId, locked: bool) -> Entity {
    let door = Door {
        closed: true,
        locked,
    };
    world.spawn((
        Name::new("Door"),
        pos,
        OnLevel(level),
        Renderable::new(door.glyph(), DOOR_COLOR).with_order(render_order::ITEM),
        door,
        BlocksMovement,
    ))
}

/// Open or close a door, keeping its glyph and blocking in sync
pub fn set_door_closed(world: &mut World, entity: Entity, closed: bool) {
    let glyph = match world.get::<&mut Door>(entity) {
        Ok(mut door) => {
            door.closed = closed;
            door.glyph()
        }
        Err(_) => return,
    };
    if let Ok(mut render) = world.get::<&mut Renderable>(entity) {
        render.glyph = glyph;
    }
    if closed {
        let _ = world.insert_one(entity, BlocksMovement);
    } else {
        let _ = world.remove_one::<BlocksMovement>(entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_door_toggles_blocking() {
        let mut world = World::new();
        let door = spawn_door(&mut world, Position::new(2, 2), LevelId(0), false);
        assert!(world.get::<&BlocksMovement>(door).is_ok());
        set_door_closed(&mut world, door, false);
        assert!(world.get::<&BlocksMovement>(door).is_err());
        assert_eq!(world.get::<&Renderable>(door).map(|r| r.glyph).ok(), Some('\''));
        set_door_closed(&mut world, door, true);
        assert!(world.get::<&BlocksMovement>(door).is_ok());
    }
}
