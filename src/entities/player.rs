//! Player entity creation

use hecs::World;

use crate::ecs::{
    render_order, BlocksMovement, CharLevel, EquipmentComponent, Fighter, InventoryComponent, Name, OnLevel,
    Player, Position, Renderable, StatusTimers,
};
use crate::items::{Equipment, Inventory, ItemIds, ItemKind};
use crate::world::LevelId;

/// Items the player starts with
const STARTING_KIT: [ItemKind; 6] = [
    ItemKind::FireballScroll,
    ItemKind::EyeOfIceStormScroll,
    ItemKind::Sword,
    ItemKind::LeatherArmor,
    ItemKind::Abacus,
    ItemKind::SwordOfRingingBell,
];

/// Spawn the player entity
pub fn spawn_player(
    world: &mut World,
    ids: &mut ItemIds,
    pos: Position,
    level: LevelId,
    inventory_capacity: usize,
) -> hecs::Entity {
    let mut inventory = Inventory::new(inventory_capacity);
    for kind in STARTING_KIT {
        let _ = inventory.add(ids.create(kind));
    }

    world.spawn((
        Player,
        Name::new("Player"),
        pos,
        OnLevel(level),
        Renderable::new('@', (255, 255, 255)).with_order(render_order::ACTOR),
        Fighter::new(65, 12, 4),
        CharLevel::new(0),
        StatusTimers::default(),
        BlocksMovement,
        InventoryComponent { inventory },
        EquipmentComponent {
            equipment: Equipment::new(),
        },
    ))
}
