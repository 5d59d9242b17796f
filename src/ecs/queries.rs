//! Spatial lookups over the world
//!
//! All entities share one `World`; these helpers scope queries to a level.

use hecs::{Entity, World};

use super::components::{BlocksMovement, Fighter, OnLevel, Position};
use crate::world::LevelId;

/// Entities placed on a level, in world iteration order
pub fn entities_on_level(world: &World, level: LevelId) -> Vec<Entity> {
    world
        .query::<&OnLevel>()
        .iter()
        .filter(|(_, on)| on.0 == level)
        .map(|(e, _)| e)
        .collect()
}

/// All entities at a position on a level
pub fn entities_at(world: &World, level: LevelId, pos: Position) -> Vec<Entity> {
    world
        .query::<(&Position, &OnLevel)>()
        .iter()
        .filter(|(_, (p, on))| **p == pos && on.0 == level)
        .map(|(e, _)| e)
        .collect()
}

pub fn is_occupied(world: &World, level: LevelId, pos: Position) -> bool {
    !entities_at(world, level, pos).is_empty()
}

/// The entity blocking movement into a position
pub fn blocking_entity_at(world: &World, level: LevelId, pos: Position) -> Option<Entity> {
    world
        .query::<(&Position, &OnLevel, &BlocksMovement)>()
        .iter()
        .find(|(_, (p, on, _))| **p == pos && on.0 == level)
        .map(|(e, _)| e)
}

/// Living (fighter, not dead) entities on a level
pub fn living_on_level(world: &World, level: LevelId) -> Vec<Entity> {
    world
        .query::<(&OnLevel, &Fighter)>()
        .iter()
        .filter(|(_, (on, f))| on.0 == level && !f.is_dead())
        .map(|(e, _)| e)
        .collect()
}

/// The living entity at a position
pub fn living_at(world: &World, level: LevelId, pos: Position) -> Option<Entity> {
    world
        .query::<(&Position, &OnLevel, &Fighter)>()
        .iter()
        .find(|(_, (p, on, f))| **p == pos && on.0 == level && !f.is_dead())
        .map(|(e, _)| e)
}

/// Positions of all blocking entities on a level
pub fn blocking_positions(world: &World, level: LevelId) -> Vec<Position> {
    world
        .query::<(&Position, &OnLevel, &BlocksMovement)>()
        .iter()
        .filter(|(_, (_, on, _))| on.0 == level)
        .map(|(_, (p, _, _))| *p)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Name;

    #[test]
    fn test_lookups_are_scoped_to_level() {
        let mut world = World::new();
        let pos = Position::new(4, 4);
        let a = world.spawn((pos, OnLevel(LevelId(0)), BlocksMovement, Fighter::new(5, 0, 1)));
        let b = world.spawn((pos, OnLevel(LevelId(1)), Name::new("rock")));

        assert_eq!(entities_at(&world, LevelId(0), pos), vec![a]);
        assert_eq!(entities_at(&world, LevelId(1), pos), vec![b]);
        assert_eq!(blocking_entity_at(&world, LevelId(0), pos), Some(a));
        assert_eq!(blocking_entity_at(&world, LevelId(1), pos), None);
        assert_eq!(living_at(&world, LevelId(0), pos), Some(a));
        assert!(!is_occupied(&world, LevelId(2), pos));
    }
}
