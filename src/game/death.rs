//! Damage and death
//!
//! Dead living entities stay in the world as inert remains. Whatever they
//! carried ends up on the floor where they fell.

use hecs::Entity;

use super::actions::capitalize;
use super::messages::MessageCategory;
use super::state::Game;
use crate::ecs::{
    render_order, BlocksMovement, CharLevel, EquipmentComponent, Fighter, Hostile,
    InventoryComponent, Name, Remains, Renderable,
};
use crate::entities::spawn_ground_item;
use crate::items::Equipment;

const REMAINS_GLYPH: char = '%';
const REMAINS_COLOR: (u8, u8, u8) = (191, 0, 0);

impl Game {
    /// Apply damage, running the death handler if this kills the target.
    /// Returns true on the killing blow.
    pub(crate) fn damage(&mut self, target: Entity, amount: i32) -> bool {
        let died = match self.world.get::<&mut Fighter>(target) {
            Ok(mut fighter) => fighter.take_damage(amount),
            Err(_) => false,
        };
        if died {
            self.kill(target);
        }
        died
    }

    /// Kill outright, regardless of hit points
    pub(crate) fn slay(&mut self, target: Entity) {
        let died = match self.world.get::<&mut Fighter>(target) {
            Ok(mut fighter) => fighter.set_hp(0),
            Err(_) => false,
        };
        if died {
            self.kill(target);
        }
    }

    /// Turn a freshly dead entity into remains. Runs once per entity since
    /// `Fighter` only reports the transition to zero once.
    fn kill(&mut self, entity: Entity) {
        let name = self.name_of(entity);

        if entity == self.player {
            self.messages.add("You died!", MessageCategory::Combat);
            log::info!("Player died on turn {}", self.turn);
        } else {
            self.messages
                .add(format!("{} is dead!", capitalize(&name)), MessageCategory::Combat);
            let xp = self.world.get::<&CharLevel>(entity).map_or(0, |l| l.xp_given);
            let gained = match self.world.get::<&mut CharLevel>(self.player) {
                Ok(mut level) => level.add_xp(xp),
                Err(_) => Vec::new(),
            };
            for line in gained {
                self.messages.add(line, MessageCategory::Status);
            }
        }

        if let Ok(mut render) = self.world.get::<&mut Renderable>(entity) {
            render.glyph = REMAINS_GLYPH;
            render.fg = REMAINS_COLOR;
            render.render_order = render_order::CORPSE;
        }
        if let Ok(mut n) = self.world.get::<&mut Name>(entity) {
            *n = Name::new(format!("remains of {}", name));
        }
        let _ = self.world.remove_one::<BlocksMovement>(entity);
        let _ = self.world.remove_one::<Hostile>(entity);
        let _ = self.world.insert_one(entity, Remains);

        self.spill_inventory(entity);
    }

    fn spill_inventory(&mut self, entity: Entity) {
        let Ok((pos, level)) = self.placement(entity) else {
            return;
        };
        if let Ok(mut equipment) = self.world.get::<&mut EquipmentComponent>(entity) {
            equipment.equipment = Equipment::new();
        }
        let items = match self.world.get::<&mut InventoryComponent>(entity) {
            Ok(mut inv) => inv.inventory.take_all(),
            Err(_) => Vec::new(),
        };
        if !items.is_empty() {
            log::debug!("{:?} spills {} items", entity, items.len());
        }
        for item in items {
            spawn_ground_item(&mut self.world, item, pos, level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{queries, GroundItem, Position};
    use crate::entities::MonsterKind;
    use crate::game::actions::tests::{arena, spawn_at};
    use crate::game::GameState;
    use crate::items::ItemKind;

    #[test]
    fn test_monster_death_leaves_remains_and_loot() {
        let mut game = arena(21);
        let pos = Position::new(8, 5);
        let orc = spawn_at(&mut game, MonsterKind::Orc, pos);
        let dagger = game.ids.create(ItemKind::Dagger);
        if let Ok(mut inv) = game.world.get::<&mut InventoryComponent>(orc) {
            let _ = inv.inventory.add(dagger);
        }

        assert!(game.damage(orc, 100));
        assert!(!game.damage(orc, 100));

        assert!(game.world.get::<&BlocksMovement>(orc).is_err());
        assert!(game.world.get::<&Hostile>(orc).is_err());
        assert!(game.world.get::<&Remains>(orc).is_ok());
        assert_eq!(game.name_of(orc), "remains of Orc");
        assert_eq!(game.world.get::<&Renderable>(orc).map(|r| r.glyph).ok(), Some('%'));

        let loot: Vec<ItemKind> = queries::entities_at(&game.world, game.current_level(), pos)
            .into_iter()
            .filter_map(|e| game.world.get::<&GroundItem>(e).ok().map(|g| g.item.kind))
            .collect();
        assert_eq!(loot, vec![ItemKind::Dagger]);

        let xp = game.world.get::<&CharLevel>(game.player).map(|l| l.current_xp).ok();
        assert_eq!(xp, Some(40));
        assert!(game.messages().contains("Orc is dead!"));
        assert!(game.messages().contains("You gain 40 experience points."));
        // Remains are not living
        assert_eq!(queries::living_at(&game.world, game.current_level(), pos), None);
    }

    #[test]
    fn test_player_death_ends_game() {
        let mut game = arena(22);
        let player = game.player;
        game.slay(player);
        assert_eq!(game.state(), GameState::GameOver);
        assert!(game.messages().contains("You died!"));
        let xp = game.world.get::<&CharLevel>(player).map(|l| l.current_xp).ok();
        assert_eq!(xp, Some(0));
    }
}
