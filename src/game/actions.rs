//! Actions
//!
//! Everything an entity can do with its turn. An action either resolves
//! completely or fails with `Impossible` before changing anything, so a
//! rejected action never costs a turn.

use hecs::Entity;

use super::messages::MessageCategory;
use super::state::Game;
use crate::combat::roll_melee;
use crate::ecs::systems::is_hostile_to;
use crate::ecs::{queries, Direction, GroundItem, InventoryComponent, Position};
use crate::entities::spawn_ground_item;
use crate::items::ItemId;
use crate::world::LevelId;

/// The only recoverable action failure. The text is shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Impossible(pub String);

impl Impossible {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// A single-turn action bound to an acting entity by `Game::perform`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Wait,
    Move(Direction),
    Melee(Direction),
    /// Attack an enemy in the way, otherwise move
    Bump(Direction),
    Pickup,
    Drop(ItemId),
    ToggleEquip(ItemId),
    Activate {
        item: ItemId,
        target: Option<Position>,
    },
    Break(ItemId),
    Open,
    Kick(Direction),
    Search,
}

/// Sentence-case a name for the start of a message
pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Game {
    /// Resolve an action for `actor`
    pub fn perform(&mut self, actor: Entity, action: Action) -> Result<(), Impossible> {
        match action {
            Action::Wait => Ok(()),
            Action::Move(dir) => self.move_entity(actor, dir),
            Action::Melee(dir) => self.melee(actor, dir),
            Action::Bump(dir) => self.bump(actor, dir),
            Action::Pickup => self.pickup(actor),
            Action::Drop(item) => self.drop_item(actor, item),
            Action::ToggleEquip(item) => self.toggle_equip(actor, item),
            Action::Activate { item, target } => self.activate(actor, item, target),
            Action::Break(item) => self.break_item(actor, item),
            Action::Open => self.open(actor),
            Action::Kick(dir) => self.kick(actor, dir),
            Action::Search => self.search(actor),
        }
    }

    /// Position and level of an entity placed on a map
    pub(crate) fn placement(&self, entity: Entity) -> Result<(Position, LevelId), Impossible> {
        match (self.position_of(entity), self.level_of(entity)) {
            (Some(pos), Some(level)) => Ok((pos, level)),
            _ => Err(Impossible::new("You are nowhere.")),
        }
    }

    fn move_entity(&mut self, actor: Entity, dir: Direction) -> Result<(), Impossible> {
        let (pos, level) = self.placement(actor)?;
        let dest = pos + dir.delta();
        let blocked = || Impossible::new("That way is blocked.");
        let map = self.levels.map(level).ok_or_else(blocked)?;
        if !map.contains(dest) || !map.is_walkable(dest.x, dest.y) {
            return Err(blocked());
        }
        if queries::blocking_entity_at(&self.world, level, dest).is_some() {
            return Err(blocked());
        }

        let from_room = map.find_room(pos);
        let to_room = map.find_room(dest);
        let elated = to_room.is_some()
            && to_room != from_room
            && to_room.map_or(false, |r| map.rooms[r].auspicious > 0);

        if let Ok(mut p) = self.world.get::<&mut Position>(actor) {
            *p = dest;
        }

        if actor == self.player {
            let seen: Vec<String> = queries::entities_at(&self.world, level, dest)
                .into_iter()
                .filter(|e| *e != actor)
                .map(|e| self.name_of(e))
                .collect();
            if !seen.is_empty() {
                self.messages
                    .add(format!("You see {}.", seen.join(", ")), MessageCategory::Item);
            }
            if elated {
                self.messages.add(
                    "You feel elated as you enter this room.",
                    MessageCategory::Status,
                );
            }
        }
        Ok(())
    }

    fn melee(&mut self, actor: Entity, dir: Direction) -> Result<(), Impossible> {
        let (pos, level) = self.placement(actor)?;
        let target = queries::living_at(&self.world, level, pos + dir.delta())
            .filter(|t| *t != actor)
            .ok_or_else(|| Impossible::new("Nothing to attack."))?;

        let power = self.power_of(actor);
        let defense = self.defense_of(target);
        let attack = roll_melee(power, defense, &mut self.rng);

        let description = format!(
            "{} attacks {}{}",
            capitalize(&self.name_of(actor)),
            self.name_of(target),
            if attack.is_crit { " (critical hit)" } else { "" }
        );
        if attack.damage > 0 {
            self.messages.add(
                format!("{} for {} hit points.", description, attack.damage),
                MessageCategory::Combat,
            );
            self.damage(target, attack.damage);
        } else {
            self.messages.add(
                format!("{} but does no damage.", description),
                MessageCategory::Combat,
            );
        }
        Ok(())
    }

    fn bump(&mut self, actor: Entity, dir: Direction) -> Result<(), Impossible> {
        let (pos, level) = self.placement(actor)?;
        let hostile_target = queries::living_at(&self.world, level, pos + dir.delta())
            .filter(|t| *t != actor && is_hostile_to(&self.world, actor, *t));
        if hostile_target.is_some() {
            self.melee(actor, dir)
        } else {
            self.move_entity(actor, dir)
        }
    }

    fn pickup(&mut self, actor: Entity) -> Result<(), Impossible> {
        let (pos, level) = self.placement(actor)?;
        let ground = queries::entities_at(&self.world, level, pos)
            .into_iter()
            .find(|e| self.world.get::<&GroundItem>(*e).is_ok())
            .ok_or_else(|| Impossible::new("There is nothing here to pick up."))?;

        let full = self
            .world
            .get::<&InventoryComponent>(actor)
            .map_or(true, |inv| inv.inventory.is_full());
        if full {
            return Err(Impossible::new("Your inventory is full."));
        }

        let item = match self.world.remove_one::<GroundItem>(ground) {
            Ok(ground_item) => ground_item.item,
            Err(_) => return Err(Impossible::new("There is nothing here to pick up.")),
        };
        if let Err(e) = self.world.despawn(ground) {
            log::debug!("Ground item {:?} already gone: {}", ground, e);
        }
        let name = item.name();
        if let Ok(mut inv) = self.world.get::<&mut InventoryComponent>(actor) {
            // Capacity was checked above
            let _ = inv.inventory.add(item);
        }

        let text = if actor == self.player {
            format!("You picked up the {}!", name)
        } else {
            format!("{} picks up the {}.", capitalize(&self.name_of(actor)), name)
        };
        self.messages.add(text, MessageCategory::Item);
        Ok(())
    }

    fn drop_item(&mut self, actor: Entity, id: ItemId) -> Result<(), Impossible> {
        let (pos, level) = self.placement(actor)?;
        if !self.carries(actor, id) {
            return Err(Impossible::new("You do not have that item."));
        }
        self.unequip_with_message(actor, id);
        let item = self
            .world
            .get::<&mut InventoryComponent>(actor)
            .ok()
            .and_then(|mut inv| inv.inventory.remove(id))
            .ok_or_else(|| Impossible::new("You do not have that item."))?;

        let name = item.name();
        spawn_ground_item(&mut self.world, item, pos, level);
        self.messages.add(
            format!("{} dropped the {}.", capitalize(&self.name_of(actor)), name),
            MessageCategory::Item,
        );
        Ok(())
    }

    pub(crate) fn carries(&self, actor: Entity, id: ItemId) -> bool {
        self.world
            .get::<&InventoryComponent>(actor)
            .map_or(false, |inv| inv.inventory.get(id).is_some())
    }
}
