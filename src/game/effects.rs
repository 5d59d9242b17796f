//! Item effects and interactions with the map
//!
//! Consumables are used up only when their effect lands. Equippable items
//! toggle when activated.

use hecs::Entity;
use rand::seq::SliceRandom;
use rand::Rng;

use super::actions::{capitalize, Impossible};
use super::messages::MessageCategory;
use super::state::Game;
use crate::ecs::systems::closest_visible_enemy;
use crate::ecs::{
    queries, Direction, Door, EquipmentComponent, Fighter, GroundItem, InventoryComponent,
    Position, StatusTimers,
};
use crate::entities::{set_door_closed, spawn_ground_item};
use crate::items::{Item, ItemId, ItemKind, Toggle, NOTE_TEXT};
use crate::world::TileType;

const HEAL_AMOUNT: i32 = 4;
const LIGHTNING_DAMAGE: i32 = 5;
const LIGHTNING_RANGE: i32 = 5;
const CONFUSION_TURNS: i32 = 7;
const FIREBALL_DAMAGE: i32 = 6;
const FIREBALL_RADIUS: i32 = 5;
const MISSILE_DAMAGE: i32 = 5;
const MISSILE_RANGE: i32 = 5;
const ICE_STORM_DAMAGE: i32 = 15;
const DOOR_ON_FIRE_DAMAGE: i32 = 12;
const LEVITATION_TURNS: i32 = 5;
const SLEEP_TURNS: i32 = 5;
const AUSPICIOUS_TURNS: u32 = 30;
const KICK_HOLD_CHANCE: f64 = 0.5;
const KICK_HURT_CHANCE: f64 = 0.4;

fn not_usable() -> Impossible {
    Impossible::new("This action cannot be used on this item")
}

/// Kickable things in front of an actor
enum KickTarget {
    Door(Entity),
    Box(Entity),
}

impl Game {
    fn carried_item(&self, actor: Entity, id: ItemId) -> Result<Item, Impossible> {
        self.world
            .get::<&InventoryComponent>(actor)
            .ok()
            .and_then(|inv| inv.inventory.get(id).cloned())
            .ok_or_else(|| Impossible::new("You do not have that item."))
    }

    fn consume(&mut self, actor: Entity, id: ItemId) {
        if let Ok(mut inv) = self.world.get::<&mut InventoryComponent>(actor) {
            inv.inventory.remove(id);
        }
    }

    fn status_mut(&mut self, entity: Entity, update: impl FnOnce(&mut StatusTimers)) {
        if let Ok(mut status) = self.world.get::<&mut StatusTimers>(entity) {
            update(&mut status);
        }
    }

    /// Unequip an item if worn, logging the removal
    pub(crate) fn unequip_with_message(&mut self, actor: Entity, id: ItemId) {
        let removed = match self.world.get::<&mut EquipmentComponent>(actor) {
            Ok(mut eq) => eq.equipment.unequip(id).is_some(),
            Err(_) => false,
        };
        if removed {
            let name = self.carried_item(actor, id).map(|i| i.name()).unwrap_or("item");
            self.messages.add(
                format!("{} removes the {}.", capitalize(&self.name_of(actor)), name),
                MessageCategory::Item,
            );
        }
    }

    pub(crate) fn toggle_equip(&mut self, actor: Entity, id: ItemId) -> Result<(), Impossible> {
        let item = self.carried_item(actor, id)?;
        if !item.kind.is_equippable() {
            return Err(not_usable());
        }
        let toggle = self
            .world
            .get::<&mut EquipmentComponent>(actor)
            .ok()
            .and_then(|mut eq| eq.equipment.toggle(&item))
            .ok_or_else(not_usable)?;

        let who = capitalize(&self.name_of(actor));
        match toggle {
            Toggle::Unequipped { .. } => {
                self.messages.add(
                    format!("{} removes the {}.", who, item.name()),
                    MessageCategory::Item,
                );
            }
            Toggle::Equipped { replaced, .. } => {
                if let Some(old) = replaced.and_then(|old| self.carried_item(actor, old).ok()) {
                    self.messages.add(
                        format!("{} removes the {}.", who, old.name()),
                        MessageCategory::Item,
                    );
                }
                self.messages.add(
                    format!("{} equips the {}.", who, item.name()),
                    MessageCategory::Item,
                );
            }
        }
        Ok(())
    }

    /// Use a carried item. `target` is required by targeted scrolls.
    pub(crate) fn activate(
        &mut self,
        actor: Entity,
        id: ItemId,
        target: Option<Position>,
    ) -> Result<(), Impossible> {
        let item = self.carried_item(actor, id)?;
        let who = capitalize(&self.name_of(actor));
        match item.kind {
            ItemKind::HealthPotion => {
                let recovered = match self.world.get::<&mut Fighter>(actor) {
                    Ok(mut fighter) => fighter.heal(HEAL_AMOUNT),
                    Err(_) => 0,
                };
                if recovered == 0 {
                    return Err(Impossible::new("Your health is already full."));
                }
                self.messages.add(
                    format!("{} consumes the {}, and recovers {} HP!", who, item.name(), recovered),
                    MessageCategory::Item,
                );
            }
            ItemKind::LightningScroll => {
                let strike = closest_visible_enemy(&self.world, self.map(), actor, LIGHTNING_RANGE)
                    .ok_or_else(|| Impossible::new("No enemy is close enough to strike."))?;
                self.messages.add(
                    format!(
                        "A lightning bolt strikes the {} with a loud thunder, for {} damage!",
                        self.name_of(strike),
                        LIGHTNING_DAMAGE
                    ),
                    MessageCategory::Combat,
                );
                self.damage(strike, LIGHTNING_DAMAGE);
            }
            ItemKind::ConfusionScroll => {
                let pos = self.visible_target(target)?;
                let (_, level) = self.placement(actor)?;
                let victim = queries::living_at(&self.world, level, pos)
                    .filter(|e| *e != actor)
                    .ok_or_else(|| Impossible::new("You must select an enemy to target."))?;
                self.status_mut(victim, |s| s.confused = CONFUSION_TURNS);
                self.messages.add(
                    format!(
                        "The eyes of the {} look vacant, as it starts to stumble around!",
                        self.name_of(victim)
                    ),
                    MessageCategory::Combat,
                );
            }
            ItemKind::FireballScroll => {
                let center = self.visible_target(target)?;
                let (_, level) = self.placement(actor)?;
                let caught: Vec<Entity> = queries::living_on_level(&self.world, level)
                    .into_iter()
                    .filter(|e| {
                        self.position_of(*e)
                            .map_or(false, |p| p.chebyshev_distance(&center) <= FIREBALL_RADIUS)
                    })
                    .collect();
                if caught.is_empty() {
                    return Err(Impossible::new("There are no targets in the radius."));
                }
                for being in caught {
                    self.messages.add(
                        format!(
                            "The {} is engulfed in a fiery explosion, taking {} damage!",
                            self.name_of(being),
                            FIREBALL_DAMAGE
                        ),
                        MessageCategory::Combat,
                    );
                    self.damage(being, FIREBALL_DAMAGE);
                }
            }
            ItemKind::MagicMissileScroll => {
                let (from, level) = self.placement(actor)?;
                let step = target
                    .map(|t| from.direction_to(&t))
                    .map(|d| Position::new(d.x.signum(), d.y.signum()))
                    .filter(|d| *d != Position::new(0, 0))
                    .ok_or_else(|| Impossible::new("You must select a direction."))?;
                let struck: Vec<Entity> = (1..=MISSILE_RANGE)
                    .map(|n| from.offset(step.x * n, step.y * n))
                    .filter_map(|cell| queries::living_at(&self.world, level, cell))
                    .filter(|e| *e != actor)
                    .collect();
                if struck.is_empty() {
                    self.messages
                        .add("The magic missile hits nothing.", MessageCategory::Combat);
                }
                for being in struck {
                    self.messages.add(
                        format!("{} suffers {} damage", capitalize(&self.name_of(being)), MISSILE_DAMAGE),
                        MessageCategory::Combat,
                    );
                    self.damage(being, MISSILE_DAMAGE);
                }
            }
            ItemKind::EyeOfIceStormScroll => {
                self.room_storm(actor, ICE_STORM_DAMAGE, "Eye of Ice Storm", "freezes")?;
            }
            ItemKind::DoorOnFireScroll => {
                self.room_storm(actor, DOOR_ON_FIRE_DAMAGE, "Door on Fire", "burns")?;
            }
            ItemKind::LevitationScroll => {
                self.status_mut(actor, |s| s.levitating = LEVITATION_TURNS);
                self.messages.add(
                    format!("The {} begins to float in the air!", self.name_of(actor)),
                    MessageCategory::Status,
                );
            }
            ItemKind::SleepScroll => {
                self.status_mut(actor, |s| s.asleep = SLEEP_TURNS);
                self.messages.add(
                    format!("The {} falls asleep", self.name_of(actor)),
                    MessageCategory::Status,
                );
            }
            ItemKind::AuspiciousRoomScroll => {
                let (_, level) = self.placement(actor)?;
                let map = self
                    .levels
                    .map_mut(level)
                    .ok_or_else(|| Impossible::new("There are no rooms on this level."))?;
                let room = map
                    .rooms
                    .choose_mut(&mut self.rng)
                    .ok_or_else(|| Impossible::new("There are no rooms on this level."))?;
                room.auspicious = AUSPICIOUS_TURNS;
                self.messages.add(
                    "You feel like there is a good place for you somewhere on this level of caves",
                    MessageCategory::Status,
                );
            }
            ItemKind::Abacus => {
                self.messages.add(
                    format!("{} calculates a few numbers.", who),
                    MessageCategory::Item,
                );
                return Ok(());
            }
            ItemKind::Note => {
                self.messages.add(NOTE_TEXT, MessageCategory::Item);
                return Ok(());
            }
            kind if kind.is_equippable() => return self.toggle_equip(actor, id),
            _ => return Err(not_usable()),
        }
        self.consume(actor, id);
        Ok(())
    }

    fn visible_target(&self, target: Option<Position>) -> Result<Position, Impossible> {
        let pos = target.ok_or_else(|| Impossible::new("You must select a target."))?;
        if !self.map().is_visible(pos) {
            return Err(Impossible::new("You cannot target an area that you cannot see."));
        }
        Ok(pos)
    }

    /// Damage every living being on and around the center of the caster's room
    fn room_storm(
        &mut self,
        actor: Entity,
        damage: i32,
        spell: &str,
        verb: &str,
    ) -> Result<(), Impossible> {
        let (pos, level) = self.placement(actor)?;
        let not_in_room = || Impossible::new("This spell requires caster to be in a room.");
        let map = self.levels.map(level).ok_or_else(not_in_room)?;
        let center = map
            .find_room(pos)
            .map(|r| map.rooms[r].center())
            .ok_or_else(not_in_room)?;

        let struck: Vec<Entity> = std::iter::once(center)
            .chain(center.neighbors())
            .filter_map(|cell| queries::living_at(&self.world, level, cell))
            .filter(|e| *e != actor)
            .collect();

        let text = match struck.as_slice() {
            [] => format!("{} {} empty space.", spell, verb),
            [one] => format!("{} was struck by {}.", capitalize(&self.name_of(*one)), spell),
            many => format!("{} monsters were struck by {}.", many.len(), spell),
        };
        self.messages.add(text, MessageCategory::Combat);
        for being in struck {
            self.damage(being, damage);
        }
        Ok(())
    }

    /// Break a breakable weapon, leaving its pieces in the inventory
    pub(crate) fn break_item(&mut self, actor: Entity, id: ItemId) -> Result<(), Impossible> {
        let item = self.carried_item(actor, id)?;
        let broken_kind = item.kind.broken_variant().ok_or_else(not_usable)?;
        self.unequip_with_message(actor, id);
        let broken = self.ids.create(broken_kind);
        if let Ok(mut inv) = self.world.get::<&mut InventoryComponent>(actor) {
            inv.inventory.replace(id, broken);
        }
        self.messages
            .add(format!("You break the {}", item.name()), MessageCategory::Item);
        Ok(())
    }

    fn take_key(&mut self, actor: Entity) -> bool {
        let key = self
            .world
            .get::<&InventoryComponent>(actor)
            .ok()
            .and_then(|inv| inv.inventory.find_kind(ItemKind::Key).map(|k| k.id));
        match key {
            Some(id) => {
                self.unequip_with_message(actor, id);
                self.consume(actor, id);
                true
            }
            None => false,
        }
    }

    fn box_at(&self, level: crate::world::LevelId, pos: Position) -> Option<Entity> {
        queries::entities_at(&self.world, level, pos)
            .into_iter()
            .find(|e| {
                self.world
                    .get::<&GroundItem>(*e)
                    .map_or(false, |g| g.item.is_container())
            })
    }

    fn door_at(&self, level: crate::world::LevelId, pos: Position) -> Option<Entity> {
        queries::entities_at(&self.world, level, pos)
            .into_iter()
            .find(|e| self.world.get::<&Door>(*e).is_ok())
    }

    /// Open a box underfoot, else open or close an adjacent door
    pub(crate) fn open(&mut self, actor: Entity) -> Result<(), Impossible> {
        let (pos, level) = self.placement(actor)?;

        if let Some(chest) = self.box_at(level, pos) {
            let locked = self
                .world
                .get::<&GroundItem>(chest)
                .map_or(false, |g| g.item.locked);
            if locked {
                if !self.take_key(actor) {
                    return Err(Impossible::new("The box is locked."));
                }
                self.messages
                    .add("You unlock the box with a key.", MessageCategory::Item);
            }
            let contents = match self.world.get::<&mut GroundItem>(chest) {
                Ok(mut ground) => {
                    ground.item.locked = false;
                    std::mem::take(&mut ground.item.contents)
                }
                Err(_) => Vec::new(),
            };
            if contents.is_empty() {
                self.messages.add("The box is empty.", MessageCategory::Item);
            } else {
                let names: Vec<&str> = contents.iter().map(|i| i.name()).collect();
                self.messages.add(
                    format!("You open the box and find: {}.", names.join(", ")),
                    MessageCategory::Item,
                );
            }
            for item in contents {
                spawn_ground_item(&mut self.world, item, pos, level);
            }
            return Ok(());
        }

        let door = pos
            .neighbors()
            .find_map(|cell| self.door_at(level, cell))
            .ok_or_else(|| Impossible::new("Nothing to open here.."))?;
        let Ok(state) = self.world.get::<&Door>(door).map(|d| *d) else {
            return Err(Impossible::new("Nothing to open here.."));
        };

        if state.locked {
            if !self.take_key(actor) {
                return Err(Impossible::new("The door is locked."));
            }
            if let Ok(mut d) = self.world.get::<&mut Door>(door) {
                d.locked = false;
            }
            self.messages
                .add("You unlock the door with a key.", MessageCategory::Item);
        }

        if state.closed {
            set_door_closed(&mut self.world, door, false);
            self.messages.add("You open the door.", MessageCategory::Item);
        } else {
            let door_pos = self.position_of(door);
            let occupied = door_pos
                .and_then(|p| queries::living_at(&self.world, level, p))
                .is_some();
            if occupied {
                return Err(Impossible::new("Something is in the way."));
            }
            set_door_closed(&mut self.world, door, true);
            self.messages.add("You close the door.", MessageCategory::Item);
        }
        Ok(())
    }

    /// Kick a door or box in a direction
    pub(crate) fn kick(&mut self, actor: Entity, dir: Direction) -> Result<(), Impossible> {
        let (pos, level) = self.placement(actor)?;
        let cell = pos + dir.delta();
        let target = match self.door_at(level, cell) {
            Some(door) => KickTarget::Door(door),
            None => self
                .box_at(level, cell)
                .map(KickTarget::Box)
                .ok_or_else(|| Impossible::new("There is nothing to kick there."))?,
        };

        let label = match target {
            KickTarget::Door(_) => "Door",
            KickTarget::Box(_) => "Box",
        };
        if self.rng.gen_bool(KICK_HOLD_CHANCE) {
            self.messages.add(format!("{} holds", label), MessageCategory::Item);
            return Ok(());
        }

        let broke = match target {
            KickTarget::Door(door) => {
                if let Err(e) = self.world.despawn(door) {
                    log::debug!("Kicked door {:?} already gone: {}", door, e);
                }
                self.messages.add("Door breaks", MessageCategory::Item);
                true
            }
            KickTarget::Box(chest) => match self.world.get::<&mut GroundItem>(chest) {
                Ok(mut ground) if ground.item.locked => {
                    ground.item.locked = false;
                    drop(ground);
                    self.messages.add("Box lock breaks", MessageCategory::Item);
                    true
                }
                _ => false,
            },
        };

        if broke && self.rng.gen_bool(KICK_HURT_CHANCE) {
            let hurt = self.rng.gen_range(6..=25);
            self.messages.add(
                format!("{} takes {} damage.", capitalize(&self.name_of(actor)), hurt),
                MessageCategory::Combat,
            );
            self.damage(actor, hurt);
        }
        Ok(())
    }

    /// Reveal hidden passages next to the actor
    pub(crate) fn search(&mut self, actor: Entity) -> Result<(), Impossible> {
        let (pos, level) = self.placement(actor)?;
        let Some(map) = self.levels.map_mut(level) else {
            return Err(Impossible::new("You are nowhere."));
        };
        let hidden: Vec<Position> = pos
            .neighbors()
            .filter(|p| map.tile_type_at(*p) == Some(TileType::HiddenPassage))
            .collect();
        for p in &hidden {
            map.set_tile(p.x, p.y, TileType::Floor);
        }
        if hidden.is_empty() {
            self.messages
                .add("You do not find anything hidden.", MessageCategory::System);
        } else {
            log::debug!("Revealed {} hidden passages", hidden.len());
            self.messages
                .add("You find a hidden passage!", MessageCategory::System);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::BlocksMovement;
    use crate::entities::{spawn_door, MonsterKind};
    use crate::game::actions::tests::{arena, spawn_at};
    use crate::game::Action;

    fn give(game: &mut Game, kind: ItemKind) -> ItemId {
        let item = game.ids.create(kind);
        let id = item.id;
        if let Ok(mut inv) = game.world.get::<&mut InventoryComponent>(game.player) {
            let _ = inv.inventory.add(item);
        }
        id
    }

    fn hp(game: &Game, e: Entity) -> i32 {
        game.world.get::<&Fighter>(e).map_or(-1, |f| f.hp())
    }

    #[test]
    fn test_health_potion_full_health_is_impossible() {
        let mut game = arena(31);
        let player = game.player;
        let potion = give(&mut game, ItemKind::HealthPotion);
        let action = Action::Activate { item: potion, target: None };
        assert_eq!(
            game.perform(player, action),
            Err(Impossible::new("Your health is already full."))
        );
        assert!(game.carries(player, potion));

        game.damage(player, 10);
        assert!(game.perform(player, action).is_ok());
        assert_eq!(hp(&game, player), 59);
        assert!(!game.carries(player, potion));
        assert!(game.messages().contains("Player consumes the Health Potion, and recovers 4 HP!"));
    }

    #[test]
    fn test_lightning_needs_a_close_enemy() {
        let mut game = arena(32);
        let player = game.player;
        let scroll = give(&mut game, ItemKind::LightningScroll);
        let action = Action::Activate { item: scroll, target: None };
        assert_eq!(
            game.perform(player, action),
            Err(Impossible::new("No enemy is close enough to strike."))
        );

        let troll = spawn_at(&mut game, MonsterKind::Troll, Position::new(8, 6));
        let far = spawn_at(&mut game, MonsterKind::Troll, Position::new(13, 5));
        game.update_fov();
        assert!(game.perform(player, action).is_ok());
        assert_eq!(hp(&game, troll), 10);
        assert_eq!(hp(&game, far), 15);
        assert!(!game.carries(player, scroll));
    }

    #[test]
    fn test_confusion_targets_visible_living() {
        let mut game = arena(33);
        let player = game.player;
        let scroll = give(&mut game, ItemKind::ConfusionScroll);
        let orc = spawn_at(&mut game, MonsterKind::Orc, Position::new(7, 7));
        game.update_fov();

        let miss = Action::Activate { item: scroll, target: Some(Position::new(9, 9)) };
        assert_eq!(
            game.perform(player, miss),
            Err(Impossible::new("You must select an enemy to target."))
        );
        let unseen = Action::Activate { item: scroll, target: Some(Position::new(40, 30)) };
        assert_eq!(
            game.perform(player, unseen),
            Err(Impossible::new("You cannot target an area that you cannot see."))
        );
        let hit = Action::Activate { item: scroll, target: Some(Position::new(7, 7)) };
        assert!(game.perform(player, hit).is_ok());
        assert_eq!(game.world.get::<&StatusTimers>(orc).map(|s| s.confused).ok(), Some(7));
    }

    #[test]
    fn test_fireball_hits_everyone_in_radius() {
        let mut game = arena(34);
        let player = game.player;
        let scroll = give(&mut game, ItemKind::FireballScroll);
        let a = spawn_at(&mut game, MonsterKind::Troll, Position::new(12, 5));
        let b = spawn_at(&mut game, MonsterKind::Troll, Position::new(14, 8));
        game.update_fov();
        let action = Action::Activate { item: scroll, target: Some(Position::new(11, 6)) };
        assert!(game.perform(player, action).is_ok());
        assert_eq!(hp(&game, a), 9);
        assert_eq!(hp(&game, b), 9);
        // The player stood 6 cells away
        assert_eq!(hp(&game, player), 65);
    }

    #[test]
    fn test_magic_missile_flies_in_a_line() {
        let mut game = arena(37);
        let player = game.player;
        let scroll = give(&mut game, ItemKind::MagicMissileScroll);
        let aimless = Action::Activate { item: scroll, target: None };
        assert_eq!(
            game.perform(player, aimless),
            Err(Impossible::new("You must select a direction."))
        );

        let near = spawn_at(&mut game, MonsterKind::Troll, Position::new(7, 5));
        let far = spawn_at(&mut game, MonsterKind::Troll, Position::new(10, 5));
        let beyond = spawn_at(&mut game, MonsterKind::Troll, Position::new(11, 5));
        let aside = spawn_at(&mut game, MonsterKind::Troll, Position::new(7, 6));
        // Only the direction of the target counts
        let east = Action::Activate { item: scroll, target: Some(Position::new(14, 5)) };
        assert!(game.perform(player, east).is_ok());
        assert_eq!(hp(&game, near), 10);
        assert_eq!(hp(&game, far), 10);
        assert_eq!(hp(&game, beyond), 15);
        assert_eq!(hp(&game, aside), 15);
        assert!(game.messages().contains("Troll suffers 5 damage"));
        assert!(!game.carries(player, scroll));

        let second = give(&mut game, ItemKind::MagicMissileScroll);
        let west = Action::Activate { item: second, target: Some(Position::new(2, 5)) };
        assert!(game.perform(player, west).is_ok());
        assert!(game.messages().contains("The magic missile hits nothing."));
        assert!(!game.carries(player, second));
    }

    #[test]
    fn test_ice_storm_hits_room_center() {
        let mut game = arena(35);
        let player = game.player;
        let scroll = give(&mut game, ItemKind::EyeOfIceStormScroll);
        let center = game.map().rooms[0].center();
        let troll = spawn_at(&mut game, MonsterKind::Troll, center.offset(1, 0));
        let action = Action::Activate { item: scroll, target: None };
        assert!(game.perform(player, action).is_ok());
        assert_eq!(hp(&game, troll), 0);
        assert!(game.messages().contains("Troll was struck by Eye of Ice Storm."));
    }

    #[test]
    fn test_equip_toggle_and_replace() {
        let mut game = arena(36);
        let player = game.player;
        let dagger = give(&mut game, ItemKind::Dagger);
        let sword = give(&mut game, ItemKind::Sword);
        let base = game.power_of(player);

        assert!(game.perform(player, Action::ToggleEquip(dagger)).is_ok());
        assert_eq!(game.power_of(player), base + 2);
        assert!(game.perform(player, Action::ToggleEquip(sword)).is_ok());
        assert_eq!(game.power_of(player), base + 4);
        assert!(game.messages().contains("Player removes the Dagger."));
        assert!(game.messages().contains("Player equips the Sword."));

        assert!(game.perform(player, Action::ToggleEquip(sword)).is_ok());
        assert_eq!(game.power_of(player), base);

        let potion = give(&mut game, ItemKind::HealthPotion);
        assert_eq!(game.perform(player, Action::ToggleEquip(potion)), Err(not_usable()));
    }

    #[test]
    fn test_break_swaps_in_pieces() {
        let mut game = arena(37);
        let player = game.player;
        let bell = give(&mut game, ItemKind::SwordOfRingingBell);
        assert!(game.perform(player, Action::ToggleEquip(bell)).is_ok());
        assert!(game.perform(player, Action::Break(bell)).is_ok());
        assert!(!game.carries(player, bell));
        let has_pieces = game
            .world
            .get::<&InventoryComponent>(player)
            .map_or(false, |inv| inv.inventory.contains_kind(ItemKind::BrokenSwordOfRingingBell));
        assert!(has_pieces);
        assert!(game.messages().contains("You break the Sword of Ringing Bell"));

        let dagger = give(&mut game, ItemKind::Dagger);
        assert_eq!(game.perform(player, Action::Break(dagger)), Err(not_usable()));
    }

    #[test]
    fn test_locked_door_needs_key() {
        let mut game = arena(38);
        let player = game.player;
        let level = game.current_level();
        let door = spawn_door(&mut game.world, Position::new(6, 5), level, true);
        assert_eq!(game.perform(player, Action::Open), Err(Impossible::new("The door is locked.")));

        let key = give(&mut game, ItemKind::Key);
        assert!(game.perform(player, Action::Open).is_ok());
        assert!(!game.carries(player, key));
        assert!(game.world.get::<&BlocksMovement>(door).is_err());
        assert_eq!(game.world.get::<&Door>(door).map(|d| d.locked).ok(), Some(false));

        assert!(game.perform(player, Action::Open).is_ok());
        assert!(game.world.get::<&BlocksMovement>(door).is_ok());
    }

    #[test]
    fn test_open_box_spills_contents() {
        let mut game = arena(39);
        let player = game.player;
        let level = game.current_level();
        let mut chest = game.ids.create(ItemKind::Box);
        chest.contents.push(game.ids.create(ItemKind::HealthPotion));
        spawn_ground_item(&mut game.world, chest, Position::new(5, 5), level);

        assert!(game.perform(player, Action::Open).is_ok());
        let potions = queries::entities_at(&game.world, level, Position::new(5, 5))
            .into_iter()
            .filter(|e| {
                game.world
                    .get::<&GroundItem>(*e)
                    .map_or(false, |g| g.item.kind == ItemKind::HealthPotion)
            })
            .count();
        assert_eq!(potions, 1);
        assert!(game.perform(player, Action::Open).is_ok());
        assert!(game.messages().contains("The box is empty."));
    }

    #[test]
    fn test_nothing_to_open_or_kick() {
        let mut game = arena(40);
        let player = game.player;
        assert_eq!(game.perform(player, Action::Open), Err(Impossible::new("Nothing to open here..")));
        assert_eq!(
            game.perform(player, Action::Kick(Direction::North)),
            Err(Impossible::new("There is nothing to kick there."))
        );
    }

    #[test]
    fn test_kick_eventually_breaks_door() {
        let mut game = arena(41);
        let player = game.player;
        let level = game.current_level();
        let door = spawn_door(&mut game.world, Position::new(5, 4), level, true);
        for _ in 0..64 {
            if !game.world.contains(door) || !game.is_alive(player) {
                break;
            }
            assert!(game.perform(player, Action::Kick(Direction::North)).is_ok());
        }
        assert!(!game.world.contains(door));
        assert!(game.messages().contains("Door breaks"));
    }

    #[test]
    fn test_search_reveals_hidden_passage() {
        let mut game = arena(42);
        let player = game.player;
        assert!(game.perform(player, Action::Search).is_ok());
        assert!(game.messages().contains("You do not find anything hidden."));

        game.levels.current_map_mut().set_tile(6, 6, TileType::HiddenPassage);
        assert!(!game.map().is_walkable(6, 6));
        assert!(game.perform(player, Action::Search).is_ok());
        assert!(game.map().is_walkable(6, 6));
        assert!(game.messages().contains("You find a hidden passage!"));
    }
}
