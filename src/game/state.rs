//! Game session state
//!
//! A `Game` owns everything one run needs: the entity world, the level
//! tree, the seeded RNG and the message log. Level transitions live here
//! too since they are the only place new levels get generated.

use std::collections::{BTreeSet, HashMap};

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::actions::Impossible;
use super::dialogue::QuestLog;
use super::messages::{MessageCategory, MessageLog};
use crate::combat::auspicious_bonus;
use crate::data::{GameConfig, SpecialId};
use crate::ecs::{
    CharLevel, EquipmentComponent, Fighter, InventoryComponent, Name, OnLevel, Position,
    Renderable,
};
use crate::entities::spawn_player;
use crate::items::ItemIds;
use crate::world::generation::{generate_level, GenContext, GenerationError, LevelRequest};
use crate::world::{compute_fov, LevelId, LevelTree, Map};

/// What the front end should be showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Playing,
    /// Enough xp banked; waiting for an upgrade choice
    LevelUp,
    /// A character asked a yes/no question
    Dialogue,
    GameOver,
}

/// Failure of a level transition
#[derive(Debug, thiserror::Error)]
pub enum TravelError {
    #[error(transparent)]
    Impossible(#[from] Impossible),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// What the renderer needs to draw an entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub pos: Position,
    pub glyph: char,
    pub fg: (u8, u8, u8),
    pub render_order: i32,
}

/// The main game struct that holds all session data
pub struct Game {
    pub(crate) world: World,
    pub(crate) levels: LevelTree,
    pub(crate) player: Entity,
    pub(crate) rng: StdRng,
    pub(crate) ids: ItemIds,
    pub(crate) messages: MessageLog,
    pub(crate) config: GameConfig,
    /// Pre-authored maps by name, for special levels
    pub(crate) custom_maps: HashMap<String, Map>,
    pub(crate) used_specials: BTreeSet<SpecialId>,
    pub(crate) quests: QuestLog,
    pub(crate) turn: u64,
    pub(crate) seed: u64,
}

impl Game {
    /// Start a new run: generate the root level and place the player
    pub fn new(
        seed: u64,
        config: GameConfig,
        custom_maps: HashMap<String, Map>,
    ) -> Result<Self, GenerationError> {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ids = ItemIds::new();
        let mut used_specials = BTreeSet::new();

        let request = LevelRequest {
            level: LevelId(0),
            depth: 0,
            allow_down: config.max_levels > 1,
            came_from: None,
        };
        let root = {
            let mut ctx = GenContext {
                world: &mut world,
                rng: &mut rng,
                ids: &mut ids,
                used_specials: &mut used_specials,
                custom_maps: &custom_maps,
                config: &config,
            };
            generate_level(&mut ctx, &request)?
        };

        let player = spawn_player(
            &mut world,
            &mut ids,
            root.player_start,
            LevelId(0),
            config.inventory_capacity,
        );
        let levels = LevelTree::new(root.map, &mut rng);

        let mut game = Self {
            world,
            levels,
            player,
            rng,
            ids,
            messages: MessageLog::new(config.message_capacity),
            config,
            custom_maps,
            used_specials,
            quests: QuestLog::default(),
            turn: 0,
            seed,
        };
        game.update_fov();
        game.messages.add(
            "Hello and welcome, adventurer, to yet another dungeon!",
            MessageCategory::System,
        );
        log::info!("New game with seed {}", seed);
        Ok(game)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn levels(&self) -> &LevelTree {
        &self.levels
    }

    /// Map of the level the player is on
    pub fn map(&self) -> &Map {
        self.levels.current_map()
    }

    pub fn current_level(&self) -> LevelId {
        self.levels.current()
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> GameState {
        let dead = self
            .world
            .get::<&Fighter>(self.player)
            .map_or(true, |f| f.is_dead());
        if dead {
            return GameState::GameOver;
        }
        if self.quests.pending().is_some() {
            return GameState::Dialogue;
        }
        let level_up = self
            .world
            .get::<&CharLevel>(self.player)
            .map_or(false, |l| l.requires_level_up());
        if level_up {
            GameState::LevelUp
        } else {
            GameState::Playing
        }
    }

    /// Get player position
    pub fn player_position(&self) -> Option<Position> {
        self.position_of(self.player)
    }

    pub fn position_of(&self, entity: Entity) -> Option<Position> {
        self.world.get::<&Position>(entity).ok().map(|p| *p)
    }

    pub(crate) fn level_of(&self, entity: Entity) -> Option<LevelId> {
        self.world.get::<&OnLevel>(entity).ok().map(|on| on.0)
    }

    pub fn name_of(&self, entity: Entity) -> String {
        self.world
            .get::<&Name>(entity)
            .map(|n| n.0.clone())
            .unwrap_or_else(|_| "something".to_string())
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world
            .get::<&Fighter>(entity)
            .map_or(false, |f| !f.is_dead())
    }

    fn in_auspicious_room(&self, entity: Entity) -> bool {
        match (self.position_of(entity), self.level_of(entity)) {
            (Some(pos), Some(level)) => self
                .levels
                .map(level)
                .map_or(false, |map| map.is_auspicious(pos)),
            _ => false,
        }
    }

    /// Base power plus equipment, boosted inside an auspicious room
    pub fn power_of(&self, entity: Entity) -> i32 {
        let base = self.world.get::<&Fighter>(entity).map_or(0, |f| f.base_power);
        let bonus = match (
            self.world.get::<&EquipmentComponent>(entity),
            self.world.get::<&InventoryComponent>(entity),
        ) {
            (Ok(eq), Ok(inv)) => eq.equipment.power_bonus(&inv.inventory),
            _ => 0,
        };
        if self.in_auspicious_room(entity) {
            auspicious_bonus(base + bonus)
        } else {
            base + bonus
        }
    }

    /// Base defense plus equipment, boosted inside an auspicious room
    pub fn defense_of(&self, entity: Entity) -> i32 {
        let base = self.world.get::<&Fighter>(entity).map_or(0, |f| f.base_defense);
        let bonus = match (
            self.world.get::<&EquipmentComponent>(entity),
            self.world.get::<&InventoryComponent>(entity),
        ) {
            (Ok(eq), Ok(inv)) => eq.equipment.defense_bonus(&inv.inventory),
            _ => 0,
        };
        if self.in_auspicious_room(entity) {
            auspicious_bonus(base + bonus)
        } else {
            base + bonus
        }
    }

    /// Recompute the player's field of view on the current level
    pub fn update_fov(&mut self) {
        let Some(origin) = self.player_position() else {
            return;
        };
        let radius = self.config.fov_radius;
        compute_fov(self.levels.current_map_mut(), origin, radius);
    }

    /// Entities on the current level the player can see, in draw order
    pub fn visible_entities(&self) -> Vec<EntityView> {
        let level = self.levels.current();
        let map = self.map();
        let mut views: Vec<EntityView> = self
            .world
            .query::<(&Position, &OnLevel, &Renderable)>()
            .iter()
            .filter(|(_, (pos, on, _))| on.0 == level && map.is_visible(**pos))
            .map(|(_, (pos, _, render))| EntityView {
                pos: *pos,
                glyph: render.glyph,
                fg: render.fg,
                render_order: render.render_order,
            })
            .collect();
        views.sort_by_key(|v| v.render_order);
        views
    }

    /// Take the down staircase under the player, generating the level below
    /// on first use.
    pub fn descend(&mut self) -> Result<(), TravelError> {
        let no_stairs = || Impossible::new("There are no stairs down here.");
        let pos = self.player_position().ok_or_else(no_stairs)?;
        let current = self.levels.current();
        let branch = self
            .levels
            .current_map()
            .down_stairs_at(pos)
            .map(|s| s.branch)
            .ok_or_else(no_stairs)?;

        let target = match self.levels.child(current, branch) {
            Some(id) => id,
            None => {
                let request = LevelRequest {
                    level: self.levels.next_id(),
                    depth: self.levels.current_map().depth + 1,
                    allow_down: self.levels.len() < self.config.max_levels,
                    came_from: Some(pos),
                };
                let generated = {
                    let mut ctx = GenContext {
                        world: &mut self.world,
                        rng: &mut self.rng,
                        ids: &mut self.ids,
                        used_specials: &mut self.used_specials,
                        custom_maps: &self.custom_maps,
                        config: &self.config,
                    };
                    generate_level(&mut ctx, &request)?
                };
                let id = self.levels.attach_child(current, branch, generated.map);
                debug_assert_eq!(id, request.level);
                id
            }
        };

        let arrival = self
            .levels
            .map(target)
            .and_then(|m| m.up.as_ref().map(|s| (s.pos, m.depth)));
        let Some((arrival, depth)) = arrival else {
            let depth = self.levels.map(target).map_or(0, |m| m.depth);
            return Err(GenerationError::NoUpStairsLocation { depth }.into());
        };

        self.place_player(target, arrival);
        self.messages
            .add("You descend the staircase.", MessageCategory::System);
        log::info!("Player descended to {:?} (depth {})", target, depth);
        Ok(())
    }

    /// Take the up staircase under the player back to where they came from
    pub fn ascend(&mut self) -> Result<(), TravelError> {
        let no_stairs = || Impossible::new("There are no stairs up here.");
        let pos = self.player_position().ok_or_else(no_stairs)?;
        let current = self.levels.current();
        let up = self
            .levels
            .current_map()
            .up
            .clone()
            .filter(|s| s.pos == pos)
            .ok_or_else(no_stairs)?;
        let target = up
            .target
            .or_else(|| self.levels.parent(current))
            .ok_or_else(|| Impossible::new("These stairs lead nowhere."))?;

        let arrival = up.above.or_else(|| {
            self.levels.map(target).and_then(|m| {
                [m.left.as_ref(), m.right.as_ref()]
                    .into_iter()
                    .flatten()
                    .find(|s| s.target == Some(current))
                    .map(|s| s.pos)
            })
        });
        let arrival = arrival.ok_or_else(|| Impossible::new("These stairs lead nowhere."))?;

        self.place_player(target, arrival);
        self.messages
            .add("You ascend the staircase.", MessageCategory::System);
        log::info!("Player ascended to {:?}", target);
        Ok(())
    }

    fn place_player(&mut self, level: LevelId, pos: Position) {
        if let Ok(mut p) = self.world.get::<&mut Position>(self.player) {
            *p = pos;
        }
        if let Ok(mut on) = self.world.get::<&mut OnLevel>(self.player) {
            on.0 = level;
        }
        self.levels.set_current(level);
        self.update_fov();
    }

    /// Text overview of every generated level
    pub fn level_overview(&self) -> Vec<String> {
        self.levels.overview()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::world::Branch;

    pub(crate) fn new_game(seed: u64) -> Game {
        match Game::new(seed, GameConfig::default(), HashMap::new()) {
            Ok(game) => game,
            Err(e) => panic!("generation failed: {}", e),
        }
    }

    /// Move the player onto a down staircase of the current level
    pub(crate) fn stand_on_down_stairs(game: &mut Game) -> Option<Branch> {
        let stairs = game.map().left.clone().or_else(|| game.map().right.clone())?;
        if let Ok(mut pos) = game.world.get::<&mut Position>(game.player) {
            *pos = stairs.pos;
        }
        Some(stairs.branch)
    }

    #[test]
    fn test_new_game_places_player_on_root() {
        let game = new_game(42);
        assert_eq!(game.current_level(), LevelId(0));
        let pos = game.player_position();
        assert!(pos.map_or(false, |p| game.map().is_walkable(p.x, p.y)));
        assert!(pos.map_or(false, |p| game.map().is_visible(p)));
        assert_eq!(game.state(), GameState::Playing);
        assert!(game.messages().contains("Hello and welcome, adventurer, to yet another dungeon!"));
    }

    #[test]
    fn test_descend_then_ascend_round_trip() {
        let mut game = new_game(7);
        let branch = stand_on_down_stairs(&mut game).expect("seed 7 has down stairs");
        let origin = game.player_position();

        assert!(game.descend().is_ok());
        let child = game.current_level();
        assert_ne!(child, LevelId(0));
        assert_eq!(game.levels().child(LevelId(0), branch), Some(child));
        assert_eq!(game.map().depth, 1);
        let up = game.map().up.clone();
        assert_eq!(up.as_ref().map(|s| s.pos), game.player_position());
        assert_eq!(up.and_then(|s| s.above), origin);

        assert!(game.ascend().is_ok());
        assert_eq!(game.current_level(), LevelId(0));
        assert_eq!(game.player_position(), origin);

        // Taking the same stairs again returns the cached level
        assert!(game.descend().is_ok());
        assert_eq!(game.current_level(), child);
        assert_eq!(game.levels().len(), 2);
    }

    #[test]
    fn test_travel_without_stairs_is_impossible() {
        let mut game = new_game(3);
        let start = game.map().rooms[0].center();
        let on_stairs = game.map().down_stairs_at(start).is_some();
        if let Ok(mut pos) = game.world.get::<&mut Position>(game.player) {
            *pos = start;
        }
        if !on_stairs {
            assert!(matches!(game.descend(), Err(TravelError::Impossible(_))));
        }
        assert!(matches!(game.ascend(), Err(TravelError::Impossible(_))));
    }

    #[test]
    fn test_auspicious_room_boosts_stats() {
        let mut game = new_game(11);
        let player = game.player;
        let base_power = game.power_of(player);
        let pos = game.player_position();
        let room = pos
            .and_then(|p| game.map().find_room(p))
            .expect("seed 11 starts the player inside a room");
        game.levels.current_map_mut().rooms[room].auspicious = 3;
        assert_eq!(game.power_of(player), auspicious_bonus(base_power));
    }
}
