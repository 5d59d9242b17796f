//! Procedural level generation
//!
//! Ordinary levels are rooms and corridors with stairs and an optional
//! hidden room. A few depths use pre-authored layouts instead.

pub mod hidden;
pub mod populate;
pub mod rooms;
pub mod stairs;
pub mod tunnels;

use std::collections::{BTreeSet, HashMap};

use hecs::World;
use rand::rngs::StdRng;

use crate::data::{special_level_for, GameConfig, SpecialId, SpecialLayout, SpecialLevel};
use crate::ecs::{queries, Position};
use crate::items::ItemIds;
use crate::world::{LevelId, Map, Room, Stairs, TileType};

/// Whole-pass retries when no room at all could be placed
const MAX_ATTEMPTS: usize = 10;
const CUSTOM_UP_STAIRS_TRIES: usize = 100;

/// Fatal generation failures
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("no room could be placed after {attempts} attempts")]
    NoRooms { attempts: usize },
    #[error("no cell found for the up staircase on depth {depth}")]
    NoUpStairsLocation { depth: u32 },
    #[error("custom map `{0}` is not loaded")]
    MissingCustomMap(String),
}

/// Session state the generator reads and mutates
pub struct GenContext<'a> {
    pub world: &'a mut World,
    pub rng: &'a mut StdRng,
    pub ids: &'a mut ItemIds,
    pub used_specials: &'a mut BTreeSet<SpecialId>,
    pub custom_maps: &'a HashMap<String, Map>,
    pub config: &'a GameConfig,
}

/// What to generate
#[derive(Debug, Clone, Copy)]
pub struct LevelRequest {
    /// Id the level will get in the tree
    pub level: LevelId,
    pub depth: u32,
    /// False once the session reached its level cap
    pub allow_down: bool,
    /// Where the player stood on the level above
    pub came_from: Option<Position>,
}

/// A generated level and where the player enters it
#[derive(Debug, Clone)]
pub struct GeneratedLevel {
    pub map: Map,
    pub player_start: Position,
}

/// Generate a level, using a registered special layout for its depth if unused
pub fn generate_level(
    ctx: &mut GenContext<'_>,
    request: &LevelRequest,
) -> Result<GeneratedLevel, GenerationError> {
    let result = match special_level_for(request.depth) {
        Some(special) if !ctx.used_specials.contains(&special.id) => {
            match generate_special(ctx, request, special) {
                Err(GenerationError::MissingCustomMap(name)) => {
                    log::warn!("Custom map `{}` missing, generating an ordinary level", name);
                    generate_ordinary(ctx, request)
                }
                other => other,
            }
        }
        _ => generate_ordinary(ctx, request),
    };

    match &result {
        Ok(level) => log::info!(
            "Generated level {:?} at depth {} with {} rooms",
            request.level,
            request.depth,
            level.map.rooms.len()
        ),
        Err(e) => {
            log::error!("Generation of depth {} failed: {}", request.depth, e);
            discard_entities(ctx.world, request.level);
        }
    }
    result
}

fn discard_entities(world: &mut World, level: LevelId) {
    for entity in queries::entities_on_level(world, level) {
        if let Err(e) = world.despawn(entity) {
            log::debug!("Discarding {:?} failed: {}", entity, e);
        }
    }
}

fn generate_ordinary(
    ctx: &mut GenContext<'_>,
    request: &LevelRequest,
) -> Result<GeneratedLevel, GenerationError> {
    let config = ctx.config;
    for attempt in 1..=MAX_ATTEMPTS {
        let mut map = Map::new(config.map_width, config.map_height, request.depth);
        let mut reserved = Vec::new();
        let first_center = rooms::place_rooms(ctx, &mut map, request.level, &mut reserved);
        let Some(first_center) = first_center else {
            log::debug!("No rooms placed on attempt {}, retrying", attempt);
            discard_entities(ctx.world, request.level);
            continue;
        };

        stairs::place_stairs(
            ctx,
            &mut map,
            request.level,
            request.allow_down,
            request.came_from,
            &reserved,
        )?;
        hidden::carve_hidden_room(&mut map, ctx.rng);

        let player_start = map.up.as_ref().map_or(first_center, |s| s.pos);
        return Ok(GeneratedLevel { map, player_start });
    }
    Err(GenerationError::NoRooms {
        attempts: MAX_ATTEMPTS,
    })
}

fn generate_special(
    ctx: &mut GenContext<'_>,
    request: &LevelRequest,
    special: &SpecialLevel,
) -> Result<GeneratedLevel, GenerationError> {
    let level = match special.layout {
        SpecialLayout::Rooms(rects) => {
            let config = ctx.config;
            let mut map = Map::new(config.map_width, config.map_height, request.depth);
            for (x, y, w, h) in rects.iter().copied() {
                let room = Room::new(x, y, w, h);
                map.carve_room(&room);
                map.rooms.push(room);
                let index = map.rooms.len() - 1;
                populate::populate_room(ctx, &map, request.level, index, &[]);
                populate::place_special(ctx, &map, request.level, index, &[]);
            }
            stairs::place_stairs(
                ctx,
                &mut map,
                request.level,
                request.allow_down,
                request.came_from,
                &[],
            )?;
            let player_start = match (&map.up, map.rooms.first()) {
                (Some(up), _) => up.pos,
                (None, Some(room)) => room.center(),
                (None, None) => return Err(GenerationError::NoRooms { attempts: 1 }),
            };
            GeneratedLevel { map, player_start }
        }
        SpecialLayout::CustomMap(name) => {
            let mut map = ctx
                .custom_maps
                .get(name)
                .cloned()
                .ok_or_else(|| GenerationError::MissingCustomMap(name.to_string()))?;
            map.depth = request.depth;
            map.clear_visibility();
            map.explored.iter_mut().for_each(|e| *e = false);

            let up_pos = match map.up.as_ref() {
                Some(up) => up.pos,
                None => populate::random_free_cell(ctx, &map, request.level, CUSTOM_UP_STAIRS_TRIES)
                    .ok_or(GenerationError::NoUpStairsLocation {
                        depth: request.depth,
                    })?,
            };
            map.set_tile(up_pos.x, up_pos.y, TileType::StairsUp);
            map.up = Some(Stairs::up(up_pos, request.came_from));
            for stairs in [map.left.as_mut(), map.right.as_mut()].into_iter().flatten() {
                stairs.target = None;
            }
            GeneratedLevel {
                map,
                player_start: up_pos,
            }
        }
    };
    ctx.used_specials.insert(special.id);
    log::info!("Using special level {:?} for depth {}", special.id, request.depth);
    Ok(level)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;

    use rand::SeedableRng;

    use crate::world::Branch;

    /// Owns everything a `GenContext` borrows
    pub(crate) struct TestSession {
        pub world: World,
        pub rng: StdRng,
        pub ids: ItemIds,
        pub used: BTreeSet<SpecialId>,
        pub custom_maps: HashMap<String, Map>,
        pub config: GameConfig,
    }

    impl TestSession {
        pub fn new(seed: u64) -> Self {
            Self {
                world: World::new(),
                rng: StdRng::seed_from_u64(seed),
                ids: ItemIds::new(),
                used: BTreeSet::new(),
                custom_maps: HashMap::new(),
                config: GameConfig::default(),
            }
        }

        pub fn ctx(&mut self) -> GenContext<'_> {
            GenContext {
                world: &mut self.world,
                rng: &mut self.rng,
                ids: &mut self.ids,
                used_specials: &mut self.used,
                custom_maps: &self.custom_maps,
                config: &self.config,
            }
        }
    }

    fn request(depth: u32) -> LevelRequest {
        LevelRequest {
            level: LevelId(0),
            depth,
            allow_down: true,
            came_from: (depth > 0).then_some(Position::new(10, 10)),
        }
    }

    /// Walkable cells reachable from `start`
    fn flood(map: &Map, start: Position) -> Vec<bool> {
        let mut seen = vec![false; map.tiles.len()];
        let mut queue = VecDeque::from([start]);
        seen[map.xy_to_idx(start.x, start.y)] = true;
        while let Some(pos) = queue.pop_front() {
            for next in pos.neighbors() {
                if map.is_walkable(next.x, next.y) {
                    let idx = map.xy_to_idx(next.x, next.y);
                    if !seen[idx] {
                        seen[idx] = true;
                        queue.push_back(next);
                    }
                }
            }
        }
        seen
    }

    #[test]
    fn test_rooms_never_overlap() {
        for seed in 0..60 {
            let mut session = TestSession::new(seed);
            let level = generate_level(&mut session.ctx(), &request(seed as u32 % 9));
            let Ok(level) = level else {
                continue;
            };
            let rooms = &level.map.rooms;
            for (i, a) in rooms.iter().enumerate() {
                for b in rooms.iter().skip(i + 1) {
                    assert!(!a.intersects(b), "seed {}: {:?} overlaps {:?}", seed, a, b);
                }
            }
        }
    }

    #[test]
    fn test_every_room_is_connected() {
        for seed in 0..60 {
            let mut session = TestSession::new(seed);
            let Ok(level) = generate_level(&mut session.ctx(), &request(0)) else {
                continue;
            };
            let map = &level.map;
            let reach = flood(map, map.rooms[0].center());
            for room in &map.rooms {
                for cell in room.interior() {
                    assert!(
                        reach[map.xy_to_idx(cell.x, cell.y)],
                        "seed {}: {:?} unreachable in {:?}",
                        seed,
                        cell,
                        room
                    );
                }
            }
        }
    }

    #[test]
    fn test_root_starts_in_first_room() {
        let mut session = TestSession::new(42);
        let level = generate_level(&mut session.ctx(), &request(0));
        let Ok(level) = level else {
            panic!("root generation failed");
        };
        assert_eq!(level.player_start, level.map.rooms[0].center());
        assert!(level.map.up.is_none());
        // Nothing spawned on the player's cell
        assert!(!queries::is_occupied(&session.world, LevelId(0), level.player_start));
    }

    #[test]
    fn test_lower_levels_have_linked_up_stairs() {
        for seed in 0..20 {
            let mut session = TestSession::new(seed);
            let req = request(2);
            let Ok(level) = generate_level(&mut session.ctx(), &req) else {
                continue;
            };
            let up = level.map.up.as_ref().map(|s| (s.pos, s.above));
            assert_eq!(up, Some((level.player_start, req.came_from)));
            assert!(level.map.is_walkable(level.player_start.x, level.player_start.y));
        }
    }

    #[test]
    fn test_same_seed_same_level() {
        let mut a = TestSession::new(99);
        let mut b = TestSession::new(99);
        let la = generate_level(&mut a.ctx(), &request(4)).map(|l| l.map.tiles);
        let lb = generate_level(&mut b.ctx(), &request(4)).map(|l| l.map.tiles);
        assert_eq!(la.ok(), lb.ok());
    }

    #[test]
    fn test_special_rooms_level_used_once() {
        let mut session = TestSession::new(5);
        let first = generate_level(&mut session.ctx(), &request(10));
        assert_eq!(first.as_ref().map(|l| l.map.rooms.len()).ok(), Some(1));
        assert!(session.used.contains(&SpecialId::LevelRooms));
        let second = generate_level(&mut session.ctx(), &request(10));
        assert!(second.map(|l| l.map.rooms.len() >= 1).unwrap_or(false));
    }

    #[test]
    fn test_custom_map_gets_up_stairs() {
        let mut session = TestSession::new(6);
        let mut custom = Map::new(20, 10, 0);
        custom.carve_room(&Room::new(1, 1, 10, 6));
        custom.left = Some(Stairs::down(Position::new(3, 3), Branch::Left));
        session.custom_maps.insert("a".to_string(), custom);

        let req = request(3);
        let level = generate_level(&mut session.ctx(), &req);
        let Ok(level) = level else {
            panic!("custom level failed");
        };
        assert_eq!(level.map.depth, 3);
        let up = level.map.up.as_ref().map(|s| s.above);
        assert_eq!(up, Some(req.came_from));
        assert_eq!(level.map.tile_type_at(level.player_start), Some(TileType::StairsUp));
        assert!(level.map.left.is_some());
    }

    #[test]
    fn test_missing_custom_map_falls_back() {
        let mut session = TestSession::new(6);
        let level = generate_level(&mut session.ctx(), &request(3));
        assert!(level.is_ok());
        assert!(!session.used.contains(&SpecialId::LevelA));
    }
}
