//! Save/Load game state
//!
//! A save is the whole session: every level of the tree, every entity with
//! its components, and the bookkeeping needed to keep generating fresh
//! levels. It is written as gzip-compressed JSON.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use hecs::{Entity, EntityBuilder, EntityRef, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::{GameConfig, SpecialId};
use crate::ecs::{
    BlocksMovement, CharLevel, Door, EquipmentComponent, Fighter, GroundItem, Hostile,
    InventoryComponent, Monster, Name, Npc, OnLevel, Player, Position, Remains, Renderable,
    StatusTimers,
};
use crate::game::{Game, MessageLog, QuestLog};
use crate::items::ItemIds;
use crate::world::{LevelTree, Map};

/// Current save format version
pub const SAVE_VERSION: u32 = 2;

/// Complete save data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub seed: u64,
    /// The session RNG continues from this seed after loading
    pub reseed: u64,
    pub turn: u64,
    pub ids: ItemIds,
    pub levels: LevelTree,
    pub entities: Vec<EntitySaveData>,
    pub messages: MessageLog,
    pub used_specials: BTreeSet<SpecialId>,
    pub quests: QuestLog,
    pub config: GameConfig,
}

/// Component snapshot of one entity. Marker components are flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitySaveData {
    /// Entity handle bits, so handles stay stable across a load
    pub id: u64,
    pub position: Option<Position>,
    pub level: Option<OnLevel>,
    pub name: Option<Name>,
    pub renderable: Option<Renderable>,
    pub player: bool,
    pub monster: Option<Monster>,
    pub hostile: Option<Hostile>,
    pub npc: Option<Npc>,
    pub blocks_movement: bool,
    pub remains: bool,
    pub fighter: Option<Fighter>,
    pub char_level: Option<CharLevel>,
    pub status: Option<StatusTimers>,
    pub ground_item: Option<GroundItem>,
    pub inventory: Option<InventoryComponent>,
    pub equipment: Option<EquipmentComponent>,
    pub door: Option<Door>,
}

/// Save/load errors
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Invalid save data: {0}")]
    InvalidData(String),
}

/// Get the save directory path
pub fn save_directory() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "delvetree", "Delvetree") {
        proj_dirs.data_dir().join("saves")
    } else {
        PathBuf::from("./saves")
    }
}

/// Get the path for a save slot
pub fn save_path(slot: u8) -> PathBuf {
    save_directory().join(format!("save_{}.json.gz", slot))
}

/// Check if a save exists in a slot
pub fn save_exists(slot: u8) -> bool {
    save_path(slot).exists()
}

fn snapshot_entity(entity: EntityRef<'_>) -> EntitySaveData {
    fn copy<T: hecs::Component + Clone>(entity: &EntityRef<'_>) -> Option<T> {
        entity.get::<&T>().map(|c| (*c).clone())
    }

    EntitySaveData {
        id: entity.entity().to_bits().get(),
        position: copy(&entity),
        level: copy(&entity),
        name: copy(&entity),
        renderable: copy(&entity),
        player: entity.has::<Player>(),
        monster: copy(&entity),
        hostile: copy(&entity),
        npc: copy(&entity),
        blocks_movement: entity.has::<BlocksMovement>(),
        remains: entity.has::<Remains>(),
        fighter: copy(&entity),
        char_level: copy(&entity),
        status: copy(&entity),
        ground_item: copy(&entity),
        inventory: copy(&entity),
        equipment: copy(&entity),
        door: copy(&entity),
    }
}

fn restore_entity(world: &mut World, data: EntitySaveData) -> Result<Entity, SaveError> {
    let handle = Entity::from_bits(data.id)
        .ok_or_else(|| SaveError::InvalidData(format!("bad entity id {}", data.id)))?;

    let mut builder = EntityBuilder::new();
    macro_rules! add_some {
        ($($field:ident),*) => {
            $(if let Some(component) = data.$field {
                builder.add(component);
            })*
        };
    }
    add_some!(
        position, level, name, renderable, monster, hostile, npc, fighter, char_level, status,
        ground_item, inventory, equipment, door
    );
    if data.player {
        builder.add(Player);
    }
    if data.blocks_movement {
        builder.add(BlocksMovement);
    }
    if data.remains {
        builder.add(Remains);
    }

    world.spawn_at(handle, builder.build());
    Ok(handle)
}

/// Capture the session. The live RNG is re-seeded from the stored value so
/// that the running game and a game loaded from this data stay in lockstep.
pub fn extract_save_data(game: &mut Game) -> SaveData {
    let reseed: u64 = game.rng.gen();
    game.rng = StdRng::seed_from_u64(reseed);

    let mut entities: Vec<EntitySaveData> = game.world.iter().map(snapshot_entity).collect();
    entities.sort_by_key(|e| e.id);

    SaveData {
        version: SAVE_VERSION,
        seed: game.seed,
        reseed,
        turn: game.turn,
        ids: game.ids.clone(),
        levels: game.levels.clone(),
        entities,
        messages: game.messages.clone(),
        used_specials: game.used_specials.clone(),
        quests: game.quests.clone(),
        config: game.config.clone(),
    }
}

/// Rebuild a session from save data. Custom maps are not part of a save,
/// the caller supplies them again.
pub fn restore_game(data: SaveData, custom_maps: HashMap<String, Map>) -> Result<Game, SaveError> {
    if data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }

    let mut world = World::new();
    let mut player = None;
    for entity in data.entities {
        let is_player = entity.player;
        let handle = restore_entity(&mut world, entity)?;
        if is_player {
            if player.is_some() {
                return Err(SaveError::InvalidData("more than one player".to_string()));
            }
            player = Some(handle);
        }
    }
    let player = player.ok_or_else(|| SaveError::InvalidData("no player entity".to_string()))?;

    if data.levels.current().0 >= data.levels.len() {
        return Err(SaveError::InvalidData("current level out of range".to_string()));
    }

    Ok(Game {
        world,
        levels: data.levels,
        player,
        rng: StdRng::seed_from_u64(data.reseed),
        ids: data.ids,
        messages: data.messages,
        config: data.config,
        custom_maps,
        used_specials: data.used_specials,
        quests: data.quests,
        turn: data.turn,
        seed: data.seed,
    })
}

/// JSON, then gzip
pub fn encode(data: &SaveData) -> Result<Vec<u8>, SaveError> {
    let json = serde_json::to_vec(data)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

pub fn decode(bytes: &[u8]) -> Result<SaveData, SaveError> {
    let mut json = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut json)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Save the game to a file
pub fn save_game_to(game: &mut Game, path: &Path) -> Result<(), SaveError> {
    let bytes = encode(&extract_save_data(game))?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, bytes)?;
    log::info!("Game saved to {} on turn {}", path.display(), game.turn);
    Ok(())
}

/// Load a game from a file
pub fn load_game_from(path: &Path, custom_maps: HashMap<String, Map>) -> Result<Game, SaveError> {
    let bytes = fs::read(path)?;
    let game = restore_game(decode(&bytes)?, custom_maps)?;
    log::info!("Game loaded from {} at turn {}", path.display(), game.turn);
    Ok(game)
}

/// Save the game to a slot
pub fn save_game(game: &mut Game, slot: u8) -> Result<(), SaveError> {
    save_game_to(game, &save_path(slot))
}

/// Load a game from a slot
pub fn load_game(slot: u8, custom_maps: HashMap<String, Map>) -> Result<Game, SaveError> {
    load_game_from(&save_path(slot), custom_maps)
}

/// Delete a save slot
pub fn delete_save(slot: u8) -> Result<(), SaveError> {
    let path = save_path(slot);
    if path.exists() {
        fs::remove_file(&path)?;
        log::info!("Deleted save slot {}", slot);
    }
    Ok(())
}
