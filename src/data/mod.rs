//! Data tables and external game content
//!
//! Tunables come from an optional RON file; spawn tables and the registry
//! of pre-authored content are static.

pub mod loader;
pub mod quests;
pub mod spawn_tables;
pub mod special;

pub use loader::GameConfig;
pub use quests::{conversation_for, quest, quest_for, Conversation, Quest, QuestId, QUESTS};
pub use spawn_tables::{choose_at_random, ITEM_CHANCES, MONSTER_CHANCES};
pub use special::{
    placement_for, special_level_for, SpecialId, SpecialLayout, SpecialLevel, SpecialPlacement,
    SpecialSpawn,
};
