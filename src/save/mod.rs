//! Save/load system
//!
//! Whole-session snapshots, stored as gzip-compressed JSON.

pub mod save_game;

pub use save_game::{
    SaveData, EntitySaveData, SaveError, SAVE_VERSION,
    save_game, load_game, save_game_to, load_game_from, delete_save,
    save_exists, save_path, save_directory,
};
