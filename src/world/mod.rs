//! World module
//!
//! Contains map data structures, tiles, the level tree and procedural generation.

pub mod fov;
pub mod generation;
pub mod level_tree;
pub mod map;
pub mod path;
pub mod room;
pub mod serialize;
pub mod tile;

pub use fov::compute_fov;
pub use level_tree::{LevelId, LevelNode, LevelTree};
pub use map::{Branch, Map, Stairs};
pub use path::{path_to, CostGrid, CROWDING_PENALTY};
pub use room::{Interval, Room};
pub use serialize::{parse_custom_maps, write_custom_maps, MapLoadError};
pub use tile::{Glyph, Tile, TileType, SHROUD};
