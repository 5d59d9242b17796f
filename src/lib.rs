//! Delvetree - simulation core of a branching turn-based roguelike
//!
//! Levels hang off each other in a tree: stairs down may fork into
//! several branches, and every visited level stays alive in memory.

pub mod combat;
pub mod data;
pub mod ecs;
pub mod entities;
pub mod game;
pub mod items;
pub mod progression;
pub mod save;
pub mod world;

// Re-export commonly used types
pub use game::{Action, Command, Game, GameState, Impossible, TurnOutcome};
pub use ecs::components::*;
pub use world::map::Map;
