//! Entity Component System module
//!
//! Defines all components, spatial queries and the AI helpers.

pub mod components;
pub mod queries;
pub mod systems;

pub use components::*;
