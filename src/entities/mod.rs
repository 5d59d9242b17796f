//! Entity creation and management

pub mod player;
pub mod monsters;
pub mod items;

pub use player::spawn_player;
pub use monsters::{roll_companions, spawn_monster, AttackHook, MonsterDef, MonsterKind, OnAttack, PETRIFY_TURNS};
pub use items::{set_door_closed, spawn_door, spawn_ground_item};
