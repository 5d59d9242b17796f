//! Pre-authored content registry
//!
//! Static tables of hand-made levels and of unique entities placed in a
//! specific room of a specific depth. Each entry is used at most once per
//! session; the session tracks used ids.

use serde::{Deserialize, Serialize};

use crate::entities::MonsterKind;
use crate::items::ItemKind;

/// Identity of a unique level or entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpecialId {
    LevelRooms,
    LevelA,
    Martinella,
    Note1,
    JuliusMattius,
    SwordOfRingingBell,
}

/// How a special level is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialLayout {
    /// Fixed rooms `(x, y, w, h)`; no corridors
    Rooms(&'static [(i32, i32, i32, i32)]),
    /// A map from the custom-map document, by name
    CustomMap(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialLevel {
    pub id: SpecialId,
    pub depth: u32,
    pub layout: SpecialLayout,
}

pub const SPECIAL_LEVELS: &[SpecialLevel] = &[
    SpecialLevel {
        id: SpecialId::LevelRooms,
        depth: 10,
        layout: SpecialLayout::Rooms(&[(5, 5, 70, 15)]),
    },
    SpecialLevel {
        id: SpecialId::LevelA,
        depth: 3,
        layout: SpecialLayout::CustomMap("a"),
    },
];

/// What a special placement spawns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialSpawn {
    Monster(MonsterKind),
    Item(ItemKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialPlacement {
    pub id: SpecialId,
    pub depth: u32,
    /// 1-based room number in placement order
    pub room: usize,
    pub spawn: SpecialSpawn,
}

pub const SPECIAL_PLACEMENTS: &[SpecialPlacement] = &[
    SpecialPlacement {
        id: SpecialId::Martinella,
        depth: 0,
        room: 1,
        spawn: SpecialSpawn::Monster(MonsterKind::Martinella),
    },
    SpecialPlacement {
        id: SpecialId::Note1,
        depth: 0,
        room: 2,
        spawn: SpecialSpawn::Item(ItemKind::Note),
    },
    SpecialPlacement {
        id: SpecialId::JuliusMattius,
        depth: 1,
        room: 1,
        spawn: SpecialSpawn::Monster(MonsterKind::JuliusMattius),
    },
    SpecialPlacement {
        id: SpecialId::SwordOfRingingBell,
        depth: 2,
        room: 1,
        spawn: SpecialSpawn::Item(ItemKind::SwordOfRingingBell),
    },
];

/// Special level registered for a depth
pub fn special_level_for(depth: u32) -> Option<&'static SpecialLevel> {
    SPECIAL_LEVELS.iter().find(|l| l.depth == depth)
}

/// Special placement registered for a room
pub fn placement_for(depth: u32, room: usize) -> Option<&'static SpecialPlacement> {
    SPECIAL_PLACEMENTS
        .iter()
        .find(|p| p.depth == depth && p.room == room)
}
