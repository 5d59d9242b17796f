//! Monster definitions and spawning
//!
//! Stat blocks are data: one `MonsterDef` per `MonsterKind`. The few kinds
//! with special behaviour carry an `OnAttack` hook.

use hecs::{Entity, World};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ecs::{
    render_order, BlocksMovement, CharLevel, EquipmentComponent, Fighter, Hostile,
    InventoryComponent, Monster, Name, Npc, NpcRole, OnLevel, Position, Renderable, StatusTimers,
};
use crate::items::{Equipment, Inventory, Item, ItemKind, DEFAULT_CAPACITY};
use crate::world::LevelId;

/// Behaviour triggered after a monster lands a melee attack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnAttack {
    None,
    /// Hisses at the target and may start turning it to stone
    Petrify,
}

/// Result of rolling an on-attack hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackHook {
    Nothing,
    Hiss,
    HissAndPetrify,
}

const HISS_CHANCE: f64 = 0.33;
const PETRIFY_CHANCE: f64 = 0.1;
/// Turns until a petrified target dies
pub const PETRIFY_TURNS: i32 = 5;

impl OnAttack {
    pub fn trigger(&self, rng: &mut impl Rng) -> AttackHook {
        match self {
            OnAttack::None => AttackHook::Nothing,
            OnAttack::Petrify if rng.gen_bool(HISS_CHANCE) => {
                if rng.gen_bool(PETRIFY_CHANCE) {
                    AttackHook::HissAndPetrify
                } else {
                    AttackHook::Hiss
                }
            }
            OnAttack::Petrify => AttackHook::Nothing,
        }
    }
}

/// Monster definition with all stats and rendering info
#[derive(Debug, Clone, Copy)]
pub struct MonsterDef {
    pub name: &'static str,
    pub glyph: char,
    pub fg: (u8, u8, u8),
    pub hp: i32,
    pub defense: i32,
    pub power: i32,
    pub xp_given: u32,
    pub hostile: bool,
    /// Items the monster always carries
    pub loadout: &'static [ItemKind],
    /// `(odds, min, max)`: spawn companions when a roll exceeds `odds`
    pub companions: Option<(f64, usize, usize)>,
    pub on_attack: OnAttack,
    /// Peaceful characters offering trade or quests
    pub role: Option<NpcRole>,
    pub gold: u32,
}

const fn hostile(
    name: &'static str,
    glyph: char,
    fg: (u8, u8, u8),
    stats: (i32, i32, i32),
    xp_given: u32,
) -> MonsterDef {
    MonsterDef {
        name,
        glyph,
        fg,
        hp: stats.0,
        defense: stats.1,
        power: stats.2,
        xp_given,
        hostile: true,
        loadout: &[],
        companions: None,
        on_attack: OnAttack::None,
        role: None,
        gold: 0,
    }
}

/// All monster kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    Orc,
    Gremlin,
    Troll,
    BroomTroll,
    ThwackingOrc,
    BurningOrc,
    ResoluteOrc,
    KnurledGoblin,
    MusculousGoblin,
    SatyricGoblin,
    InsuperableTroll,
    GiantAnt,
    FireAnt,
    Chicatrice,
    AcidBlob,
    JuliusMattius,
    Martinella,
}

impl MonsterKind {
    pub fn def(&self) -> MonsterDef {
        match self {
            MonsterKind::Orc => hostile("Orc", 'o', (63, 127, 63), (10, 1, 2), 40),
            MonsterKind::Gremlin => hostile("Gremlin", 'G', (120, 90, 40), (8, 0, 3), 15),
            MonsterKind::Troll => hostile("Troll", 'T', (0, 127, 0), (15, 2, 2), 40),
            MonsterKind::BroomTroll => MonsterDef {
                loadout: &[ItemKind::Broom],
                ..hostile("Broom Troll", 'T', (0, 127, 50), (20, 3, 4), 50)
            },
            MonsterKind::ThwackingOrc => hostile("Thwacking Orc", 'o', (0, 65, 65), (22, 4, 5), 60),
            MonsterKind::BurningOrc => hostile("Burning Orc", 'o', (150, 50, 50), (24, 6, 6), 70),
            MonsterKind::ResoluteOrc => hostile("Resolute Orc", 'o', (50, 120, 130), (28, 7, 8), 80),
            MonsterKind::KnurledGoblin => hostile("Knurled Goblin", 'g', (65, 65, 95), (30, 9, 9), 90),
            MonsterKind::MusculousGoblin => {
                hostile("Musculous Goblin", 'g', (75, 95, 105), (32, 10, 12), 110)
            }
            MonsterKind::SatyricGoblin => hostile("Satyric Goblin", 'g', (75, 65, 55), (35, 13, 13), 130),
            MonsterKind::InsuperableTroll => {
                hostile("Insuperable Troll", 'T', (65, 105, 105), (37, 14, 15), 160)
            }
            MonsterKind::GiantAnt => MonsterDef {
                companions: Some((0.5, 2, 4)),
                ..hostile("Giant Ant", 'a', (85, 105, 105), (7, 2, 2), 25)
            },
            MonsterKind::FireAnt => hostile("Fire Ant", 'a', (185, 105, 105), (7, 3, 3), 45),
            MonsterKind::Chicatrice => MonsterDef {
                on_attack: OnAttack::Petrify,
                ..hostile("Chicatrice", 'c', (63, 163, 63), (12, 3, 3), 40)
            },
            MonsterKind::AcidBlob => hostile("Acid Blob", 'b', (63, 63, 63), (10, 2, 2), 40),
            MonsterKind::JuliusMattius => MonsterDef {
                hostile: false,
                loadout: &[
                    ItemKind::FireballScroll,
                    ItemKind::Sword,
                    ItemKind::LeatherArmor,
                    ItemKind::Broom,
                    ItemKind::MagicMissileScroll,
                ],
                role: Some(NpcRole::Merchant),
                gold: 500,
                ..hostile("Julius Mattius", 'T', (250, 50, 155), (15, 2, 2), 40)
            },
            MonsterKind::Martinella => MonsterDef {
                hostile: false,
                loadout: &[ItemKind::BurlyArmor],
                role: Some(NpcRole::QuestGiver),
                gold: 100,
                ..hostile("Martinella", 'o', (25, 25, 205), (10, 1, 2), 40)
            },
        }
    }
}

/// Spawn a monster carrying `items`. Sleeping monsters stay asleep until woken.
pub fn spawn_monster(
    world: &mut World,
    kind: MonsterKind,
    pos: Position,
    level: LevelId,
    items: Vec<Item>,
    asleep: bool,
) -> Entity {
    let def = kind.def();
    let status = StatusTimers {
        asleep: if asleep { -1 } else { 0 },
        ..StatusTimers::default()
    };

    let mut inventory = Inventory::with_items(DEFAULT_CAPACITY, items);
    inventory.add_gold(def.gold);

    let entity = world.spawn((
        Monster { kind },
        Name::new(def.name),
        pos,
        OnLevel(level),
        Renderable::new(def.glyph, def.fg).with_order(render_order::ACTOR),
        Fighter::new(def.hp, def.defense, def.power),
        CharLevel::new(def.xp_given),
        status,
        BlocksMovement,
        InventoryComponent { inventory },
        EquipmentComponent {
            equipment: Equipment::new(),
        },
    ));

    if def.hostile {
        let _ = world.insert_one(entity, Hostile::default());
    }
    if let Some(role) = def.role {
        let _ = world.insert_one(entity, Npc { role });
    }

    log::debug!("Spawned {} at ({}, {}) on {:?}", def.name, pos.x, pos.y, level);
    entity
}

/// Number of companions to bring along, if the kind has any and the roll succeeds
pub fn roll_companions(kind: MonsterKind, rng: &mut impl Rng) -> usize {
    match kind.def().companions {
        Some((odds, min, max)) if rng.gen::<f64>() > odds => rng.gen_range(min..=max),
        _ => 0,
    }
}
