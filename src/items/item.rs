//! Item definitions
//!
//! Every item kind is a row in a static property table; behaviour that
//! differs between kinds is dispatched by matching on `ItemKind`.

use serde::{Deserialize, Serialize};

/// Unique item ID for tracking
pub type ItemId = u64;

/// Which kind of equipment slot an item occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    Weapon,
    Armor,
    Tool,
    Ring,
}

/// All item kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    // Consumables
    HealthPotion,
    LightningScroll,
    ConfusionScroll,
    FireballScroll,
    EyeOfIceStormScroll,
    DoorOnFireScroll,
    LevitationScroll,
    SleepScroll,
    AuspiciousRoomScroll,
    MagicMissileScroll,
    // Weapons
    Dagger,
    Sword,
    SwordOfRingingBell,
    // Armor
    LeatherArmor,
    ChainMail,
    BurlyArmor,
    CreakingArmor,
    // Tools & rings
    Broom,
    Abacus,
    Key,
    Pickaxe,
    RingOfFreeAction,
    // Misc
    BrokenSwordOfRingingBell,
    Box,
    Note,
}

/// Static properties of an item kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemProps {
    pub name: &'static str,
    pub glyph: char,
    pub color: (u8, u8, u8),
    pub price: u32,
    pub slot: Option<SlotKind>,
    pub power_bonus: i32,
    pub defense_bonus: i32,
}

const fn plain(name: &'static str, glyph: char, color: (u8, u8, u8), price: u32) -> ItemProps {
    ItemProps {
        name,
        glyph,
        color,
        price,
        slot: None,
        power_bonus: 0,
        defense_bonus: 0,
    }
}

const fn gear(
    name: &'static str,
    slot: SlotKind,
    color: (u8, u8, u8),
    price: u32,
    power_bonus: i32,
    defense_bonus: i32,
) -> ItemProps {
    let glyph = match slot {
        SlotKind::Weapon => ')',
        SlotKind::Armor => '[',
        SlotKind::Tool => ']',
        SlotKind::Ring => '=',
    };
    ItemProps {
        name,
        glyph,
        color,
        price,
        slot: Some(slot),
        power_bonus,
        defense_bonus,
    }
}

impl ItemKind {
    pub fn props(&self) -> ItemProps {
        use SlotKind::*;
        match self {
            ItemKind::HealthPotion => plain("Health Potion", '!', (127, 0, 255), 10),
            ItemKind::LightningScroll => plain("Lightning Scroll", '~', (127, 25, 155), 20),
            ItemKind::ConfusionScroll => plain("Confusion Scroll", '~', (127, 100, 100), 20),
            ItemKind::FireballScroll => plain("Fireball Scroll", '~', (127, 130, 120), 30),
            ItemKind::EyeOfIceStormScroll => plain("Eye of Ice Storm Scroll", '~', (111, 111, 125), 30),
            ItemKind::DoorOnFireScroll => plain("Door on Fire Scroll", '~', (111, 11, 125), 30),
            ItemKind::LevitationScroll => plain("Levitation Scroll", '~', (127, 190, 130), 40),
            ItemKind::SleepScroll => plain("Sleep Scroll", '~', (117, 190, 130), 50),
            ItemKind::AuspiciousRoomScroll => plain("Auspicious Room Scroll", '~', (147, 45, 155), 30),
            ItemKind::MagicMissileScroll => plain("Magic Missile Scroll", '~', (247, 145, 35), 30),
            ItemKind::Dagger => gear("Dagger", Weapon, (0, 191, 255), 10, 2, 0),
            ItemKind::Sword => gear("Sword", Weapon, (0, 91, 255), 25, 4, 0),
            ItemKind::SwordOfRingingBell => gear("Sword of Ringing Bell", Weapon, (90, 120, 155), 25, 4, 0),
            ItemKind::LeatherArmor => gear("Leather Armor", Armor, (0, 1, 255), 25, 0, 2),
            ItemKind::ChainMail => gear("Chain Mail", Armor, (35, 1, 255), 35, 0, 3),
            ItemKind::BurlyArmor => gear("Burly Armor", Armor, (35, 25, 75), 45, 0, 5),
            ItemKind::CreakingArmor => gear("Creaking Armor", Armor, (35, 105, 105), 70, 0, 7),
            ItemKind::Broom => gear("Broom", Tool, (0, 95, 225), 5, 1, 0),
            ItemKind::Abacus => gear("Abacus", Tool, (0, 50, 100), 5, 0, 0),
            ItemKind::Key => gear("Key", Tool, (205, 100, 205), 0, 0, 0),
            ItemKind::Pickaxe => gear("Pickaxe", Tool, (25, 10, 205), 0, 0, 0),
            ItemKind::RingOfFreeAction => gear("Ring of Free Action", Ring, (0, 95, 225), 100, 0, 0),
            ItemKind::BrokenSwordOfRingingBell => {
                plain("Pieces of broken sword of ringing bell", ']', (90, 120, 155), 0)
            }
            ItemKind::Box => plain("Box", ']', (100, 100, 100), 0),
            ItemKind::Note => plain("Note", '[', (35, 35, 35), 0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.props().name
    }

    pub fn slot(&self) -> Option<SlotKind> {
        self.props().slot
    }

    pub fn is_equippable(&self) -> bool {
        self.slot().is_some()
    }

    /// What a merchant charges for it
    pub fn buy_price(&self) -> u32 {
        (self.props().price as f64 * 1.1).round_ties_even() as u32
    }

    /// What a merchant pays for it
    pub fn sell_price(&self) -> u32 {
        (self.props().price as f64 * 0.9).round_ties_even() as u32
    }

    /// What the item turns into when broken
    pub fn broken_variant(&self) -> Option<ItemKind> {
        match self {
            ItemKind::SwordOfRingingBell => Some(ItemKind::BrokenSwordOfRingingBell),
            _ => None,
        }
    }
}

/// Text written on notes
pub const NOTE_TEXT: &str =
    ".. my poor eyes [...] violence of sorrow froze his life's blood, and he fell ...";

/// A concrete item instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    /// Damaged weapons lose a fifth of their power bonus
    pub damaged: bool,
    /// Only meaningful for boxes
    pub locked: bool,
    /// Box contents
    pub contents: Vec<Item>,
}

impl Item {
    pub fn new(id: ItemId, kind: ItemKind) -> Self {
        Self {
            id,
            kind,
            damaged: false,
            locked: false,
            contents: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_container(&self) -> bool {
        self.kind == ItemKind::Box
    }

    pub fn power_bonus(&self) -> i32 {
        let bonus = self.kind.props().power_bonus;
        if self.damaged && self.kind.slot() == Some(SlotKind::Weapon) {
            (bonus as f64 * 0.8).floor() as i32
        } else {
            bonus
        }
    }

    pub fn defense_bonus(&self) -> i32 {
        self.kind.props().defense_bonus
    }

    /// Mark a weapon as damaged. Returns false for anything else.
    pub fn damage(&mut self) -> bool {
        if self.kind.slot() == Some(SlotKind::Weapon) {
            self.damaged = true;
            true
        } else {
            false
        }
    }
}

/// Hands out unique item ids for a session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemIds {
    next: ItemId,
}

impl ItemIds {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Create a fresh item of the given kind
    pub fn create(&mut self, kind: ItemKind) -> Item {
        let id = self.next;
        self.next += 1;
        Item::new(id, kind)
    }
}
