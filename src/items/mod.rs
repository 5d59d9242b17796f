//! Item system

pub mod item;
pub mod inventory;
pub mod equipment;

pub use item::{Item, ItemId, ItemIds, ItemKind, ItemProps, SlotKind, NOTE_TEXT};
pub use inventory::{Inventory, DEFAULT_CAPACITY};
pub use equipment::{EquipSlot, Equipment, Toggle};
