//! Equipment system
//!
//! Maps each slot to the id of an item kept in the owner's inventory and
//! sums the bonuses of everything equipped.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::inventory::Inventory;
use super::item::{Item, ItemId, SlotKind};

/// Equipment slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
    Weapon,
    Armor,
    Tool,
    Ring1,
    Ring2,
}

impl EquipSlot {
    pub fn all() -> &'static [EquipSlot] {
        &[
            EquipSlot::Weapon,
            EquipSlot::Armor,
            EquipSlot::Tool,
            EquipSlot::Ring1,
            EquipSlot::Ring2,
        ]
    }
}

/// Outcome of toggling an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Equipped { slot: EquipSlot, replaced: Option<ItemId> },
    Unequipped { slot: EquipSlot },
}

/// Equipped item ids per slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    slots: HashMap<EquipSlot, ItemId>,
}

impl Equipment {
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Get item id in a slot
    pub fn get(&self, slot: EquipSlot) -> Option<ItemId> {
        self.slots.get(&slot).copied()
    }

    /// Check if a slot is empty
    pub fn is_empty(&self, slot: EquipSlot) -> bool {
        !self.slots.contains_key(&slot)
    }

    /// Slot an item of this kind would go into (first free ring slot for rings)
    pub fn slot_for(&self, kind: SlotKind) -> EquipSlot {
        match kind {
            SlotKind::Weapon => EquipSlot::Weapon,
            SlotKind::Armor => EquipSlot::Armor,
            SlotKind::Tool => EquipSlot::Tool,
            SlotKind::Ring => {
                if self.is_empty(EquipSlot::Ring1) || !self.is_empty(EquipSlot::Ring2) {
                    EquipSlot::Ring1
                } else {
                    EquipSlot::Ring2
                }
            }
        }
    }

    pub fn slot_available(&self, kind: SlotKind) -> bool {
        self.is_empty(self.slot_for(kind))
    }

    /// Slot holding an item, if equipped
    pub fn slot_of(&self, id: ItemId) -> Option<EquipSlot> {
        self.slots
            .iter()
            .find(|(_, equipped)| **equipped == id)
            .map(|(slot, _)| *slot)
    }

    pub fn is_equipped(&self, id: ItemId) -> bool {
        self.slot_of(id).is_some()
    }

    /// Equip an item, returning whatever it replaced. `None` if not equippable.
    pub fn equip(&mut self, item: &Item) -> Option<(EquipSlot, Option<ItemId>)> {
        let slot = self.slot_for(item.kind.slot()?);
        let replaced = self.slots.insert(slot, item.id);
        Some((slot, replaced))
    }

    /// Unequip by item id
    pub fn unequip(&mut self, id: ItemId) -> Option<EquipSlot> {
        let slot = self.slot_of(id)?;
        self.slots.remove(&slot);
        Some(slot)
    }

    /// Equip if not worn, remove if worn. `None` if not equippable.
    pub fn toggle(&mut self, item: &Item) -> Option<Toggle> {
        if let Some(slot) = self.unequip(item.id) {
            return Some(Toggle::Unequipped { slot });
        }
        let (slot, replaced) = self.equip(item)?;
        Some(Toggle::Equipped { slot, replaced })
    }

    /// Weapon, armor and tool all filled
    pub fn fully_equipped(&self) -> bool {
        [EquipSlot::Weapon, EquipSlot::Armor, EquipSlot::Tool]
            .iter()
            .all(|s| !self.is_empty(*s))
    }

    fn equipped_items<'a>(&'a self, inventory: &'a Inventory) -> impl Iterator<Item = &'a Item> + 'a {
        self.slots.values().filter_map(move |id| inventory.get(*id))
    }

    /// Total power bonus from all equipment
    pub fn power_bonus(&self, inventory: &Inventory) -> i32 {
        self.equipped_items(inventory).map(|i| i.power_bonus()).sum()
    }

    /// Total defense bonus from all equipment
    pub fn defense_bonus(&self, inventory: &Inventory) -> i32 {
        self.equipped_items(inventory).map(|i| i.defense_bonus()).sum()
    }
}
