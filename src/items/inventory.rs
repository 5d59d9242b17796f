//! Inventory system
//!
//! Bounded, ordered list of carried items, plus the owner's gold.

use serde::{Deserialize, Serialize};

use super::item::{Item, ItemId, ItemKind};

/// Default number of items an entity can carry
pub const DEFAULT_CAPACITY: usize = 20;

/// Carried items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
    capacity: usize,
    #[serde(default)]
    gold: u32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Inventory {
    /// Create a new inventory
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
            gold: 0,
        }
    }

    /// Inventory pre-filled with a spawn loadout
    pub fn with_items(capacity: usize, items: Vec<Item>) -> Self {
        Self {
            items,
            capacity,
            gold: 0,
        }
    }

    /// Get current number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Add an item, handing it back if there is no room
    pub fn add(&mut self, item: Item) -> Result<(), Item> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    /// Remove an item by ID
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let idx = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(idx))
    }

    /// Replace an item in place, keeping its position
    pub fn replace(&mut self, id: ItemId, item: Item) -> bool {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Item by display position
    pub fn get_at(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Membership by kind
    pub fn contains_kind(&self, kind: ItemKind) -> bool {
        self.items.iter().any(|i| i.kind == kind)
    }

    pub fn find_kind(&self, kind: ItemKind) -> Option<&Item> {
        self.items.iter().find(|i| i.kind == kind)
    }

    /// Get current gold
    pub fn gold(&self) -> u32 {
        self.gold
    }

    /// Add gold
    pub fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Spend gold, returns false if not enough
    pub fn spend_gold(&mut self, amount: u32) -> bool {
        if self.gold >= amount {
            self.gold -= amount;
            true
        } else {
            false
        }
    }

    /// Empty the inventory, returning everything in order
    pub fn take_all(&mut self) -> Vec<Item> {
        std::mem::take(&mut self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemIds;

    #[test]
    fn test_capacity_is_enforced() {
        let mut ids = ItemIds::new();
        let mut inv = Inventory::new(2);
        assert!(inv.add(ids.create(ItemKind::Dagger)).is_ok());
        assert!(inv.add(ids.create(ItemKind::Key)).is_ok());
        assert!(inv.is_full());
        let rejected = inv.add(ids.create(ItemKind::Note));
        assert_eq!(rejected.map_err(|i| i.kind), Err(ItemKind::Note));
        assert_eq!(inv.len(), 2);
    }

    #[test]
    fn test_remove_and_membership() {
        let mut ids = ItemIds::new();
        let mut inv = Inventory::default();
        let key = ids.create(ItemKind::Key);
        let key_id = key.id;
        inv.add(ids.create(ItemKind::HealthPotion)).ok();
        inv.add(key).ok();
        assert!(inv.contains_kind(ItemKind::Key));
        assert_eq!(inv.remove(key_id).map(|i| i.kind), Some(ItemKind::Key));
        assert!(!inv.contains_kind(ItemKind::Key));
        assert_eq!(inv.remove(key_id), None);
        assert_eq!(inv.get_at(0).map(|i| i.kind), Some(ItemKind::HealthPotion));
    }

    #[test]
    fn test_gold_cannot_go_negative() {
        let mut inv = Inventory::new(5);
        inv.add_gold(30);
        assert!(!inv.spend_gold(31));
        assert_eq!(inv.gold(), 30);
        assert!(inv.spend_gold(30));
        assert_eq!(inv.gold(), 0);
    }
}
