//! Talking and trading with peaceful characters
//!
//! None of this takes game time. A quest offer leaves the session waiting
//! for a yes/no answer; quest progress is kept in a `QuestLog` that is part
//! of the save.

use std::collections::BTreeMap;

use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::actions::{capitalize, Impossible};
use super::messages::MessageCategory;
use super::state::Game;
use crate::data::{conversation_for, quest, quest_for, Quest, QuestId, QUESTS};
use crate::ecs::{queries, EquipmentComponent, InventoryComponent, Monster, Npc, NpcRole};
use crate::entities::spawn_ground_item;
use crate::items::{ItemId, ItemKind};

/// How far along a quest is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestStage {
    /// Told, not yet accepted
    Offered,
    Active,
    /// The end condition has been in the inventory since the last check
    Fulfilled,
    Completed,
}

/// Quests the player has heard of
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestLog {
    stages: BTreeMap<QuestId, QuestStage>,
    /// Offer waiting for an answer
    pending: Option<QuestId>,
}

impl QuestLog {
    pub fn stage(&self, id: QuestId) -> Option<QuestStage> {
        self.stages.get(&id).copied()
    }

    pub fn pending(&self) -> Option<QuestId> {
        self.pending
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestId, QuestStage)> + '_ {
        self.stages.iter().map(|(id, stage)| (*id, *stage))
    }

    /// One line per known quest
    pub fn overview(&self) -> Vec<String> {
        self.iter()
            .map(|(id, stage)| {
                let suffix = if stage == QuestStage::Completed { " [completed]" } else { "" };
                format!("{}{}", quest(id).name, suffix)
            })
            .collect()
    }
}

/// A merchant's wares as the player sees them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopView {
    pub merchant: String,
    pub gold: u32,
    /// `(item, name, price)`
    pub stock: Vec<(ItemId, &'static str, u32)>,
}

impl Game {
    pub fn quests(&self) -> &QuestLog {
        &self.quests
    }

    /// Gold the player carries
    pub fn gold(&self) -> u32 {
        self.world
            .get::<&InventoryComponent>(self.player)
            .map_or(0, |inv| inv.inventory.gold())
    }

    fn player_has_kind(&self, kind: ItemKind) -> bool {
        self.world
            .get::<&InventoryComponent>(self.player)
            .map_or(false, |inv| inv.inventory.contains_kind(kind))
    }

    fn say(&mut self, lines: &[&str]) {
        for line in lines {
            self.messages.add(*line, MessageCategory::Dialogue);
        }
    }

    /// Talk to the first adjacent character with something to say
    pub(crate) fn talk(&mut self) -> Result<(), Impossible> {
        let (pos, level) = self.placement(self.player)?;
        let speakers: Vec<(Entity, crate::entities::MonsterKind)> = pos
            .neighbors()
            .filter_map(|cell| queries::living_at(&self.world, level, cell))
            .filter_map(|e| self.world.get::<&Monster>(e).ok().map(|m| (e, m.kind)))
            .collect();

        for (npc, kind) in speakers {
            if let Some(conversation) = conversation_for(kind) {
                if self.player_has_kind(conversation.condition) {
                    self.say(conversation.lines);
                    return Ok(());
                }
            }
            if let Some(quest) = quest_for(kind) {
                if self.quests.stage(quest.id) != Some(QuestStage::Completed) {
                    self.advance_quest(quest, npc);
                    return Ok(());
                }
            }
        }
        Err(Impossible::new("So boring, no-one to talk to.."))
    }

    fn advance_quest(&mut self, quest: &'static Quest, giver: Entity) {
        match self.quests.stage(quest.id) {
            None | Some(QuestStage::Offered) => {
                self.quests.stages.insert(quest.id, QuestStage::Offered);
                self.quests.pending = Some(quest.id);
                self.say(quest.offer);
                self.say(&[quest.question]);
            }
            Some(QuestStage::Active) | Some(QuestStage::Fulfilled) => {
                if self.player_has_kind(quest.end_condition) {
                    self.complete_quest(quest);
                } else {
                    self.quests.stages.insert(quest.id, QuestStage::Active);
                    self.messages.add(
                        format!("{} ignores you", capitalize(&self.name_of(giver))),
                        MessageCategory::Dialogue,
                    );
                }
            }
            Some(QuestStage::Completed) => {}
        }
    }

    fn complete_quest(&mut self, quest: &'static Quest) {
        self.quests.stages.insert(quest.id, QuestStage::Completed);
        self.say(quest.end_text);

        if quest.reward_gold > 0 {
            if let Ok(mut inv) = self.world.get::<&mut InventoryComponent>(self.player) {
                inv.inventory.add_gold(quest.reward_gold);
            }
            self.messages.add(
                format!("You receive ${}", quest.reward_gold),
                MessageCategory::Item,
            );
        }
        for kind in quest.reward_items {
            let item = self.ids.create(*kind);
            let overflow = match self.world.get::<&mut InventoryComponent>(self.player) {
                Ok(mut inv) => inv.inventory.add(item).err(),
                Err(_) => Some(item),
            };
            if let Some(item) = overflow {
                if let Ok((pos, level)) = self.placement(self.player) {
                    spawn_ground_item(&mut self.world, item, pos, level);
                }
            }
            self.messages
                .add(format!("You receive {}!", kind.name()), MessageCategory::Item);
        }
        log::info!("Completed {}", quest.name);
    }

    /// Reply to the pending quest offer
    pub(crate) fn answer(&mut self, accept: bool) -> Result<(), Impossible> {
        let id = self
            .quests
            .pending
            .take()
            .ok_or_else(|| Impossible::new("Nobody is waiting for an answer."))?;
        let quest = quest(id);
        if accept {
            self.quests.stages.insert(id, QuestStage::Active);
            self.messages
                .add(format!("You accept the {}.", quest.name), MessageCategory::Dialogue);
            self.check_quest_items();
        } else {
            self.messages.add(
                format!("You turn {} down.", quest.giver.def().name),
                MessageCategory::Dialogue,
            );
        }
        Ok(())
    }

    /// Note active quests whose end condition the player now carries
    pub(crate) fn check_quest_items(&mut self) {
        for quest in QUESTS {
            if self.quests.stage(quest.id) != Some(QuestStage::Active) {
                continue;
            }
            if self.player_has_kind(quest.end_condition) {
                self.quests.stages.insert(quest.id, QuestStage::Fulfilled);
                self.messages.add(
                    format!("You have what {} asked for.", quest.giver.def().name),
                    MessageCategory::Dialogue,
                );
            }
        }
    }

    fn merchant_nearby(&self) -> Result<Entity, Impossible> {
        let (pos, level) = self.placement(self.player)?;
        let merchant = pos
            .neighbors()
            .filter_map(|cell| queries::living_at(&self.world, level, cell))
            .find(|e| {
                self.world
                    .get::<&Npc>(*e)
                    .map_or(false, |npc| npc.role == NpcRole::Merchant)
            })
            .ok_or_else(|| Impossible::new("There is no one to trade with."));
        merchant
    }

    /// Wares of the adjacent merchant, priced for buying
    pub fn shop(&self) -> Result<ShopView, Impossible> {
        let merchant = self.merchant_nearby()?;
        let inv = self
            .world
            .get::<&InventoryComponent>(merchant)
            .map_err(|_| Impossible::new("There is no one to trade with."))?;
        Ok(ShopView {
            merchant: self.name_of(merchant),
            gold: inv.inventory.gold(),
            stock: inv
                .inventory
                .iter()
                .map(|item| (item.id, item.name(), item.kind.buy_price()))
                .collect(),
        })
    }

    /// Buy an item from the adjacent merchant
    pub(crate) fn buy(&mut self, id: ItemId) -> Result<(), Impossible> {
        let merchant = self.merchant_nearby()?;
        let item = self
            .world
            .get::<&InventoryComponent>(merchant)
            .ok()
            .and_then(|inv| inv.inventory.get(id).cloned())
            .ok_or_else(|| Impossible::new("That is not for sale."))?;
        let price = item.kind.buy_price();

        {
            let mut inv = self
                .world
                .get::<&mut InventoryComponent>(self.player)
                .map_err(|_| Impossible::new("You cannot carry anything."))?;
            if inv.inventory.is_full() {
                return Err(Impossible::new("Your inventory is full."));
            }
            if !inv.inventory.spend_gold(price) {
                return Err(Impossible::new("You cannot afford it."));
            }
        }

        if let Ok(mut eq) = self.world.get::<&mut EquipmentComponent>(merchant) {
            eq.equipment.unequip(id);
        }
        if let Ok(mut inv) = self.world.get::<&mut InventoryComponent>(merchant) {
            inv.inventory.remove(id);
            inv.inventory.add_gold(price);
        }
        if let Ok(mut inv) = self.world.get::<&mut InventoryComponent>(self.player) {
            // Room was checked above
            let _ = inv.inventory.add(item.clone());
        }
        self.messages.add(
            format!("You buy the {} for ${}.", item.name(), price),
            MessageCategory::Item,
        );
        self.check_quest_items();
        Ok(())
    }

    /// Sell a carried, unequipped item to the adjacent merchant
    pub(crate) fn sell(&mut self, id: ItemId) -> Result<(), Impossible> {
        let merchant = self.merchant_nearby()?;
        let item = self
            .world
            .get::<&InventoryComponent>(self.player)
            .ok()
            .and_then(|inv| inv.inventory.get(id).cloned())
            .ok_or_else(|| Impossible::new("You do not have that item."))?;
        let equipped = self
            .world
            .get::<&EquipmentComponent>(self.player)
            .map_or(false, |eq| eq.equipment.is_equipped(id));
        if equipped {
            return Err(Impossible::new("Unequip it before selling."));
        }
        let price = item.kind.sell_price();
        let merchant_name = self.name_of(merchant);

        {
            let mut inv = self
                .world
                .get::<&mut InventoryComponent>(merchant)
                .map_err(|_| Impossible::new("There is no one to trade with."))?;
            if inv.inventory.is_full() {
                return Err(Impossible::new(format!("{} has no room for it.", merchant_name)));
            }
            if !inv.inventory.spend_gold(price) {
                return Err(Impossible::new(format!("{} cannot afford it.", merchant_name)));
            }
            let _ = inv.inventory.add(item.clone());
        }
        if let Ok(mut inv) = self.world.get::<&mut InventoryComponent>(self.player) {
            inv.inventory.remove(id);
            inv.inventory.add_gold(price);
        }
        self.messages.add(
            format!("You sell the {} for ${}.", item.name(), price),
            MessageCategory::Item,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Position;
    use crate::entities::MonsterKind;
    use crate::game::actions::tests::{arena, spawn_at};
    use crate::game::{Action, Command, GameState, TurnOutcome};

    fn give(game: &mut Game, kind: ItemKind) -> ItemId {
        let item = game.ids.create(kind);
        let id = item.id;
        if let Ok(mut inv) = game.world.get::<&mut InventoryComponent>(game.player) {
            let _ = inv.inventory.add(item);
        }
        id
    }

    fn find_kind(game: &Game, kind: ItemKind) -> Option<ItemId> {
        game.world
            .get::<&InventoryComponent>(game.player)
            .ok()
            .and_then(|inv| inv.inventory.find_kind(kind).map(|i| i.id))
    }

    fn submit(game: &mut Game, command: Command) -> TurnOutcome {
        match game.submit(command) {
            Ok(outcome) => outcome,
            Err(e) => panic!("generation failed: {}", e),
        }
    }

    #[test]
    fn test_talking_to_nobody() {
        let mut game = arena(61);
        assert_eq!(submit(&mut game, Command::Talk), TurnOutcome::Rejected);
        assert!(game.messages().contains("So boring, no-one to talk to.."));
    }

    #[test]
    fn test_martinella_quest_from_offer_to_reward() {
        let mut game = arena(62);
        spawn_at(&mut game, MonsterKind::Martinella, Position::new(6, 5));

        assert_eq!(submit(&mut game, Command::Talk), TurnOutcome::Free);
        assert_eq!(game.state(), GameState::Dialogue);
        assert_eq!(game.quests().stage(QuestId::Martinella), Some(QuestStage::Offered));
        assert!(game.messages().contains("Will you help? [Y/N]"));

        // Nothing else is accepted until the offer is answered
        assert_eq!(submit(&mut game, Command::Act(Action::Wait)), TurnOutcome::Rejected);
        assert!(game.messages().contains("Answer first. [Y/N]"));
        assert_eq!(game.turn(), 0);

        assert_eq!(submit(&mut game, Command::Answer(true)), TurnOutcome::Free);
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.quests().stage(QuestId::Martinella), Some(QuestStage::Active));

        // Not done yet
        assert_eq!(submit(&mut game, Command::Talk), TurnOutcome::Free);
        assert!(game.messages().contains("Martinella ignores you"));

        // The starting kit holds the Sword of Ringing Bell
        let sword = find_kind(&game, ItemKind::SwordOfRingingBell).expect("starting kit has the sword");
        assert_eq!(submit(&mut game, Command::Act(Action::Break(sword))), TurnOutcome::Acted);
        assert_eq!(game.quests().stage(QuestId::Martinella), Some(QuestStage::Fulfilled));
        assert!(game.messages().contains("You have what Martinella asked for."));

        let gold = game.gold();
        assert_eq!(submit(&mut game, Command::Talk), TurnOutcome::Free);
        assert_eq!(game.quests().stage(QuestId::Martinella), Some(QuestStage::Completed));
        assert_eq!(game.gold(), gold + 100);
        assert!(find_kind(&game, ItemKind::BurlyArmor).is_some());
        assert!(game.messages().contains("You receive $100"));
        assert!(game.messages().contains("You receive Burly Armor!"));
        assert_eq!(game.quests().overview(), vec!["Martinella Quest [completed]".to_string()]);

        // A finished quest has nothing more to say
        assert_eq!(submit(&mut game, Command::Talk), TurnOutcome::Rejected);
    }

    #[test]
    fn test_declined_offer_can_be_repeated() {
        let mut game = arena(63);
        spawn_at(&mut game, MonsterKind::Martinella, Position::new(4, 4));
        assert_eq!(submit(&mut game, Command::Answer(true)), TurnOutcome::Rejected);

        submit(&mut game, Command::Talk);
        assert_eq!(submit(&mut game, Command::Answer(false)), TurnOutcome::Free);
        assert_eq!(game.quests().stage(QuestId::Martinella), Some(QuestStage::Offered));
        assert_eq!(game.quests().pending(), None);

        submit(&mut game, Command::Talk);
        assert_eq!(game.quests().pending(), Some(QuestId::Martinella));
    }

    #[test]
    fn test_picking_up_the_pieces_fulfils_quest() {
        let mut game = arena(64);
        let level = game.current_level();
        spawn_at(&mut game, MonsterKind::Martinella, Position::new(6, 5));
        submit(&mut game, Command::Talk);
        submit(&mut game, Command::Answer(true));

        let pieces = game.ids.create(ItemKind::BrokenSwordOfRingingBell);
        spawn_ground_item(&mut game.world, pieces, Position::new(5, 5), level);
        assert_eq!(submit(&mut game, Command::Act(Action::Pickup)), TurnOutcome::Acted);
        assert_eq!(game.quests().stage(QuestId::Martinella), Some(QuestStage::Fulfilled));
    }

    #[test]
    fn test_julius_speaks_only_about_the_note() {
        let mut game = arena(65);
        spawn_at(&mut game, MonsterKind::JuliusMattius, Position::new(6, 6));
        assert_eq!(submit(&mut game, Command::Talk), TurnOutcome::Rejected);

        give(&mut game, ItemKind::Note);
        assert_eq!(submit(&mut game, Command::Talk), TurnOutcome::Free);
        assert!(game
            .messages()
            .contains("-- Julius seems worried and slightly discombobulated. --"));
    }

    #[test]
    fn test_buy_and_sell_with_julius() {
        let mut game = arena(66);
        let level = game.current_level();
        let stock = vec![game.ids.create(ItemKind::MagicMissileScroll)];
        let julius = crate::entities::spawn_monster(
            &mut game.world,
            MonsterKind::JuliusMattius,
            Position::new(6, 5),
            level,
            stock,
            false,
        );

        let shop = game.shop().expect("Julius is adjacent");
        assert_eq!(shop.gold, 500);
        let (missile, _, price) = *shop
            .stock
            .iter()
            .find(|(_, name, _)| *name == "Magic Missile Scroll")
            .expect("Julius stocks a Magic Missile Scroll");
        assert_eq!(price, 33);

        assert_eq!(submit(&mut game, Command::Buy(missile)), TurnOutcome::Rejected);
        assert!(game.messages().contains("You cannot afford it."));

        let dagger = give(&mut game, ItemKind::Dagger);
        assert_eq!(submit(&mut game, Command::Sell(dagger)), TurnOutcome::Free);
        assert_eq!(game.gold(), 9);
        assert_eq!(
            game.world.get::<&InventoryComponent>(julius).map(|i| i.inventory.gold()).ok(),
            Some(491)
        );

        if let Ok(mut inv) = game.world.get::<&mut InventoryComponent>(game.player) {
            inv.inventory.add_gold(40);
        }
        assert_eq!(submit(&mut game, Command::Buy(missile)), TurnOutcome::Free);
        assert_eq!(game.gold(), 16);
        assert!(find_kind(&game, ItemKind::MagicMissileScroll).is_some());
        assert!(game.messages().contains("You buy the Magic Missile Scroll for $33."));
    }

    #[test]
    fn test_equipped_items_are_not_for_sale() {
        let mut game = arena(67);
        spawn_at(&mut game, MonsterKind::JuliusMattius, Position::new(4, 5));
        let sword = find_kind(&game, ItemKind::Sword).expect("starting kit has a sword");
        submit(&mut game, Command::Act(Action::ToggleEquip(sword)));
        assert_eq!(submit(&mut game, Command::Sell(sword)), TurnOutcome::Rejected);
        assert!(game.messages().contains("Unequip it before selling."));
    }

    #[test]
    fn test_trade_needs_a_merchant() {
        let mut game = arena(68);
        spawn_at(&mut game, MonsterKind::Martinella, Position::new(6, 5));
        assert!(game.shop().is_err());
        let potion = give(&mut game, ItemKind::HealthPotion);
        assert_eq!(submit(&mut game, Command::Sell(potion)), TurnOutcome::Rejected);
        assert!(game.messages().contains("There is no one to trade with."));
    }
}
