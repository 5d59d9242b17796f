//! Quests and conversations
//!
//! Peaceful special characters either hand out a quest or have something
//! to say once the player carries the right item. Both are static tables
//! keyed by the character's monster kind.

use serde::{Deserialize, Serialize};

use crate::entities::MonsterKind;
use crate::items::ItemKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuestId {
    Martinella,
}

/// A quest definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quest {
    pub id: QuestId,
    pub name: &'static str,
    pub giver: MonsterKind,
    /// Told when the quest is offered
    pub offer: &'static [&'static str],
    pub question: &'static str,
    /// The quest is done once this is carried back to the giver
    pub end_condition: ItemKind,
    pub end_text: &'static [&'static str],
    pub reward_gold: u32,
    pub reward_items: &'static [ItemKind],
}

/// Lines a character speaks when the player carries `condition`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conversation {
    pub speaker: MonsterKind,
    pub condition: ItemKind,
    pub lines: &'static [&'static str],
}

pub const QUESTS: &[Quest] = &[Quest {
    id: QuestId::Martinella,
    name: "Martinella Quest",
    giver: MonsterKind::Martinella,
    offer: &[
        "Whether by skill or ingenuity, the ringing sword shall be demolished if this part of the caves is to enjoy its rightful peace.",
        "You will have your reward.",
        "I spoke.",
        "Martinella humphs and crosses his arms.",
    ],
    question: "Will you help? [Y/N]",
    end_condition: ItemKind::BrokenSwordOfRingingBell,
    end_text: &[
        "Beauty of the blade so illustrious.. that part of me wishes I could have kept it to myself.",
        "Yet it was wise on my part to have it broken..",
    ],
    reward_gold: 100,
    reward_items: &[ItemKind::BurlyArmor],
}];

pub const CONVERSATIONS: &[Conversation] = &[Conversation {
    speaker: MonsterKind::JuliusMattius,
    condition: ItemKind::Note,
    lines: &[
        "Victorious gentle-Troll, I found a mysterious tattered scroll nearby, may you help me find out more as it relates to matters I may be interested in?",
        "Traveler, it seems to be a barely legible pergament, it is surely a figment of some diseased mind of some sorry dweller of this part of the caves.",
        "-- Julius seems worried and slightly discombobulated. --",
    ],
}];

pub fn quest(id: QuestId) -> &'static Quest {
    match id {
        QuestId::Martinella => &QUESTS[0],
    }
}

/// Quest handed out by a character
pub fn quest_for(giver: MonsterKind) -> Option<&'static Quest> {
    QUESTS.iter().find(|q| q.giver == giver)
}

/// Conversation a character holds
pub fn conversation_for(speaker: MonsterKind) -> Option<&'static Conversation> {
    CONVERSATIONS.iter().find(|c| c.speaker == speaker)
}
