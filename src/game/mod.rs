//! Game module - session state, actions and the turn engine

mod actions;
mod death;
mod dialogue;
mod effects;
mod messages;
mod state;
mod turn;

pub use actions::{Action, Impossible};
pub use dialogue::{QuestLog, QuestStage, ShopView};
pub use messages::{GameMessage, MessageCategory, MessageLog};
pub use state::{EntityView, Game, GameState, TravelError};
pub use turn::{Command, TurnOutcome};
