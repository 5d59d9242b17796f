//! Turn engine
//!
//! One player command resolves per call to `Game::submit`. A command that
//! takes game time is followed by the enemy pass: status ticks for every
//! living entity, then hostile AI, then regeneration and FOV. Rejected
//! commands and level transitions cost no time.

use hecs::Entity;
use rand::seq::SliceRandom;
use rand::Rng;

use super::actions::{capitalize, Action, Impossible};
use super::messages::MessageCategory;
use super::state::{Game, TravelError};
use crate::combat::StatusTick;
use crate::ecs::systems::{
    self, closest_visible_enemy, equip_first_available, pick_up_equippables, WAKE_RADIUS,
};
use crate::ecs::{
    queries, CharLevel, Direction, Fighter, Hostile, InventoryComponent, Monster, Position,
    StatusTimers,
};
use crate::entities::{AttackHook, PETRIFY_TURNS};
use crate::items::{ItemId, ItemKind};
use crate::progression::LevelUpChoice;
use crate::world::generation::GenerationError;
use crate::world::LevelId;

/// Range of a monster's lightning scroll
const AI_LIGHTNING_RANGE: i32 = 5;

/// A player command from the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// A turn-consuming action
    Act(Action),
    Descend,
    Ascend,
    LevelUp(LevelUpChoice),
    /// Speak to an adjacent character
    Talk,
    /// Reply to a pending quest offer
    Answer(bool),
    Buy(ItemId),
    Sell(ItemId),
}

/// How a submitted command played out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The action resolved and the enemies took their turn
    Acted,
    /// Resolved without spending game time
    Free,
    /// Impossible; nothing changed
    Rejected,
}

impl Game {
    /// Resolve one player command. Only generation failures are errors;
    /// impossible commands are reported in the message log.
    pub fn submit(&mut self, command: Command) -> Result<TurnOutcome, GenerationError> {
        if !self.is_alive(self.player) {
            self.messages.add_unique("You are dead.", MessageCategory::Warning);
            return Ok(TurnOutcome::Rejected);
        }

        let awaiting_answer = self.quests.pending().is_some();
        let result = match command {
            Command::Answer(accept) => self.answer(accept).map(|()| TurnOutcome::Free),
            _ if awaiting_answer => Err(Impossible::new("Answer first. [Y/N]")),
            Command::Act(action) => self.player_act(action).map(|()| TurnOutcome::Acted),
            Command::LevelUp(choice) => self.level_up(choice).map(|()| TurnOutcome::Free),
            Command::Descend => self.travel(Game::descend)?,
            Command::Ascend => self.travel(Game::ascend)?,
            Command::Talk => self.talk().map(|()| TurnOutcome::Free),
            Command::Buy(id) => self.buy(id).map(|()| TurnOutcome::Free),
            Command::Sell(id) => self.sell(id).map(|()| TurnOutcome::Free),
        };

        match result {
            Ok(TurnOutcome::Acted) => {
                self.end_turn();
                Ok(TurnOutcome::Acted)
            }
            Ok(outcome) => Ok(outcome),
            Err(Impossible(reason)) => {
                log::debug!("Rejected {:?}: {}", command, reason);
                self.messages.add(reason, MessageCategory::Warning);
                Ok(TurnOutcome::Rejected)
            }
        }
    }

    fn travel(
        &mut self,
        go: fn(&mut Game) -> Result<(), TravelError>,
    ) -> Result<Result<TurnOutcome, Impossible>, GenerationError> {
        match go(self) {
            Ok(()) => Ok(Ok(TurnOutcome::Free)),
            Err(TravelError::Impossible(e)) => Ok(Err(e)),
            Err(TravelError::Generation(e)) => Err(e),
        }
    }

    fn player_act(&mut self, action: Action) -> Result<(), Impossible> {
        let helpless = self
            .world
            .get::<&StatusTimers>(self.player)
            .map_or(false, |s| !s.can_act());
        if helpless {
            self.messages
                .add("You are unable to move", MessageCategory::Status);
            return self.perform(self.player, Action::Wait);
        }
        self.perform(self.player, action)?;
        if matches!(action, Action::Pickup | Action::Break(_)) {
            self.check_quest_items();
        }
        Ok(())
    }

    fn level_up(&mut self, choice: LevelUpChoice) -> Result<(), Impossible> {
        let player = self.player;
        let mut query = self
            .world
            .query_one::<(&mut CharLevel, &mut Fighter)>(player)
            .map_err(|_| Impossible::new("You are not ready to advance."))?;
        let Some((level, fighter)) = query.get() else {
            return Err(Impossible::new("You are not ready to advance."));
        };
        if !level.requires_level_up() {
            return Err(Impossible::new("You are not ready to advance."));
        }
        let text = level.level_up(choice, fighter);
        drop(query);
        self.messages.add(text, MessageCategory::Status);
        Ok(())
    }

    /// Everything that happens after the player spent a turn
    fn end_turn(&mut self) {
        let level = self.levels.current();

        for entity in queries::living_on_level(&self.world, level) {
            self.tick_status(entity);
        }

        // Snapshot: the pass spawns loot and turns monsters into remains
        let hostiles: Vec<Entity> = queries::living_on_level(&self.world, level)
            .into_iter()
            .filter(|e| self.world.get::<&Hostile>(*e).is_ok())
            .collect();
        for entity in hostiles {
            if !self.is_alive(self.player) {
                break;
            }
            let ready = self.is_alive(entity)
                && self.world.get::<&Hostile>(entity).is_ok()
                && self
                    .world
                    .get::<&StatusTimers>(entity)
                    .map_or(true, |s| s.can_act());
            if ready {
                self.hostile_turn(entity);
            }
        }

        if self.is_alive(self.player) && self.rng.gen_bool(self.config.regen_chance) {
            if let Ok(mut fighter) = self.world.get::<&mut Fighter>(self.player) {
                fighter.heal(self.config.regen_amount);
            }
        }

        self.update_fov();
        self.levels.current_map_mut().make_turn();
        self.turn += 1;
    }

    fn tick_status(&mut self, entity: Entity) {
        let tick = match self.world.get::<&mut StatusTimers>(entity) {
            Ok(mut status) => status.tick(&mut self.rng),
            Err(_) => return,
        };
        if tick == StatusTick::default() {
            return;
        }
        let name = capitalize(&self.name_of(entity));

        if tick.poison_damage > 0 {
            self.messages.add(
                format!("{} suffers {} poison damage.", name, tick.poison_damage),
                MessageCategory::Status,
            );
            if self.damage(entity, tick.poison_damage) {
                return;
            }
        }
        if tick.poison_death {
            self.messages
                .add(format!("{} succumbs to the poison.", name), MessageCategory::Status);
            self.slay(entity);
            return;
        }
        if tick.petrified {
            self.messages
                .add(format!("{} turns to stone!", name), MessageCategory::Status);
            self.slay(entity);
            return;
        }
        if tick.recovered {
            self.messages
                .add(format!("{} feels better.", name), MessageCategory::Status);
        }
        if tick.landed {
            self.messages
                .add(format!("{} floats back to the ground.", name), MessageCategory::Status);
        }
    }

    /// One hostile entity's decision for this turn
    fn hostile_turn(&mut self, actor: Entity) {
        let Ok((pos, level)) = self.placement(actor) else {
            return;
        };
        let name = capitalize(&self.name_of(actor));

        // Gear first
        let picked = pick_up_equippables(&mut self.world, actor);
        if !picked.is_empty() {
            for item in picked {
                self.messages
                    .add(format!("{} picks up the {}.", name, item), MessageCategory::Item);
            }
            return;
        }
        if let Some(item) = equip_first_available(&mut self.world, actor) {
            self.messages
                .add(format!("{} equips the {}.", name, item), MessageCategory::Item);
            return;
        }

        let confused = self
            .world
            .get::<&StatusTimers>(actor)
            .map_or(0, |s| s.confused);
        if confused > 0 {
            let dir = Direction::ALL
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(Direction::North);
            self.status_countdown_confusion(actor);
            let _ = self.perform(actor, Action::Bump(dir));
            return;
        }

        let Some(target_pos) = self.player_position() else {
            return;
        };

        // FOV is symmetric: a monster standing in a lit cell sees the player
        if self.levels.current_map().is_visible(pos) {
            let scroll = self
                .world
                .get::<&InventoryComponent>(actor)
                .ok()
                .and_then(|inv| inv.inventory.find_kind(ItemKind::LightningScroll).map(|i| i.id));
            let in_reach = closest_visible_enemy(
                &self.world,
                self.levels.current_map(),
                actor,
                AI_LIGHTNING_RANGE,
            ) == Some(self.player);
            if let (Some(scroll), true) = (scroll, in_reach) {
                self.wake_around(actor, pos, level);
                if self
                    .perform(actor, Action::Activate { item: scroll, target: None })
                    .is_ok()
                {
                    return;
                }
            }

            if pos.chebyshev_distance(&target_pos) <= 1 {
                if let Ok(mut status) = self.world.get::<&mut StatusTimers>(self.player) {
                    status.wake();
                }
                self.wake_around(actor, pos, level);
                if let Some(dir) = Direction::from_delta(pos.direction_to(&target_pos)) {
                    if self.perform(actor, Action::Melee(dir)).is_ok() {
                        self.after_attack(actor);
                    }
                }
                return;
            }

            let path =
                systems::plan_path(&self.world, self.levels.current_map(), level, pos, target_pos);
            systems::set_path(&mut self.world, actor, path);
        }

        if let Some(step) = systems::next_step(&mut self.world, actor) {
            if let Some(dir) = Direction::from_delta(pos.direction_to(&step)) {
                // A blocked step just wastes the turn
                let _ = self.perform(actor, Action::Move(dir));
            }
        }
    }

    fn status_countdown_confusion(&mut self, actor: Entity) {
        let cleared = match self.world.get::<&mut StatusTimers>(actor) {
            Ok(mut status) => {
                status.confused -= 1;
                status.confused == 0
            }
            Err(_) => false,
        };
        if cleared {
            self.messages.add(
                format!("The {} is no longer confused.", self.name_of(actor)),
                MessageCategory::Status,
            );
        }
    }

    fn wake_around(&mut self, actor: Entity, pos: Position, level: LevelId) {
        let woken = systems::wake_nearby(&mut self.world, level, pos, WAKE_RADIUS, actor);
        if !woken.is_empty() {
            self.messages.add(
                format!("Monsters wake up: {}", woken.join(", ")),
                MessageCategory::Status,
            );
        }
    }

    /// Run the attacker's on-attack hook against the player
    fn after_attack(&mut self, actor: Entity) {
        if !self.is_alive(self.player) {
            return;
        }
        let Ok(hook) = self
            .world
            .get::<&Monster>(actor)
            .map(|m| m.kind.def().on_attack)
        else {
            return;
        };
        let outcome = hook.trigger(&mut self.rng);
        if outcome == AttackHook::Nothing {
            return;
        }
        self.messages.add(
            format!("{} hisses at {}", capitalize(&self.name_of(actor)), self.name_of(self.player)),
            MessageCategory::Combat,
        );
        if outcome == AttackHook::HissAndPetrify {
            if let Ok(mut status) = self.world.get::<&mut StatusTimers>(self.player) {
                if status.turning_to_stone == 0 {
                    status.turning_to_stone = PETRIFY_TURNS;
                }
            }
            self.messages
                .add("You feel your limbs stiffening!", MessageCategory::Status);
        }
    }
}
