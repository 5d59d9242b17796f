//! Delvetree - Entry Point
//!
//! Line-oriented driver: one command per line on stdin, the visible map
//! and latest messages on stdout after every turn.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};

use delvetree::ecs::{Direction, InventoryComponent, Position};
use delvetree::game::{Action, Command, Game, GameState, TurnOutcome};
use delvetree::progression::LevelUpChoice;
use delvetree::world::{parse_custom_maps, Map};
use delvetree::{data::GameConfig, save};

const CONFIG_FILE: &str = "delvetree.ron";
const CUSTOM_MAPS_FILE: &str = "custom_maps.json";
const MESSAGES_SHOWN: usize = 5;
const SAVE_SLOT: u8 = 0;

/// What a line of input asks for
enum Input {
    Turn(Command),
    Overview,
    Shop,
    Quests,
    Save,
    Quit,
}

fn main() -> Result<()> {
    // Log to a file so stdout stays readable
    let log_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("delvetree.log")
        .context("opening delvetree.log")?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    log::info!("Starting Delvetree v{}", env!("CARGO_PKG_VERSION"));

    let config = GameConfig::load_or_default(Path::new(CONFIG_FILE));
    let custom_maps = load_custom_maps(Path::new(CUSTOM_MAPS_FILE));

    let mut game = match std::env::args().nth(1).as_deref() {
        Some("--load") => save::load_game(SAVE_SLOT, custom_maps).context("loading save")?,
        Some(arg) => {
            let seed: u64 = arg.parse().with_context(|| format!("invalid seed {:?}", arg))?;
            Game::new(seed, config, custom_maps)?
        }
        None => Game::new(rand::random(), config, custom_maps)?,
    };
    log::info!("Session seed {}", game.seed());

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    render(&game, &mut out)?;

    for line in stdin.lock().lines() {
        let line = line?;
        let input = match parse_command(&game, line.trim()) {
            Some(input) => input,
            None => {
                writeln!(out, "Unknown command: {}", line.trim())?;
                continue;
            }
        };

        match input {
            Input::Quit => break,
            Input::Overview => {
                for row in game.level_overview() {
                    writeln!(out, "{}", row)?;
                }
                continue;
            }
            Input::Shop => {
                match game.shop() {
                    Ok(shop) => {
                        writeln!(out, "{} (${})", shop.merchant, shop.gold)?;
                        for (i, (_, name, price)) in shop.stock.iter().enumerate() {
                            writeln!(out, "  {}: {} ${}", i, name, price)?;
                        }
                    }
                    Err(e) => writeln!(out, "{}", e)?,
                }
                continue;
            }
            Input::Quests => {
                for line in game.quests().overview() {
                    writeln!(out, "{}", line)?;
                }
                continue;
            }
            Input::Save => match save::save_game(&mut game, SAVE_SLOT) {
                Ok(()) => writeln!(out, "Saved to {}", save::save_path(SAVE_SLOT).display())?,
                Err(e) => {
                    log::warn!("Save failed: {}", e);
                    writeln!(out, "Save failed: {}", e)?;
                }
            },
            Input::Turn(command) => {
                let outcome = game.submit(command)?;
                log::debug!("{:?} -> {:?}", command, outcome);
                if outcome != TurnOutcome::Free && game.state() == GameState::GameOver {
                    render(&game, &mut out)?;
                    break;
                }
            }
        }
        render(&game, &mut out)?;
    }

    log::info!("Leaving after {} turns", game.turn());
    Ok(())
}

fn load_custom_maps(path: &Path) -> HashMap<String, Map> {
    let Ok(content) = fs::read_to_string(path) else {
        return HashMap::new();
    };
    match parse_custom_maps(&content) {
        Ok(maps) => {
            log::info!("Loaded {} custom maps from {}", maps.len(), path.display());
            maps
        }
        Err(e) => {
            log::warn!("Ignoring {}: {}", path.display(), e);
            HashMap::new()
        }
    }
}

/// Inventory slot number to item id
fn item_at(game: &Game, index: &str) -> Option<delvetree::items::ItemId> {
    let index: usize = index.parse().ok()?;
    let inv = game.world().get::<&InventoryComponent>(game.player()).ok()?;
    inv.inventory.get_at(index).map(|item| item.id)
}

/// Shop slot number to item id
fn stock_at(game: &Game, index: &str) -> Option<delvetree::items::ItemId> {
    let index: usize = index.parse().ok()?;
    let shop = game.shop().ok()?;
    shop.stock.get(index).map(|(id, _, _)| *id)
}

fn parse_command(game: &Game, line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let head = words.next()?;
    let mut chars = head.chars();
    let key = chars.next()?;
    if chars.next().is_some() {
        return None;
    }

    let act = |action| Some(Input::Turn(Command::Act(action)));
    if let Some(dir) = Direction::from_key(key) {
        return act(Action::Bump(dir));
    }
    if let Some(choice) = LevelUpChoice::from_key(key) {
        return Some(Input::Turn(Command::LevelUp(choice)));
    }

    match key {
        '.' => act(Action::Wait),
        'g' => act(Action::Pickup),
        'd' => act(Action::Drop(item_at(game, words.next()?)?)),
        'e' => act(Action::ToggleEquip(item_at(game, words.next()?)?)),
        'x' => act(Action::Break(item_at(game, words.next()?)?)),
        'a' => {
            let item = item_at(game, words.next()?)?;
            let target = match (words.next(), words.next()) {
                (Some(x), Some(y)) => Some(Position::new(x.parse().ok()?, y.parse().ok()?)),
                (None, _) => None,
                _ => return None,
            };
            act(Action::Activate { item, target })
        }
        'K' => {
            let dir = words.next()?.chars().next().and_then(Direction::from_key)?;
            act(Action::Kick(dir))
        }
        's' => act(Action::Search),
        'o' => act(Action::Open),
        '>' => Some(Input::Turn(Command::Descend)),
        '<' => Some(Input::Turn(Command::Ascend)),
        't' => Some(Input::Turn(Command::Talk)),
        'Y' => Some(Input::Turn(Command::Answer(true))),
        'N' => Some(Input::Turn(Command::Answer(false))),
        'B' => Some(Input::Turn(Command::Buy(stock_at(game, words.next()?)?))),
        'p' => Some(Input::Turn(Command::Sell(item_at(game, words.next()?)?))),
        '$' => Some(Input::Shop),
        'Q' => Some(Input::Quests),
        'm' => Some(Input::Overview),
        'S' => Some(Input::Save),
        'q' => Some(Input::Quit),
        _ => None,
    }
}

fn render(game: &Game, out: &mut impl Write) -> Result<()> {
    let map = game.map();
    let mut grid: Vec<Vec<char>> = (0..map.height)
        .map(|y| {
            (0..map.width)
                .map(|x| {
                    let pos = Position::new(x, y);
                    if !map.is_explored(pos) && !map.is_visible(pos) {
                        return ' ';
                    }
                    map.get_tile(x, y).map_or(' ', |tile| match tile.tile_type() {
                        Some(stock) => stock.ascii(),
                        None => tile.glyph(map.is_visible(pos)).ch,
                    })
                })
                .collect()
        })
        .collect();

    let mut entities = game.visible_entities();
    entities.sort_by_key(|e| e.render_order);
    for view in entities {
        if let Some(cell) = grid
            .get_mut(view.pos.y as usize)
            .and_then(|row| row.get_mut(view.pos.x as usize))
        {
            *cell = view.glyph;
        }
    }

    for row in grid {
        writeln!(out, "{}", row.into_iter().collect::<String>().trim_end())?;
    }

    let status = match game.world().get::<&delvetree::ecs::Fighter>(game.player()) {
        Ok(f) => format!("HP {}/{}", f.hp(), f.max_hp),
        Err(_) => String::from("HP ?"),
    };
    writeln!(
        out,
        "{}  ${}  depth {}  turn {}  {:?}",
        status,
        game.gold(),
        map.depth,
        game.turn(),
        game.state()
    )?;

    if let Ok(inv) = game.world().get::<&InventoryComponent>(game.player()) {
        let names: Vec<String> = inv
            .inventory
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}:{}", i, item.name()))
            .collect();
        writeln!(out, "Inventory: {}", names.join(", "))?;
    }

    for message in game.messages().recent(MESSAGES_SHOWN) {
        writeln!(out, "> {}", message.full_text())?;
    }
    out.flush()?;
    Ok(())
}
