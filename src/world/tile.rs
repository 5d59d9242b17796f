//! Tile definitions
//!
//! A tile is a plain record of movement/sight flags and two glyphs
//! (one for remembered-but-dark cells, one for lit cells). `TileType`
//! names the stock tiles the generator lays down.

use serde::{Deserialize, Serialize};

/// Character plus colors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Glyph {
    pub ch: char,
    pub fg: (u8, u8, u8),
    pub bg: (u8, u8, u8),
}

impl Glyph {
    pub const fn new(ch: char, fg: (u8, u8, u8), bg: (u8, u8, u8)) -> Self {
        Self { ch, fg, bg }
    }
}

/// A single map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub walkable: bool,
    pub transparent: bool,
    pub dark: Glyph,
    pub light: Glyph,
}

impl Tile {
    pub fn is_walkable(&self) -> bool {
        self.walkable
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// The glyph to draw depending on whether the cell is lit
    pub fn glyph(&self, lit: bool) -> Glyph {
        if lit {
            self.light
        } else {
            self.dark
        }
    }

    /// Reverse lookup of the stock tile this record matches
    pub fn tile_type(&self) -> Option<TileType> {
        TileType::ALL.iter().copied().find(|t| t.tile() == *self)
    }
}

impl Default for Tile {
    fn default() -> Self {
        TileType::Wall.tile()
    }
}

/// Never-seen cells
pub const SHROUD: Glyph = Glyph::new(' ', (255, 255, 255), (0, 0, 0));

const WHITE: (u8, u8, u8) = (255, 255, 255);
const FLOOR_DARK: (u8, u8, u8) = (50, 50, 150);
const FLOOR_LIGHT: (u8, u8, u8) = (200, 180, 50);
const WALL_DARK: (u8, u8, u8) = (0, 0, 100);
const WALL_LIGHT: (u8, u8, u8) = (130, 110, 50);

/// Stock tile kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Floor,
    Wall,
    /// Looks and behaves like a wall until found by searching
    HiddenPassage,
    StairsDown,
    StairsUp,
}

impl TileType {
    pub const ALL: [TileType; 5] = [
        TileType::Floor,
        TileType::Wall,
        TileType::HiddenPassage,
        TileType::StairsDown,
        TileType::StairsUp,
    ];

    pub fn tile(&self) -> Tile {
        match self {
            TileType::Floor => Tile {
                walkable: true,
                transparent: true,
                dark: Glyph::new(' ', WHITE, FLOOR_DARK),
                light: Glyph::new(' ', WHITE, FLOOR_LIGHT),
            },
            TileType::Wall => Tile {
                walkable: false,
                transparent: false,
                dark: Glyph::new(' ', WHITE, WALL_DARK),
                light: Glyph::new(' ', WHITE, WALL_LIGHT),
            },
            // Same glyphs as a wall; only the tile identity differs
            TileType::HiddenPassage => Tile {
                walkable: false,
                transparent: false,
                dark: Glyph::new(' ', (254, 254, 254), WALL_DARK),
                light: Glyph::new(' ', (254, 254, 254), WALL_LIGHT),
            },
            TileType::StairsDown => Tile {
                walkable: true,
                transparent: true,
                dark: Glyph::new('>', WALL_DARK, FLOOR_DARK),
                light: Glyph::new('>', WHITE, FLOOR_LIGHT),
            },
            TileType::StairsUp => Tile {
                walkable: true,
                transparent: true,
                dark: Glyph::new('<', WALL_DARK, FLOOR_DARK),
                light: Glyph::new('<', WHITE, FLOOR_LIGHT),
            },
        }
    }

    /// ASCII stand-in used by the text driver
    pub fn ascii(&self) -> char {
        match self {
            TileType::Floor => '.',
            TileType::Wall | TileType::HiddenPassage => '#',
            TileType::StairsDown => '>',
            TileType::StairsUp => '<',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_tiles_are_distinct() {
        for a in TileType::ALL {
            for b in TileType::ALL {
                assert_eq!(a == b, a.tile() == b.tile(), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_hidden_passage_blocks_like_wall() {
        let t = TileType::HiddenPassage.tile();
        assert!(!t.is_walkable());
        assert!(!t.is_transparent());
        assert_eq!(t.tile_type(), Some(TileType::HiddenPassage));
        assert_eq!(TileType::HiddenPassage.ascii(), TileType::Wall.ascii());
    }
}
