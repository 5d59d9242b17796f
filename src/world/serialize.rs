//! Portable level format
//!
//! A level is written as JSON with its tiles stored column-major
//! (`tiles[x][y]`), each tile a `(walkable, transparent, dark, light)`
//! tuple and each glyph a `(char code, fg, bg)` tuple. Only terrain and
//! stair positions survive; rooms, entities and stair links do not.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{Branch, Glyph, Map, Stairs, Tile};
use crate::ecs::Position;

/// Failure to read a serialized level or custom-map document
#[derive(Debug, thiserror::Error)]
pub enum MapLoadError {
    #[error("malformed map data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("map size {width}x{height} does not match its tile grid")]
    SizeMismatch { width: i32, height: i32 },
    #[error("invalid glyph code {0}")]
    InvalidGlyph(u32),
    #[error("stairs at ({0}, {1}) lie outside the map")]
    StairsOutOfBounds(i32, i32),
}

#[derive(Serialize, Deserialize)]
struct GlyphRecord(u32, [u8; 3], [u8; 3]);

#[derive(Serialize, Deserialize)]
struct TileRecord(bool, bool, GlyphRecord, GlyphRecord);

#[derive(Serialize, Deserialize)]
struct MapRecord {
    width: i32,
    height: i32,
    tiles: Vec<Vec<TileRecord>>,
    up: Option<(i32, i32)>,
    left: Option<(i32, i32)>,
    right: Option<(i32, i32)>,
}

impl From<Glyph> for GlyphRecord {
    fn from(g: Glyph) -> Self {
        GlyphRecord(
            g.ch as u32,
            [g.fg.0, g.fg.1, g.fg.2],
            [g.bg.0, g.bg.1, g.bg.2],
        )
    }
}

impl TryFrom<GlyphRecord> for Glyph {
    type Error = MapLoadError;

    fn try_from(GlyphRecord(code, fg, bg): GlyphRecord) -> Result<Self, Self::Error> {
        let ch = char::from_u32(code).ok_or(MapLoadError::InvalidGlyph(code))?;
        Ok(Glyph::new(ch, (fg[0], fg[1], fg[2]), (bg[0], bg[1], bg[2])))
    }
}

fn stairs_pos(stairs: &Option<Stairs>) -> Option<(i32, i32)> {
    stairs.as_ref().map(|s| (s.pos.x, s.pos.y))
}

impl Map {
    fn to_record(&self) -> MapRecord {
        let tiles = (0..self.width)
            .map(|x| {
                (0..self.height)
                    .map(|y| {
                        let t = self.tiles[self.xy_to_idx(x, y)];
                        TileRecord(t.walkable, t.transparent, t.dark.into(), t.light.into())
                    })
                    .collect()
            })
            .collect();
        MapRecord {
            width: self.width,
            height: self.height,
            tiles,
            up: stairs_pos(&self.up),
            left: stairs_pos(&self.left),
            right: stairs_pos(&self.right),
        }
    }

    fn from_record(record: MapRecord) -> Result<Map, MapLoadError> {
        let MapRecord {
            width,
            height,
            tiles,
            up,
            left,
            right,
        } = record;
        let size_ok = width > 0
            && height > 0
            && tiles.len() == width as usize
            && tiles.iter().all(|col| col.len() == height as usize);
        if !size_ok {
            return Err(MapLoadError::SizeMismatch { width, height });
        }

        let mut map = Map::new(width, height, 0);
        for (x, column) in tiles.into_iter().enumerate() {
            for (y, TileRecord(walkable, transparent, dark, light)) in column.into_iter().enumerate() {
                let tile = Tile {
                    walkable,
                    transparent,
                    dark: dark.try_into()?,
                    light: light.try_into()?,
                };
                map.set_raw_tile(x as i32, y as i32, tile);
            }
        }

        let place = |xy: Option<(i32, i32)>| -> Result<Option<Position>, MapLoadError> {
            match xy {
                Some((x, y)) if !map.in_bounds(x, y) => Err(MapLoadError::StairsOutOfBounds(x, y)),
                Some((x, y)) => Ok(Some(Position::new(x, y))),
                None => Ok(None),
            }
        };
        let up = place(up)?;
        let left = place(left)?;
        let right = place(right)?;
        map.up = up.map(|p| Stairs::up(p, None));
        map.left = left.map(|p| Stairs::down(p, Branch::Left));
        map.right = right.map(|p| Stairs::down(p, Branch::Right));
        Ok(map)
    }

    /// Terrain and stair positions as a JSON document
    pub fn serialize(&self) -> String {
        // Plain data with string keys only; serialization cannot fail
        serde_json::to_string(&self.to_record()).unwrap_or_default()
    }

    /// Rebuild a level from [`Map::serialize`] output
    pub fn load(data: &str) -> Result<Map, MapLoadError> {
        let record: MapRecord = serde_json::from_str(data)?;
        Map::from_record(record)
    }
}

/// Parse a custom-map document: a JSON object of name to serialized map
pub fn parse_custom_maps(data: &str) -> Result<HashMap<String, Map>, MapLoadError> {
    let records: BTreeMap<String, MapRecord> = serde_json::from_str(data)?;
    records
        .into_iter()
        .map(|(name, record)| Ok((name, Map::from_record(record)?)))
        .collect()
}

/// Write a custom-map document with names in sorted order
pub fn write_custom_maps(maps: &HashMap<String, Map>) -> Result<String, MapLoadError> {
    let records: BTreeMap<&str, MapRecord> = maps
        .iter()
        .map(|(name, map)| (name.as_str(), map.to_record()))
        .collect();
    Ok(serde_json::to_string(&records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{Room, TileType};

    fn sample() -> Map {
        let mut map = Map::new(12, 8, 4);
        map.carve_room(&Room::new(1, 1, 6, 5));
        map.set_tile(2, 2, TileType::StairsUp);
        map.set_tile(4, 3, TileType::StairsDown);
        map.set_tile(7, 3, TileType::HiddenPassage);
        map.up = Some(Stairs::up(Position::new(2, 2), Some(Position::new(9, 9))));
        map.left = Some(Stairs::down(Position::new(4, 3), Branch::Left));
        map
    }

    #[test]
    fn test_serialized_map_restores_terrain_and_stairs() {
        let map = sample();
        let loaded = Map::load(&map.serialize());
        let Ok(loaded) = loaded else {
            panic!("load failed: {:?}", loaded.err());
        };
        assert_eq!(loaded.tiles, map.tiles);
        assert_eq!(loaded.tile_type_at(Position::new(7, 3)), Some(TileType::HiddenPassage));
        assert_eq!(loaded.up.as_ref().map(|s| s.pos), Some(Position::new(2, 2)));
        // The link to the level above is not part of the format
        assert_eq!(loaded.up.as_ref().and_then(|s| s.above), None);
        assert_eq!(loaded.left.as_ref().map(|s| s.branch), Some(Branch::Left));
        assert!(loaded.right.is_none());
    }

    #[test]
    fn test_tiles_are_written_column_major() {
        let mut map = Map::new(3, 2, 0);
        map.set_tile(2, 0, TileType::Floor);
        let value: serde_json::Value = serde_json::from_str(&map.serialize()).unwrap();
        let tiles = value["tiles"].as_array().unwrap();
        assert_eq!(tiles.len(), 3);
        assert_eq!(tiles[0].as_array().map(|c| c.len()), Some(2));
        assert_eq!(tiles[2][0][0], serde_json::Value::Bool(true));
        assert_eq!(tiles[2][0][2][0], serde_json::json!(' ' as u32));
    }

    #[test]
    fn test_bad_documents_are_rejected() {
        assert!(matches!(Map::load("{"), Err(MapLoadError::Json(_))));
        let short = r#"{"width":2,"height":1,"tiles":[],"up":null,"left":null,"right":null}"#;
        assert!(matches!(Map::load(short), Err(MapLoadError::SizeMismatch { .. })));
        let tile = r#"[true,true,[32,[1,1,1],[0,0,0]],[32,[1,1,1],[0,0,0]]]"#;
        let stray = format!(
            r#"{{"width":1,"height":1,"tiles":[[{}]],"up":[5,5],"left":null,"right":null}}"#,
            tile
        );
        assert!(matches!(Map::load(&stray), Err(MapLoadError::StairsOutOfBounds(5, 5))));
    }

    #[test]
    fn test_custom_map_document() {
        let mut maps = HashMap::new();
        maps.insert("a".to_string(), sample());
        let text = write_custom_maps(&maps).unwrap();
        let parsed = parse_custom_maps(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed["a"].tiles, maps["a"].tiles);
    }
}
