//! RON config loader
//!
//! Loads tunables from an external RON file, with fallback to hardcoded defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Session tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map_width: i32,
    pub map_height: i32,
    pub room_min_size: i32,
    pub room_max_size: i32,
    pub max_rooms: usize,
    /// Total levels a session may generate; beyond it no down stairs are placed
    pub max_levels: usize,
    pub fov_radius: i32,
    pub inventory_capacity: usize,
    pub regen_chance: f64,
    pub regen_amount: i32,
    pub message_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: 80,
            map_height: 45,
            room_min_size: 6,
            room_max_size: 10,
            max_rooms: 5,
            max_levels: 25,
            fov_radius: 8,
            inventory_capacity: 20,
            regen_chance: 0.5,
            regen_amount: 2,
            message_capacity: 100,
        }
    }
}

impl GameConfig {
    /// Load from a RON file, falling back to defaults if missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match Self::from_ron(&content) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    return config;
                }
                Err(e) => log::warn!("Failed to parse {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Failed to read {}: {}", path.display(), e),
        }
        Self::default()
    }

    pub fn from_ron(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_ron_keeps_defaults() {
        let config = GameConfig::from_ron("(max_levels: 3, fov_radius: 5)").ok();
        let config = config.unwrap_or_default();
        assert_eq!(config.max_levels, 3);
        assert_eq!(config.fov_radius, 5);
        assert_eq!(config.map_width, 80);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = GameConfig::load_or_default(Path::new("/nonexistent/delvetree.ron"));
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_ron_round_trip() {
        let config = GameConfig {
            max_rooms: 6,
            ..GameConfig::default()
        };
        let text = config.to_ron().unwrap_or_default();
        assert_eq!(GameConfig::from_ron(&text).ok(), Some(config));
    }
}
