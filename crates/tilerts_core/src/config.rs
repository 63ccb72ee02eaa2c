//! Compiled-in game constants and the serializable [`GameConfig`].
//!
//! The constants describe the default session: a 20x15 map of 32-pixel
//! tiles and a single unit walking at 150 pixels per second.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::Fixed;

/// Default map width in tiles.
pub const MAP_WIDTH: i32 = 20;

/// Default map height in tiles.
pub const MAP_HEIGHT: i32 = 15;

/// Default tile edge length in pixels.
pub const TILE_SIZE: i32 = 32;

/// Maximum number of tiles in a [`Path`](crate::pathfinding::Path) and in a
/// unit's [`MovementQueue`](crate::movement::MovementQueue).
pub const MAX_PATH_LENGTH: usize = 128;

/// Upper bound on `width * height` for configured grids.
///
/// The search cost of one `find_path` call is proportional to the cell
/// count and runs inside a single frame, so it stays bounded.
pub const MAX_GRID_CELLS: usize = 64 * 64;

/// Largest tile edge length in pixels.
pub const MAX_TILE_SIZE: i32 = 1024;

/// Upper bound on the map's longest side in world units.
///
/// World positions are `I32F32`, and a squared distance across the whole
/// map (`2 * extent^2`) must stay below `2^31`.
pub const MAX_WORLD_EXTENT: i64 = 16_384;

/// Default unit speed in pixels per second.
pub const DEFAULT_UNIT_SPEED: i32 = 150;

/// Frames per second of the reference frame loop.
pub const FRAME_RATE: u32 = 60;

/// Duration of one reference frame in seconds.
#[must_use]
pub fn frame_dt() -> Fixed {
    Fixed::ONE / Fixed::from_num(FRAME_RATE)
}

/// Session configuration.
///
/// Missing fields fall back to the compiled-in constants, so an empty RON
/// document `()` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Map width in tiles.
    pub map_width: i32,
    /// Map height in tiles.
    pub map_height: i32,
    /// Tile edge length in pixels.
    pub tile_size: i32,
    /// Unit movement speed in pixels per second.
    pub unit_speed: i32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_width: MAP_WIDTH,
            map_height: MAP_HEIGHT,
            tile_size: TILE_SIZE,
            unit_speed: DEFAULT_UNIT_SPEED,
        }
    }
}

impl GameConfig {
    /// Unit speed as a fixed-point value.
    #[must_use]
    pub fn unit_speed_fixed(&self) -> Fixed {
        Fixed::from_num(self.unit_speed)
    }

    /// Parse a config from a RON document and validate it.
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let config: Self = ron::from_str(source).map_err(|e| GameError::DataParseError {
            path: "<config>".into(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the config describes a playable, search-bounded map.
    pub fn validate(&self) -> Result<()> {
        if self.map_width <= 0 || self.map_height <= 0 {
            return Err(GameError::InvalidConfig(format!(
                "map dimensions must be positive, got {}x{}",
                self.map_width, self.map_height
            )));
        }

        let cells = (self.map_width as usize) * (self.map_height as usize);
        if cells > MAX_GRID_CELLS {
            return Err(GameError::InvalidConfig(format!(
                "map has {cells} cells, limit is {MAX_GRID_CELLS}"
            )));
        }

        if self.tile_size <= 0 || self.tile_size > MAX_TILE_SIZE {
            return Err(GameError::InvalidConfig(format!(
                "tile size must be in 1..={MAX_TILE_SIZE}, got {}",
                self.tile_size
            )));
        }

        let extent = i64::from(self.map_width.max(self.map_height)) * i64::from(self.tile_size);
        if extent > MAX_WORLD_EXTENT {
            return Err(GameError::InvalidConfig(format!(
                "map spans {extent} world units, limit is {MAX_WORLD_EXTENT}"
            )));
        }

        if self.unit_speed <= 0 {
            return Err(GameError::InvalidConfig(
                "unit speed must be positive".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_constants() {
        let config = GameConfig::default();
        assert_eq!(config.map_width, 20);
        assert_eq!(config.map_height, 15);
        assert_eq!(config.tile_size, 32);
        assert_eq!(config.unit_speed_fixed(), Fixed::from_num(150));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_ron_uses_defaults() {
        let config = GameConfig::from_ron_str("()").unwrap();
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn test_partial_ron_overrides_fields() {
        let config = GameConfig::from_ron_str("(map_width: 8, map_height: 4)").unwrap();
        assert_eq!(config.map_width, 8);
        assert_eq!(config.map_height, 4);
        assert_eq!(config.tile_size, TILE_SIZE);
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let config = GameConfig {
            map_width: 0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_oversized_grid() {
        let config = GameConfig {
            map_width: 100,
            map_height: 100,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_tiles() {
        let config = GameConfig {
            tile_size: 100_000,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_oversized_world() {
        // 4096 cells is within the cell limit, but 4096 * 32 px is not.
        let config = GameConfig {
            map_width: 4096,
            map_height: 1,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GameConfig {
            map_width: 16,
            map_height: 16,
            tile_size: MAX_TILE_SIZE,
            ..GameConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_speed() {
        let config = GameConfig {
            unit_speed: 0,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_ron_is_parse_error() {
        let err = GameConfig::from_ron_str("(map_width: \"wide\")").unwrap_err();
        assert!(matches!(err, GameError::DataParseError { .. }));
    }
}
