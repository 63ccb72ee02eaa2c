//! Scenario loading and configuration.
//!
//! A scenario fixes the map, the starting units and a script of mouse
//! clicks, so a headless run is reproducible from a single RON file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tilerts_core::config::GameConfig;
use tilerts_core::error::GameError;
use tilerts_core::game::GameState;
use tilerts_core::grid::TilePos;
use tilerts_core::unit::UnitId;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// A blocked tile lies off the map.
    #[error("Blocked tile {0} is outside the map")]
    BlockedOutOfBounds(TilePos),
    /// The session could not be set up.
    #[error("Failed to set up scenario: {0}")]
    Setup(#[from] GameError),
}

/// A scripted left click in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Click {
    /// Frame the click lands on; applied before that frame's update.
    pub frame: u64,
    /// Unit receiving the order.
    #[serde(default = "first_unit")]
    pub unit: UnitId,
    /// Pixel x.
    pub x: i32,
    /// Pixel y.
    pub y: i32,
}

const fn first_unit() -> UnitId {
    1
}

const fn default_frames() -> u64 {
    600
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Map and unit parameters.
    #[serde(default)]
    pub config: GameConfig,
    /// Unwalkable tiles as (x, y).
    #[serde(default)]
    pub blocked: Vec<(i32, i32)>,
    /// Starting tiles as (x, y); ids are assigned in this order from 1.
    pub units: Vec<(i32, i32)>,
    /// Scripted input.
    #[serde(default)]
    pub clicks: Vec<Click>,
    /// Frames to run when the command line does not say.
    #[serde(default = "default_frames")]
    pub frames: u64,
}

impl Default for Scenario {
    /// One unit at (5, 5) on the open 20x15 map.
    fn default() -> Self {
        Self {
            name: "Open Field".to_string(),
            description: "A single unit on an empty map".to_string(),
            config: GameConfig::default(),
            blocked: Vec::new(),
            units: vec![(5, 5)],
            clicks: Vec::new(),
            frames: default_frames(),
        }
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// A wall down the middle of the map with a gap at the bottom, and one
    /// click on the far side.
    #[must_use]
    pub fn wall_detour() -> Self {
        Self {
            name: "Wall Detour".to_string(),
            description: "Walk around a wall through its only gap".to_string(),
            blocked: (0..14).map(|y| (10, y)).collect(),
            units: vec![(2, 7)],
            clicks: vec![Click {
                frame: 0,
                unit: 1,
                x: 17 * 32 + 5,
                y: 7 * 32 + 20,
            }],
            frames: 480,
            ..Self::default()
        }
    }

    /// Build the initial game state: terrain first, then units.
    pub fn build(&self) -> Result<GameState, ScenarioError> {
        let mut game = GameState::new(self.config.clone())?;

        for &tile in &self.blocked {
            let tile = TilePos::from(tile);
            if !game.grid_mut().set_walkable(tile, false) {
                return Err(ScenarioError::BlockedOutOfBounds(tile));
            }
        }

        for &tile in &self.units {
            game.spawn_unit(TilePos::from(tile))?;
        }

        tracing::debug!(
            scenario = %self.name,
            blocked = self.blocked.len(),
            units = self.units.len(),
            "scenario built"
        );
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scenario() {
        let scenario = Scenario::default();
        let game = scenario.build().unwrap();
        assert_eq!(game.units().len(), 1);
        assert_eq!(game.units()[0].tile(), TilePos::new(5, 5));
    }

    #[test]
    fn test_wall_detour_scenario() {
        let game = Scenario::wall_detour().build().unwrap();
        assert!(!game.grid().is_walkable(TilePos::new(10, 0)));
        assert!(game.grid().is_walkable(TilePos::new(10, 14)));
    }

    #[test]
    fn test_parse_from_ron() {
        let ron = r#"
            Scenario(
                name: "Test",
                blocked: [(3, 0)],
                units: [(0, 0)],
                clicks: [Click(frame: 2, x: 100, y: 4)],
            )
        "#;
        let scenario = Scenario::from_ron_str(ron).unwrap();
        assert_eq!(scenario.name, "Test");
        assert_eq!(scenario.config, GameConfig::default());
        assert_eq!(scenario.frames, 600);
        assert_eq!(scenario.clicks[0].unit, 1);
    }

    #[test]
    fn test_bundled_scenarios_parse() {
        for source in [
            include_str!("../scenarios/open_field.ron"),
            include_str!("../scenarios/wall_detour.ron"),
            include_str!("../scenarios/crossing.ron"),
        ] {
            let scenario = Scenario::from_ron_str(source).unwrap();
            assert!(scenario.build().is_ok(), "{} failed to build", scenario.name);
        }
    }

    #[test]
    fn test_blocked_tile_off_map() {
        let scenario = Scenario {
            blocked: vec![(25, 0)],
            ..Scenario::default()
        };
        assert!(matches!(
            scenario.build(),
            Err(ScenarioError::BlockedOutOfBounds(_))
        ));
    }

    #[test]
    fn test_unit_on_blocked_tile() {
        let scenario = Scenario {
            blocked: vec![(5, 5)],
            ..Scenario::default()
        };
        assert!(matches!(
            scenario.build(),
            Err(ScenarioError::Setup(GameError::SpawnBlocked(_)))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Scenario::load("definitely/not/here.ron"),
            Err(ScenarioError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.ron");
        std::fs::write(&path, r#"Scenario(name: "Disk", units: [(1, 1)])"#).unwrap();
        let scenario = Scenario::load(&path).unwrap();
        assert_eq!(scenario.units, vec![(1, 1)]);
    }
}
