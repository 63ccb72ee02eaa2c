//! Fixed-size tile map with static walkability and dynamic occupancy.
//!
//! The grid owns the spatial data only. It answers bounds, terrain and
//! occupancy queries and converts between tile and world coordinates.
//! It never moves units or interprets input.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, MAP_HEIGHT, MAP_WIDTH, TILE_SIZE};
use crate::math::{Fixed, Vec2Fixed};

/// Integer tile coordinate.
///
/// Coordinates are signed so that off-map requests (for example a click
/// left of the map) can be expressed and rejected by bounds checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TilePos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl TilePos {
    /// Create a tile coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another tile.
    #[must_use]
    pub fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The tile displaced by `(dx, dy)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for TilePos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Static terrain flag, set during map setup.
    pub walkable: bool,
    /// True while a unit's committed tile is this cell.
    pub occupied: bool,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            walkable: true,
            occupied: false,
        }
    }
}

/// The tile map.
///
/// Tiles are stored row-major (`y * width + x`). Dimensions are fixed at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GridData")]
pub struct Grid {
    width: i32,
    height: i32,
    tile_size: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Create a grid with every tile walkable and unoccupied.
    ///
    /// # Panics
    ///
    /// Panics if `width`, `height` or `tile_size` is not positive.
    #[must_use]
    pub fn new(width: i32, height: i32, tile_size: i32) -> Self {
        assert!(width > 0, "Grid width must be positive");
        assert!(height > 0, "Grid height must be positive");
        assert!(tile_size > 0, "Grid tile_size must be positive");

        let cell_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            tile_size,
            tiles: vec![Tile::default(); cell_count],
        }
    }

    /// Create a grid sized by a validated config.
    #[must_use]
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.map_width, config.map_height, config.tile_size)
    }

    /// Reset every tile to walkable and unoccupied.
    pub fn init(&mut self) {
        self.tiles.fill(Tile::default());
    }

    /// Grid width in tiles.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Grid height in tiles.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Tile edge length in world units.
    #[must_use]
    pub const fn tile_size(&self) -> i32 {
        self.tile_size
    }

    /// Number of cells (`width * height`).
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.tiles.len()
    }

    /// Check if a tile lies within the grid.
    #[must_use]
    pub fn is_inside(&self, pos: TilePos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    /// Row-major index of an in-bounds tile.
    #[must_use]
    pub fn index_of(&self, pos: TilePos) -> Option<usize> {
        self.is_inside(pos)
            .then(|| (pos.y as usize) * (self.width as usize) + (pos.x as usize))
    }

    /// Tile coordinate of a row-major index.
    #[must_use]
    pub fn pos_of(&self, index: usize) -> TilePos {
        let width = self.width as usize;
        TilePos::new((index % width) as i32, (index / width) as i32)
    }

    /// Get the tile at a coordinate, `None` if out of bounds.
    #[must_use]
    pub fn tile(&self, pos: TilePos) -> Option<Tile> {
        self.index_of(pos).map(|index| self.tiles[index])
    }

    /// Terrain query. Out-of-bounds tiles are not walkable.
    #[must_use]
    pub fn is_walkable(&self, pos: TilePos) -> bool {
        self.tile(pos).is_some_and(|tile| tile.walkable)
    }

    /// Occupancy query. Out-of-bounds tiles report as occupied.
    #[must_use]
    pub fn is_occupied(&self, pos: TilePos) -> bool {
        self.tile(pos).map_or(true, |tile| tile.occupied)
    }

    /// Set the occupancy flag. Silently ignores out-of-bounds tiles.
    pub fn set_occupied(&mut self, pos: TilePos, value: bool) {
        if let Some(index) = self.index_of(pos) {
            self.tiles[index].occupied = value;
        }
    }

    /// Set the terrain flag during map setup.
    ///
    /// Returns `false` if out of bounds.
    pub fn set_walkable(&mut self, pos: TilePos, value: bool) -> bool {
        match self.index_of(pos) {
            Some(index) => {
                self.tiles[index].walkable = value;
                true
            }
            None => false,
        }
    }

    /// Iterate over all tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TilePos, Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(|(index, tile)| (self.pos_of(index), *tile))
    }

    /// All currently occupied tiles in row-major order.
    pub fn occupied_tiles(&self) -> impl Iterator<Item = TilePos> + '_ {
        self.iter()
            .filter(|(_, tile)| tile.occupied)
            .map(|(pos, _)| pos)
    }

    /// World position of a tile's top-left corner.
    #[must_use]
    pub fn tile_to_world(&self, pos: TilePos) -> Vec2Fixed {
        Vec2Fixed::from_ints(pos.x * self.tile_size, pos.y * self.tile_size)
    }

    /// Tile containing a world position.
    ///
    /// Positions left of or above the map floor to negative tiles, which
    /// fail [`is_inside`](Self::is_inside).
    #[must_use]
    pub fn world_to_tile(&self, world: Vec2Fixed) -> TilePos {
        let size = Fixed::from_num(self.tile_size);
        TilePos::new(
            (world.x / size).floor().to_num::<i32>(),
            (world.y / size).floor().to_num::<i32>(),
        )
    }
}

/// Unchecked wire form of [`Grid`].
#[derive(Deserialize)]
#[serde(rename = "Grid")]
struct GridData {
    width: i32,
    height: i32,
    tile_size: i32,
    tiles: Vec<Tile>,
}

impl TryFrom<GridData> for Grid {
    type Error = String;

    fn try_from(data: GridData) -> std::result::Result<Self, Self::Error> {
        if data.width <= 0 || data.height <= 0 || data.tile_size <= 0 {
            return Err(format!(
                "grid dimensions must be positive, got {}x{} with tile size {}",
                data.width, data.height, data.tile_size
            ));
        }
        let expected = (data.width as usize) * (data.height as usize);
        if data.tiles.len() != expected {
            return Err(format!(
                "grid of {}x{} needs {expected} tiles, got {}",
                data.width,
                data.height,
                data.tiles.len()
            ));
        }
        Ok(Self {
            width: data.width,
            height: data.height,
            tile_size: data.tile_size,
            tiles: data.tiles,
        })
    }
}

impl Default for Grid {
    /// The default 20x15 map of 32-pixel tiles.
    fn default() -> Self {
        Self::new(MAP_WIDTH, MAP_HEIGHT, TILE_SIZE)
    }
}
