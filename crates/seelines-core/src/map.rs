//! The static walkability grid.
//!
//! A [`GridMap`] is built once at world setup and never mutated during
//! simulation. Water is navigable, land is not.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Tile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TerrainKind {
    Water,
    Land,
}

/// One cell of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapTile {
    pub x: i32,
    pub y: i32,
    pub walkable: bool,
    pub kind: TerrainKind,
}

impl MapTile {
    pub fn new(x: i32, y: i32, kind: TerrainKind) -> Self {
        Self {
            x,
            y,
            walkable: kind == TerrainKind::Water,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("map has no rows")]
    Empty,
    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown terrain glyph {glyph:?} at ({x}, {y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
}

/// Immutable rectangular grid, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMap {
    width: u32,
    height: u32,
    tiles: Vec<MapTile>,
}

impl GridMap {
    /// Build a map by classifying every coordinate.
    pub fn from_fn(width: u32, height: u32, mut terrain: impl FnMut(i32, i32) -> TerrainKind) -> Self {
        let mut tiles = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height as i32 {
            for x in 0..width as i32 {
                tiles.push(MapTile::new(x, y, terrain(x, y)));
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    /// All-water map.
    pub fn open_water(width: u32, height: u32) -> Self {
        Self::from_fn(width, height, |_, _| TerrainKind::Water)
    }

    /// Parse a text grid: `.` is water, `#` is land, one string per row.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, MapError> {
        let first = rows.first().ok_or(MapError::Empty)?;
        let expected = first.as_ref().chars().count();
        if expected == 0 {
            return Err(MapError::Empty);
        }

        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != expected {
                return Err(MapError::RaggedRows {
                    row: y,
                    expected,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let kind = match glyph {
                    '.' => TerrainKind::Water,
                    '#' => TerrainKind::Land,
                    _ => return Err(MapError::UnknownGlyph { glyph, x, y }),
                };
                tiles.push(MapTile::new(x as i32, y as i32, kind));
            }
        }

        Ok(Self {
            width: expected as u32,
            height: rows.len() as u32,
            tiles,
        })
    }

    /// The 24x18 default skirmish sea: a central island, a northern shoal
    /// and the eastern keys.
    pub fn skirmish() -> Self {
        Self::from_fn(24, 18, |x, y| {
            let centre = x > 6 && x < 14 && y > 6 && y < 10;
            let shoal = y < 3 && x > 4 && x < 12;
            let keys = x > 16 && y > 8 && y < 14;
            if centre || shoal || keys {
                TerrainKind::Land
            } else {
                TerrainKind::Water
            }
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, tile: Tile) -> bool {
        tile.x >= 0 && tile.y >= 0 && (tile.x as u32) < self.width && (tile.y as u32) < self.height
    }

    pub fn get(&self, tile: Tile) -> Option<&MapTile> {
        if !self.in_bounds(tile) {
            return None;
        }
        self.tiles
            .get(tile.y as usize * self.width as usize + tile.x as usize)
    }

    /// Out-of-bounds tiles are never walkable.
    pub fn is_walkable(&self, tile: Tile) -> bool {
        self.get(tile).is_some_and(|t| t.walkable)
    }

    /// Clamp a tile into the map rectangle.
    pub fn clamp_tile(&self, tile: Tile) -> Tile {
        let max_x = self.width.saturating_sub(1) as i32;
        let max_y = self.height.saturating_sub(1) as i32;
        Tile::new(tile.x.clamp(0, max_x), tile.y.clamp(0, max_y))
    }

    pub fn tiles(&self) -> &[MapTile] {
        &self.tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_parses_glyphs() {
        let map = GridMap::from_rows(&["..#", "#.."]).unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.height(), 2);
        assert!(!map.is_walkable(Tile::new(2, 0)));
        assert!(!map.is_walkable(Tile::new(0, 1)));
        assert!(map.is_walkable(Tile::new(1, 1)));
        assert_eq!(map.get(Tile::new(2, 0)).unwrap().kind, TerrainKind::Land);
    }

    #[test]
    fn from_rows_rejects_bad_input() {
        let empty: [&str; 0] = [];
        assert_eq!(GridMap::from_rows(&empty), Err(MapError::Empty));
        assert!(matches!(
            GridMap::from_rows(&["...", ".."]),
            Err(MapError::RaggedRows { row: 1, .. })
        ));
        assert!(matches!(
            GridMap::from_rows(&[".x."]),
            Err(MapError::UnknownGlyph { glyph: 'x', .. })
        ));
    }

    #[test]
    fn out_of_bounds_is_not_walkable() {
        let map = GridMap::open_water(4, 4);
        assert!(!map.is_walkable(Tile::new(-1, 0)));
        assert!(!map.is_walkable(Tile::new(4, 0)));
        assert!(map.get(Tile::new(0, 4)).is_none());
    }

    #[test]
    fn skirmish_layout() {
        let map = GridMap::skirmish();
        assert_eq!((map.width(), map.height()), (24, 18));
        assert!(!map.is_walkable(Tile::new(10, 8)));
        assert!(!map.is_walkable(Tile::new(6, 1)));
        assert!(!map.is_walkable(Tile::new(18, 10)));
        assert!(map.is_walkable(Tile::new(3, 12)));
        assert!(map.is_walkable(Tile::new(0, 0)));
    }

    #[test]
    fn clamp_tile_stays_inside() {
        let map = GridMap::open_water(5, 3);
        assert_eq!(map.clamp_tile(Tile::new(-3, 9)), Tile::new(0, 2));
    }
}
