//! The grid module contains the [`TileGrid`] trait a [`NavMesh`](crate::NavMesh) is generated from,
//! and [`Tilemap`], a plain in-memory implementation of it.
//!
//! Coordinates are in tile units. `y` grows downward, so the cell "below" `(x, y)` is `(x, y + 1)`
//! and gravity points along `+y`.

use std::{fmt, str::FromStr};

use glam::Vec2;
use thiserror::Error;

/// The state of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Tile {
    /// Open space an agent can occupy.
    #[default]
    Empty,
    /// Solid terrain.
    Wall,
}

impl Tile {
    /// Returns `true` for [`Tile::Wall`].
    #[inline]
    pub const fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// Returns the opposite tile state.
    #[inline]
    pub const fn toggled(self) -> Self {
        match self {
            Tile::Empty => Tile::Wall,
            Tile::Wall => Tile::Empty,
        }
    }

    const fn as_char(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Wall => '#',
        }
    }
}

/// Read access to a grid of [`Tile`]s.
///
/// This is the only thing navmesh generation needs from the world. Cells outside of
/// `0..width` x `0..height` must report [`Tile::Wall`], since the playable area is enclosed.
pub trait TileGrid {
    /// The number of columns.
    fn width(&self) -> u32;

    /// The number of rows.
    fn height(&self) -> u32;

    /// The tile at `(x, y)`. Out of bounds coordinates are [`Tile::Wall`].
    fn tile(&self, x: i32, y: i32) -> Tile;

    /// Shorthand for `self.tile(x, y).is_wall()`.
    #[inline]
    fn is_wall(&self, x: i32, y: i32) -> bool {
        self.tile(x, y).is_wall()
    }

    /// Whether the world-space `point` lies inside a wall cell.
    fn is_wall_at(&self, point: Vec2) -> bool {
        if !point.is_finite() {
            return true;
        }
        self.is_wall(point.x.floor() as i32, point.y.floor() as i32)
    }

    /// The world-space center of the cell at `(x, y)`.
    #[inline]
    fn cell_to_world(&self, x: u32, y: u32) -> Vec2 {
        Vec2::new(x as f32, y as f32) + Vec2::splat(0.5)
    }

    /// The cell containing the world-space `point`, or `None` if it lies outside the grid.
    fn world_to_cell(&self, point: Vec2) -> Option<(u32, u32)> {
        if !point.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let (x, y) = (point.x.floor() as u32, point.y.floor() as u32);
        (x < self.width() && y < self.height()).then_some((x, y))
    }
}

/// A dense, row-major grid of [`Tile`]s.
///
/// Build one with [`Tilemap::new`] and edit it with [`Tilemap::set`], or parse it from ASCII art
/// with [`Tilemap::from_ascii`], where `#` is a wall and `.` or a space is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Tilemap {
    width: u32,
    height: u32,
    /// The tiles in `width * height` order
    tiles: Vec<Tile>,
}

impl Tilemap {
    /// Creates a tilemap of the given size with every tile [`Tile::Empty`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Empty; width as usize * height as usize],
        }
    }

    /// Parses a tilemap from ASCII art. Every line is a row, top row first.
    ///
    /// # Errors
    ///
    /// Returns an error if the input has no rows, if rows differ in length, or if a character
    /// other than `#`, `.` or a space is encountered. Leading and trailing blank lines are
    /// skipped; a blank line between rows is a row of the wrong length.
    pub fn from_ascii(ascii: &str) -> Result<Self, TilemapError> {
        let lines: Vec<&str> = ascii
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        let Some(top) = lines.iter().position(|line| !line.is_empty()) else {
            return Err(TilemapError::Empty);
        };
        let bottom = lines
            .iter()
            .rposition(|line| !line.is_empty())
            .unwrap_or(top);
        let rows = &lines[top..=bottom];
        let width = rows[0].chars().count();

        let mut tilemap = Tilemap::new(width as u32, rows.len() as u32);
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(TilemapError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, character) in row.chars().enumerate() {
                let tile = match character {
                    '#' => Tile::Wall,
                    '.' | ' ' => Tile::Empty,
                    other => {
                        return Err(TilemapError::UnknownTile {
                            character: other,
                            x,
                            y,
                        });
                    }
                };
                let index = tilemap.tile_index(x as u32, y as u32);
                tilemap.tiles[index] = tile;
            }
        }
        Ok(tilemap)
    }

    /// The index of `(x, y)` in the backing storage.
    #[inline]
    pub fn tile_index(&self, x: u32, y: u32) -> usize {
        self.width as usize * y as usize + x as usize
    }

    /// The inverse of [`Tilemap::tile_index`].
    #[inline]
    pub fn tile_coord(&self, index: usize) -> (u32, u32) {
        let width = self.width.max(1) as usize;
        ((index % width) as u32, (index / width) as u32)
    }

    /// The tile at `(x, y)`, or `None` if out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<Tile> {
        self.contains(x, y)
            .then(|| self.tiles[self.tile_index(x, y)])
    }

    /// Sets the tile at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns an error if `(x, y)` is outside the tilemap.
    pub fn set(&mut self, x: u32, y: u32, tile: Tile) -> Result<(), TilemapError> {
        if !self.contains(x, y) {
            return Err(TilemapError::OutOfBounds { x, y });
        }
        let index = self.tile_index(x, y);
        self.tiles[index] = tile;
        Ok(())
    }

    /// Flips the tile at `(x, y)` between [`Tile::Empty`] and [`Tile::Wall`] and returns the new state.
    ///
    /// # Errors
    ///
    /// Returns an error if `(x, y)` is outside the tilemap.
    pub fn toggle_tile(&mut self, x: u32, y: u32) -> Result<Tile, TilemapError> {
        if !self.contains(x, y) {
            return Err(TilemapError::OutOfBounds { x, y });
        }
        let index = self.tile_index(x, y);
        let tile = self.tiles[index].toggled();
        self.tiles[index] = tile;
        Ok(tile)
    }

    /// Whether `(x, y)` lies inside the tilemap.
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }
}

impl TileGrid for Tilemap {
    #[inline]
    fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn height(&self) -> u32 {
        self.height
    }

    fn tile(&self, x: i32, y: i32) -> Tile {
        if x < 0 || y < 0 {
            return Tile::Wall;
        }
        self.get(x as u32, y as u32).unwrap_or(Tile::Wall)
    }
}

impl FromStr for Tilemap {
    type Err = TilemapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tilemap::from_ascii(s)
    }
}

impl fmt::Display for Tilemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(self.width.max(1) as usize) {
            let line: String = row.iter().map(|tile| tile.as_char()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Errors that can occur when building or editing a [`Tilemap`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TilemapError {
    /// Happens when the ASCII input contains no rows.
    #[error("Tilemap input contains no rows")]
    Empty,
    /// Happens when a row of the ASCII input is shorter or longer than the first one.
    #[error("Row {row} has {found} tiles, but the first row has {expected}")]
    RaggedRow {
        /// The offending row
        row: usize,
        /// The width of the first row
        expected: usize,
        /// The width of the offending row
        found: usize,
    },
    /// Happens when the ASCII input contains a character that is not a tile.
    #[error("Unknown tile {character:?} at x={x}, y={y}")]
    UnknownTile {
        /// The offending character
        character: char,
        /// The column of the character
        x: usize,
        /// The row of the character
        y: usize,
    },
    /// Happens when editing a tile outside of the tilemap.
    #[error("tile index out of bounds: x={x}, y={y}")]
    OutOfBounds {
        /// The x-coordinate of the tile
        x: u32,
        /// The y-coordinate of the tile
        y: u32,
    },
}
