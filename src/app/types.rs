// src/app/types.rs
use std::sync::Arc;

// ---- catalog ----
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    pub name: String,
    pub rating: Option<String>,
    pub release_date: Option<String>,
    pub artwork_url: String,
    pub video_url: Option<String>,
}

impl Tile {
    /// Preview video URL, if the tile has a non-empty one.
    pub fn video(&self) -> Option<&str> {
        self.video_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileSet {
    pub name: String,
    pub tiles: Vec<Tile>,
}

/// Rows as parsed at startup. Never mutated afterwards; shared read-only with the worker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    pub rows: Vec<TileSet>,
}

pub type SharedCatalog = Arc<Catalog>;

impl Catalog {
    pub fn new(rows: Vec<TileSet>) -> Self {
        Self { rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row_len(&self, row: usize) -> usize {
        self.rows.get(row).map_or(0, |r| r.tiles.len())
    }

    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.rows.get(id.row)?.tiles.get(id.column)
    }

    pub fn tile_count(&self) -> usize {
        self.rows.iter().map(|r| r.tiles.len()).sum()
    }
}

/// Absolute position of a tile in the catalog.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TileId {
    pub row: usize,
    pub column: usize,
}

impl TileId {
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

// ---- input ----
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];
}

// ---- pixels ----
/// A decoded, tightly packed pixel buffer. `bits_per_pixel` is 8 (grey), 24 (RGB) or 32 (RGBA).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub bits_per_pixel: u8,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn size(&self) -> [usize; 2] {
        [self.width as usize, self.height as usize]
    }
}

/// One RGBA frame from a preview stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}
