use std::num::NonZeroU32;

use crate::geometry::{ScreenPoint, ScreenSize};

/// A rectangular block of pixels handed to one worker at a time.
/// Tiles on the right and bottom edges are clipped when the tile size does
/// not divide the image size evenly.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub min: ScreenPoint,
    pub width: u32,
    pub height: u32,
}

impl Tile {
    /// Pixel coordinates inside the tile, x changing fastest.
    pub fn pixels(&self) -> impl Iterator<Item = ScreenPoint> {
        let min = self.min;
        let width = self.width;
        (min.y..min.y + self.height)
            .flat_map(move |y| (min.x..min.x + width).map(move |x| ScreenPoint::new(x, y)))
    }

    pub fn area(&self) -> u32 {
        self.width * self.height
    }
}

/// Covers `size` with tiles in row-major order.
pub fn tile_ordering(size: ScreenSize, tile_size: NonZeroU32) -> Vec<Tile> {
    let tile_size = tile_size.get();
    let mut tiles = Vec::new();
    for y in (0..size.height).step_by(tile_size as usize) {
        for x in (0..size.width).step_by(tile_size as usize) {
            tiles.push(Tile {
                min: ScreenPoint::new(x, y),
                width: tile_size.min(size.width - x),
                height: tile_size.min(size.height - y),
            });
        }
    }
    tiles
}
