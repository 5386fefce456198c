mod machinery;
mod tiles;
mod worker;

pub use crate::renderer::machinery::{RenderProgress, render};
pub use crate::renderer::tiles::Tile;

#[derive(Copy, Clone, Debug)]
pub struct RenderSettings {
    pub tile_size: std::num::NonZeroU32,
    pub sample_count: std::num::NonZeroU32,
}
