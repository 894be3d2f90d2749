use crate::{foundation::core::Position, raster::TextBlock};

/// Blends a [`TextBlock`] onto the canvas with its top-left at `at`.
///
/// Parts of the block outside the canvas are clipped without error.
pub trait Compositor {
    fn blit(&mut self, canvas: &mut image::RgbaImage, block: &TextBlock, at: Position);
}

/// Source-over alpha blending via [`image::imageops::overlay`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AlphaOverlay;

impl Compositor for AlphaOverlay {
    fn blit(&mut self, canvas: &mut image::RgbaImage, block: &TextBlock, at: Position) {
        image::imageops::overlay(canvas, block.pixels(), at.x, at.y);
    }
}
