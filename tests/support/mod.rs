#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use textmark::{
    AlphaOverlay, Compositor, Position, Rasterizer, Size, TextBlock, WatermarkResult,
    WatermarkStyle, Watermarker,
};

/// Renders every text as an opaque white rectangle of a fixed size.
pub struct FixedRasterizer {
    pub size: Size,
    pub calls: Vec<(String, WatermarkStyle)>,
}

impl Rasterizer for FixedRasterizer {
    fn render(&mut self, text: &str, style: &WatermarkStyle) -> WatermarkResult<TextBlock> {
        self.calls.push((text.to_string(), style.clone()));
        Ok(TextBlock::new(RgbaImage::from_pixel(
            self.size.width,
            self.size.height,
            Rgba([255, 255, 255, 255]),
        )))
    }
}

/// Records blit positions and still composites.
#[derive(Default)]
pub struct Recorder {
    pub at: Vec<Position>,
}

impl Compositor for Recorder {
    fn blit(&mut self, canvas: &mut RgbaImage, block: &TextBlock, at: Position) {
        self.at.push(at);
        AlphaOverlay.blit(canvas, block, at);
    }
}

pub type TestEngine = Watermarker<FixedRasterizer, Recorder>;

pub fn engine(canvas: Size, block: Size) -> TestEngine {
    Watermarker::with_collaborators(
        RgbaImage::from_pixel(canvas.width, canvas.height, Rgba([0, 0, 0, 255])),
        FixedRasterizer {
            size: block,
            calls: Vec::new(),
        },
        Recorder::default(),
    )
}
