use image::RgbaImage;
use rand::Rng;

use crate::{
    anchor::{Corner, Edge},
    composite::{AlphaOverlay, Compositor},
    foundation::{
        core::{Position, Size},
        error::{WatermarkError, WatermarkResult},
    },
    placement::{LatticeSpacing, Placement},
    raster::{ParleyRasterizer, Rasterizer},
    style::WatermarkStyle,
};

/// Stamps text watermarks onto an owned canvas.
///
/// Style setters chain through `?`:
///
/// ```no_run
/// # fn main() -> textmark::WatermarkResult<()> {
/// let mut wm = textmark::Watermarker::new(image::RgbaImage::new(640, 480));
/// wm.font("DejaVuSans.ttf")?.size(32)?.colour(&[255, 255, 255])?.margin(12)?;
/// wm.apply_corner("(c) ACME", textmark::Corner::BottomRight)?;
/// let stamped = wm.collect();
/// # let _ = stamped;
/// # Ok(())
/// # }
/// ```
///
/// Every placement validates its arguments before rendering or compositing,
/// so a failed call leaves the canvas untouched.
pub struct Watermarker<R = ParleyRasterizer, C = AlphaOverlay> {
    canvas: RgbaImage,
    style: WatermarkStyle,
    rasterizer: R,
    compositor: C,
}

impl Watermarker {
    /// Engine with the default style, the Parley rasterizer and alpha overlay.
    pub fn new(canvas: RgbaImage) -> Self {
        Self::with_collaborators(canvas, ParleyRasterizer::new(), AlphaOverlay)
    }
}

impl<R: Rasterizer, C: Compositor> Watermarker<R, C> {
    /// Engine with caller-supplied rendering and compositing backends.
    pub fn with_collaborators(canvas: RgbaImage, rasterizer: R, compositor: C) -> Self {
        Self {
            canvas,
            style: WatermarkStyle::default(),
            rasterizer,
            compositor,
        }
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    /// Consumes the engine, returning the watermarked canvas.
    pub fn collect(self) -> RgbaImage {
        self.canvas
    }

    pub fn style(&self) -> &WatermarkStyle {
        &self.style
    }

    pub(crate) fn style_mut(&mut self) -> &mut WatermarkStyle {
        &mut self.style
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    /// Path of the font file used for rendering; must not be blank.
    pub fn font(&mut self, font: &str) -> WatermarkResult<&mut Self> {
        self.style.set_font(font)?;
        Ok(self)
    }

    /// Font size in points, greater than zero.
    pub fn size(&mut self, size_pt: i64) -> WatermarkResult<&mut Self> {
        self.style.set_size(size_pt)?;
        Ok(self)
    }

    /// Text colour as exactly three components in `0..=255`.
    pub fn colour(&mut self, rgb: &[i64]) -> WatermarkResult<&mut Self> {
        self.style.set_colour(rgb)?;
        Ok(self)
    }

    /// Anticlockwise rotation in `0..=360` degrees; 360 is stored as 0.
    pub fn rotation(&mut self, degrees: i64) -> WatermarkResult<&mut Self> {
        self.style.set_rotation(degrees)?;
        Ok(self)
    }

    /// Flips the text horizontally before rotation.
    pub fn mirror(&mut self, mirror: bool) -> WatermarkResult<&mut Self> {
        self.style.set_mirror(mirror)?;
        Ok(self)
    }

    /// Distance kept from the anchored edges. Unconstrained; negative values
    /// push the block outward.
    pub fn margin(&mut self, margin: i64) -> WatermarkResult<&mut Self> {
        self.style.set_margin(margin)?;
        Ok(self)
    }

    pub fn apply_centre(&mut self, text: &str) -> WatermarkResult<&RgbaImage> {
        self.apply(text, &Placement::Centre)
    }

    /// The whole block lands inside the canvas when the canvas is large enough.
    pub fn apply_corner(&mut self, text: &str, corner: Corner) -> WatermarkResult<&RgbaImage> {
        self.apply(text, &Placement::Corner(corner))
    }

    pub fn apply_edge(&mut self, text: &str, edge: Edge) -> WatermarkResult<&RgbaImage> {
        self.apply(text, &Placement::Edge(edge))
    }

    pub fn apply_absolute(&mut self, text: &str, x: i64, y: i64) -> WatermarkResult<&RgbaImage> {
        self.apply(text, &Placement::Absolute(Position::new(x, y)))
    }

    pub fn apply_percent(
        &mut self,
        text: &str,
        x_from_left: i64,
        y_from_top: i64,
    ) -> WatermarkResult<&RgbaImage> {
        self.apply(
            text,
            &Placement::Percent {
                x: x_from_left,
                y: y_from_top,
            },
        )
    }

    /// Places `quantity` copies at independent random positions inside the
    /// margins. Copies may overlap.
    pub fn apply_random(&mut self, text: &str, quantity: i64) -> WatermarkResult<&RgbaImage> {
        self.apply_random_with(text, quantity, &mut rand::thread_rng())
    }

    pub fn apply_random_with<G: Rng + ?Sized>(
        &mut self,
        text: &str,
        quantity: i64,
        rng: &mut G,
    ) -> WatermarkResult<&RgbaImage> {
        let text = watermark_text(text)?;
        let placement = Placement::random(quantity)?;
        self.place(text, &placement, move || rng)
    }

    /// Tiles the text over the whole canvas. Start margins default to the
    /// corresponding spacing margin.
    pub fn apply_lattice(
        &mut self,
        text: &str,
        horizontal_margin: i64,
        vertical_margin: i64,
        horizontal_start_margin: Option<i64>,
        vertical_start_margin: Option<i64>,
    ) -> WatermarkResult<&RgbaImage> {
        let text = watermark_text(text)?;
        let spacing = LatticeSpacing::new(
            horizontal_margin,
            vertical_margin,
            horizontal_start_margin,
            vertical_start_margin,
        )?;
        self.place(text, &Placement::Lattice(spacing), rand::thread_rng)
    }

    /// Runs an already-validated placement. The thread-local RNG is only
    /// touched by [`Placement::Random`].
    pub fn apply(&mut self, text: &str, placement: &Placement) -> WatermarkResult<&RgbaImage> {
        let text = watermark_text(text)?;
        self.place(text, placement, rand::thread_rng)
    }

    pub fn apply_with<G: Rng + ?Sized>(
        &mut self,
        text: &str,
        placement: &Placement,
        rng: &mut G,
    ) -> WatermarkResult<&RgbaImage> {
        let text = watermark_text(text)?;
        self.place(text, placement, move || rng)
    }

    /// Renders once, then blits each position as soon as it is produced.
    #[tracing::instrument(level = "debug", skip_all, fields(mode = placement.mode_name()))]
    fn place<G, F>(
        &mut self,
        text: &str,
        placement: &Placement,
        rng: F,
    ) -> WatermarkResult<&RgbaImage>
    where
        G: Rng,
        F: FnOnce() -> G,
    {
        let block = self.rasterizer.render(text, &self.style)?;
        let positions = placement.positions(
            Size::of_image(&self.canvas),
            block.size(),
            self.style.margin(),
            rng,
        )?;
        let mut count = 0usize;
        for at in positions {
            self.compositor.blit(&mut self.canvas, &block, at);
            count += 1;
        }
        tracing::debug!(
            width = block.size().width,
            height = block.size().height,
            count,
            "composited watermark"
        );
        Ok(&self.canvas)
    }
}

/// Trimmed watermark text; blank text is rejected.
pub fn watermark_text(text: &str) -> WatermarkResult<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(WatermarkError::value(
            "the watermark text cannot be empty or only whitespace",
        ));
    }
    Ok(trimmed)
}
