//! Text rasterization: turning watermark text plus a style into an RGBA block.

use std::{borrow::Cow, collections::HashMap};

use kurbo::{Affine, Rect};

use crate::{
    foundation::{
        core::Size,
        error::{WatermarkError, WatermarkResult},
    },
    style::WatermarkStyle,
};

/// Rendered watermark text, transparent outside glyph coverage.
///
/// Dimensions are those of the block after mirroring and rotation.
#[derive(Clone, Debug)]
pub struct TextBlock {
    pixels: image::RgbaImage,
}

impl TextBlock {
    pub fn new(pixels: image::RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn size(&self) -> Size {
        Size::of_image(&self.pixels)
    }

    /// Straight-alpha RGBA8.
    pub fn pixels(&self) -> &image::RgbaImage {
        &self.pixels
    }
}

/// Produces a [`TextBlock`] for already-trimmed, non-empty text.
///
/// Implementations apply mirroring before rotation and grow the block to fit
/// rotated content. An unresolvable font reference is a [`WatermarkError::Font`].
pub trait Rasterizer {
    fn render(&mut self, text: &str, style: &WatermarkStyle) -> WatermarkResult<TextBlock>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

struct LoadedFont {
    family: String,
    data: vello_cpu::peniko::FontData,
}

/// Lays text out with Parley and paints it on the CPU with `vello_cpu`.
///
/// The style's font reference is a path to a TrueType/OpenType file. Loaded
/// fonts are cached by reference for the rasterizer's lifetime.
pub struct ParleyRasterizer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    fonts: HashMap<String, LoadedFont>,
}

impl Default for ParleyRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ParleyRasterizer {
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            fonts: HashMap::new(),
        }
    }

    fn load_font(&mut self, reference: &str) -> WatermarkResult<&LoadedFont> {
        if !self.fonts.contains_key(reference) {
            let bytes = std::fs::read(reference).map_err(|e| {
                WatermarkError::font(format!("cannot open font resource '{reference}': {e}"))
            })?;

            let families = self
                .font_ctx
                .collection
                .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
            let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
                WatermarkError::font(format!("no font families found in '{reference}'"))
            })?;
            let family = self
                .font_ctx
                .collection
                .family_name(family_id)
                .ok_or_else(|| {
                    WatermarkError::font(format!("font family in '{reference}' has no name"))
                })?
                .to_string();

            tracing::debug!(font = reference, family = %family, "loaded font");
            let data =
                vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
            self.fonts
                .insert(reference.to_string(), LoadedFont { family, data });
        }

        self.fonts
            .get(reference)
            .ok_or_else(|| WatermarkError::font(format!("font '{reference}' missing from cache")))
    }
}

impl Rasterizer for ParleyRasterizer {
    fn render(&mut self, text: &str, style: &WatermarkStyle) -> WatermarkResult<TextBlock> {
        let (family, font) = {
            let loaded = self.load_font(style.font_reference())?;
            (loaded.family.clone(), loaded.data.clone())
        };

        let colour = style.colour();
        let brush = TextBrushRgba8 {
            r: colour.r,
            g: colour.g,
            b: colour.b,
            a: 255,
        };

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_pt() as f32));
        builder.push_default(parley::style::StyleProperty::Brush(brush));
        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);

        let natural = Size::new(
            snap_ceil(f64::from(layout.width())),
            snap_ceil(f64::from(layout.height())),
        );
        let (block, transform) =
            block_transform(natural, style.mirror(), style.rotation_degrees());
        if block.width == 0 || block.height == 0 {
            return Ok(TextBlock::new(image::RgbaImage::new(block.width, block.height)));
        }

        let w: u16 = block
            .width
            .try_into()
            .map_err(|_| WatermarkError::value("rendered text block width exceeds u16"))?;
        let h: u16 = block
            .height
            .try_into()
            .map_err(|_| WatermarkError::value("rendered text block height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(affine_to_cpu(transform));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        let mut rgba = pixmap.data_as_u8_slice().to_vec();
        unpremultiply_rgba8_in_place(&mut rgba);
        let pixels = image::RgbaImage::from_raw(block.width, block.height, rgba)
            .ok_or_else(|| WatermarkError::value("rendered pixmap byte length mismatch"))?;
        Ok(TextBlock::new(pixels))
    }
}

/// Size of the transformed block and the transform mapping layout space into it.
///
/// The layout is flipped horizontally first, then rotated anticlockwise, then
/// translated so the rotated bounding box starts at the origin.
pub(crate) fn block_transform(natural: Size, mirror: bool, degrees: u16) -> (Size, Affine) {
    let w = f64::from(natural.width);
    let h = f64::from(natural.height);

    let mut content = Affine::IDENTITY;
    if mirror {
        content = Affine::new([-1.0, 0.0, 0.0, 1.0, w, 0.0]);
    }
    if degrees == 0 {
        return (natural, content);
    }

    // Screen space is y-down, so an anticlockwise turn is a negative angle.
    content = Affine::rotate(-f64::from(degrees).to_radians()) * content;
    let bbox = content.transform_rect_bbox(Rect::new(0.0, 0.0, w, h));
    let size = Size::new(snap_ceil(bbox.width()), snap_ceil(bbox.height()));
    (size, Affine::translate((-bbox.x0, -bbox.y0)) * content)
}

/// Rounds up, ignoring float noise just above an integer.
fn snap_ceil(v: f64) -> u32 {
    (v - 1e-6).ceil().max(0.0) as u32
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}
