use crate::foundation::{
    core::Rgb8,
    error::{WatermarkError, WatermarkResult},
};

pub const DEFAULT_FONT: &str = "Arial_Bold.ttf";
pub const DEFAULT_SIZE_PT: u32 = 20;

/// Text style and margin shared by every placement operation.
///
/// Setters validate before assigning, so a rejected value leaves the previous
/// one in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatermarkStyle {
    font: String,
    size_pt: u32,
    colour: Rgb8,
    rotation_degrees: u16,
    mirror: bool,
    margin: i64,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            font: DEFAULT_FONT.to_string(),
            size_pt: DEFAULT_SIZE_PT,
            colour: Rgb8::BLACK,
            rotation_degrees: 0,
            mirror: false,
            margin: 0,
        }
    }
}

impl WatermarkStyle {
    pub fn font_reference(&self) -> &str {
        &self.font
    }

    pub fn size_pt(&self) -> u32 {
        self.size_pt
    }

    pub fn colour(&self) -> Rgb8 {
        self.colour
    }

    /// Anticlockwise rotation in `[0, 360)`.
    pub fn rotation_degrees(&self) -> u16 {
        self.rotation_degrees
    }

    pub fn mirror(&self) -> bool {
        self.mirror
    }

    pub fn margin(&self) -> i64 {
        self.margin
    }

    pub fn set_font(&mut self, font: &str) -> WatermarkResult<&mut Self> {
        if font.trim().is_empty() {
            return Err(WatermarkError::value("the font file cannot be empty"));
        }
        self.font = font.to_string();
        Ok(self)
    }

    pub fn set_size(&mut self, size_pt: i64) -> WatermarkResult<&mut Self> {
        if size_pt <= 0 {
            return Err(WatermarkError::value("the font size must be greater than 0"));
        }
        self.size_pt = u32::try_from(size_pt)
            .map_err(|_| WatermarkError::value("the font size is too large"))?;
        Ok(self)
    }

    pub fn set_colour(&mut self, components: &[i64]) -> WatermarkResult<&mut Self> {
        let [r, g, b] = components else {
            return Err(WatermarkError::value(format!(
                "the colour must have exactly 3 components, got {}",
                components.len()
            )));
        };
        let channel = |v: i64| {
            u8::try_from(v).map_err(|_| {
                WatermarkError::value(format!(
                    "each colour component must be between 0 and 255 inclusive, got {v}"
                ))
            })
        };
        self.colour = Rgb8::new(channel(*r)?, channel(*g)?, channel(*b)?);
        Ok(self)
    }

    pub fn set_rotation(&mut self, degrees: i64) -> WatermarkResult<&mut Self> {
        if degrees < 0 {
            return Err(WatermarkError::value("the rotation must be 0 or greater"));
        }
        if degrees > 360 {
            return Err(WatermarkError::value("the rotation must be 360 or less"));
        }
        self.rotation_degrees = (degrees % 360) as u16;
        Ok(self)
    }

    pub fn set_mirror(&mut self, mirror: bool) -> WatermarkResult<&mut Self> {
        self.mirror = mirror;
        Ok(self)
    }

    pub fn set_margin(&mut self, margin: i64) -> WatermarkResult<&mut Self> {
        self.margin = margin;
        Ok(self)
    }
}
