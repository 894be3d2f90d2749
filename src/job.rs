//! JSON watermark jobs: a style block plus an ordered list of placements.
//!
//! ```json
//! { "style": { "font": "DejaVuSans.ttf", "size": 32, "margin": 8 },
//!   "placements": [ { "mode": "corner", "text": "(c) ACME", "corner": "bottom_right" } ] }
//! ```

use anyhow::Context as _;
use rand::{SeedableRng, rngs::StdRng};
use serde_json::{Map, Value};

use crate::{
    anchor::{validate_corner, validate_edge},
    args,
    composite::Compositor,
    foundation::{
        core::Position,
        error::{WatermarkError, WatermarkResult},
    },
    placement::{LatticeSpacing, Placement},
    raster::Rasterizer,
    style::WatermarkStyle,
    watermarker::{Watermarker, watermark_text},
};

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct WatermarkJob {
    #[serde(default)]
    pub style: Map<String, Value>,
    #[serde(default)]
    pub placements: Vec<Value>,
    /// Seeds random placements; unseeded jobs draw from the thread RNG.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// One parsed entry of [`WatermarkJob::placements`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementRequest {
    /// Trimmed, non-empty.
    pub text: String,
    pub placement: Placement,
}

impl PlacementRequest {
    /// Parses `{ "mode": ..., "text": ..., <mode arguments> }`.
    ///
    /// The text is checked first, then the mode arguments in order.
    pub fn from_value(value: &Value) -> WatermarkResult<Self> {
        let obj = value.as_object().ok_or_else(|| {
            WatermarkError::type_error("a placement must be a JSON object")
        })?;
        let text = watermark_text(args::require_str("text", obj.get("text"))?)?.to_string();
        let mode = args::require_str("mode", obj.get("mode"))?;

        let placement = match mode {
            "centre" | "center" => Placement::Centre,
            "corner" => Placement::Corner(validate_corner(args::anchor(
                "corner",
                obj.get("corner"),
            )?)?),
            "edge" => Placement::Edge(validate_edge(args::anchor("edge", obj.get("edge"))?)?),
            "absolute" => Placement::Absolute(Position::new(
                args::require_int("x", obj.get("x"))?,
                args::require_int("y", obj.get("y"))?,
            )),
            "percent" => Placement::Percent {
                x: args::require_int("x", obj.get("x"))?,
                y: args::require_int("y", obj.get("y"))?,
            },
            "random" => {
                let quantity = args::optional_int("quantity", obj.get("quantity"))?.unwrap_or(1);
                Placement::random(quantity)?
            }
            "lattice" => Placement::Lattice(LatticeSpacing::new(
                args::require_int("horizontal_margin", obj.get("horizontal_margin"))?,
                args::require_int("vertical_margin", obj.get("vertical_margin"))?,
                args::optional_int(
                    "horizontal_start_margin",
                    obj.get("horizontal_start_margin"),
                )?,
                args::optional_int("vertical_start_margin", obj.get("vertical_start_margin"))?,
            )?),
            other => {
                return Err(WatermarkError::type_error(format!(
                    "unknown placement mode '{other}'"
                )));
            }
        };

        Ok(Self { text, placement })
    }
}

/// Applies one named style setting through the typed setters.
pub fn apply_setting(
    style: &mut WatermarkStyle,
    key: &str,
    value: Option<&Value>,
) -> WatermarkResult<()> {
    match key {
        "font" => style.set_font(args::require_str("font", value)?)?,
        "size" => style.set_size(args::require_int("size", value)?)?,
        "colour" | "color" => style.set_colour(&args::require_int_list("colour", value)?)?,
        "rotation" => style.set_rotation(args::require_int("rotation", value)?)?,
        "mirror" => style.set_mirror(args::require_bool("mirror", value)?)?,
        "margin" => style.set_margin(args::require_int("margin", value)?)?,
        other => {
            return Err(WatermarkError::type_error(format!(
                "unknown style setting '{other}'"
            )));
        }
    };
    Ok(())
}

impl<R: Rasterizer, C: Compositor> Watermarker<R, C> {
    /// Sets a style field by name from an untyped value.
    pub fn configure(&mut self, key: &str, value: Option<&Value>) -> WatermarkResult<&mut Self> {
        apply_setting(self.style_mut(), key, value)?;
        Ok(self)
    }
}

impl WatermarkJob {
    pub fn from_json(s: &str) -> WatermarkResult<Self> {
        let job = serde_json::from_str(s).context("parse watermark job JSON")?;
        Ok(job)
    }

    pub fn from_path(path: &std::path::Path) -> WatermarkResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read watermark job '{}'", path.display()))?;
        Self::from_json(&s)
    }

    /// Checks every style value and placement without touching a canvas.
    pub fn validate(&self) -> WatermarkResult<Vec<PlacementRequest>> {
        let mut scratch = WatermarkStyle::default();
        for (key, value) in &self.style {
            apply_setting(&mut scratch, key, Some(value))?;
        }
        self.placements
            .iter()
            .map(PlacementRequest::from_value)
            .collect()
    }

    /// Configures `wm` and runs every placement in order, returning how many ran.
    ///
    /// The whole job is validated first. Rendering and random-fit errors can
    /// still stop the job part way, after earlier placements were applied.
    #[tracing::instrument(level = "debug", skip_all, fields(placements = self.placements.len()))]
    pub fn run<R: Rasterizer, C: Compositor>(
        &self,
        wm: &mut Watermarker<R, C>,
    ) -> WatermarkResult<usize> {
        let requests = self.validate()?;
        for (key, value) in &self.style {
            wm.configure(key, Some(value))?;
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        for (i, req) in requests.iter().enumerate() {
            wm.apply_with(&req.text, &req.placement, &mut rng)
                .map_err(|e| {
                    tracing::warn!(index = i, mode = req.placement.mode_name(), error = %e, "placement failed");
                    e
                })?;
        }
        Ok(requests.len())
    }
}
