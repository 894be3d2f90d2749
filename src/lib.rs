//! Text watermark placement for raster images.
//!
//! A [`Watermarker`] owns a canvas and a [`WatermarkStyle`], renders watermark
//! text into a [`TextBlock`] and composites it at positions derived from
//! anchors, offsets, percentages, random draws or a tiling lattice.
//!
//! - [`anchor`]: corner and edge vocabularies and their validators
//! - [`placement`]: pure coordinate derivation for every mode
//! - [`raster`] / [`composite`]: rendering and blending collaborators
//! - [`job`]: JSON job files driving the engine
#![forbid(unsafe_code)]

mod foundation;

pub mod anchor;
pub mod args;
pub mod composite;
pub mod job;
pub mod placement;
pub mod raster;
pub mod style;
pub mod watermarker;

pub use crate::anchor::{Anchor, Corner, Edge, validate_corner, validate_edge};
pub use crate::composite::{AlphaOverlay, Compositor};
pub use crate::foundation::core::{Position, Rgb8, Size};
pub use crate::foundation::error::{WatermarkError, WatermarkResult};
pub use crate::job::{PlacementRequest, WatermarkJob};
pub use crate::placement::{LatticeSpacing, LatticeTiles, Placement, Positions, RandomBounds};
pub use crate::raster::{ParleyRasterizer, Rasterizer, TextBlock};
pub use crate::style::WatermarkStyle;
pub use crate::watermarker::Watermarker;
