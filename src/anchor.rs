//! Named reference points on a rectangle's boundary.
//!
//! Anchors are closed enumerations: the only valid corners and edges are the
//! variants below. A pair of fractions that happens to equal a corner's
//! fractions is not a corner.

use crate::foundation::error::{WatermarkError, WatermarkResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// `(x_fraction, y_fraction)`, each `0.0` (near edge) or `1.0` (far edge).
    pub fn fractions(self) -> (f64, f64) {
        match self {
            Corner::TopLeft => (0.0, 0.0),
            Corner::TopRight => (1.0, 0.0),
            Corner::BottomLeft => (0.0, 1.0),
            Corner::BottomRight => (1.0, 1.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Corner::TopLeft => "top_left",
            Corner::TopRight => "top_right",
            Corner::BottomLeft => "bottom_left",
            Corner::BottomRight => "bottom_right",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

    /// `(x_fraction, y_fraction)`; exactly one axis is `0.5`.
    pub fn fractions(self) -> (f64, f64) {
        match self {
            Edge::Left => (0.0, 0.5),
            Edge::Right => (1.0, 0.5),
            Edge::Top => (0.5, 0.0),
            Edge::Bottom => (0.5, 1.0),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Top => "top",
            Edge::Bottom => "bottom",
        }
    }
}

/// A corner or an edge midpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Anchor {
    Corner(Corner),
    Edge(Edge),
}

impl Anchor {
    pub fn fractions(self) -> (f64, f64) {
        match self {
            Anchor::Corner(c) => c.fractions(),
            Anchor::Edge(e) => e.fractions(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Anchor::Corner(c) => c.name(),
            Anchor::Edge(e) => e.name(),
        }
    }

    /// Looks an anchor up by its snake_case name. `-` is accepted in place of `_`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().replace('-', "_");
        Corner::ALL
            .into_iter()
            .map(Anchor::Corner)
            .chain(Edge::ALL.into_iter().map(Anchor::Edge))
            .find(|a| a.name() == name)
    }
}

impl From<Corner> for Anchor {
    fn from(c: Corner) -> Self {
        Anchor::Corner(c)
    }
}

impl From<Edge> for Anchor {
    fn from(e: Edge) -> Self {
        Anchor::Edge(e)
    }
}

/// Accepts only the four corner constants.
pub fn validate_corner(anchor: Option<Anchor>) -> WatermarkResult<Corner> {
    match anchor {
        None => Err(WatermarkError::type_error("a corner value must be provided")),
        Some(Anchor::Corner(c)) => Ok(c),
        Some(Anchor::Edge(e)) => Err(WatermarkError::type_error(format!(
            "only corner values are valid, got edge '{}'",
            e.name()
        ))),
    }
}

/// Accepts only the four edge constants.
pub fn validate_edge(anchor: Option<Anchor>) -> WatermarkResult<Edge> {
    match anchor {
        None => Err(WatermarkError::type_error("an edge value must be provided")),
        Some(Anchor::Edge(e)) => Ok(e),
        Some(Anchor::Corner(c)) => Err(WatermarkError::type_error(format!(
            "only edge values are valid, got corner '{}'",
            c.name()
        ))),
    }
}
