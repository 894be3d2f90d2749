//! Coordinate derivation for every placement mode.
//!
//! Everything here is pure: given the canvas size, the rendered block size and
//! the style margin, each mode yields the top-left coordinates at which the
//! block is composited. Fractional intermediate results are truncated toward
//! zero.

use rand::Rng;

use crate::{
    anchor::{Corner, Edge},
    foundation::{
        core::{Position, Size},
        error::{WatermarkError, WatermarkResult},
    },
};

/// A validated placement request, independent of the text being placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Centre,
    Corner(Corner),
    Edge(Edge),
    Absolute(Position),
    /// Offsets as percentages of the canvas width/height.
    Percent {
        x: i64,
        y: i64,
    },
    Random {
        quantity: usize,
    },
    Lattice(LatticeSpacing),
}

impl Placement {
    pub fn random(quantity: i64) -> WatermarkResult<Self> {
        if quantity < 1 {
            return Err(WatermarkError::value("the quantity must be 1 or greater"));
        }
        let quantity = usize::try_from(quantity)
            .map_err(|_| WatermarkError::value("the quantity is too large"))?;
        Ok(Placement::Random { quantity })
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            Placement::Centre => "centre",
            Placement::Corner(_) => "corner",
            Placement::Edge(_) => "edge",
            Placement::Absolute(_) => "absolute",
            Placement::Percent { .. } => "percent",
            Placement::Random { .. } => "random",
            Placement::Lattice(_) => "lattice",
        }
    }

    /// Resolves the top-left coordinates for a block of `block` size, lazily
    /// and in compositing order.
    ///
    /// `rng` is only called by [`Placement::Random`], once, after the block
    /// has been checked to fit.
    pub fn positions<G, F>(
        &self,
        canvas: Size,
        block: Size,
        margin: i64,
        rng: F,
    ) -> WatermarkResult<Positions<G>>
    where
        G: Rng,
        F: FnOnce() -> G,
    {
        let source = match *self {
            Placement::Centre => Source::Single(Some(centre(canvas, block))),
            Placement::Corner(c) => Source::Single(Some(corner(canvas, block, c, margin))),
            Placement::Edge(e) => Source::Single(Some(edge(canvas, block, e, margin))),
            Placement::Absolute(p) => Source::Single(Some(p)),
            Placement::Percent { x, y } => Source::Single(Some(percent(canvas, x, y))),
            Placement::Random { quantity } => Source::Random {
                bounds: RandomBounds::new(canvas, block, margin)?,
                remaining: quantity,
                rng: rng(),
            },
            Placement::Lattice(spacing) => Source::Lattice(lattice(canvas, block, spacing)?),
        };
        Ok(Positions { source })
    }
}

/// Iterator over the coordinates of one placement; see [`Placement::positions`].
#[derive(Debug)]
pub struct Positions<G> {
    source: Source<G>,
}

#[derive(Debug)]
enum Source<G> {
    Single(Option<Position>),
    Random {
        bounds: RandomBounds,
        remaining: usize,
        rng: G,
    },
    Lattice(LatticeTiles),
}

impl<G: Rng> Iterator for Positions<G> {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        match &mut self.source {
            Source::Single(at) => at.take(),
            Source::Random {
                bounds,
                remaining,
                rng,
            } => {
                if *remaining == 0 {
                    return None;
                }
                *remaining -= 1;
                Some(bounds.sample(rng))
            }
            Source::Lattice(tiles) => tiles.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.source {
            Source::Single(at) => {
                let n = usize::from(at.is_some());
                (n, Some(n))
            }
            Source::Random { remaining, .. } => (*remaining, Some(*remaining)),
            Source::Lattice(tiles) => tiles.size_hint(),
        }
    }
}

pub fn centre(canvas: Size, block: Size) -> Position {
    Position::new(
        centred_axis(canvas.width, block.width),
        centred_axis(canvas.height, block.height),
    )
}

/// Keeps the whole block inside the canvas when it fits; a negative margin
/// pushes it past the chosen edges.
pub fn corner(canvas: Size, block: Size, corner: Corner, margin: i64) -> Position {
    let (fx, fy) = corner.fractions();
    Position::new(
        corner_axis(canvas.width, block.width, fx, margin),
        corner_axis(canvas.height, block.height, fy, margin),
    )
}

pub fn edge(canvas: Size, block: Size, edge: Edge, margin: i64) -> Position {
    let (fx, fy) = edge.fractions();
    Position::new(
        edge_axis(canvas.width, block.width, fx, margin),
        edge_axis(canvas.height, block.height, fy, margin),
    )
}

/// May land off-canvas; compositing clips.
pub fn percent(canvas: Size, x_percent: i64, y_percent: i64) -> Position {
    let x = f64::from(canvas.width) / 100.0 * x_percent as f64;
    let y = f64::from(canvas.height) / 100.0 * y_percent as f64;
    Position::new(x as i64, y as i64)
}

fn centred_axis(dim: u32, block: u32) -> i64 {
    (f64::from(dim) / 2.0 - f64::from(block) / 2.0) as i64
}

fn corner_axis(dim: u32, block: u32, fraction: f64, margin: i64) -> i64 {
    let anchor = f64::from(dim) * fraction;
    // A zero-sized canvas dimension falls back to the near-edge rule.
    if anchor > 0.0 {
        (anchor - f64::from(block) - margin as f64) as i64
    } else {
        margin
    }
}

fn edge_axis(dim: u32, block: u32, fraction: f64, margin: i64) -> i64 {
    let anchor = f64::from(dim) * fraction;
    let pos = if fraction == 0.5 {
        anchor - f64::from(block) / 2.0
    } else if fraction == 1.0 {
        anchor - f64::from(block) - margin as f64
    } else {
        anchor + margin as f64
    };
    pos as i64
}

/// Inclusive ranges a randomly placed block may start in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RandomBounds {
    pub min_x: i64,
    pub max_x: i64,
    pub min_y: i64,
    pub max_y: i64,
}

impl RandomBounds {
    /// Fails when the block plus margin does not fit the canvas on either axis.
    pub fn new(canvas: Size, block: Size, margin: i64) -> WatermarkResult<Self> {
        let max_x = far_bound(canvas.width, block.width, margin).ok_or_else(|| {
            WatermarkError::value(format!("margin {margin} is out of range for random placement"))
        })?;
        let max_y = far_bound(canvas.height, block.height, margin).ok_or_else(|| {
            WatermarkError::value(format!("margin {margin} is out of range for random placement"))
        })?;
        if max_x < margin {
            return Err(WatermarkError::value(format!(
                "text block width {} does not fit canvas width {} with margin {margin}",
                block.width, canvas.width
            )));
        }
        if max_y < margin {
            return Err(WatermarkError::value(format!(
                "text block height {} does not fit canvas height {} with margin {margin}",
                block.height, canvas.height
            )));
        }
        Ok(Self {
            min_x: margin,
            max_x,
            min_y: margin,
            max_y,
        })
    }

    pub fn sample<G: Rng + ?Sized>(&self, rng: &mut G) -> Position {
        Position::new(
            rng.gen_range(self.min_x..=self.max_x),
            rng.gen_range(self.min_y..=self.max_y),
        )
    }

    pub fn contains(&self, p: Position) -> bool {
        (self.min_x..=self.max_x).contains(&p.x) && (self.min_y..=self.max_y).contains(&p.y)
    }
}

/// `dim - block - margin`, or `None` when it does not fit in an `i64`.
fn far_bound(dim: u32, block: u32, margin: i64) -> Option<i64> {
    (i64::from(dim) - i64::from(block)).checked_sub(margin)
}

/// Gaps between lattice tiles and the offset of the first tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatticeSpacing {
    horizontal_margin: i64,
    vertical_margin: i64,
    horizontal_start_margin: i64,
    vertical_start_margin: i64,
}

impl LatticeSpacing {
    /// Both margins must be at least 1 so the tiling cursor always advances.
    /// Start margins default to the corresponding margin.
    pub fn new(
        horizontal_margin: i64,
        vertical_margin: i64,
        horizontal_start_margin: Option<i64>,
        vertical_start_margin: Option<i64>,
    ) -> WatermarkResult<Self> {
        if horizontal_margin < 1 {
            return Err(WatermarkError::value(
                "horizontal margin must be greater than 0",
            ));
        }
        if vertical_margin < 1 {
            return Err(WatermarkError::value(
                "vertical margin must be greater than 0",
            ));
        }
        Ok(Self {
            horizontal_margin,
            vertical_margin,
            horizontal_start_margin: horizontal_start_margin.unwrap_or(horizontal_margin),
            vertical_start_margin: vertical_start_margin.unwrap_or(vertical_margin),
        })
    }

    pub fn horizontal_margin(&self) -> i64 {
        self.horizontal_margin
    }

    pub fn vertical_margin(&self) -> i64 {
        self.vertical_margin
    }

    pub fn horizontal_start_margin(&self) -> i64 {
        self.horizontal_start_margin
    }

    pub fn vertical_start_margin(&self) -> i64 {
        self.vertical_start_margin
    }
}

/// Row-major tile origins covering the canvas.
///
/// Fails when a step (block size plus spacing margin) does not fit in an
/// `i64` or would not advance the cursor.
pub fn lattice(
    canvas: Size,
    block: Size,
    spacing: LatticeSpacing,
) -> WatermarkResult<LatticeTiles> {
    let step_x = i64::from(block.width)
        .checked_add(spacing.horizontal_margin)
        .ok_or_else(|| WatermarkError::value("horizontal lattice step is out of range"))?;
    let step_y = i64::from(block.height)
        .checked_add(spacing.vertical_margin)
        .ok_or_else(|| WatermarkError::value("vertical lattice step is out of range"))?;
    if step_x < 1 || step_y < 1 {
        return Err(WatermarkError::value(
            "lattice step must advance by at least one pixel",
        ));
    }

    let (width, height) = (i64::from(canvas.width), i64::from(canvas.height));
    let start_x = spacing.horizontal_start_margin;
    // An empty first row means every row is empty.
    let y = if start_x < width {
        spacing.vertical_start_margin
    } else {
        height
    };
    Ok(LatticeTiles {
        x: start_x,
        y,
        start_x,
        step_x,
        step_y,
        width,
        height,
    })
}

/// Streaming tile cursor returned by [`lattice`].
#[derive(Clone, Debug)]
pub struct LatticeTiles {
    x: i64,
    y: i64,
    start_x: i64,
    step_x: i64,
    step_y: i64,
    width: i64,
    height: i64,
}

impl Iterator for LatticeTiles {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.x >= self.width {
            self.x = self.start_x;
            self.y = self.y.saturating_add(self.step_y);
        }
        if self.y >= self.height {
            return None;
        }
        let at = Position::new(self.x, self.y);
        self.x = self.x.saturating_add(self.step_x);
        Some(at)
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    const CANVAS: Size = Size::new(512, 512);
    const BLOCK: Size = Size::new(100, 20);

    #[test]
    fn centre_truncates_toward_zero() {
        assert_eq!(centre(CANVAS, BLOCK), Position::new(206, 246));
        assert_eq!(
            centre(Size::new(11, 7), Size::new(4, 4)),
            Position::new(3, 1)
        );
        // Block larger than the canvas.
        assert_eq!(
            centre(Size::new(10, 10), Size::new(15, 13)),
            Position::new(-2, -1)
        );
    }

    #[test]
    fn corners_respect_margin_on_both_axes() {
        let m = 8;
        assert_eq!(corner(CANVAS, BLOCK, Corner::TopLeft, m), Position::new(8, 8));
        assert_eq!(
            corner(CANVAS, BLOCK, Corner::TopRight, m),
            Position::new(512 - 100 - 8, 8)
        );
        assert_eq!(
            corner(CANVAS, BLOCK, Corner::BottomLeft, m),
            Position::new(8, 512 - 20 - 8)
        );
        assert_eq!(
            corner(CANVAS, BLOCK, Corner::BottomRight, m),
            Position::new(404, 484)
        );
    }

    #[test]
    fn negative_corner_margin_pushes_outward() {
        assert_eq!(
            corner(CANVAS, BLOCK, Corner::TopLeft, -5),
            Position::new(-5, -5)
        );
        assert_eq!(
            corner(CANVAS, BLOCK, Corner::BottomRight, -5),
            Position::new(417, 497)
        );
    }

    #[test]
    fn corner_on_zero_sized_axis_uses_near_edge_rule() {
        assert_eq!(
            corner(Size::new(0, 50), BLOCK, Corner::BottomRight, 3),
            Position::new(3, 27)
        );
    }

    #[test]
    fn edges_centre_one_axis_and_offset_the_other() {
        let m = 10;
        assert_eq!(edge(CANVAS, BLOCK, Edge::Left, m), Position::new(10, 246));
        assert_eq!(edge(CANVAS, BLOCK, Edge::Right, m), Position::new(402, 246));
        assert_eq!(edge(CANVAS, BLOCK, Edge::Top, m), Position::new(206, 10));
        assert_eq!(edge(CANVAS, BLOCK, Edge::Bottom, m), Position::new(206, 482));
    }

    #[test]
    fn anchored_blocks_stay_inside_a_large_enough_canvas() {
        let canvas = Size::new(300, 200);
        let block = Size::new(37, 19);
        let margin = 6;
        let inside = |p: Position| {
            p.x >= 0
                && p.y >= 0
                && p.x + i64::from(block.width) <= i64::from(canvas.width)
                && p.y + i64::from(block.height) <= i64::from(canvas.height)
        };
        for c in Corner::ALL {
            assert!(inside(corner(canvas, block, c, margin)), "{c:?}");
        }
        for e in Edge::ALL {
            assert!(inside(edge(canvas, block, e, margin)), "{e:?}");
        }
    }

    #[test]
    fn percent_may_leave_the_canvas() {
        assert_eq!(percent(Size::new(200, 400), 50, 25), Position::new(100, 100));
        assert_eq!(percent(Size::new(200, 400), 150, -10), Position::new(300, -40));
        assert_eq!(percent(Size::new(333, 333), 10, 10), Position::new(33, 33));
    }

    #[test]
    fn random_bounds_follow_margin() {
        let b = RandomBounds::new(CANVAS, BLOCK, 4).unwrap();
        assert_eq!(
            b,
            RandomBounds {
                min_x: 4,
                max_x: 408,
                min_y: 4,
                max_y: 488,
            }
        );
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(b.contains(b.sample(&mut rng)));
        }
    }

    #[test]
    fn random_bounds_reject_blocks_that_do_not_fit() {
        let err = RandomBounds::new(Size::new(100, 100), Size::new(95, 10), 3).unwrap_err();
        assert!(err.is_value_error());
        let err = RandomBounds::new(Size::new(100, 100), Size::new(10, 101), 0).unwrap_err();
        assert!(err.is_value_error());
        // Exact fit leaves a single candidate position.
        let b = RandomBounds::new(Size::new(100, 100), Size::new(90, 90), 5).unwrap();
        assert_eq!((b.min_x, b.max_x), (5, 5));
    }

    #[test]
    fn random_quantity_must_be_positive() {
        assert!(Placement::random(0).unwrap_err().is_value_error());
        assert!(Placement::random(-2).unwrap_err().is_value_error());
        assert_eq!(
            Placement::random(3).unwrap(),
            Placement::Random { quantity: 3 }
        );
    }

    #[test]
    fn random_positions_yield_quantity_draws() {
        let mut rng = StdRng::seed_from_u64(42);
        let placement = Placement::random(5).unwrap();
        let rng = &mut rng;
        let got: Vec<_> = placement
            .positions(CANVAS, BLOCK, 2, move || rng)
            .unwrap()
            .collect();
        assert_eq!(got.len(), 5);
        let b = RandomBounds::new(CANVAS, BLOCK, 2).unwrap();
        assert!(got.iter().all(|p| b.contains(*p)));
    }

    #[test]
    fn lattice_spacing_requires_positive_margins() {
        assert!(LatticeSpacing::new(0, 5, None, None).unwrap_err().is_value_error());
        assert!(LatticeSpacing::new(5, -1, None, None).unwrap_err().is_value_error());
        let s = LatticeSpacing::new(3, 4, None, Some(0)).unwrap();
        assert_eq!(s.horizontal_start_margin(), 3);
        assert_eq!(s.vertical_start_margin(), 0);
    }

    #[test]
    fn lattice_tiles_row_major() {
        let spacing = LatticeSpacing::new(64, 64, Some(16), Some(32)).unwrap();
        let tiles: Vec<_> = lattice(CANVAS, BLOCK, spacing).unwrap().collect();

        assert_eq!(tiles[0], Position::new(16, 32));
        assert_eq!(tiles[1], Position::new(180, 32));
        assert_eq!(tiles[2], Position::new(344, 32));
        assert_eq!(tiles[3], Position::new(508, 32));
        assert_eq!(tiles[4], Position::new(16, 116));

        // Rows at 32, 116, 200, 284, 368, 452; four columns each.
        assert_eq!(tiles.len(), 24);
        assert_eq!(tiles.last().copied(), Some(Position::new(508, 452)));
    }

    #[test]
    fn lattice_start_beyond_canvas_places_nothing() {
        let spacing = LatticeSpacing::new(1, 1, Some(600), None).unwrap();
        assert_eq!(lattice(CANVAS, BLOCK, spacing).unwrap().next(), None);
    }

    #[test]
    fn lattice_with_empty_block_still_advances() {
        let spacing = LatticeSpacing::new(1, 1, Some(0), Some(0)).unwrap();
        let tiles = lattice(Size::new(3, 2), Size::new(0, 0), spacing).unwrap();
        assert_eq!(tiles.count(), 6);
    }

    #[test]
    fn fixed_modes_never_ask_for_randomness() {
        let no_rng = || -> StdRng { panic!("only random placement draws") };
        let spacing = LatticeSpacing::new(64, 64, None, None).unwrap();
        for placement in [
            Placement::Centre,
            Placement::Corner(Corner::TopRight),
            Placement::Edge(Edge::Bottom),
            Placement::Absolute(Position::new(3, 4)),
            Placement::Percent { x: 10, y: 90 },
            Placement::Lattice(spacing),
        ] {
            assert!(placement.positions(CANVAS, BLOCK, 5, no_rng).unwrap().count() >= 1);
        }
    }

    #[test]
    fn huge_random_quantity_is_drawn_lazily() {
        let placement = Placement::Random {
            quantity: usize::MAX,
        };
        let rng = StdRng::seed_from_u64(3);
        let mut positions = placement.positions(CANVAS, BLOCK, 0, move || rng).unwrap();
        assert_eq!(positions.size_hint(), (usize::MAX, Some(usize::MAX)));
        let first: Vec<_> = positions.by_ref().take(3).collect();
        assert_eq!(first.len(), 3);
        assert_eq!(positions.size_hint().0, usize::MAX - 3);
    }

    #[test]
    fn lattice_with_far_negative_start_streams() {
        let spacing = LatticeSpacing::new(1, 1, Some(i64::MIN), Some(i64::MIN)).unwrap();
        let mut tiles = lattice(CANVAS, BLOCK, spacing).unwrap();
        assert_eq!(tiles.next(), Some(Position::new(i64::MIN, i64::MIN)));
        assert_eq!(tiles.next(), Some(Position::new(i64::MIN + 101, i64::MIN)));
    }

    #[test]
    fn lattice_rejects_steps_that_overflow() {
        let spacing = LatticeSpacing::new(i64::MAX, 1, Some(0), Some(0)).unwrap();
        assert!(lattice(CANVAS, BLOCK, spacing).unwrap_err().is_value_error());
        let spacing = LatticeSpacing::new(1, i64::MAX, Some(0), Some(0)).unwrap();
        assert!(lattice(CANVAS, BLOCK, spacing).unwrap_err().is_value_error());
        // With an empty block the step fits exactly, so a single tile per axis.
        let spacing = LatticeSpacing::new(i64::MAX, i64::MAX, Some(0), Some(0)).unwrap();
        let tiles: Vec<_> = lattice(CANVAS, Size::new(0, 0), spacing).unwrap().collect();
        assert_eq!(tiles, vec![Position::new(0, 0)]);
    }

    #[test]
    fn random_bounds_reject_extreme_margins() {
        for margin in [i64::MIN, i64::MIN + 1, i64::MAX] {
            let err = RandomBounds::new(CANVAS, BLOCK, margin).unwrap_err();
            assert!(err.is_value_error(), "{margin}: {err}");
        }
    }
}
