//! Fill patterns. Every filler takes a list of closed rings (outer outlines
//! and holes alike, filled by the even-odd rule) and returns one fill
//! [`OperationSet`], or `None` when the rings enclose nothing.
//!
//! Most fillers start from [`hachure_rows`]: rotate the rings so the fill
//! angle lies flat, sweep horizontal scan lines across them, pair up the
//! sorted edge crossings of each line and rotate the resulting segments
//! back.
use crate::context::operation::{OpSetKind, Operation, OperationSet};
use crate::geometry::{clean_ring, rings_area, rings_bounds, rings_centroid, rotate_rings, rotate_segments};
use crate::options::{FillStyle, RenderOptions};
use crate::sketch::random::Randomizer;
use crate::sketch::strokes::double_line;
use kurbo::Point;
use std::fmt::Debug;

pub mod crosshatch;
pub use crosshatch::CrossHatchFiller;
pub mod dashed;
pub use dashed::DashedFiller;
pub mod dots;
pub use dots::DotFiller;
pub mod hachure;
pub use hachure::HachureFiller;
pub mod scribble;
pub use scribble::ScribbleFiller;
pub mod solid;
pub use solid::{solid_fill_polygon, SolidFiller};
pub mod sunburst;
pub use sunburst::SunBurstFiller;
pub mod zigzag;
pub use zigzag::ZigZagFiller;
pub mod zigzag_line;
pub use zigzag_line::ZigZagLineFiller;

/// Smallest spacing any scan line sweep will use.
pub const MIN_GAP: f64 = 0.1;

/// A fill pattern. Fillers hold no state, so one shared instance per style
/// serves every call.
pub trait Filler: Debug + Send + Sync {
    fn fill_polygons(
        &self,
        rings: &[Vec<Point>],
        rng: &mut Randomizer,
        o: &RenderOptions,
    ) -> Option<OperationSet>;
}

/// The filler for a fill style.
pub fn filler_for(style: FillStyle) -> &'static dyn Filler {
    static HACHURE: HachureFiller = HachureFiller {};
    static SOLID: SolidFiller = SolidFiller {};
    static ZIGZAG: ZigZagFiller = ZigZagFiller {};
    static CROSS_HATCH: CrossHatchFiller = CrossHatchFiller {};
    static DOTS: DotFiller = DotFiller {};
    static DASHED: DashedFiller = DashedFiller {};
    static SUN_BURST: SunBurstFiller = SunBurstFiller {};
    static ZIGZAG_LINE: ZigZagLineFiller = ZigZagLineFiller {};
    static SCRIBBLE: ScribbleFiller = ScribbleFiller {};
    match style {
        FillStyle::Hachure => &HACHURE,
        FillStyle::Solid => &SOLID,
        FillStyle::Zigzag => &ZIGZAG,
        FillStyle::CrossHatch => &CROSS_HATCH,
        FillStyle::Dots => &DOTS,
        FillStyle::Dashed => &DASHED,
        FillStyle::SunBurst => &SUN_BURST,
        FillStyle::ZigzagLine => &ZIGZAG_LINE,
        FillStyle::Scribble => &SCRIBBLE,
    }
}

/// Fill `rings` with the options' own fill style.
pub fn pattern_fill(
    rings: &[Vec<Point>],
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> Option<OperationSet> {
    filler_for(o.fill_style).fill_polygons(rings, rng, o)
}

/// Cleaned rings with at least three points, or `None` when together they
/// have no area to fill.
pub fn prepare_rings(rings: &[Vec<Point>]) -> Option<Vec<Vec<Point>>> {
    let cleaned: Vec<Vec<Point>> = rings
        .iter()
        .map(|r| clean_ring(r))
        .filter(|r| r.len() >= 3)
        .collect();
    let area = rings_area(&cleaned);
    if cleaned.is_empty() || !(area > 1e-9) {
        tracing::trace!(rings = rings.len(), area, "nothing to fill");
        return None;
    }
    Some(cleaned)
}

/// X coordinates where the horizontal line at `y` crosses the rings' edges.
/// Edges are half-open in y so a line through a vertex counts it once.
pub fn scan_crossings(rings: &[Vec<Point>], y: f64) -> Vec<f64> {
    let mut xs = vec![];
    for ring in rings {
        for (i, a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            if (a.y <= y && y < b.y) || (b.y <= y && y < a.y) {
                xs.push(a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
    }
    xs.sort_by(f64::total_cmp);
    xs
}

/// Hachure segments grouped by scan line, in sweep order; a line that misses
/// the rings keeps its (empty) place. `degrees` is the
/// line angle; `gap` the base spacing, scaled per line by the cycling
/// `spacing_pattern` multipliers when given.
pub fn hachure_rows(
    rings: &[Vec<Point>],
    degrees: f64,
    gap: f64,
    spacing_pattern: Option<&[f64]>,
) -> Vec<Vec<(Point, Point)>> {
    let Some(center) = rings_centroid(rings) else {
        return vec![];
    };
    let flat = rotate_rings(rings, center, -degrees);
    let Some(bounds) = rings_bounds(&flat) else {
        return vec![];
    };
    let pattern = spacing_pattern.filter(|p| !p.is_empty());
    let spacing = |k: usize| {
        let multiplier = pattern.map_or(1.0, |p| p[k % p.len()]);
        let step = gap * multiplier;
        if step.is_finite() {
            step.max(MIN_GAP)
        } else {
            gap.max(MIN_GAP)
        }
    };

    let mut rows = vec![];
    let mut k = 0usize;
    let mut y = bounds.y0 + spacing(0) / 2.0;
    while y < bounds.y1 {
        let xs = scan_crossings(&flat, y);
        let row: Vec<(Point, Point)> = xs
            .chunks_exact(2)
            .filter(|pair| pair[1] > pair[0])
            .map(|pair| (Point::new(pair[0], y), Point::new(pair[1], y)))
            .collect();
        rows.push(rotate_segments(&row, center, degrees));
        k += 1;
        y += spacing(k);
    }
    rows
}

/// All hachure segments at the options' spacing.
pub fn hachure_lines(rings: &[Vec<Point>], degrees: f64, o: &RenderOptions) -> Vec<(Point, Point)> {
    hachure_rows(
        rings,
        degrees,
        o.hachure_gap(),
        o.fill_spacing_pattern.as_deref(),
    )
    .into_iter()
    .flatten()
    .collect()
}

/// Every segment as a doubled fill line.
pub fn render_lines(
    lines: &[(Point, Point)],
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> Vec<Operation> {
    lines
        .iter()
        .flat_map(|(a, b)| double_line(*a, *b, rng, o, true))
        .collect()
}

/// A sketch set, or `None` when nothing was drawn.
pub(crate) fn sketch_set(ops: Vec<Operation>) -> Option<OperationSet> {
    if ops.is_empty() {
        None
    } else {
        Some(OperationSet::new(OpSetKind::FillSketch, ops))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn square(size: f64) -> Vec<Vec<Point>> {
        vec![vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ]]
    }

    #[test]
    fn test_flat_rows_span_the_square() {
        let rows = hachure_rows(&square(100.0), 0.0, 10.0, None);
        assert_eq!(rows.len(), 10);
        for row in &rows {
            assert_eq!(row.len(), 1);
            let (a, b) = row[0];
            assert!((a.x - 0.0).abs() < 1e-9 && (b.x - 100.0).abs() < 1e-9);
        }
        assert!((rows[0][0].0.y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_hole_splits_rows() {
        let mut rings = square(100.0);
        rings.push(vec![
            Point::new(40.0, 40.0),
            Point::new(60.0, 40.0),
            Point::new(60.0, 60.0),
            Point::new(40.0, 60.0),
        ]);
        let rows = hachure_rows(&rings, 0.0, 10.0, None);
        assert_eq!(rows[4].len(), 2);
        assert_eq!(rows[0].len(), 1);
    }

    #[test]
    fn test_spacing_pattern_changes_density() {
        let even = hachure_rows(&square(100.0), 0.0, 10.0, None).len();
        let graded = hachure_rows(&square(100.0), 0.0, 10.0, Some(&[1.0, 3.0])).len();
        assert!(graded < even);
        let zero = hachure_rows(&square(1.0), 0.0, 0.0, None).len();
        assert_eq!(zero, 10);
    }

    #[test]
    fn test_rotated_rows_stay_inside() {
        let rows = hachure_rows(&square(100.0), 45.0, 5.0, None);
        assert!(!rows.is_empty());
        for (a, b) in rows.iter().flatten() {
            for p in [a, b] {
                assert!(p.x > -1e-6 && p.x < 100.0 + 1e-6);
                assert!(p.y > -1e-6 && p.y < 100.0 + 1e-6);
            }
            // Segments run at 45 degrees.
            assert!(((b.y - a.y).abs() - (b.x - a.x).abs()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_degenerate_rings() {
        assert!(prepare_rings(&[]).is_none());
        let line = vec![vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
        ]];
        assert!(prepare_rings(&line).is_none());
        for style in FillStyle::ALL {
            let mut rng = Randomizer::new(1);
            let o = RenderOptions::default().with_fill_style(style);
            assert!(pattern_fill(&line, &mut rng, &o).is_none(), "{style:?}");
            assert!(pattern_fill(&[], &mut rng, &o).is_none(), "{style:?}");
        }
    }

    #[test]
    fn test_every_style_fills_a_square() {
        for style in FillStyle::ALL {
            let mut rng = Randomizer::new(1);
            let o = RenderOptions::default().with_fill_style(style);
            let set = pattern_fill(&square(100.0), &mut rng, &o).expect("filled");
            assert!(!set.is_empty(), "{style:?}");
        }
    }
}
