use super::{hachure_lines, prepare_rings, render_lines, sketch_set, Filler};
use crate::context::operation::OperationSet;
use crate::options::RenderOptions;
use crate::sketch::random::Randomizer;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Hachure lines broken into dashes. Negative dash length or gap fall back
/// to the hachure gap.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct DashedFiller {}

/// Dashes of `dash` length separated by `space`, centered on `a-b`.
pub fn dashes(a: Point, b: Point, dash: f64, space: f64) -> Vec<(Point, Point)> {
    let length = (b - a).hypot();
    let period = dash + space;
    if !(period > 0.0) || !(dash > 0.0) || length == 0.0 {
        return vec![];
    }
    let count = (length / period).floor() as usize;
    let start = (length + space - count as f64 * period) / 2.0;
    let dir = (b - a) / length;
    (0..count)
        .map(|i| {
            let from = start + i as f64 * period;
            (a + dir * from, a + dir * (from + dash))
        })
        .collect()
}

impl Filler for DashedFiller {
    fn fill_polygons(
        &self,
        rings: &[Vec<Point>],
        rng: &mut Randomizer,
        o: &RenderOptions,
    ) -> Option<OperationSet> {
        let rings = prepare_rings(rings)?;
        let gap = o.hachure_gap();
        let dash = if o.dash_offset < 0.0 { gap } else { o.dash_offset };
        let space = if o.dash_gap < 0.0 { gap } else { o.dash_gap };
        let pieces: Vec<(Point, Point)> = hachure_lines(&rings, o.fill_angle, o)
            .into_iter()
            .flat_map(|(a, b)| dashes(a, b, dash, space))
            .collect();
        sketch_set(render_lines(&pieces, rng, o))
    }
}
