use super::{hachure_lines, prepare_rings, sketch_set, Filler, MIN_GAP};
use crate::context::operation::OperationSet;
use crate::options::RenderOptions;
use crate::sketch::random::Randomizer;
use crate::sketch::strokes::ellipse;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Small sketchy circles strung along the hachure lines, one per gap,
/// centered on each line and nudged by up to a quarter gap.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct DotFiller {}

/// Evenly spaced stations along `a-b`, `gap` apart, centered on the segment.
pub fn stations(a: Point, b: Point, gap: f64) -> Vec<Point> {
    let length = (b - a).hypot();
    if !(gap > 0.0) || length == 0.0 {
        return vec![];
    }
    let count = (length / gap).floor() as usize;
    if count == 0 {
        return vec![];
    }
    let dir = (b - a) / length;
    let start = (length - (count - 1) as f64 * gap) / 2.0;
    (0..count)
        .map(|i| a + dir * (start + i as f64 * gap))
        .collect()
}

impl Filler for DotFiller {
    fn fill_polygons(
        &self,
        rings: &[Vec<Point>],
        rng: &mut Randomizer,
        o: &RenderOptions,
    ) -> Option<OperationSet> {
        let rings = prepare_rings(rings)?;
        let gap = o.hachure_gap();
        let diameter = o.effective_fill_weight().max(MIN_GAP);
        let ro = gap / 4.0;
        let mut ops = vec![];
        for (a, b) in hachure_lines(&rings, o.fill_angle, o) {
            for p in stations(a, b, gap) {
                let dx = rng.offset(ro, o);
                let center = p + Vec2::new(dx, rng.offset(ro, o));
                ops.extend(ellipse(center, diameter, diameter, rng, o).opset.ops);
            }
        }
        sketch_set(ops)
    }
}
