use super::{hachure_rows, prepare_rings, sketch_set, Filler};
use crate::context::operation::OperationSet;
use crate::options::RenderOptions;
use crate::sketch::random::Randomizer;
use crate::sketch::strokes::double_line;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Hachure lines joined end to end into one back-and-forth stroke. The chain
/// breaks wherever a scan line crosses the shape more than once, so the
/// connectors never jump over a gap in the shape.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ZigZagFiller {}

impl Filler for ZigZagFiller {
    fn fill_polygons(
        &self,
        rings: &[Vec<Point>],
        rng: &mut Randomizer,
        o: &RenderOptions,
    ) -> Option<OperationSet> {
        let rings = prepare_rings(rings)?;
        let rows = hachure_rows(
            &rings,
            o.fill_angle,
            o.hachure_gap(),
            o.fill_spacing_pattern.as_deref(),
        );
        let mut ops = vec![];
        let mut chain_end: Option<Point> = None;
        let mut forward = true;
        for row in &rows {
            if let [(a, b)] = row.as_slice() {
                let (from, to) = if forward { (*a, *b) } else { (*b, *a) };
                if let Some(end) = chain_end {
                    ops.extend(double_line(end, from, rng, o, true));
                }
                ops.extend(double_line(from, to, rng, o, true));
                chain_end = Some(to);
                forward = !forward;
            } else {
                chain_end = None;
                forward = true;
                for (a, b) in row {
                    ops.extend(double_line(*a, *b, rng, o, true));
                }
            }
        }
        sketch_set(ops)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::context::operation::Operation;

    #[test]
    fn test_rows_are_chained() {
        let rings = vec![vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ]];
        let o = RenderOptions {
            fill_angle: 0.0,
            fill_weight: 1.0,
            fill_spacing: 25.0,
            disable_multi_stroke_fill: true,
            ..RenderOptions::default().with_roughness(0.0)
        };
        let set = ZigZagFiller::default()
            .fill_polygons(&rings, &mut Randomizer::new(1), &o)
            .expect("filled");
        // Four scan lines and three connectors, one pass each.
        assert_eq!(set.ops.len(), 14);
        let ends: Vec<Point> = set
            .ops
            .iter()
            .filter_map(|op| match op {
                Operation::BezierCurveTo(_, _, p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(ends[0], Point::new(100.0, 12.5));
        assert_eq!(ends[1], Point::new(100.0, 37.5));
        assert_eq!(ends[2], Point::new(0.0, 37.5));
    }
}
