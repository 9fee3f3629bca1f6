use super::{prepare_rings, Filler};
use crate::context::operation::{OpSetKind, Operation, OperationSet};
use crate::options::RenderOptions;
use crate::sketch::random::Randomizer;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// One filled region, no strokes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SolidFiller {}

/// Every ring of three or more points as a closed, lightly jittered
/// subpath of a single fill.
pub fn solid_fill_polygon(
    rings: &[Vec<Point>],
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> OperationSet {
    let offset = o.max_randomness_offset;
    let mut ops = vec![];
    for ring in rings.iter().filter(|r| r.len() > 2) {
        for (i, p) in ring.iter().enumerate() {
            let dx = rng.offset(offset, o);
            let q = *p + Vec2::new(dx, rng.offset(offset, o));
            ops.push(if i == 0 {
                Operation::Move(q)
            } else {
                Operation::LineTo(q)
            });
        }
        ops.push(Operation::Close);
    }
    OperationSet::new(OpSetKind::FillSolidPath, ops)
}

impl Filler for SolidFiller {
    fn fill_polygons(
        &self,
        rings: &[Vec<Point>],
        rng: &mut Randomizer,
        o: &RenderOptions,
    ) -> Option<OperationSet> {
        let rings = prepare_rings(rings)?;
        Some(solid_fill_polygon(&rings, rng, o))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_one_subpath_per_ring() {
        let rings = vec![
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
            ],
            vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
        ];
        let o = RenderOptions::default().with_roughness(0.0);
        let set = solid_fill_polygon(&rings, &mut Randomizer::new(1), &o);
        assert_eq!(set.kind, OpSetKind::FillSolidPath);
        assert_eq!(
            set.ops,
            vec![
                Operation::Move(Point::new(0.0, 0.0)),
                Operation::LineTo(Point::new(10.0, 0.0)),
                Operation::LineTo(Point::new(10.0, 10.0)),
                Operation::Close,
            ]
        );
    }
}
