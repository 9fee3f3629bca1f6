use super::{prepare_rings, render_lines, sketch_set, Filler};
use crate::context::operation::OperationSet;
use crate::geometry::rings_centroid;
use crate::options::RenderOptions;
use crate::sketch::random::Randomizer;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Rays from the centroid out to the outline, one per gap of perimeter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct SunBurstFiller {}

/// Points every `step` along the closed ring, starting at its first vertex.
pub fn perimeter_samples(ring: &[Point], step: f64) -> Vec<Point> {
    if ring.len() < 2 || !(step > 0.0) {
        return vec![];
    }
    let mut samples = vec![];
    // Distance still to walk before the next sample.
    let mut carry = 0.0;
    for (i, a) in ring.iter().enumerate() {
        let b = ring[(i + 1) % ring.len()];
        let length = (b - *a).hypot();
        if length == 0.0 {
            continue;
        }
        let dir = (b - *a) / length;
        let mut along = carry;
        while along < length {
            samples.push(*a + dir * along);
            along += step;
        }
        carry = along - length;
    }
    samples
}

impl Filler for SunBurstFiller {
    fn fill_polygons(
        &self,
        rings: &[Vec<Point>],
        rng: &mut Randomizer,
        o: &RenderOptions,
    ) -> Option<OperationSet> {
        let rings = prepare_rings(rings)?;
        let center = rings_centroid(&rings)?;
        let rays: Vec<(Point, Point)> = rings
            .iter()
            .flat_map(|ring| perimeter_samples(ring, o.hachure_gap()))
            .map(|p| (center, p))
            .collect();
        sketch_set(render_lines(&rays, rng, o))
    }
}
