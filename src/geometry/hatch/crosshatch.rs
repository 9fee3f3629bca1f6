use super::{hachure_lines, prepare_rings, render_lines, sketch_set, Filler};
use crate::context::operation::OperationSet;
use crate::options::RenderOptions;
use crate::sketch::random::Randomizer;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Hachure at the fill angle, then again at a right angle to it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct CrossHatchFiller {}

impl Filler for CrossHatchFiller {
    fn fill_polygons(
        &self,
        rings: &[Vec<Point>],
        rng: &mut Randomizer,
        o: &RenderOptions,
    ) -> Option<OperationSet> {
        let rings = prepare_rings(rings)?;
        let mut lines = hachure_lines(&rings, o.fill_angle, o);
        lines.extend(hachure_lines(&rings, o.fill_angle + 90.0, o));
        sketch_set(render_lines(&lines, rng, o))
    }
}
