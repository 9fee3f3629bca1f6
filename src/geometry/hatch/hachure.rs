use super::{hachure_lines, prepare_rings, render_lines, sketch_set, Filler};
use crate::context::operation::OperationSet;
use crate::options::RenderOptions;
use crate::sketch::random::Randomizer;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Parallel doubled lines at the fill angle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct HachureFiller {}

impl Filler for HachureFiller {
    fn fill_polygons(
        &self,
        rings: &[Vec<Point>],
        rng: &mut Randomizer,
        o: &RenderOptions,
    ) -> Option<OperationSet> {
        let rings = prepare_rings(rings)?;
        let lines = hachure_lines(&rings, o.fill_angle, o);
        sketch_set(render_lines(&lines, rng, o))
    }
}
