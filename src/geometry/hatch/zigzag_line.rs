use super::{hachure_rows, prepare_rings, sketch_set, Filler};
use crate::context::operation::OperationSet;
use crate::options::RenderOptions;
use crate::sketch::random::Randomizer;
use crate::sketch::strokes::double_line;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_4;

/// Each hachure line redrawn as a run of small sawtooth teeth, `zigzag_offset`
/// long and tall.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ZigZagLineFiller {}

impl ZigZagLineFiller {
    /// Tooth size: the explicit offset, or the hachure gap when negative.
    pub fn tooth(o: &RenderOptions) -> f64 {
        if o.zigzag_offset < 0.0 {
            o.hachure_gap()
        } else {
            o.zigzag_offset
        }
    }
}

impl Filler for ZigZagLineFiller {
    fn fill_polygons(
        &self,
        rings: &[Vec<Point>],
        rng: &mut Randomizer,
        o: &RenderOptions,
    ) -> Option<OperationSet> {
        let rings = prepare_rings(rings)?;
        let zo = Self::tooth(o);
        if !(zo > 0.0) {
            return None;
        }
        let gap = o.hachure_gap();
        let lines = hachure_rows(
            &rings,
            o.fill_angle,
            gap + zo,
            o.fill_spacing_pattern.as_deref(),
        );
        let dz = (2.0 * zo * zo).sqrt();
        let mut ops = vec![];
        for (a, b) in lines.iter().flatten() {
            let (p1, p2) = if a.x > b.x { (*b, *a) } else { (*a, *b) };
            let length = (p2 - p1).hypot();
            let count = (length / (2.0 * zo)).round() as usize;
            if length == 0.0 || count == 0 {
                continue;
            }
            let dir = (p2 - p1) / length;
            let tooth_dir = Vec2::new(
                dir.x * FRAC_PI_4.cos() - dir.y * FRAC_PI_4.sin(),
                dir.x * FRAC_PI_4.sin() + dir.y * FRAC_PI_4.cos(),
            );
            for i in 0..count {
                let start = p1 + dir * (i as f64 * 2.0 * zo);
                let end = p1 + dir * ((i + 1) as f64 * 2.0 * zo);
                let middle = start + tooth_dir * dz;
                ops.extend(double_line(start, middle, rng, o, true));
                ops.extend(double_line(middle, end, rng, o, true));
            }
        }
        sketch_set(ops)
    }
}
