use super::{prepare_rings, sketch_set, Filler, MIN_GAP};
use crate::context::operation::{ops_bez_path, OpSetKind, Operation, OperationSet};
use crate::geometry::brush::BrushProfile;
use crate::geometry::spatial_hash::{SpatialHash, SCRIBBLE_DEDUP_TOLERANCE};
use crate::geometry::stroke::stroke_to_fill;
use crate::geometry::{rings_bounds, rings_centroid, rotate_rings, segment_intersection};
use crate::options::RenderOptions;
use crate::sketch::random::Randomizer;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// One continuous back-and-forth line across the shape. Parallel rays at the
/// scribble angle are cast across the shape; each ray's entry and exit points
/// become consecutive vertices, alternating sides from ray to ray.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ScribbleFiller {}

/// Ray positions across a band of `height`. A tightness pattern splits the
/// band into equal slices, each with its own ray count.
pub fn ray_offsets(height: f64, tightness: u32, pattern: Option<&[u32]>) -> Vec<f64> {
    match pattern.filter(|p| !p.is_empty()) {
        None => {
            let n = tightness.max(1);
            (0..n)
                .map(|k| (k as f64 + 0.5) * height / n as f64)
                .collect()
        }
        Some(pattern) => {
            let slice = height / pattern.len() as f64;
            pattern
                .iter()
                .enumerate()
                .flat_map(|(b, count)| {
                    let n = (*count).max(1);
                    (0..n).map(move |k| b as f64 * slice + (k as f64 + 0.5) * slice / n as f64)
                })
                .collect()
        }
    }
}

/// Scribble vertices, in drawing order.
pub fn scribble_points(rings: &[Vec<Point>], o: &RenderOptions) -> Vec<Point> {
    let Some(center) = rings_centroid(rings) else {
        return vec![];
    };
    let flat = rotate_rings(rings, center, -o.scribble_origin);
    let Some(bounds) = rings_bounds(&flat) else {
        return vec![];
    };

    let mut vertices = vec![];
    let mut forward = true;
    for dy in ray_offsets(
        bounds.height(),
        o.scribble_tightness,
        o.scribble_tightness_pattern.as_deref(),
    ) {
        let y = bounds.y0 + dy;
        let from = Point::new(bounds.x0 - 1.0, y);
        let to = Point::new(bounds.x1 + 1.0, y);
        // Dedup per ray: neighbouring rays may sit closer than the tolerance.
        let mut seen = SpatialHash::new(SCRIBBLE_DEDUP_TOLERANCE);
        let mut hits: Vec<Point> = flat
            .iter()
            .flat_map(|ring| {
                (0..ring.len()).filter_map(move |i| {
                    segment_intersection(from, to, ring[i], ring[(i + 1) % ring.len()])
                })
            })
            .filter(|p| seen.insert_unique(*p))
            .collect();
        if hits.len() < 2 {
            continue;
        }
        hits.sort_by(|a, b| a.x.total_cmp(&b.x));
        let (entry, exit) = (hits[0], hits[hits.len() - 1]);
        if forward {
            vertices.extend([entry, exit]);
        } else {
            vertices.extend([exit, entry]);
        }
        forward = !forward;
    }
    rotate_rings(&[vertices], center, o.scribble_origin)
        .pop()
        .unwrap_or_default()
}

/// Path through `points`. With curvature, every interior corner is cut back
/// by that fraction of its half-segments and rounded with a quadratic.
pub fn scribble_ops(points: &[Point], rng: &mut Randomizer, o: &RenderOptions) -> Vec<Operation> {
    let ro = o.max_randomness_offset;
    let points: Vec<Point> = points
        .iter()
        .map(|p| {
            let dx = rng.offset(ro, o);
            *p + Vec2::new(dx, rng.offset(ro, o))
        })
        .collect();
    let Some((first, rest)) = points.split_first() else {
        return vec![];
    };
    let mut ops = vec![Operation::Move(*first)];
    let r = o.scribble_curvature.clamp(0.0, 1.0) * 0.5;
    if r == 0.0 || points.len() < 3 {
        ops.extend(rest.iter().map(|p| Operation::LineTo(*p)));
        return ops;
    }
    for w in points.windows(3) {
        let (prev, corner, next) = (w[0], w[1], w[2]);
        ops.push(Operation::LineTo(corner + (prev - corner) * r));
        ops.push(Operation::QuadraticCurveTo(corner, corner + (next - corner) * r));
    }
    ops.push(Operation::LineTo(points[points.len() - 1]));
    ops
}

impl Filler for ScribbleFiller {
    fn fill_polygons(
        &self,
        rings: &[Vec<Point>],
        rng: &mut Randomizer,
        o: &RenderOptions,
    ) -> Option<OperationSet> {
        let rings = prepare_rings(rings)?;
        let ops = scribble_ops(&scribble_points(&rings, o), rng, o);
        if !o.scribble_use_brush_stroke {
            return sketch_set(ops);
        }
        let profile = if o.brush_profile.requires_custom_rendering() {
            o.brush_profile.clone()
        } else {
            BrushProfile::pen()
        };
        let width = o.effective_fill_weight().max(MIN_GAP);
        let outline = stroke_to_fill(&ops_bez_path(&ops), width, &profile);
        let set = OperationSet::from_bez_path(OpSetKind::FillSolidPath, &outline);
        if set.is_empty() {
            None
        } else {
            Some(set)
        }
    }
}
