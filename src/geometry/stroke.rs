//! Stroke-to-fill conversion: a centerline plus a [`BrushProfile`] becomes one
//! filled outline. Curves are flattened adaptively, each sample gets its own
//! half-width from the thickness profile and the tip, and the two offset rails
//! are stitched together with caps at open ends and joins at corners.
use crate::geometry::brush::{BrushProfile, LineCap, LineJoin};
use crate::geometry::flatten::{flatten_path, Polyline, FLATNESS_TOLERANCE};
use kurbo::{BezPath, Point, Vec2};
use std::f64::consts::{FRAC_PI_8, PI};

/// Miter joins longer than this many half-widths fall back to a bevel.
pub const MITER_LIMIT: f64 = 4.0;

/// Turns smaller than this (radians) are treated as a smooth continuation.
const SMOOTH_TURN: f64 = 1e-3;

/// A point on the flattened centerline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSample {
    pub point: Point,
    /// Normalized arc length over the whole path.
    pub t: f64,
    /// Local stroke direction, radians.
    pub angle: f64,
    pub half_width: f64,
}

#[derive(Debug, Clone)]
pub struct StrokeOutliner<'a> {
    profile: &'a BrushProfile,
    base_width: f64,
    tolerance: f64,
}

impl<'a> StrokeOutliner<'a> {
    pub fn new(profile: &'a BrushProfile, base_width: f64) -> StrokeOutliner<'a> {
        StrokeOutliner {
            profile,
            base_width,
            tolerance: FLATNESS_TOLERANCE,
        }
    }

    pub fn with_tolerance(self, tolerance: f64) -> Self {
        StrokeOutliner { tolerance, ..self }
    }

    /// Outline of the whole path. No drawable segment means an empty outline.
    pub fn outline(&self, path: &BezPath) -> BezPath {
        let mut out = BezPath::new();
        if !(self.base_width > 0.0) {
            return out;
        }
        let lines: Vec<Polyline> = flatten_path(path, self.tolerance)
            .into_iter()
            .map(|mut p| {
                p.points = dedup(&p.points);
                p
            })
            .filter(|p| p.points.len() > 1)
            .collect();
        let total: f64 = lines.iter().map(polyline_length).sum();
        if total <= 0.0 {
            return out;
        }
        let mut walked = 0.0;
        for line in &lines {
            let samples = self.samples(line, walked, total);
            walked += polyline_length(line);
            if line.closed {
                self.closed_outline(&samples, &mut out);
            } else {
                self.open_outline(&samples, &mut out);
            }
        }
        out
    }

    /// Samples for one subpath, `t` continuing from `walked` along `total`.
    pub fn samples(&self, line: &Polyline, walked: f64, total: f64) -> Vec<StrokeSample> {
        let pts = &line.points;
        let n = pts.len();
        let mut along = walked;
        (0..n)
            .map(|i| {
                if i > 0 {
                    along += pts[i].distance(pts[i - 1]);
                }
                let incoming = if i > 0 {
                    Some(pts[i] - pts[i - 1])
                } else if line.closed {
                    Some(pts[0] - pts[n - 1])
                } else {
                    None
                };
                let outgoing = if i + 1 < n {
                    Some(pts[i + 1] - pts[i])
                } else if line.closed {
                    Some(pts[0] - pts[i])
                } else {
                    None
                };
                let dir = match (incoming, outgoing) {
                    (Some(a), Some(b)) => {
                        let avg = unit(a) + unit(b);
                        if avg.hypot() > 1e-9 {
                            avg
                        } else {
                            b
                        }
                    }
                    (Some(a), None) => a,
                    (None, Some(b)) => b,
                    (None, None) => Vec2::new(1.0, 0.0),
                };
                let t = along / total;
                let angle = dir.y.atan2(dir.x);
                let width = self.base_width * self.profile.thickness.multiplier(t);
                let half_width = self
                    .profile
                    .tip
                    .effective_width(width / 2.0, angle)
                    .max(0.0);
                StrokeSample {
                    point: pts[i],
                    t,
                    angle,
                    half_width,
                }
            })
            .collect()
    }

    /// Left and right rails in forward order, joins included.
    fn rails(&self, s: &[StrokeSample], closed: bool) -> (Vec<Point>, Vec<Point>) {
        let n = s.len();
        let mut left = Vec::with_capacity(n);
        let mut right = Vec::with_capacity(n);
        for i in 0..n {
            let p = s[i].point;
            let hw = s[i].half_width;
            let prev = if i > 0 {
                Some(s[i - 1].point)
            } else if closed {
                Some(s[n - 1].point)
            } else {
                None
            };
            let next = if i + 1 < n {
                Some(s[i + 1].point)
            } else if closed {
                Some(s[0].point)
            } else {
                None
            };
            match (prev, next) {
                (Some(prev), Some(next)) => {
                    let a = unit(p - prev);
                    let b = unit(next - p);
                    let turn = a.cross(b).atan2(a.dot(b));
                    if turn.abs() < SMOOTH_TURN {
                        let nrm = normal(a);
                        left.push(p + nrm * hw);
                        right.push(p - nrm * hw);
                    } else {
                        // A left turn (positive) puts the outer edge on the right rail.
                        let (outer, inner, side) = if turn > 0.0 {
                            (&mut right, &mut left, -1.0)
                        } else {
                            (&mut left, &mut right, 1.0)
                        };
                        inner.push(inner_point(p, a, b, hw, -side));
                        self.join(outer, p, a, b, hw, side, turn);
                    }
                }
                (None, Some(next)) => {
                    let nrm = normal(unit(next - p));
                    left.push(p + nrm * hw);
                    right.push(p - nrm * hw);
                }
                (Some(prev), None) => {
                    let nrm = normal(unit(p - prev));
                    left.push(p + nrm * hw);
                    right.push(p - nrm * hw);
                }
                (None, None) => {}
            }
        }
        (left, right)
    }

    #[allow(clippy::too_many_arguments)]
    fn join(&self, rail: &mut Vec<Point>, p: Point, a: Vec2, b: Vec2, hw: f64, side: f64, turn: f64) {
        let from = p + normal(a) * hw * side;
        let to = p + normal(b) * hw * side;
        match self.profile.join {
            LineJoin::Bevel => {
                rail.push(from);
                rail.push(to);
            }
            LineJoin::Miter => {
                let half = turn.abs() / 2.0;
                let factor = 1.0 / half.cos().max(1e-9);
                if factor <= MITER_LIMIT {
                    rail.push(p + bisector(a, b) * hw * side * factor);
                } else {
                    rail.push(from);
                    rail.push(to);
                }
            }
            LineJoin::Round => {
                let start = (from - p).atan2();
                arc_into(rail, p, hw, start, turn, true);
            }
        }
    }

    fn open_outline(&self, s: &[StrokeSample], out: &mut BezPath) {
        let (left, right) = self.rails(s, false);
        if left.is_empty() {
            return;
        }
        let n = s.len();
        let end_dir = unit(s[n - 1].point - s[n - 2].point);
        let start_dir = unit(s[1].point - s[0].point);
        let mut ring: Vec<Point> = Vec::with_capacity(left.len() + right.len() + 32);
        ring.extend_from_slice(&left);
        self.cap(&mut ring, s[n - 1].point, end_dir, s[n - 1].half_width);
        ring.extend(right.iter().rev());
        self.cap(&mut ring, s[0].point, -start_dir, s[0].half_width);
        emit_ring(&ring, out);
    }

    fn closed_outline(&self, s: &[StrokeSample], out: &mut BezPath) {
        let (left, right) = self.rails(s, true);
        emit_ring(&left, out);
        let reversed: Vec<Point> = right.into_iter().rev().collect();
        emit_ring(&reversed, out);
    }

    /// Cap at `center`, `dir` pointing out of the stroke. The ring arrives on
    /// the side `center + normal(dir) * hw` and leaves on the opposite side.
    fn cap(&self, ring: &mut Vec<Point>, center: Point, dir: Vec2, hw: f64) {
        let nrm = normal(dir);
        match self.profile.cap {
            LineCap::Butt => {}
            LineCap::Square => {
                ring.push(center + nrm * hw + dir * hw);
                ring.push(center - nrm * hw + dir * hw);
            }
            LineCap::Round => {
                let start = nrm.atan2();
                arc_into(ring, center, hw, start, -PI, false);
            }
        }
    }
}

/// Convert `path` into a filled outline for `profile` at `base_width`.
pub fn stroke_to_fill(path: &BezPath, base_width: f64, profile: &BrushProfile) -> BezPath {
    StrokeOutliner::new(profile, base_width).outline(path)
}

fn unit(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len > 1e-12 {
        v / len
    } else {
        Vec2::ZERO
    }
}

fn normal(d: Vec2) -> Vec2 {
    Vec2::new(-d.y, d.x)
}

fn bisector(a: Vec2, b: Vec2) -> Vec2 {
    let m = normal(a) + normal(b);
    if m.hypot() > 1e-9 {
        unit(m)
    } else {
        normal(a)
    }
}

fn inner_point(p: Point, a: Vec2, b: Vec2, hw: f64, side: f64) -> Point {
    let half = (a.cross(b).atan2(a.dot(b))).abs() / 2.0;
    let factor = (1.0 / half.cos().max(1e-9)).min(MITER_LIMIT);
    p + bisector(a, b) * hw * side * factor
}

/// Arc points around `center` from `start` sweeping `sweep` radians. The
/// start point itself is included when `include_start` is set.
fn arc_into(out: &mut Vec<Point>, center: Point, r: f64, start: f64, sweep: f64, include_start: bool) {
    let steps = ((sweep.abs() / FRAC_PI_8).ceil() as usize).max(1);
    let first = if include_start { 0 } else { 1 };
    for i in first..=steps {
        let angle = start + sweep * i as f64 / steps as f64;
        out.push(center + Vec2::from_angle(angle) * r);
    }
}

fn emit_ring(ring: &[Point], out: &mut BezPath) {
    let ring = dedup(ring);
    if ring.len() < 2 {
        return;
    }
    out.move_to(ring[0]);
    for p in &ring[1..] {
        out.line_to(*p);
    }
    out.close_path();
}

fn dedup(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().map_or(true, |q| q.distance(*p) > 1e-9) {
            out.push(*p);
        }
    }
    out
}

fn polyline_length(line: &Polyline) -> f64 {
    let open: f64 = line.points.windows(2).map(|w| w[0].distance(w[1])).sum();
    match (line.closed, line.points.first(), line.points.last()) {
        (true, Some(first), Some(last)) => open + first.distance(*last),
        _ => open,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::brush::{BrushTip, ThicknessProfile};
    use kurbo::{PathEl, Shape};

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
        let mut p = BezPath::new();
        p.move_to((x0, y0));
        p.line_to((x1, y1));
        p
    }

    fn with_cap(cap: LineCap) -> BrushProfile {
        BrushProfile {
            cap,
            ..Default::default()
        }
    }

    fn subpaths(p: &BezPath) -> usize {
        p.elements()
            .iter()
            .filter(|e| matches!(e, PathEl::MoveTo(_)))
            .count()
    }

    #[test]
    fn test_move_only_is_empty() {
        let mut p = BezPath::new();
        p.move_to((3.0, 3.0));
        assert!(stroke_to_fill(&p, 4.0, &BrushProfile::default()).is_empty());
        assert!(stroke_to_fill(&line(0.0, 0.0, 10.0, 0.0), 0.0, &BrushProfile::default()).is_empty());
    }

    #[test]
    fn test_butt_and_square_caps() {
        let path = line(0.0, 0.0, 100.0, 0.0);
        let butt = stroke_to_fill(&path, 10.0, &with_cap(LineCap::Butt)).bounding_box();
        assert!((butt.x0 - 0.0).abs() < 1e-9 && (butt.x1 - 100.0).abs() < 1e-9);
        assert!((butt.y0 + 5.0).abs() < 1e-9 && (butt.y1 - 5.0).abs() < 1e-9);
        let square = stroke_to_fill(&path, 10.0, &with_cap(LineCap::Square)).bounding_box();
        assert!((square.x0 + 5.0).abs() < 1e-9 && (square.x1 - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_cap_reaches_radius() {
        let path = line(0.0, 0.0, 100.0, 0.0);
        let round = stroke_to_fill(&path, 10.0, &with_cap(LineCap::Round)).bounding_box();
        assert!((round.x0 + 5.0).abs() < 1e-6);
        assert!((round.x1 - 105.0).abs() < 1e-6);
    }

    #[test]
    fn test_closed_path_has_two_loops() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((50.0, 0.0));
        p.line_to((50.0, 50.0));
        p.line_to((0.0, 50.0));
        p.close_path();
        let out = stroke_to_fill(&p, 4.0, &BrushProfile::default());
        assert_eq!(subpaths(&out), 2);
        let bb = out.bounding_box();
        assert!(bb.x0 < 0.0 && bb.x1 > 50.0);
    }

    #[test]
    fn test_miter_join_corner() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.line_to((50.0, 0.0));
        p.line_to((50.0, 50.0));
        let profile = BrushProfile {
            join: LineJoin::Miter,
            cap: LineCap::Butt,
            ..Default::default()
        };
        let bb = stroke_to_fill(&p, 10.0, &profile).bounding_box();
        // The outer miter corner sits at (55, -5).
        assert!((bb.x1 - 55.0).abs() < 1e-6);
        assert!((bb.y0 + 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_taper_pinches_ends() {
        let path = line(0.0, 0.0, 100.0, 0.0);
        let profile = BrushProfile {
            thickness: ThicknessProfile::TaperBoth(0.25, 0.25),
            cap: LineCap::Butt,
            ..Default::default()
        };
        let outliner = StrokeOutliner::new(&profile, 10.0);
        let flat = flatten_path(&path, FLATNESS_TOLERANCE);
        let samples = outliner.samples(&flat[0], 0.0, 100.0);
        assert_eq!(samples.first().map(|s| s.half_width), Some(0.0));
        assert_eq!(samples.last().map(|s| s.half_width), Some(0.0));
    }

    #[test]
    fn test_curves_sample_adaptively() {
        let mut gentle = BezPath::new();
        gentle.move_to((0.0, 0.0));
        gentle.curve_to((30.0, 1.0), (60.0, 1.0), (90.0, 0.0));
        let mut tight = BezPath::new();
        tight.move_to((0.0, 0.0));
        tight.curve_to((0.0, 90.0), (90.0, 90.0), (90.0, 0.0));
        let profile = BrushProfile::default();
        let a = stroke_to_fill(&gentle, 2.0, &profile).elements().len();
        let b = stroke_to_fill(&tight, 2.0, &profile).elements().len();
        assert!(b > a);
    }

    #[test]
    fn test_calligraphic_tip_thins_along_nib() {
        let profile = BrushProfile {
            tip: BrushTip::calligraphic(0.2, 0.0),
            cap: LineCap::Butt,
            ..Default::default()
        };
        let along = stroke_to_fill(&line(0.0, 0.0, 100.0, 0.0), 10.0, &profile).bounding_box();
        assert!((along.height() - 2.0).abs() < 1e-6);
        let across = stroke_to_fill(&line(0.0, 0.0, 0.0, 100.0), 10.0, &profile).bounding_box();
        assert!((across.width() - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_coarser_tolerance_samples_less() {
        let mut p = BezPath::new();
        p.move_to((0.0, 0.0));
        p.curve_to((0.0, 80.0), (60.0, 80.0), (60.0, 0.0));
        let profile = BrushProfile::default();
        let fine = StrokeOutliner::new(&profile, 6.0).outline(&p);
        let coarse = StrokeOutliner::new(&profile, 6.0)
            .with_tolerance(4.0)
            .outline(&p);
        assert!(coarse.elements().len() < fine.elements().len());
    }
}
