//! Per-shape stroke outlines. Every segment is drawn twice with independent
//! jitter; curves go through jittered point lists joined by Catmull-Rom
//! cubics.
use crate::context::operation::{OpSetKind, Operation, OperationSet};
use crate::geometry::spline::catmull_rom;
use crate::options::RenderOptions;
use crate::sketch::random::Randomizer;
use kurbo::{Point, Vec2};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Angle loops compare against their bound with this much slack so that a
/// last step landing exactly on the bound survives float error.
const ANGLE_EPSILON: f64 = 1e-9;

/// Long lines wobble less: full roughness below 200 units, 40% above 500.
pub fn roughness_gain(length: f64) -> f64 {
    if length < 200.0 {
        1.0
    } else if length > 500.0 {
        0.4
    } else {
        -0.0016668 * length + 1.233334
    }
}

/// One bowed, jittered pass from `p1` to `p2`. The `overlay` pass uses half
/// the jitter of the first.
pub fn line_ops(
    p1: Point,
    p2: Point,
    rng: &mut Randomizer,
    o: &RenderOptions,
    move_to: bool,
    overlay: bool,
) -> Vec<Operation> {
    let length_sq = (p1 - p2).hypot2();
    let length = length_sq.sqrt();
    let gain = roughness_gain(length);

    let mut offset = o.max_randomness_offset;
    if offset * offset * 100.0 > length_sq {
        offset = length / 10.0;
    }
    let half_offset = offset / 2.0;
    let diverge = 0.2 + rng.next() * 0.2;

    let mid_disp = Vec2::new(
        rng.offset_with_gain(
            o.bowing * o.max_randomness_offset * (p2.y - p1.y) / 200.0,
            o,
            gain,
        ),
        rng.offset_with_gain(
            o.bowing * o.max_randomness_offset * (p1.x - p2.x) / 200.0,
            o,
            gain,
        ),
    );

    let jitter = if overlay { half_offset } else { offset };
    let wobble = |rng: &mut Randomizer| {
        let dx = rng.offset_with_gain(jitter, o, gain);
        Vec2::new(dx, rng.offset_with_gain(jitter, o, gain))
    };

    let mut ops = Vec::with_capacity(2);
    if move_to {
        let start = if o.preserve_vertices {
            p1
        } else {
            p1 + wobble(rng)
        };
        ops.push(Operation::Move(start));
    }
    let span = p2 - p1;
    let c1 = p1 + mid_disp + span * diverge + wobble(rng);
    let c2 = p1 + mid_disp + span * (2.0 * diverge) + wobble(rng);
    let end = if o.preserve_vertices {
        p2
    } else {
        p2 + wobble(rng)
    };
    ops.push(Operation::BezierCurveTo(c1, c2, end));
    ops
}

/// The hand-drawn double stroke. Fill lines and outline strokes each have
/// their own switch for dropping the second pass. Zero-length segments draw
/// nothing.
pub fn double_line(
    p1: Point,
    p2: Point,
    rng: &mut Randomizer,
    o: &RenderOptions,
    filling: bool,
) -> Vec<Operation> {
    if (p2 - p1).hypot2() == 0.0 || !p1.is_finite() || !p2.is_finite() {
        tracing::trace!(?p1, ?p2, "skipping degenerate segment");
        return vec![];
    }
    let single = if filling {
        o.disable_multi_stroke_fill
    } else {
        o.disable_multi_stroke
    };
    let mut ops = line_ops(p1, p2, rng, o, true, false);
    if !single {
        ops.extend(line_ops(p1, p2, rng, o, true, true));
    }
    ops
}

pub fn line(p1: Point, p2: Point, rng: &mut Randomizer, o: &RenderOptions) -> OperationSet {
    OperationSet::new(OpSetKind::StrokePath, double_line(p1, p2, rng, o, false))
}

/// Doubled edges through `points`, plus the closing edge when `close` is
/// set. Two points are a plain line; fewer draw nothing.
pub fn linear_path(
    points: &[Point],
    close: bool,
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> OperationSet {
    match points.len() {
        0 | 1 => OperationSet::new(OpSetKind::StrokePath, vec![]),
        2 => line(points[0], points[1], rng, o),
        len => {
            let mut ops = vec![];
            for pair in points.windows(2) {
                ops.extend(double_line(pair[0], pair[1], rng, o, false));
            }
            if close {
                ops.extend(double_line(points[len - 1], points[0], rng, o, false));
            }
            OperationSet::new(OpSetKind::StrokePath, ops)
        }
    }
}

pub fn polygon(points: &[Point], rng: &mut Randomizer, o: &RenderOptions) -> OperationSet {
    linear_path(points, true, rng, o)
}

/// Corners of an axis-aligned rectangle, clockwise from `(x, y)`.
pub fn rectangle_points(x: f64, y: f64, width: f64, height: f64) -> Vec<Point> {
    vec![
        Point::new(x, y),
        Point::new(x + width, y),
        Point::new(x + width, y + height),
        Point::new(x, y + height),
    ]
}

pub fn rectangle(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> OperationSet {
    polygon(&rectangle_points(x, y, width, height), rng, o)
}

/// Sampling step and (jittered) radii shared by an ellipse's stroke and its
/// solid fill, so both trace the same wobble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseParams {
    pub increment: f64,
    pub rx: f64,
    pub ry: f64,
}

/// More samples for bigger ellipses: the step count grows with the square
/// root of the perimeter estimate.
pub fn ellipse_params(
    width: f64,
    height: f64,
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> EllipseParams {
    let psq = (TAU * (((width / 2.0).powi(2) + (height / 2.0).powi(2)) / 2.0).sqrt()).sqrt();
    let steps = o.curve_step_count.max(1) as f64;
    let step_count = steps.max(steps / 200f64.sqrt() * psq).ceil();
    let increment = TAU / step_count;

    let mut rx = (width / 2.0).abs();
    let mut ry = (height / 2.0).abs();
    let fit_randomness = 1.0 - o.curve_fitting;
    rx += rng.offset(rx * fit_randomness, o);
    ry += rng.offset(ry * fit_randomness, o);
    EllipseParams { increment, rx, ry }
}

/// An ellipse outline plus the un-overlapped sample points, which the
/// pattern fills use as the ellipse's polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipseResult {
    pub opset: OperationSet,
    pub estimated_points: Vec<Point>,
}

fn ellipse_point(center: Point, rx: f64, ry: f64, angle: f64) -> Point {
    center + Vec2::new(rx * angle.cos(), ry * angle.sin())
}

/// Returns `(all_points, core_points)`. The jittered variant starts a bit
/// inside the ellipse and overshoots the start by `overlap`, which gives the
/// loose closing loop of a hand-drawn circle.
fn ellipse_points(
    increment: f64,
    center: Point,
    rx: f64,
    ry: f64,
    offset: f64,
    overlap: f64,
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> (Vec<Point>, Vec<Point>) {
    let mut core = vec![];
    let mut all = vec![];
    if o.roughness == 0.0 {
        let increment = increment / 4.0;
        all.push(ellipse_point(center, rx, ry, -increment));
        let mut i = 0u32;
        loop {
            let angle = i as f64 * increment;
            if angle > TAU + ANGLE_EPSILON {
                break;
            }
            let p = ellipse_point(center, rx, ry, angle);
            core.push(p);
            all.push(p);
            i += 1;
        }
        all.push(ellipse_point(center, rx, ry, 0.0));
        all.push(ellipse_point(center, rx, ry, increment));
    } else {
        let rad_offset = rng.offset(0.5, o) - FRAC_PI_2;
        let jittered = |rng: &mut Randomizer, scale: f64, angle: f64| {
            let dx = rng.offset(offset, o);
            let dy = rng.offset(offset, o);
            ellipse_point(center, scale * rx, scale * ry, angle) + Vec2::new(dx, dy)
        };
        all.push(jittered(rng, 0.9, rad_offset - increment));
        let end_angle = TAU + rad_offset - 0.01;
        let mut i = 0u32;
        loop {
            let angle = rad_offset + i as f64 * increment;
            if angle >= end_angle {
                break;
            }
            let p = jittered(rng, 1.0, angle);
            core.push(p);
            all.push(p);
            i += 1;
        }
        all.push(jittered(rng, 1.0, rad_offset + TAU + overlap * 0.5));
        all.push(jittered(rng, 0.98, rad_offset + overlap));
        all.push(jittered(rng, 0.9, rad_offset + overlap * 0.5));
    }
    (all, core)
}

pub fn ellipse_with_params(
    center: Point,
    params: &EllipseParams,
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> EllipseResult {
    let finite = [params.increment, params.rx, params.ry, center.x, center.y];
    if params.increment <= 0.0 || finite.iter().any(|v| !v.is_finite()) {
        tracing::trace!(?params, "skipping degenerate ellipse");
        return EllipseResult {
            opset: OperationSet::new(OpSetKind::StrokePath, vec![]),
            estimated_points: vec![],
        };
    }
    let inner = rng.offset_in_range(0.4, 1.0);
    let overlap = params.increment * rng.offset_in_range(0.1, inner);
    let (all, core) = ellipse_points(
        params.increment,
        center,
        params.rx,
        params.ry,
        1.0,
        overlap,
        rng,
        o,
    );
    let mut ops = curve_ops(&all, None, rng, o);
    if !o.disable_multi_stroke && o.roughness != 0.0 {
        let (second, _) = ellipse_points(
            params.increment,
            center,
            params.rx,
            params.ry,
            1.5,
            0.0,
            rng,
            o,
        );
        ops.extend(curve_ops(&second, None, rng, o));
    }
    EllipseResult {
        opset: OperationSet::new(OpSetKind::StrokePath, ops),
        estimated_points: core,
    }
}

pub fn ellipse(
    center: Point,
    width: f64,
    height: f64,
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> EllipseResult {
    let params = ellipse_params(width, height, rng, o);
    ellipse_with_params(center, &params, rng, o)
}

/// Start and stop pulled into `[0, 2π)` territory; a sweep longer than a full
/// turn becomes exactly one turn.
fn normalize_arc(start: f64, stop: f64) -> (f64, f64) {
    let turns = if start < 0.0 {
        (-start / TAU).ceil()
    } else {
        0.0
    };
    let (start, stop) = (start + turns * TAU, stop + turns * TAU);
    if stop - start > TAU {
        (0.0, TAU)
    } else {
        (start, stop)
    }
}

/// Jittered radii used by both the arc stroke and its pattern fill.
fn arc_radii(width: f64, height: f64, rng: &mut Randomizer, o: &RenderOptions) -> (f64, f64) {
    let mut rx = (width / 2.0).abs();
    let mut ry = (height / 2.0).abs();
    rx += rng.offset(rx * 0.01, o);
    ry += rng.offset(ry * 0.01, o);
    (rx, ry)
}

fn arc_pass(
    increment: f64,
    center: Point,
    rx: f64,
    ry: f64,
    start: f64,
    stop: f64,
    offset: f64,
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> Vec<Operation> {
    let rad_offset = start + rng.offset(0.1, o);
    let jittered = |rng: &mut Randomizer, scale: f64, angle: f64| {
        let dx = rng.offset(offset, o);
        let dy = rng.offset(offset, o);
        ellipse_point(center, scale * rx, scale * ry, angle) + Vec2::new(dx, dy)
    };
    let mut points = vec![jittered(rng, 0.9, rad_offset - increment)];
    let mut i = 0u32;
    loop {
        let angle = rad_offset + i as f64 * increment;
        if angle > stop + ANGLE_EPSILON {
            break;
        }
        points.push(jittered(rng, 1.0, angle));
        i += 1;
    }
    let end = ellipse_point(center, rx, ry, stop);
    points.push(end);
    points.push(end);
    curve_ops(&points, None, rng, o)
}

/// Partial ellipse centered on `center` from `start` to `stop` (radians).
/// A closed arc gets its two radii drawn back to the center: doubled and
/// jittered with `rough_closure`, plain otherwise.
pub fn arc(
    center: Point,
    width: f64,
    height: f64,
    start: f64,
    stop: f64,
    closed: bool,
    rough_closure: bool,
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> OperationSet {
    if !(start.is_finite() && stop.is_finite()) {
        return OperationSet::new(OpSetKind::StrokePath, vec![]);
    }
    let (rx, ry) = arc_radii(width, height, rng, o);
    let (start, stop) = normalize_arc(start, stop);
    let ellipse_inc = TAU / o.curve_step_count.max(1) as f64;
    let arc_inc = (ellipse_inc / 2.0).min((stop - start) / 2.0);
    if arc_inc <= 0.0 {
        tracing::trace!(start, stop, "skipping empty arc");
        return OperationSet::new(OpSetKind::StrokePath, vec![]);
    }

    let mut ops = arc_pass(arc_inc, center, rx, ry, start, stop, 1.0, rng, o);
    if !o.disable_multi_stroke {
        ops.extend(arc_pass(arc_inc, center, rx, ry, start, stop, 1.5, rng, o));
    }
    if closed {
        let from = ellipse_point(center, rx, ry, start);
        let to = ellipse_point(center, rx, ry, stop);
        if rough_closure {
            ops.extend(double_line(center, from, rng, o, false));
            ops.extend(double_line(center, to, rng, o, false));
        } else {
            ops.push(Operation::LineTo(center));
            ops.push(Operation::LineTo(from));
        }
    }
    OperationSet::new(OpSetKind::StrokePath, ops)
}

/// Polygon of a closed arc for pattern fills: samples along the sweep, the
/// stop point and the center.
pub fn arc_fill_points(
    center: Point,
    width: f64,
    height: f64,
    start: f64,
    stop: f64,
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> Vec<Point> {
    if !(start.is_finite() && stop.is_finite()) {
        return vec![];
    }
    let (rx, ry) = arc_radii(width, height, rng, o);
    let (start, stop) = normalize_arc(start, stop);
    let increment = (stop - start) / o.curve_step_count.max(1) as f64;
    if increment <= 0.0 {
        return vec![];
    }
    let mut points: Vec<Point> = (0..=o.curve_step_count.max(1))
        .map(|i| start + i as f64 * increment)
        .filter(|angle| *angle <= stop + ANGLE_EPSILON)
        .map(|angle| ellipse_point(center, rx, ry, angle))
        .collect();
    points.push(ellipse_point(center, rx, ry, stop));
    points.push(center);
    points
}

/// Cubic chain through `points`, whose first and last entries only steer the
/// end tangents. Three points give a single cubic, two a plain line pass.
pub fn curve_ops(
    points: &[Point],
    close_point: Option<Point>,
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> Vec<Operation> {
    match points.len() {
        0 | 1 => vec![],
        2 => line_ops(points[0], points[1], rng, o, true, true),
        3 => vec![
            Operation::Move(points[1]),
            Operation::BezierCurveTo(points[1], points[2], points[2]),
        ],
        _ => {
            let mut ops = vec![Operation::Move(points[1])];
            ops.extend(
                catmull_rom(points, o.curve_tightness)
                    .into_iter()
                    .map(|c| Operation::BezierCurveTo(c.p1, c.p2, c.p3)),
            );
            if let Some(p) = close_point {
                let ro = o.max_randomness_offset;
                let dx = rng.offset(ro, o);
                let dy = rng.offset(ro, o);
                ops.push(Operation::LineTo(p + Vec2::new(dx, dy)));
            }
            ops
        }
    }
}

/// Every point jittered by `offset`, with the ends doubled up so the curve
/// passes through them.
fn curve_with_offset(
    points: &[Point],
    offset: f64,
    rng: &mut Randomizer,
    o: &RenderOptions,
) -> Vec<Operation> {
    let (first, rest) = match points.split_first() {
        Some(split) => split,
        None => return vec![],
    };
    let jitter = |rng: &mut Randomizer, p: Point| {
        let dx = rng.offset(offset, o);
        p + Vec2::new(dx, rng.offset(offset, o))
    };
    let mut ps = vec![jitter(rng, *first), jitter(rng, *first)];
    for (i, p) in rest.iter().enumerate() {
        ps.push(jitter(rng, *p));
        if i == rest.len() - 1 {
            ps.push(jitter(rng, *p));
        }
    }
    curve_ops(&ps, None, rng, o)
}

/// Smooth sketchy curve through `points`.
pub fn curve(points: &[Point], rng: &mut Randomizer, o: &RenderOptions) -> OperationSet {
    let mut ops = curve_with_offset(points, 1.0 + o.roughness * 0.2, rng, o);
    if !o.disable_multi_stroke {
        ops.extend(curve_with_offset(
            points,
            1.5 * (1.0 + o.roughness * 0.22),
            rng,
            o,
        ));
    }
    OperationSet::new(OpSetKind::StrokePath, ops)
}
