//! Adaptive flattening: curves are split until their control points sit within
//! [`FLATNESS_TOLERANCE`] of the chord, so nearly straight curves cost a
//! single segment and tight ones get as many as they need.
use kurbo::{BezPath, CubicBez, Line, ParamCurve, PathEl, Point};

/// Maximum control-point deviation from the chord, in drawing units.
pub const FLATNESS_TOLERANCE: f64 = 0.25;

/// Hard cap on recursion: at most 2^10 pieces per curve.
pub const MAX_SUBDIVISION_DEPTH: u32 = 10;

/// Largest distance of either control point from the chord `p0-p3`.
pub fn cubic_flatness(c: &CubicBez) -> f64 {
    let chord = Line::new(c.p0, c.p3);
    let len = chord.p0.distance(chord.p1);
    if len < 1e-12 {
        return c.p0.distance(c.p1).max(c.p0.distance(c.p2));
    }
    let dir = (chord.p1 - chord.p0) / len;
    let off = |p: Point| (p - chord.p0).cross(dir).abs();
    off(c.p1).max(off(c.p2))
}

/// Push the flattened points of `c` onto `out`, start point excluded.
pub fn flatten_cubic(c: &CubicBez, tolerance: f64, out: &mut Vec<Point>) {
    subdivide(c, tolerance.max(1e-6), 0, out);
}

fn subdivide(c: &CubicBez, tolerance: f64, depth: u32, out: &mut Vec<Point>) {
    if depth >= MAX_SUBDIVISION_DEPTH || cubic_flatness(c) <= tolerance {
        out.push(c.p3);
        return;
    }
    let (left, right) = c.subdivide();
    subdivide(&left, tolerance, depth + 1, out);
    subdivide(&right, tolerance, depth + 1, out);
}

/// A flattened subpath.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Point>,
    pub closed: bool,
}

/// Flatten every subpath of `path`. Subpaths with a single point are dropped.
pub fn flatten_path(path: &BezPath, tolerance: f64) -> Vec<Polyline> {
    let mut out = vec![];
    let mut current: Vec<Point> = vec![];
    let mut closed = false;
    let mut last = Point::ZERO;
    let flush = |current: &mut Vec<Point>, closed: bool, out: &mut Vec<Polyline>| {
        if current.len() > 1 {
            out.push(Polyline {
                points: std::mem::take(current),
                closed,
            });
        } else {
            current.clear();
        }
    };
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                flush(&mut current, closed, &mut out);
                closed = false;
                current.push(p);
                last = p;
            }
            PathEl::LineTo(p) => {
                if current.is_empty() {
                    current.push(last);
                }
                current.push(p);
                last = p;
            }
            PathEl::QuadTo(p1, p2) => {
                if current.is_empty() {
                    current.push(last);
                }
                let q = kurbo::QuadBez::new(last, p1, p2);
                flatten_cubic(&q.raise(), tolerance, &mut current);
                last = p2;
            }
            PathEl::CurveTo(p1, p2, p3) => {
                if current.is_empty() {
                    current.push(last);
                }
                flatten_cubic(&CubicBez::new(last, p1, p2, p3), tolerance, &mut current);
                last = p3;
            }
            PathEl::ClosePath => {
                closed = true;
                if let Some(first) = current.first().copied() {
                    last = first;
                }
                flush(&mut current, closed, &mut out);
                closed = false;
            }
        }
    }
    flush(&mut current, closed, &mut out);
    out
}

/// Flattened subpaths as fill rings. Every subpath counts as closed.
pub fn path_rings(path: &BezPath) -> Vec<Vec<Point>> {
    flatten_path(path, FLATNESS_TOLERANCE)
        .into_iter()
        .map(|p| super::clean_ring(&p.points))
        .filter(|r| r.len() > 2)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_straight_cubic_is_one_segment() {
        let c = CubicBez::new((0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0));
        let mut out = vec![];
        flatten_cubic(&c, FLATNESS_TOLERANCE, &mut out);
        assert_eq!(out, vec![Point::new(30.0, 0.0)]);
    }

    #[test]
    fn test_tolerance_pins_point_count() {
        assert_eq!(FLATNESS_TOLERANCE, 0.25);
        let c = CubicBez::new((0.0, 0.0), (0.0, 20.0), (10.0, 20.0), (10.0, 0.0));
        let mut out = vec![];
        flatten_cubic(&c, FLATNESS_TOLERANCE, &mut out);
        assert_eq!(out.len(), 10);
        assert_eq!(out[9], Point::new(10.0, 0.0));
        let mut coarse = vec![];
        flatten_cubic(&c, 0.3, &mut coarse);
        assert_eq!(coarse.len(), 8);
    }

    #[test]
    fn test_curvier_needs_more() {
        let gentle = CubicBez::new((0.0, 0.0), (10.0, 2.0), (20.0, 2.0), (30.0, 0.0));
        let tight = CubicBez::new((0.0, 0.0), (0.0, 80.0), (30.0, 80.0), (30.0, 0.0));
        let (mut a, mut b) = (vec![], vec![]);
        flatten_cubic(&gentle, FLATNESS_TOLERANCE, &mut a);
        flatten_cubic(&tight, FLATNESS_TOLERANCE, &mut b);
        assert!(b.len() > a.len());
        assert!(b.len() <= 1 << MAX_SUBDIVISION_DEPTH);
        assert_eq!(*b.last().expect("non-empty"), Point::new(30.0, 0.0));
    }

    #[test]
    fn test_flatten_path_subpaths() {
        let path = BezPath::from_svg("M0 0 L10 0 L10 10 Z M20 20 Q30 40 40 20").expect("valid");
        let lines = flatten_path(&path, FLATNESS_TOLERANCE);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].closed);
        assert!(!lines[1].closed);
        assert_eq!(path_rings(&path).len(), 2);
    }
}
