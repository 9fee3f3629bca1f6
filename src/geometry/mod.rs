use geo::{Area, BoundingRect, Centroid, Rotate};
use geo_types::{Coord, LineString, MultiLineString, MultiPolygon, Polygon};
use kurbo::{Point, Rect};

/// Brush tips, thickness profiles, caps and joins.
pub mod brush;

/// Adaptive curve flattening shared by the path fills and the outline
/// converter.
pub mod flatten;

/// Fill patterns! One filler per fill style, all driven off the same
/// scan-line core.
pub mod hatch;

/// Shape descriptors, canvas sizes and the glyph collaborator.
pub mod shapes;

/// Grid bucketing for near-duplicate point removal.
pub mod spatial_hash;

/// Catmull-Rom curves through point lists.
pub mod spline;

/// Converts a centerline plus a brush into a filled outline.
pub mod stroke;

/// SVG path data in and out.
pub mod svg;

/// Conversions between the kurbo points the operations use and the geo
/// coordinates the geometry algorithms use.
pub trait ToCoord {
    fn to_coord(&self) -> Coord<f64>;
}

impl ToCoord for Point {
    fn to_coord(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }
}

pub fn to_point(c: Coord<f64>) -> Point {
    Point::new(c.x, c.y)
}

/// A closed ring as a geo polygon. Rings with fewer than three points are not
/// polygons.
pub fn ring_polygon(ring: &[Point]) -> Option<Polygon<f64>> {
    if ring.len() < 3 {
        return None;
    }
    let exterior: LineString<f64> = ring.iter().map(ToCoord::to_coord).collect();
    Some(Polygon::new(exterior, vec![]))
}

fn rings_multipolygon(rings: &[Vec<Point>]) -> MultiPolygon<f64> {
    MultiPolygon::new(rings.iter().filter_map(|r| ring_polygon(r)).collect())
}

/// Summed unsigned area of every ring.
pub fn rings_area(rings: &[Vec<Point>]) -> f64 {
    rings_multipolygon(rings).unsigned_area()
}

/// Centroid of the rings. Zero-area input falls back to the centroid of the
/// vertices; empty input has none.
pub fn rings_centroid(rings: &[Vec<Point>]) -> Option<Point> {
    if let Some(c) = rings_multipolygon(rings).centroid() {
        return Some(Point::new(c.x(), c.y()));
    }
    let all: Vec<Point> = rings.iter().flatten().copied().collect();
    if all.is_empty() {
        return None;
    }
    let n = all.len() as f64;
    let (sx, sy) = all.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(Point::new(sx / n, sy / n))
}

pub fn rings_bounds(rings: &[Vec<Point>]) -> Option<Rect> {
    let lines = MultiLineString::new(
        rings
            .iter()
            .map(|r| r.iter().map(ToCoord::to_coord).collect::<LineString<f64>>())
            .collect(),
    );
    lines
        .bounding_rect()
        .map(|r| Rect::new(r.min().x, r.min().y, r.max().x, r.max().y))
}

/// Rotate every ring by `degrees` about `center`.
pub fn rotate_rings(rings: &[Vec<Point>], center: Point, degrees: f64) -> Vec<Vec<Point>> {
    if degrees == 0.0 {
        return rings.to_vec();
    }
    let pivot = geo_types::Point::new(center.x, center.y);
    rings
        .iter()
        .map(|ring| {
            let ls: LineString<f64> = ring.iter().map(ToCoord::to_coord).collect();
            ls.rotate_around_point(degrees, pivot)
                .0
                .into_iter()
                .map(to_point)
                .collect()
        })
        .collect()
}

/// Rotate a list of segments by `degrees` about `center`.
pub fn rotate_segments(
    segments: &[(Point, Point)],
    center: Point,
    degrees: f64,
) -> Vec<(Point, Point)> {
    if degrees == 0.0 {
        return segments.to_vec();
    }
    let pivot = geo_types::Point::new(center.x, center.y);
    let mls = MultiLineString::new(
        segments
            .iter()
            .map(|(a, b)| LineString::new(vec![a.to_coord(), b.to_coord()]))
            .collect(),
    );
    mls.rotate_around_point(degrees, pivot)
        .0
        .into_iter()
        .filter_map(|ls| match ls.0.as_slice() {
            [a, b] => Some((to_point(*a), to_point(*b))),
            _ => None,
        })
        .collect()
}

/// Intersection point of the segments `a1-a2` and `b1-b2`, if they cross.
/// Parallel and collinear segments report no intersection.
pub fn segment_intersection(a1: Point, a2: Point, b1: Point, b2: Point) -> Option<Point> {
    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.cross(s);
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let qp = b1 - a1;
    let t = qp.cross(s) / denom;
    let u = qp.cross(r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a1 + r * t)
    } else {
        None
    }
}

/// Drop consecutive duplicate points and a closing point equal to the first.
pub fn clean_ring(ring: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(ring.len());
    for p in ring {
        if !p.x.is_finite() || !p.y.is_finite() {
            continue;
        }
        if out.last().map_or(true, |last| last.distance(*p) > 1e-9) {
            out.push(*p);
        }
    }
    while out.len() > 1 && out[0].distance(out[out.len() - 1]) <= 1e-9 {
        out.pop();
    }
    out
}
