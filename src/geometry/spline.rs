use kurbo::{CubicBez, Point};

/// Catmull-Rom segments over `points`, where the first and last entries are
/// phantom neighbours only: a list of `n` points yields `n - 3` cubics running
/// from `points[1]` to `points[n - 2]`. `tightness` of 0 is a classic
/// Catmull-Rom, 1 collapses the handles into straight lines.
pub fn catmull_rom(points: &[Point], tightness: f64) -> Vec<CubicBez> {
    if points.len() < 4 {
        return vec![];
    }
    let s = 1.0 - tightness;
    points
        .windows(4)
        .map(|w| {
            let (p0, p1, p2, p3) = (w[0], w[1], w[2], w[3]);
            CubicBez::new(
                p1,
                Point::new(
                    p1.x + (s * p2.x - s * p0.x) / 6.0,
                    p1.y + (s * p2.y - s * p0.y) / 6.0,
                ),
                Point::new(
                    p2.x + (s * p1.x - s * p3.x) / 6.0,
                    p2.y + (s * p1.y - s * p3.y) / 6.0,
                ),
                p2,
            )
        })
        .collect()
}

/// Curve passing through every point, end points repeated as their own
/// phantom neighbours.
pub fn through_points(points: &[Point], tightness: f64) -> Vec<CubicBez> {
    match points {
        [] | [_] => vec![],
        [first, .., last] => {
            let mut padded = Vec::with_capacity(points.len() + 2);
            padded.push(*first);
            padded.extend_from_slice(points);
            padded.push(*last);
            catmull_rom(&padded, tightness)
        }
    }
}
