use kurbo::Point;
use std::collections::HashMap;

/// Points within this distance of each other count as the same scribble
/// vertex.
pub const SCRIBBLE_DEDUP_TOLERANCE: f64 = 0.5;

/// Grid bucketing over the plane. Each bucket is `tolerance` wide, so any point
/// within `tolerance` of a query lives in the query's bucket or one of its
/// eight neighbours.
#[derive(Debug, Default, Clone)]
pub struct SpatialHash {
    cell: f64,
    entries: HashMap<(i64, i64), Vec<Point>>,
}

impl SpatialHash {
    pub fn new(tolerance: f64) -> SpatialHash {
        SpatialHash {
            cell: if tolerance > 0.0 { tolerance } else { f64::EPSILON },
            entries: HashMap::new(),
        }
    }

    pub fn bucket_key(&self, p: Point) -> (i64, i64) {
        ((p.x / self.cell).floor() as i64, (p.y / self.cell).floor() as i64)
    }

    /// True when a stored point lies strictly within the tolerance of `p`.
    pub fn contains_near(&self, p: Point) -> bool {
        let (kx, ky) = self.bucket_key(p);
        (-1..=1).any(|dx| {
            (-1..=1).any(|dy| {
                self.entries
                    .get(&(kx + dx, ky + dy))
                    .is_some_and(|bucket| bucket.iter().any(|q| q.distance(p) < self.cell))
            })
        })
    }

    /// Store `p` unless it is a near-duplicate. Returns whether it was stored.
    pub fn insert_unique(&mut self, p: Point) -> bool {
        if self.contains_near(p) {
            return false;
        }
        let key = self.bucket_key(p);
        self.entries.entry(key).or_default().push(p);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Order-preserving near-duplicate removal in one pass.
pub fn dedup_points(points: &[Point], tolerance: f64) -> Vec<Point> {
    let mut hash = SpatialHash::new(tolerance);
    points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite() && hash.insert_unique(*p))
        .collect()
}
