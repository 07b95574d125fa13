use nalgebra::Isometry2;

use super::{Point2, Vector2};

/// Computes the signed area of a closed polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns the distance travelled along the path at each vertex.
///
/// The first entry is always `0.0`; the last is the total path length.
#[must_use]
pub fn cumulative_lengths(points: &[Point2]) -> Vec<f64> {
    let mut sums = Vec::with_capacity(points.len());
    let mut total = 0.0;
    let mut previous = points.first();
    for pt in points {
        if let Some(prev) = previous {
            total += (pt - prev).norm();
        }
        sums.push(total);
        previous = Some(pt);
    }
    sums
}

/// Returns the vertices from `start` to `end` (inclusive), walking forward only.
///
/// When `end < start` the walk wraps around the end of `points`, so a closed
/// polygon is traversed the long way instead of being reversed.
#[must_use]
pub fn sub_path(points: &[Point2], start: usize, end: usize) -> Vec<Point2> {
    let n = points.len();
    if n == 0 {
        return Vec::new();
    }
    let end = if end < start { end + n } else { end };
    (start..=end).map(|i| points[i % n]).collect()
}

/// Drops consecutive vertices closer than `tolerance` to their predecessor.
#[must_use]
pub fn dedup_consecutive(points: &[Point2], tolerance: f64) -> Vec<Point2> {
    let mut out: Vec<Point2> = Vec::with_capacity(points.len());
    for pt in points {
        match out.last() {
            Some(last) if (pt - last).norm() <= tolerance => {}
            _ => out.push(*pt),
        }
    }
    out
}

/// Rotates `local` points by `angle` about the origin, then moves them to `origin`.
#[must_use]
pub fn place_local(local: &[Point2], origin: &Point2, angle: f64) -> Vec<Point2> {
    let iso = Isometry2::new(Vector2::new(origin.x, origin.y), angle);
    local.iter().map(|pt| iso.transform_point(pt)).collect()
}
