use super::{Point2, TOLERANCE};

/// Returns the Euclidean length of the segment from `a` to `b`.
#[must_use]
pub fn line_length(a: &Point2, b: &Point2) -> f64 {
    (b - a).norm()
}

/// Returns the direction angle of the segment from `a` to `b`, as `atan2(dy, dx)`.
#[must_use]
pub fn slope(a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    d.y.atan2(d.x)
}

/// Returns the minimum distance from `p` to the line segment from `a` to `b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < TOLERANCE * TOLERANCE {
        // Degenerate segment (zero length).
        return (p - a).norm();
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    let closest = a + d * t;

    (p - closest).norm()
}

/// Checks whether `p` lies on the segment from `a` to `b`.
///
/// The point must be within `tolerance` of the supporting line and inside the
/// segment's bounding box grown by `tolerance`. With `tolerance = 0` this is the
/// exact zero-cross-product test.
#[must_use]
pub fn is_point_on_segment(p: &Point2, a: &Point2, b: &Point2, tolerance: f64) -> bool {
    let within_box = p.x >= a.x.min(b.x) - tolerance
        && p.x <= a.x.max(b.x) + tolerance
        && p.y >= a.y.min(b.y) - tolerance
        && p.y <= a.y.max(b.y) + tolerance;
    if !within_box {
        return false;
    }

    let d = b - a;
    let len = d.norm();
    if len < TOLERANCE {
        return (p - a).norm() <= tolerance;
    }

    let cross = d.x * (p.y - a.y) - d.y * (p.x - a.x);
    (cross / len).abs() <= tolerance
}

/// Returns the minimum distance from `p` to any segment of an open polyline.
#[must_use]
pub fn point_to_polyline_dist(p: &Point2, points: &[Point2]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (p - only).norm(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(p, &w[0], &w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}
