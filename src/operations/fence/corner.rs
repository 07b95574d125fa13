use std::f64::consts::PI;

use crate::math::distance_2d::slope;
use crate::math::Point2;

/// Default turn angle, in degrees, above which a fence vertex gets a fixed via.
pub const DEFAULT_CORNER_TOLERANCE_DEG: f64 = 10.0;

/// Returns the indices of all fixed via positions on an open fence path.
///
/// Index 0 and the last index are always included. An interior vertex is
/// included when the path turns there by more than `tolerance_deg` away from
/// straight. The result is ascending.
#[must_use]
pub fn find_corners(points: &[Point2], tolerance_deg: f64) -> Vec<usize> {
    let n = points.len();
    if n < 2 {
        return (0..n).collect();
    }

    let tolerance = tolerance_deg.to_radians();
    let mut fixed = vec![0];
    for i in 1..n - 1 {
        let prev_slope = slope(&points[i], &points[i - 1]);
        let next_slope = slope(&points[i], &points[i + 1]);
        // Both directions point away from vertex i, so a straight run differs by pi.
        let deviation = (prev_slope - next_slope).abs() - PI;
        if deviation.abs() > tolerance {
            fixed.push(i);
        }
    }
    fixed.push(n - 1);
    fixed
}
