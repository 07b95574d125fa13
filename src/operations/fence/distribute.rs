use crate::error::Result;
use crate::math::interpolate::PathInterpolator;
use crate::math::polygon_2d::{cumulative_lengths, dedup_consecutive};
use crate::math::{Point2, TOLERANCE};

/// Slack added to `length / pitch` before rounding down, so a run that is a
/// whole number of pitches long up to float noise keeps its last interval.
const RATIO_EPSILON: f64 = 1e-9;

/// Places evenly spaced points strictly between the ends of `points`.
///
/// The run of length `L` gets `floor(L / pitch) - 1` points at equal arc-length
/// spacing `L / floor(L / pitch)`. The spacing is at most `pitch` when `L` is a
/// multiple of it and always below `2 * pitch`. The end vertices are not
/// returned. Runs shorter than one pitch, or that collapse to a single point
/// once zero-length segments are removed, yield nothing.
///
/// # Errors
///
/// Returns `OperationError::InvalidInput` if the arc-length interpolant cannot
/// be built.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn distribute(points: &[Point2], pitch: f64) -> Result<Vec<Point2>> {
    let path = dedup_consecutive(points, TOLERANCE);
    if path.len() < 2 {
        if !points.is_empty() {
            tracing::warn!(vertices = points.len(), "fence run collapsed to a point");
        }
        return Ok(Vec::new());
    }

    let distances = cumulative_lengths(&path);
    let total = distances[distances.len() - 1];
    let count = (total / pitch + RATIO_EPSILON).floor() as usize;
    if count < 1 {
        return Ok(Vec::new());
    }

    let spacing = total / count as f64;
    let interpolator = PathInterpolator::new(&distances, &path)?;
    Ok((1..count)
        .map(|k| interpolator.at(k as f64 * spacing))
        .collect())
}
