use super::Point2;
use crate::error::{OperationError, Result};

/// Piecewise-linear interpolant over a strictly increasing domain.
///
/// Queries outside the domain extrapolate along the first or last interval.
#[derive(Debug, Clone)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    slopes: Vec<f64>,
}

impl LinearInterpolator {
    /// Builds an interpolant through the samples `(xs[i], ys[i])`.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if the sample lists differ in
    /// length, hold fewer than 2 samples, or `xs` is not strictly increasing.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(OperationError::InvalidInput(format!(
                "interpolation domain has {} samples but range has {}",
                xs.len(),
                ys.len()
            ))
            .into());
        }
        if xs.len() < 2 {
            return Err(OperationError::InvalidInput(
                "at least 2 samples are required for interpolation".to_owned(),
            )
            .into());
        }
        if xs.windows(2).any(|w| w[1] - w[0] <= 0.0) {
            return Err(OperationError::InvalidInput(
                "interpolation domain must be strictly increasing".to_owned(),
            )
            .into());
        }

        let slopes = xs
            .windows(2)
            .zip(ys.windows(2))
            .map(|(x, y)| (y[1] - y[0]) / (x[1] - x[0]))
            .collect();

        Ok(Self { xs, ys, slopes })
    }

    /// Evaluates the interpolant at `x`.
    #[must_use]
    pub fn at(&self, x: f64) -> f64 {
        // Interval whose left end is the last sample strictly below `x`.
        let i = self
            .xs
            .partition_point(|&v| v < x)
            .saturating_sub(1)
            .min(self.slopes.len() - 1);
        self.ys[i] + self.slopes[i] * (x - self.xs[i])
    }
}

/// Maps an arc-length parameter to a position along a polyline.
#[derive(Debug, Clone)]
pub struct PathInterpolator {
    x: LinearInterpolator,
    y: LinearInterpolator,
}

impl PathInterpolator {
    /// Builds an interpolator from the parameter value `t[i]` of each vertex.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidInput` if `t` is not strictly increasing
    /// or does not match the vertex count.
    pub fn new(t: &[f64], path: &[Point2]) -> Result<Self> {
        let x = LinearInterpolator::new(t.to_vec(), path.iter().map(|p| p.x).collect())?;
        let y = LinearInterpolator::new(t.to_vec(), path.iter().map(|p| p.y).collect())?;
        Ok(Self { x, y })
    }

    /// Returns the point at parameter `t`.
    #[must_use]
    pub fn at(&self, t: f64) -> Point2 {
        Point2::new(self.x.at(t), self.y.at(t))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn linear_between_samples() {
        let f = LinearInterpolator::new(vec![0.0, 10.0, 20.0], vec![0.0, 100.0, 0.0]).unwrap();
        assert_relative_eq!(f.at(5.0), 50.0);
        assert_relative_eq!(f.at(15.0), 50.0);
    }

    #[test]
    fn linear_hits_samples_exactly() {
        let f = LinearInterpolator::new(vec![0.0, 10.0, 20.0], vec![1.0, 2.0, 4.0]).unwrap();
        assert_relative_eq!(f.at(0.0), 1.0);
        assert_relative_eq!(f.at(10.0), 2.0);
        assert_relative_eq!(f.at(20.0), 4.0);
    }

    #[test]
    fn linear_rejects_non_increasing_domain() {
        assert!(LinearInterpolator::new(vec![0.0, 1.0, 1.0], vec![0.0, 1.0, 2.0]).is_err());
        assert!(LinearInterpolator::new(vec![0.0, 2.0, 1.0], vec![0.0, 1.0, 2.0]).is_err());
    }

    #[test]
    fn linear_rejects_single_sample() {
        assert!(LinearInterpolator::new(vec![0.0], vec![0.0]).is_err());
    }

    #[test]
    fn path_follows_corner() {
        let path = [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(10.0, 10.0)];
        let interp = PathInterpolator::new(&[0.0, 10.0, 20.0], &path).unwrap();
        let q = interp.at(15.0);
        assert_relative_eq!(q.x, 10.0);
        assert_relative_eq!(q.y, 5.0);
    }
}
