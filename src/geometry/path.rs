use crate::math::distance_2d::line_length;
use crate::math::Point2;

/// A straight-segment polyline in board coordinates.
///
/// For closed paths the last vertex connects back to the first; the first
/// vertex is not repeated at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub points: Vec<Point2>,
    pub closed: bool,
}

impl Path {
    /// Creates an open path through `points`.
    #[must_use]
    pub fn open(points: Vec<Point2>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    /// Creates a closed path (polygon ring) through `points`.
    #[must_use]
    pub fn closed(points: Vec<Point2>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    /// Returns the number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the path has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the number of segments in this path.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        let n = self.points.len();
        if n < 2 {
            return 0;
        }
        if self.closed {
            n
        } else {
            n - 1
        }
    }

    /// Returns the vertex indices `(i, j)` of segment `i`, wrapping for closed paths.
    #[must_use]
    pub fn segment_indices(&self, i: usize) -> (usize, usize) {
        (i, (i + 1) % self.points.len())
    }

    /// Returns the total length of all segments.
    #[must_use]
    pub fn length(&self) -> f64 {
        (0..self.segment_count())
            .map(|i| {
                let (a, b) = self.segment_indices(i);
                line_length(&self.points[a], &self.points[b])
            })
            .sum()
    }

    /// Returns the vertex list of a closed path with the first vertex repeated at
    /// the end, so it can be walked as an open path returning to its start.
    #[must_use]
    pub fn unrolled(&self) -> Vec<Point2> {
        let mut pts = self.points.clone();
        if self.closed {
            if let Some(first) = self.points.first() {
                pts.push(*first);
            }
        }
        pts
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn square() -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ]
    }

    #[test]
    fn open_and_closed_segment_counts() {
        assert_eq!(Path::open(square()).segment_count(), 3);
        assert_eq!(Path::closed(square()).segment_count(), 4);
    }

    #[test]
    fn segment_count_single_vertex() {
        assert_eq!(Path::closed(vec![Point2::new(1.0, 1.0)]).segment_count(), 0);
    }

    #[test]
    fn closing_segment_wraps() {
        let ring = Path::closed(square());
        assert_eq!(ring.segment_indices(3), (3, 0));
    }

    #[test]
    fn lengths() {
        assert_relative_eq!(Path::open(square()).length(), 6.0);
        assert_relative_eq!(Path::closed(square()).length(), 8.0);
    }

    #[test]
    fn unrolled_repeats_start_only_when_closed() {
        assert_eq!(Path::closed(square()).unrolled().len(), 5);
        assert_eq!(Path::open(square()).unrolled().len(), 4);
    }
}
