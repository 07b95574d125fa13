use std::collections::HashMap;

use crate::geometry::{BoardPoint, Track, TrackSet};
use crate::math::distance_2d::{is_point_on_segment, slope};
use crate::math::{Point2, TOLERANCE};

/// A free track end: an endpoint no other track connects to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leaf {
    pub position: Point2,
    /// Direction in which the track runs out through this end, as `atan2(dy, dx)`.
    pub angle: f64,
}

/// Finds the free ends of a track set.
///
/// An endpoint is a leaf when its exact coordinate occurs once among all track
/// endpoints and it does not touch the body of any track. Ends sitting on
/// another track's vertex or segment (T-junctions) count as connected.
#[must_use]
pub fn find_leaves(tracks: &TrackSet) -> Vec<Leaf> {
    let mut endpoint_degree: HashMap<BoardPoint, usize> = HashMap::new();
    for (first, last) in tracks.tracks().iter().filter_map(Track::endpoints) {
        *endpoint_degree.entry(first).or_default() += 1;
        *endpoint_degree.entry(last).or_default() += 1;
    }

    let mut leaves = Vec::new();
    for (index, track) in tracks.tracks().iter().enumerate() {
        let n = track.points.len();
        let (Some(head_neighbor), Some(tail_neighbor)) =
            (first_distinct(track), last_distinct(track))
        else {
            continue;
        };

        let ends = [
            (0, head_neighbor, SkipSegments::Before(head_neighbor)),
            (n - 1, tail_neighbor, SkipSegments::From(tail_neighbor)),
        ];
        for (end, neighbor, skip) in ends {
            let point = track.points[end];
            if endpoint_degree.get(&point).copied() != Some(1) {
                continue;
            }
            if touches_track_body(tracks, point, index, skip) {
                continue;
            }
            let position = point.to_point2();
            let angle = slope(&track.points[neighbor].to_point2(), &position);
            leaves.push(Leaf { position, angle });
        }
    }

    tracing::trace!(leaves = leaves.len(), "leaf vertices found");
    leaves
}

/// Segments of the endpoint's own track that are incident to it.
#[derive(Debug, Clone, Copy)]
enum SkipSegments {
    /// Segments with start index below the given vertex.
    Before(usize),
    /// Segments with start index at or above the given vertex.
    From(usize),
}

impl SkipSegments {
    fn skips(self, segment: usize) -> bool {
        match self {
            Self::Before(v) => segment < v,
            Self::From(v) => segment >= v,
        }
    }
}

/// Index of the first vertex that differs from the first vertex.
fn first_distinct(track: &Track) -> Option<usize> {
    let first = *track.points.first()?;
    track.points.iter().position(|p| *p != first)
}

/// Index of the last vertex that differs from the last vertex.
fn last_distinct(track: &Track) -> Option<usize> {
    let last = *track.points.last()?;
    track.points.iter().rposition(|p| *p != last)
}

fn touches_track_body(tracks: &TrackSet, point: BoardPoint, own: usize, skip: SkipSegments) -> bool {
    let p = point.to_point2();
    tracks.tracks().iter().enumerate().any(|(index, track)| {
        track.points.windows(2).enumerate().any(|(segment, w)| {
            if index == own && skip.skips(segment) {
                return false;
            }
            is_point_on_segment(&p, &w[0].to_point2(), &w[1].to_point2(), TOLERANCE)
        })
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    use approx::assert_relative_eq;

    use super::*;

    fn set(coords: &[Vec<[i64; 2]>]) -> TrackSet {
        TrackSet::from_coords(coords).unwrap()
    }

    #[test]
    fn straight_track_has_two_leaves() {
        let leaves = find_leaves(&set(&[vec![[0, 0], [10_000, 0]]]));
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].position, Point2::new(0.0, 0.0));
        assert_relative_eq!(leaves[0].angle, PI);
        assert_eq!(leaves[1].position, Point2::new(10_000.0, 0.0));
        assert_relative_eq!(leaves[1].angle, 0.0);
    }

    #[test]
    fn tangent_uses_adjacent_vertex() {
        let leaves = find_leaves(&set(&[vec![[0, 0], [10, 10], [10, 50]]]));
        assert_relative_eq!(leaves[0].angle, -3.0 * FRAC_PI_4);
        assert_relative_eq!(leaves[1].angle, FRAC_PI_2);
    }

    #[test]
    fn shared_endpoint_is_not_a_leaf() {
        let leaves = find_leaves(&set(&[
            vec![[0, 0], [100, 0]],
            vec![[100, 0], [100, 100]],
            vec![[100, 0], [200, 0]],
        ]));
        assert_eq!(leaves.len(), 3);
        assert!(leaves.iter().all(|l| l.position != Point2::new(100.0, 0.0)));
    }

    #[test]
    fn closed_loop_track_has_no_leaves() {
        let leaves = find_leaves(&set(&[vec![[0, 0], [100, 0], [100, 100], [0, 0]]]));
        assert!(leaves.is_empty());
    }

    #[test]
    fn end_on_interior_vertex_is_a_junction() {
        // Second track ends on the first track's middle vertex.
        let leaves = find_leaves(&set(&[
            vec![[0, 0], [100, 0], [200, 0]],
            vec![[100, 0], [100, 100]],
        ]));
        let positions: Vec<_> = leaves.iter().map(|l| l.position).collect();
        assert_eq!(
            positions,
            vec![Point2::new(0.0, 0.0), Point2::new(200.0, 0.0), Point2::new(100.0, 100.0)]
        );
    }

    #[test]
    fn end_on_segment_is_a_junction() {
        let leaves = find_leaves(&set(&[vec![[0, 0], [200, 0]], vec![[50, 0], [50, 80]]]));
        assert_eq!(leaves.len(), 3);
        assert!(leaves.iter().all(|l| l.position != Point2::new(50.0, 0.0)));
    }

    #[test]
    fn repeated_end_vertex_uses_first_distinct_neighbor() {
        let leaves = find_leaves(&set(&[vec![[0, 0], [0, 0], [0, 100]]]));
        assert_eq!(leaves.len(), 2);
        assert_relative_eq!(leaves[0].angle, -FRAC_PI_2);
    }

    #[test]
    fn empty_set_has_no_leaves() {
        assert!(find_leaves(&TrackSet::default()).is_empty());
    }
}
