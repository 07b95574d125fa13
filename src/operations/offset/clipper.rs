use clipper2::{difference, EndType, FillRule, JoinType, Paths};

use super::{EndCap, OffsetEngine};
use crate::error::{OperationError, Result};
use crate::geometry::{Path, TrackSet};
use crate::math::Point2;

/// Miter limit handed to Clipper2. Unused with round joins, but required by the API.
const MITER_LIMIT: f64 = 2.0;

/// [`OffsetEngine`] backed by the Clipper2 polygon library.
///
/// Clipper2 works on scaled integer coordinates internally, so output vertices
/// are quantized to 0.01 board units.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipperEngine {
    end_cap: EndCap,
}

impl ClipperEngine {
    /// Creates an engine that caps free track ends with `end_cap`.
    #[must_use]
    pub fn new(end_cap: EndCap) -> Self {
        Self { end_cap }
    }
}

impl OffsetEngine for ClipperEngine {
    fn offset(&self, tracks: &TrackSet, distance: f64) -> Result<Vec<Path>> {
        if tracks.is_empty() || distance.is_nan() || distance <= 0.0 {
            return Ok(Vec::new());
        }

        let coords: Vec<Vec<(f64, f64)>> = tracks
            .tracks()
            .iter()
            .map(|t| t.to_points().iter().map(|p| (p.x, p.y)).collect())
            .collect();
        let paths: Paths = coords.into();

        let end_type = match self.end_cap {
            EndCap::Round => EndType::Round,
            EndCap::Butt => EndType::Butt,
        };
        let inflated = paths.inflate(distance, JoinType::Round, end_type, MITER_LIMIT);

        Ok(rings_from(inflated.into()))
    }

    fn difference(&self, subject: &Path, clips: &[Path]) -> Result<Vec<Path>> {
        let subject: Paths = vec![to_coords(subject)].into();
        let clip: Paths = clips.iter().map(to_coords).collect::<Vec<_>>().into();

        let result = difference(subject, clip, FillRule::NonZero)
            .map_err(|err| OperationError::Engine(format!("difference failed: {err:?}")))?;

        Ok(rings_from(result.into()))
    }
}

fn to_coords(path: &Path) -> Vec<(f64, f64)> {
    path.points.iter().map(|p| (p.x, p.y)).collect()
}

/// Converts engine output to closed paths, dropping rings that cannot enclose area.
fn rings_from(output: Vec<Vec<(f64, f64)>>) -> Vec<Path> {
    output
        .into_iter()
        .filter(|ring| ring.len() >= 3)
        .map(|ring| Path::closed(ring.into_iter().map(|(x, y)| Point2::new(x, y)).collect()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::distance_2d::point_to_polyline_dist;
    use crate::math::polygon_2d::signed_area;

    fn straight() -> TrackSet {
        TrackSet::from_coords(&[vec![[0, 0], [10_000, 0]]]).unwrap()
    }

    #[test]
    fn offset_straight_track_round_caps() {
        let polys = ClipperEngine::new(EndCap::Round).offset(&straight(), 500.0).unwrap();
        assert_eq!(polys.len(), 1);
        let track = straight().tracks()[0].to_points();
        for v in &polys[0].points {
            let d = point_to_polyline_dist(v, &track);
            assert!((d - 500.0).abs() < 2.0, "vertex {v:?} at distance {d}");
        }
        // Round caps reach past both ends.
        assert!(polys[0].points.iter().any(|v| v.x < -499.0));
        assert!(polys[0].points.iter().any(|v| v.x > 10_499.0));
    }

    #[test]
    fn offset_straight_track_butt_caps_is_rectangle() {
        let polys = ClipperEngine::new(EndCap::Butt).offset(&straight(), 500.0).unwrap();
        assert_eq!(polys.len(), 1);
        assert_relative_eq!(signed_area(&polys[0].points).abs(), 10_000.0 * 1_000.0, epsilon = 1.0);
    }

    #[test]
    fn offset_of_disjoint_tracks_gives_separate_polygons() {
        let tracks = TrackSet::from_coords(&[
            vec![[0, 0], [1_000, 0]],
            vec![[0, 10_000], [1_000, 10_000]],
        ])
        .unwrap();
        let polys = ClipperEngine::default().offset(&tracks, 100.0).unwrap();
        assert_eq!(polys.len(), 2);
    }

    #[test]
    fn offset_of_joined_tracks_merges() {
        let tracks = TrackSet::from_coords(&[
            vec![[0, 0], [1_000, 0]],
            vec![[1_000, 0], [1_000, 1_000]],
        ])
        .unwrap();
        let polys = ClipperEngine::default().offset(&tracks, 100.0).unwrap();
        assert_eq!(polys.len(), 1);
    }

    #[test]
    fn offset_empty_or_non_positive_gives_nothing() {
        let engine = ClipperEngine::default();
        assert!(engine.offset(&TrackSet::default(), 500.0).unwrap().is_empty());
        assert!(engine.offset(&straight(), 0.0).unwrap().is_empty());
        assert!(engine.offset(&straight(), -5.0).unwrap().is_empty());
    }

    #[test]
    fn difference_cuts_rectangle_in_half() {
        let square = Path::closed(vec![
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(0.0, 100.0),
        ]);
        let right_half = Path::closed(vec![
            Point2::new(50.0, -10.0),
            Point2::new(200.0, -10.0),
            Point2::new(200.0, 110.0),
            Point2::new(50.0, 110.0),
        ]);
        let result = ClipperEngine::default().difference(&square, &[right_half]).unwrap();
        assert_eq!(result.len(), 1);
        assert_relative_eq!(signed_area(&result[0].points).abs(), 5_000.0, epsilon = 1e-6);
        assert!(result[0].points.iter().all(|p| p.x <= 50.0 + 1e-9));
    }

    #[test]
    fn difference_without_clips_keeps_subject() {
        let tri = Path::closed(vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(0.0, 10.0),
        ]);
        let result = ClipperEngine::default().difference(&tri, &[]).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].len(), 3);
    }
}
