use serde::{Deserialize, Serialize};

use crate::error::{InputError, Result};
use crate::math::Point2;

/// A point in integer board units (the host's native length unit).
///
/// Serialized as a `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i64; 2]", into = "[i64; 2]")]
pub struct BoardPoint {
    pub x: i64,
    pub y: i64,
}

impl BoardPoint {
    #[must_use]
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Rounds a floating-point position to the nearest board unit.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn rounded(p: &Point2) -> Self {
        Self {
            x: p.x.round() as i64,
            y: p.y.round() as i64,
        }
    }

    /// Converts to a floating-point geometry point.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_point2(self) -> Point2 {
        Point2::new(self.x as f64, self.y as f64)
    }
}

impl From<[i64; 2]> for BoardPoint {
    fn from([x, y]: [i64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<BoardPoint> for [i64; 2] {
    fn from(p: BoardPoint) -> Self {
        [p.x, p.y]
    }
}

/// One copper track: an open polyline of board points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub points: Vec<BoardPoint>,
}

impl Track {
    #[must_use]
    pub fn new(points: Vec<BoardPoint>) -> Self {
        Self { points }
    }

    /// Returns the first and last vertex.
    #[must_use]
    pub fn endpoints(&self) -> Option<(BoardPoint, BoardPoint)> {
        Some((*self.points.first()?, *self.points.last()?))
    }

    /// Returns the vertices as floating-point geometry points.
    #[must_use]
    pub fn to_points(&self) -> Vec<Point2> {
        self.points.iter().map(|p| p.to_point2()).collect()
    }
}

/// The validated input of the generator: an ordered collection of tracks.
///
/// Every track has at least 2 vertices and non-zero length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSet {
    tracks: Vec<Track>,
}

impl TrackSet {
    /// Validates and wraps `tracks`.
    ///
    /// # Errors
    ///
    /// Returns `InputError::TooFewVertices` for a track with fewer than 2
    /// vertices, or `InputError::ZeroLength` if all its vertices coincide.
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        for (index, track) in tracks.iter().enumerate() {
            if track.points.len() < 2 {
                return Err(InputError::TooFewVertices {
                    track: index,
                    count: track.points.len(),
                }
                .into());
            }
            let first = track.points[0];
            if track.points.iter().all(|p| *p == first) {
                return Err(InputError::ZeroLength { track: index }.into());
            }
        }
        Ok(Self { tracks })
    }

    /// Builds a track set from raw `[x, y]` coordinate lists.
    ///
    /// # Errors
    ///
    /// Same as [`TrackSet::new`].
    pub fn from_coords(coords: &[Vec<[i64; 2]>]) -> Result<Self> {
        let tracks = coords
            .iter()
            .map(|pts| Track::new(pts.iter().copied().map(BoardPoint::from).collect()))
            .collect();
        Self::new(tracks)
    }

    #[must_use]
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Returns the tracks as raw `[x, y]` coordinate lists.
    #[must_use]
    pub fn to_coords(&self) -> Vec<Vec<[i64; 2]>> {
        self.tracks
            .iter()
            .map(|t| t.points.iter().map(|&p| p.into()).collect())
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ViaFenceError;

    #[test]
    fn accepts_valid_tracks() {
        let set = TrackSet::from_coords(&[vec![[0, 0], [10, 0]], vec![[10, 0], [10, 10], [0, 10]]])
            .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_coords()[1], vec![[10, 0], [10, 10], [0, 10]]);
    }

    #[test]
    fn empty_set_is_valid() {
        assert!(TrackSet::from_coords(&[]).unwrap().is_empty());
    }

    #[test]
    fn rejects_single_vertex_track() {
        let err = TrackSet::from_coords(&[vec![[0, 0], [1, 0]], vec![[5, 5]]]).unwrap_err();
        assert!(matches!(
            err,
            ViaFenceError::Input(InputError::TooFewVertices { track: 1, count: 1 })
        ));
    }

    #[test]
    fn rejects_zero_length_track() {
        let err = TrackSet::from_coords(&[vec![[3, 3], [3, 3], [3, 3]]]).unwrap_err();
        assert!(matches!(err, ViaFenceError::Input(InputError::ZeroLength { track: 0 })));
    }

    #[test]
    fn board_point_serializes_as_pair() {
        let json = serde_json::to_string(&BoardPoint::new(3, -4)).unwrap();
        assert_eq!(json, "[3,-4]");
        let back: BoardPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BoardPoint::new(3, -4));
    }

    #[test]
    fn rounding_to_board_units() {
        let p = BoardPoint::rounded(&Point2::new(1.4999, -2.5001));
        assert_eq!(p, BoardPoint::new(1, -3));
    }
}
