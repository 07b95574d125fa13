mod corner;
mod distribute;
mod leaf;
mod split;
mod trim;

use serde::{Deserialize, Serialize};

use crate::error::{InputError, Result};
use crate::geometry::{Path, TrackSet};
use crate::math::Point2;
use crate::operations::offset::{ClipperEngine, EndCap, OffsetEngine};

pub use corner::{find_corners, DEFAULT_CORNER_TOLERANCE_DEG};
pub use distribute::distribute;
pub use leaf::{find_leaves, Leaf};
pub use split::{find_cut_edges, split, split_at};
pub use trim::{trim, wedge};

/// Distance, as a fraction of the offset, within which a leaf counts as lying
/// on a polygon edge. The offset boundary keeps every other edge a full offset
/// away from the tracks.
const BUTT_LINE_TOLERANCE: f64 = 0.01;

/// Tuning knobs of the fence pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FenceOptions {
    /// Turn angle in degrees above which a rail vertex gets a fixed via.
    pub corner_tolerance_deg: f64,
    /// Cap style handed to the offset engine.
    pub end_cap: EndCap,
}

impl Default for FenceOptions {
    fn default() -> Self {
        Self {
            corner_tolerance_deg: DEFAULT_CORNER_TOLERANCE_DEG,
            end_cap: EndCap::Round,
        }
    }
}

/// Why a via sits where it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViaKind {
    /// Rail end or sharp corner.
    Fixed,
    /// Evenly spaced fill between fixed vias.
    Interpolated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViaPoint {
    pub position: Point2,
    pub kind: ViaKind,
}

/// One rail of the fence and its vias in traversal order.
#[derive(Debug, Clone, PartialEq)]
pub struct FenceRail {
    /// The rail geometry. Closed when the offset ring had no butt line.
    pub path: Path,
    pub vias: Vec<ViaPoint>,
}

/// Generates a via fence around a set of tracks.
///
/// # Algorithm
///
/// 1. Offset the tracks into closed polygons (round joins).
/// 2. Find the free track ends (leaves) and cut a flat butt line into each
///    polygon at every leaf.
/// 3. Split every polygon open at its butt lines into fence rails. A polygon
///    without butt lines becomes one closed rail.
/// 4. On each rail, fix vias at both ends and at every sharp corner, then fill
///    each run between fixed vias at no more than the pitch.
#[derive(Debug, Clone)]
pub struct ViaFence<'a> {
    tracks: &'a TrackSet,
    offset: f64,
    pitch: f64,
    options: FenceOptions,
}

impl<'a> ViaFence<'a> {
    /// Creates a generator with default options.
    ///
    /// * `offset` - Standoff distance between the tracks and the rails.
    /// * `pitch` - Maximum spacing between neighbouring vias on a run.
    #[must_use]
    pub fn new(tracks: &'a TrackSet, offset: f64, pitch: f64) -> Self {
        Self {
            tracks,
            offset,
            pitch,
            options: FenceOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: FenceOptions) -> Self {
        self.options = options;
        self
    }

    /// Runs the pipeline and returns all via positions in discovery order.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` for a non-positive or non-finite offset, pitch or
    /// corner tolerance, and an `OperationError` if the polygon engine fails.
    pub fn execute(&self) -> Result<Vec<Point2>> {
        let rails = self.execute_rails()?;
        Ok(rails
            .iter()
            .flat_map(|rail| rail.vias.iter().map(|via| via.position))
            .collect())
    }

    /// Runs the pipeline and returns the rails with their tagged vias.
    ///
    /// # Errors
    ///
    /// See [`ViaFence::execute`].
    pub fn execute_rails(&self) -> Result<Vec<FenceRail>> {
        let engine = ClipperEngine::new(self.options.end_cap);
        self.execute_with(&engine)
    }

    /// Runs the pipeline on a caller-supplied polygon engine.
    ///
    /// # Errors
    ///
    /// See [`ViaFence::execute`].
    pub fn execute_with(&self, engine: &dyn OffsetEngine) -> Result<Vec<FenceRail>> {
        self.validate()?;

        let polygons = engine.offset(self.tracks, self.offset)?;
        if polygons.is_empty() {
            if !self.tracks.is_empty() {
                tracing::warn!(
                    tracks = self.tracks.len(),
                    offset = self.offset,
                    "offset produced no polygon, fence is empty"
                );
            }
            return Ok(Vec::new());
        }

        let leaves = find_leaves(self.tracks);
        let butts: Vec<Point2> = leaves.iter().map(|leaf| leaf.position).collect();
        let tolerance = self.offset * BUTT_LINE_TOLERANCE;

        let mut rails = Vec::new();
        for polygon in &polygons {
            for ring in trim(engine, polygon, &leaves, self.offset)? {
                let paths = split(&ring, &butts, tolerance);
                if paths.is_empty() {
                    rails.push(self.place_vias(Path::closed(ring.points))?);
                } else {
                    for path in paths {
                        rails.push(self.place_vias(path)?);
                    }
                }
            }
        }

        tracing::debug!(
            polygons = polygons.len(),
            leaves = leaves.len(),
            rails = rails.len(),
            vias = rails.iter().map(|r| r.vias.len()).sum::<usize>(),
            "via fence generated"
        );
        Ok(rails)
    }

    /// Fixes vias at the rail ends and corners and fills the runs between them.
    fn place_vias(&self, path: Path) -> Result<FenceRail> {
        let points = path.unrolled();
        let fixed = find_corners(&points, self.options.corner_tolerance_deg);
        let runs = split_at(&points, &fixed);

        let mut vias = Vec::with_capacity(fixed.len());
        for (run, &start) in runs.iter().zip(&fixed) {
            vias.push(ViaPoint {
                position: points[start],
                kind: ViaKind::Fixed,
            });
            vias.extend(distribute(run, self.pitch)?.into_iter().map(|position| ViaPoint {
                position,
                kind: ViaKind::Interpolated,
            }));
        }
        // A closed rail ends where it started; that via is already placed.
        if !path.closed {
            if let Some(&last) = fixed.last() {
                vias.push(ViaPoint {
                    position: points[last],
                    kind: ViaKind::Fixed,
                });
            }
        }

        tracing::trace!(
            vertices = points.len(),
            length = path.length(),
            fixed = fixed.len(),
            vias = vias.len(),
            closed = path.closed,
            "rail placed"
        );
        Ok(FenceRail { path, vias })
    }

    fn validate(&self) -> Result<()> {
        check_positive("offset", self.offset)?;
        check_positive("pitch", self.pitch)?;
        let tolerance = self.options.corner_tolerance_deg;
        if !tolerance.is_finite() {
            return Err(InputError::NonFinite {
                parameter: "corner tolerance",
            }
            .into());
        }
        if tolerance < 0.0 {
            return Err(InputError::NonPositive {
                parameter: "corner tolerance",
                value: tolerance,
            }
            .into());
        }
        Ok(())
    }
}

fn check_positive(parameter: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(InputError::NonFinite { parameter }.into());
    }
    if value <= 0.0 {
        return Err(InputError::NonPositive { parameter, value }.into());
    }
    Ok(())
}

/// Computes the via fence of `tracks` with default options.
///
/// # Errors
///
/// See [`ViaFence::execute`].
pub fn generate_via_fence(tracks: &TrackSet, offset: f64, pitch: f64) -> Result<Vec<Point2>> {
    ViaFence::new(tracks, offset, pitch).execute()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{OperationError, ViaFenceError};
    use crate::math::distance_2d::point_to_polyline_dist;

    fn set(coords: &[Vec<[i64; 2]>]) -> TrackSet {
        TrackSet::from_coords(coords).unwrap()
    }

    fn regression_tracks() -> TrackSet {
        set(&[
            vec![[1000, 1000], [3000, 3000], [5000, 3000], [5000, 5000], [3000, 7000], [5000, 7000]],
            vec![[3000, 3000], [2000, 5000], [1000, 5000]],
        ])
    }

    fn contains(points: &[Point2], x: f64, y: f64) -> bool {
        let q = Point2::new(x, y);
        points.iter().any(|p| (p - q).norm() < 0.05)
    }

    fn assert_pitch_bound(rails: &[FenceRail], pitch: f64) {
        for rail in rails {
            for w in rail.vias.windows(2) {
                let d = (w[1].position - w[0].position).norm();
                assert!(d > 0.0 && d < 2.0 * pitch, "spacing {d} between {w:?}");
            }
        }
    }

    // ── scenarios ──

    #[test]
    fn single_straight_track() {
        let tracks = set(&[vec![[0, 0], [10_000, 0]]]);
        let rails = ViaFence::new(&tracks, 500.0, 1000.0).execute_rails().unwrap();
        assert_eq!(rails.len(), 2);

        for rail in &rails {
            assert!(!rail.path.closed);
            assert_eq!(rail.vias.len(), 11);
            assert_eq!(rail.vias[0].kind, ViaKind::Fixed);
            assert_eq!(rail.vias[10].kind, ViaKind::Fixed);
            let interpolated = rail
                .vias
                .iter()
                .filter(|v| v.kind == ViaKind::Interpolated)
                .count();
            assert_eq!(interpolated, 9);
            let y = rail.vias[0].position.y;
            assert!((y.abs() - 500.0).abs() < 1e-6);
            assert!(rail.vias.iter().all(|v| (v.position.y - y).abs() < 1e-6));
        }

        let points = generate_via_fence(&tracks, 500.0, 1000.0).unwrap();
        assert_eq!(points.len(), 22);
        for x in (0..=10).map(|k| f64::from(k) * 1000.0) {
            assert!(contains(&points, x, 500.0), "missing ({x}, 500)");
            assert!(contains(&points, x, -500.0), "missing ({x}, -500)");
        }
        assert_pitch_bound(&rails, 1000.0);
    }

    #[test]
    fn regression_scenario_properties() {
        let tracks = regression_tracks();
        let rails = ViaFence::new(&tracks, 500.0, 300.0).execute_rails().unwrap();
        // Three free ends cut the single polygon into three rails.
        assert_eq!(rails.len(), 3);
        assert_eq!(rails.iter().map(|r| r.vias.len()).sum::<usize>(), 86);

        let track_points: Vec<Vec<Point2>> = tracks.tracks().iter().map(|t| t.to_points()).collect();
        for via in rails.iter().flat_map(|r| &r.vias) {
            let d = track_points
                .iter()
                .map(|t| point_to_polyline_dist(&via.position, t))
                .fold(f64::INFINITY, f64::min);
            assert!((d - 500.0).abs() < 1.0, "via {:?} is {d} from the tracks", via.position);
        }
        assert_pitch_bound(&rails, 300.0);

        // The flat cut at the (1000, 5000) end leaves fixed vias 500 above and below it.
        let fixed: Vec<Point2> = rails
            .iter()
            .flat_map(|r| &r.vias)
            .filter(|v| v.kind == ViaKind::Fixed)
            .map(|v| v.position)
            .collect();
        assert!(contains(&fixed, 1000.0, 4500.0));
        assert!(contains(&fixed, 1000.0, 5500.0));
    }

    #[test]
    fn output_is_deterministic() {
        let tracks = regression_tracks();
        let a = generate_via_fence(&tracks, 500.0, 300.0).unwrap();
        let b = generate_via_fence(&tracks, 500.0, 300.0).unwrap();
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn right_angle_corner_gets_a_fixed_via() {
        let tracks = set(&[vec![[0, 0], [10_000, 0], [10_000, 10_000]]]);
        let rails = ViaFence::new(&tracks, 500.0, 1000.0).execute_rails().unwrap();
        assert_eq!(rails.len(), 2);
        let corner = rails
            .iter()
            .flat_map(|r| &r.vias)
            .find(|v| (v.position - Point2::new(9500.0, 500.0)).norm() < 0.05)
            .unwrap();
        assert_eq!(corner.kind, ViaKind::Fixed);
        assert_pitch_bound(&rails, 1000.0);
    }

    #[test]
    fn rail_ends_are_always_fixed() {
        let tracks = set(&[vec![[0, 0], [3_000, 1_000], [6_000, 0]]]);
        let options = FenceOptions {
            corner_tolerance_deg: 90.0,
            ..FenceOptions::default()
        };
        let rails = ViaFence::new(&tracks, 400.0, 500.0)
            .with_options(options)
            .execute_rails()
            .unwrap();
        for rail in &rails {
            let first = rail.vias.first().unwrap();
            let last = rail.vias.last().unwrap();
            assert_eq!(first.position, rail.path.points[0]);
            assert_eq!(last.position, *rail.path.points.last().unwrap());
            assert_eq!(first.kind, ViaKind::Fixed);
            assert_eq!(last.kind, ViaKind::Fixed);
        }
    }

    #[test]
    fn butt_caps_give_the_same_rails() {
        let tracks = set(&[vec![[0, 0], [10_000, 0]]]);
        let options = FenceOptions {
            end_cap: EndCap::Butt,
            ..FenceOptions::default()
        };
        let points = ViaFence::new(&tracks, 500.0, 1000.0)
            .with_options(options)
            .execute()
            .unwrap();
        assert_eq!(points.len(), 22);
    }

    #[test]
    fn closed_loop_track_gives_closed_rails() {
        let tracks = set(&[vec![[0, 0], [10_000, 0], [10_000, 10_000], [0, 10_000], [0, 0]]]);
        let rails = ViaFence::new(&tracks, 500.0, 1000.0).execute_rails().unwrap();
        assert_eq!(rails.len(), 2);
        for rail in &rails {
            assert!(rail.path.closed);
            let first = rail.vias.first().unwrap().position;
            let last = rail.vias.last().unwrap().position;
            assert!((first - last).norm() > 1.0, "closing via emitted twice");
        }
        let points: Vec<Point2> = rails.iter().flat_map(|r| &r.vias).map(|v| v.position).collect();
        assert!(contains(&points, 500.0, 500.0));
        assert!(contains(&points, 9500.0, 9500.0));
    }

    #[test]
    fn disjoint_groups_are_all_processed() {
        let tracks = set(&[vec![[0, 0], [5_000, 0]], vec![[0, 20_000], [5_000, 20_000]]]);
        let rails = ViaFence::new(&tracks, 500.0, 1000.0).execute_rails().unwrap();
        assert_eq!(rails.len(), 4);
    }

    // ── edge cases and errors ──

    #[test]
    fn empty_input_is_empty_output() {
        let points = generate_via_fence(&TrackSet::default(), 500.0, 300.0).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn rejects_bad_parameters() {
        let tracks = regression_tracks();
        for (offset, pitch) in [(0.0, 300.0), (-1.0, 300.0), (500.0, 0.0), (500.0, -3.0)] {
            let err = generate_via_fence(&tracks, offset, pitch).unwrap_err();
            assert!(matches!(err, ViaFenceError::Input(InputError::NonPositive { .. })));
        }
        let err = generate_via_fence(&tracks, f64::NAN, 300.0).unwrap_err();
        assert!(matches!(err, ViaFenceError::Input(InputError::NonFinite { .. })));
        let err = generate_via_fence(&tracks, 500.0, f64::INFINITY).unwrap_err();
        assert!(matches!(err, ViaFenceError::Input(InputError::NonFinite { .. })));
    }

    #[test]
    fn rejects_negative_corner_tolerance() {
        let tracks = regression_tracks();
        let options = FenceOptions {
            corner_tolerance_deg: -1.0,
            ..FenceOptions::default()
        };
        let err = ViaFence::new(&tracks, 500.0, 300.0)
            .with_options(options)
            .execute()
            .unwrap_err();
        assert!(matches!(err, ViaFenceError::Input(_)));
    }

    struct NoPolygons;

    impl OffsetEngine for NoPolygons {
        fn offset(&self, _tracks: &TrackSet, _distance: f64) -> Result<Vec<Path>> {
            Ok(Vec::new())
        }

        fn difference(&self, subject: &Path, _clips: &[Path]) -> Result<Vec<Path>> {
            Ok(vec![subject.clone()])
        }
    }

    struct BrokenClipper;

    impl OffsetEngine for BrokenClipper {
        fn offset(&self, tracks: &TrackSet, distance: f64) -> Result<Vec<Path>> {
            ClipperEngine::default().offset(tracks, distance)
        }

        fn difference(&self, _subject: &Path, _clips: &[Path]) -> Result<Vec<Path>> {
            Err(OperationError::Engine("clip rejected".to_owned()).into())
        }
    }

    #[test]
    fn missing_polygon_is_a_soft_failure() {
        let tracks = regression_tracks();
        let rails = ViaFence::new(&tracks, 500.0, 300.0)
            .execute_with(&NoPolygons)
            .unwrap();
        assert!(rails.is_empty());
    }

    #[test]
    fn engine_failure_propagates() {
        let tracks = regression_tracks();
        let err = ViaFence::new(&tracks, 500.0, 300.0)
            .execute_with(&BrokenClipper)
            .unwrap_err();
        assert!(matches!(err, ViaFenceError::Operation(OperationError::Engine(_))));
    }

    #[test]
    fn generator_is_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ViaFence<'static>>();
        assert_send_sync::<FenceRail>();
    }
}
