use crate::geometry::Path;
use crate::math::distance_2d::is_point_on_segment;
use crate::math::polygon_2d::sub_path;
use crate::math::Point2;

/// Returns the vertex index pairs of every polygon edge carrying a target point.
///
/// Edges are visited in ring order, including the closing edge. Each edge is
/// reported at most once, however many targets lie on it.
#[must_use]
pub fn find_cut_edges(polygon: &Path, targets: &[Point2], tolerance: f64) -> Vec<(usize, usize)> {
    (0..polygon.segment_count())
        .map(|i| polygon.segment_indices(i))
        .filter(|&(a, b)| {
            let (pa, pb) = (&polygon.points[a], &polygon.points[b]);
            targets
                .iter()
                .any(|t| is_point_on_segment(t, pa, pb, tolerance))
        })
        .collect()
}

/// Cuts a closed polygon open at every edge carrying a target point.
///
/// The cut edges themselves are dropped; each returned open path runs from the
/// end of one cut edge to the start of the next, wrapping around the ring.
/// Runs that collapse to a single vertex (two adjacent cut edges) are discarded.
/// Returns nothing when no edge is cut.
#[must_use]
pub fn split(polygon: &Path, targets: &[Point2], tolerance: f64) -> Vec<Path> {
    let cuts = find_cut_edges(polygon, targets, tolerance);
    if cuts.is_empty() {
        return Vec::new();
    }

    // Shift the flattened index list by one so each pair is (end of a cut,
    // start of the following cut).
    let mut flat: Vec<usize> = cuts.iter().flat_map(|&(a, b)| [a, b]).collect();
    flat.rotate_left(1);

    flat.chunks_exact(2)
        .filter(|pair| pair[0] != pair[1])
        .map(|pair| Path::open(sub_path(&polygon.points, pair[0], pair[1])))
        .collect()
}

/// Splits an open path into consecutive runs between the given vertex indices.
///
/// `fixed` must be ascending; run `k` spans `fixed[k]..=fixed[k + 1]`.
#[must_use]
pub fn split_at(points: &[Point2], fixed: &[usize]) -> Vec<Vec<Point2>> {
    fixed
        .windows(2)
        .map(|w| points[w[0]..=w[1]].to_vec())
        .collect()
}
