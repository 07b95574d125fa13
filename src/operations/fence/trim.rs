use std::f64::consts::{FRAC_PI_2, PI};

use super::leaf::Leaf;
use crate::error::Result;
use crate::geometry::Path;
use crate::math::polygon_2d::place_local;
use crate::math::Point2;
use crate::operations::offset::OffsetEngine;

/// Radius of the cutting flag as a multiple of the offset distance. Must exceed 1
/// so the flag reaches past the round cap.
const CAP_MARGIN: f64 = 1.02;

/// Arc segments approximating the flag's curved side.
const CAP_SEGMENTS: u32 = 16;

/// Builds the flag that squares off the offset cap at `leaf`.
///
/// In local coordinates the leaf sits at the origin and the track runs out along
/// +x. The flag is the half-disc `x >= 0` around the leaf, slightly larger than
/// the cap, so it removes the cap and nothing beyond it. Its diameter on the y
/// axis becomes the flat butt line through the leaf.
///
/// The arc vertices sit at `CAP_MARGIN * offset / cos(pi / 2n)`, which keeps
/// every chord outside the cap.
///
/// On an end segment shorter than the offset, the butt line itself comes within
/// the offset of the rest of the track, so vias near such a leaf can sit closer
/// than the offset to copper.
#[must_use]
pub fn wedge(leaf: &Leaf, offset: f64) -> Path {
    let step = PI / f64::from(CAP_SEGMENTS);
    let radius = CAP_MARGIN * offset / (step / 2.0).cos();
    let local: Vec<Point2> = (0..=CAP_SEGMENTS)
        .map(|k| {
            let a = -FRAC_PI_2 + f64::from(k) * step;
            Point2::new(radius * a.cos(), radius * a.sin())
        })
        .collect();
    Path::closed(place_local(&local, &leaf.position, leaf.angle))
}

/// Cuts a flat end into `polygon` at every leaf.
///
/// Returns the remaining rings. A cut may split the polygon, so more than one
/// ring can come back.
///
/// # Errors
///
/// Propagates engine failures.
pub fn trim(
    engine: &dyn OffsetEngine,
    polygon: &Path,
    leaves: &[Leaf],
    offset: f64,
) -> Result<Vec<Path>> {
    if leaves.is_empty() {
        return Ok(vec![polygon.clone()]);
    }
    let wedges: Vec<Path> = leaves.iter().map(|leaf| wedge(leaf, offset)).collect();
    engine.difference(polygon, &wedges)
}
