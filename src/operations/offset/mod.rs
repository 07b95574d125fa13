mod clipper;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{Path, TrackSet};

pub use clipper::ClipperEngine;

/// End cap style applied at the free ends of offset tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EndCap {
    /// Semicircular cap around the track end.
    #[default]
    Round,
    /// Flat cap through the track end, perpendicular to the track.
    Butt,
}

/// Polygon offsetting and boolean clipping capability.
///
/// Implementations must be reentrant: the generator holds one for the duration
/// of a single call and never shares it across calls.
pub trait OffsetEngine {
    /// Expands `tracks` into closed polygons at `distance` using round joins.
    ///
    /// Returns no polygons for an empty track set or a non-positive distance.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Engine` if the underlying library fails.
    fn offset(&self, tracks: &TrackSet, distance: f64) -> Result<Vec<Path>>;

    /// Subtracts the union of `clips` from `subject`.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::Engine` if the underlying library fails.
    fn difference(&self, subject: &Path, clips: &[Path]) -> Result<Vec<Path>>;
}
