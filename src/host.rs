//! Boundary between the fence generator and a host board editor.
//!
//! The host hands over its copper segments and a [`FenceConfig`], and receives
//! one callback per via to create. Nothing here touches a board directly.

use std::io::Write;
use std::path::Path as FsPath;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{InputError, OperationError, Result};
use crate::fixture::read_json;
use crate::geometry::{BoardPoint, Track, TrackSet};
use crate::operations::{EndCap, FenceOptions, ViaFence};
use crate::operations::fence::DEFAULT_CORNER_TOLERANCE_DEG;

/// Conversions between millimetres and board units (nanometres).
pub mod units {
    /// Board units per millimetre.
    pub const NM_PER_MM: f64 = 1_000_000.0;

    /// Converts millimetres to the nearest board unit.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_mm(mm: f64) -> i64 {
        (mm * NM_PER_MM).round() as i64
    }

    /// Converts board units to millimetres.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_mm(nm: i64) -> f64 {
        nm as f64 / NM_PER_MM
    }
}

/// Host-side parameters of one fence run. Lengths are in board units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FenceConfig {
    pub via_offset: f64,
    pub via_pitch: f64,
    /// Net assigned to the created vias.
    pub via_net: String,
    pub via_size: i64,
    pub via_drill: i64,
    /// Wildcard pattern (`*`, `?`) selecting the nets to fence.
    pub net_filter: String,
    /// Only fence tracks on this layer, when set.
    pub layer: Option<String>,
    pub corner_tolerance_deg: f64,
    pub end_cap: EndCap,
}

impl Default for FenceConfig {
    #[allow(clippy::cast_precision_loss)]
    fn default() -> Self {
        Self {
            via_offset: units::from_mm(0.5) as f64,
            via_pitch: units::from_mm(1.0) as f64,
            via_net: "GND".to_owned(),
            via_size: units::from_mm(0.6),
            via_drill: units::from_mm(0.3),
            net_filter: "*".to_owned(),
            layer: None,
            corner_tolerance_deg: DEFAULT_CORNER_TOLERANCE_DEG,
            end_cap: EndCap::Round,
        }
    }
}

impl FenceConfig {
    /// Loads a configuration from a JSON file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a `FileError` if the file cannot be read or parsed.
    pub fn from_json_file(path: &FsPath) -> Result<Self> {
        read_json(path)
    }

    /// Returns the pipeline options carried by this configuration.
    #[must_use]
    pub fn options(&self) -> FenceOptions {
        FenceOptions {
            corner_tolerance_deg: self.corner_tolerance_deg,
            end_cap: self.end_cap,
        }
    }
}

/// A straight copper segment as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostTrack {
    pub net: String,
    pub layer: String,
    pub start: BoardPoint,
    pub end: BoardPoint,
}

/// Net name matcher supporting `*` (any run) and `?` (any single character).
#[derive(Debug, Clone)]
pub struct NetFilter {
    regex: Regex,
}

impl NetFilter {
    /// Compiles a wildcard pattern.
    ///
    /// # Errors
    ///
    /// Returns `InputError::NetFilter` if the pattern cannot be compiled.
    pub fn new(pattern: &str) -> Result<Self> {
        let body = regex::escape(pattern)
            .replace(r"\*", ".*")
            .replace(r"\?", ".");
        let regex = Regex::new(&format!("^{body}$")).map_err(|err| InputError::NetFilter {
            pattern: pattern.to_owned(),
            reason: err.to_string(),
        })?;
        Ok(Self { regex })
    }

    #[must_use]
    pub fn matches(&self, net: &str) -> bool {
        self.regex.is_match(net)
    }
}

/// A via the host is asked to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViaPlacement<'a> {
    pub position: BoardPoint,
    pub net: &'a str,
    pub size: i64,
    pub drill: i64,
}

/// Picks the host segments matching the configured net pattern and layer.
///
/// Zero-length segments are skipped.
///
/// # Errors
///
/// Returns `InputError::NetFilter` for an unusable pattern.
pub fn select_tracks(config: &FenceConfig, tracks: &[HostTrack]) -> Result<TrackSet> {
    let filter = NetFilter::new(&config.net_filter)?;
    let selected: Vec<Track> = tracks
        .iter()
        .filter(|t| filter.matches(&t.net))
        .filter(|t| config.layer.as_ref().is_none_or(|layer| *layer == t.layer))
        .filter(|t| {
            let keep = t.start != t.end;
            if !keep {
                tracing::debug!(net = %t.net, x = t.start.x, y = t.start.y, "skipping zero-length segment");
            }
            keep
        })
        .map(|t| Track::new(vec![t.start, t.end]))
        .collect();
    TrackSet::new(selected)
}

/// Generates the fence for the selected host tracks and asks the host to create
/// each via, in generation order. Returns the number of vias created.
///
/// # Errors
///
/// Returns input, engine, or callback errors. A failing callback stops placement
/// and its error is returned as is.
pub fn place_via_fence<F>(config: &FenceConfig, tracks: &[HostTrack], mut create_via: F) -> Result<usize>
where
    F: FnMut(&ViaPlacement<'_>) -> Result<()>,
{
    let selected = select_tracks(config, tracks)?;
    if selected.is_empty() {
        tracing::info!(filter = %config.net_filter, "no tracks selected, nothing to fence");
        return Ok(0);
    }

    let points = ViaFence::new(&selected, config.via_offset, config.via_pitch)
        .with_options(config.options())
        .execute()?;

    for point in &points {
        create_via(&ViaPlacement {
            position: BoardPoint::rounded(point),
            net: &config.via_net,
            size: config.via_size,
            drill: config.via_drill,
        })?;
    }

    tracing::info!(
        tracks = selected.len(),
        vias = points.len(),
        net = %config.via_net,
        "via fence placed"
    );
    Ok(points.len())
}

/// Runs [`place_via_fence`] and writes each via to `out` as one JSON line.
/// Returns the number of vias written.
///
/// # Errors
///
/// Returns input or engine errors, and `OperationError::Host` if a via cannot
/// be serialized or written. Writing stops at the first failure.
pub fn write_via_lines<W: Write>(config: &FenceConfig, tracks: &[HostTrack], mut out: W) -> Result<usize> {
    let count = place_via_fence(config, tracks, |via| {
        let line = serde_json::to_string(via)
            .map_err(|err| OperationError::Host(format!("cannot serialize via: {err}")))?;
        writeln!(out, "{line}")
            .map_err(|err| OperationError::Host(format!("cannot write via: {err}")))?;
        Ok(())
    })?;
    out.flush()
        .map_err(|err| OperationError::Host(format!("cannot flush vias: {err}")))?;
    Ok(count)
}
