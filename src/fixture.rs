//! Stored regression scenarios.
//!
//! A fixture is a JSON object holding a track set, the fence parameters, and the
//! via list produced by an earlier run. Checking a fixture recomputes the fence
//! and compares the two point lists as multisets.

use std::fs;
use std::path::{Path as FsPath, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{FileError, Result};
use crate::geometry::TrackSet;
use crate::math::Point2;
use crate::operations::generate_via_fence;

/// Largest distance, in board units, at which a recomputed via matches a stored one.
pub const MATCH_TOLERANCE: f64 = 1e-6;

/// Reads and deserializes a JSON file.
pub(crate) fn read_json<T: DeserializeOwned>(path: &FsPath) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value = serde_json::from_str(&text).map_err(|source| FileError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(value)
}

/// Writes `value` as JSON indented by four spaces, with a trailing newline.
pub(crate) fn write_json<T: Serialize>(path: &FsPath, value: &T) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser).map_err(|source| FileError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    buf.push(b'\n');
    fs::write(path, buf).map_err(|source| FileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// One stored scenario. Field order is the on-disk key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub path_list: Vec<Vec<[i64; 2]>>,
    pub via_offset: f64,
    pub via_pitch: f64,
    /// Output of the run that recorded this fixture. `None` until recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via_points: Option<Vec<[f64; 2]>>,
}

/// Result of checking one fixture.
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureStatus {
    Passed,
    Failed {
        expected: usize,
        generated: usize,
        /// Recomputed vias that found a stored counterpart.
        matched: usize,
    },
    /// The fixture holds no stored vias to compare against.
    Unrecorded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixtureOutcome {
    /// File stem of the fixture.
    pub name: String,
    pub status: FixtureStatus,
    pub generated: Vec<Point2>,
}

impl FixtureOutcome {
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self.status, FixtureStatus::Failed { .. })
    }
}

impl Fixture {
    #[must_use]
    pub fn new(path_list: Vec<Vec<[i64; 2]>>, via_offset: f64, via_pitch: f64) -> Self {
        Self {
            path_list,
            via_offset,
            via_pitch,
            via_points: None,
        }
    }

    /// Loads a fixture from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns a `FileError` if the file cannot be read or parsed.
    pub fn load(path: &FsPath) -> Result<Self> {
        read_json(path)
    }

    /// Writes the fixture as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns a `FileError` if the file cannot be written.
    pub fn save(&self, path: &FsPath) -> Result<()> {
        write_json(path, self)
    }

    /// Builds the track set described by `path_list`.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` for malformed tracks.
    pub fn tracks(&self) -> Result<TrackSet> {
        TrackSet::from_coords(&self.path_list)
    }

    /// Runs the generator on the stored inputs.
    ///
    /// # Errors
    ///
    /// Returns input or engine errors from the generator.
    pub fn recompute(&self) -> Result<Vec<Point2>> {
        generate_via_fence(&self.tracks()?, self.via_offset, self.via_pitch)
    }

    /// Recomputes the vias and stores them as the expected output.
    ///
    /// # Errors
    ///
    /// Returns input or engine errors from the generator.
    pub fn record(&mut self) -> Result<&[[f64; 2]]> {
        let points = self.recompute()?;
        let stored = self
            .via_points
            .insert(points.iter().map(|p| [p.x, p.y]).collect());
        Ok(stored.as_slice())
    }

    /// Recomputes the vias and compares them with the stored output.
    ///
    /// `name` only labels the outcome.
    ///
    /// # Errors
    ///
    /// Returns input or engine errors from the generator. A mismatch is reported
    /// through [`FixtureStatus::Failed`], not as an error.
    pub fn check(&self, name: &str) -> Result<FixtureOutcome> {
        let generated = self.recompute()?;
        let status = match &self.via_points {
            None => FixtureStatus::Unrecorded,
            Some(expected) => compare(expected, &generated),
        };
        Ok(FixtureOutcome {
            name: name.to_owned(),
            status,
            generated,
        })
    }
}

/// Multiset comparison: every generated point must consume a distinct stored point.
fn compare(expected: &[[f64; 2]], generated: &[Point2]) -> FixtureStatus {
    let mut unused: Vec<Point2> = expected.iter().map(|&[x, y]| Point2::new(x, y)).collect();
    let mut matched = 0;
    for point in generated {
        if let Some(idx) = unused
            .iter()
            .position(|q| (q - point).norm() <= MATCH_TOLERANCE)
        {
            unused.swap_remove(idx);
            matched += 1;
        }
    }

    if matched == generated.len() && generated.len() == expected.len() {
        FixtureStatus::Passed
    } else {
        FixtureStatus::Failed {
            expected: expected.len(),
            generated: generated.len(),
            matched,
        }
    }
}

/// Returns the `*.json` files in `dir`, sorted by file name.
///
/// # Errors
///
/// Returns a `FileError` if the directory cannot be listed.
pub fn fixture_files(dir: &FsPath) -> Result<Vec<PathBuf>> {
    let io_err = |source: std::io::Error| FileError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Checks every fixture in `dir`, in file name order.
///
/// # Errors
///
/// Returns the first file or generator error encountered.
pub fn run_all(dir: &FsPath) -> Result<Vec<FixtureOutcome>> {
    fixture_files(dir)?
        .iter()
        .map(|path| {
            let name = path
                .file_stem()
                .map_or_else(String::new, |s| s.to_string_lossy().into_owned());
            let outcome = Fixture::load(path)?.check(&name)?;
            tracing::debug!(fixture = %outcome.name, status = ?outcome.status, "fixture checked");
            Ok(outcome)
        })
        .collect()
}
