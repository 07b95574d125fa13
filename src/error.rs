use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for via fence generation.
#[derive(Debug, Error)]
pub enum ViaFenceError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    File(#[from] FileError),
}

/// Errors raised while validating caller input, before any geometry runs.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("track {track} has {count} vertices, at least 2 are required")]
    TooFewVertices { track: usize, count: usize },

    #[error("track {track} has zero length")]
    ZeroLength { track: usize },

    #[error("{parameter} must be positive, got {value}")]
    NonPositive { parameter: &'static str, value: f64 },

    #[error("{parameter} must be finite")]
    NonFinite { parameter: &'static str },

    #[error("invalid net filter {pattern:?}: {reason}")]
    NetFilter { pattern: String, reason: String },
}

/// Errors raised by the geometry pipeline, the polygon engine, or the host.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("polygon engine failure: {0}")]
    Engine(String),

    /// Raised by a host while applying generated vias.
    #[error("host rejected the result: {0}")]
    Host(String),
}

/// Errors related to reading and writing fixture and configuration files.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for results using [`ViaFenceError`].
pub type Result<T> = std::result::Result<T, ViaFenceError>;
