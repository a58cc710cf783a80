//! This module defines the error types used by the `swarmpath-navigation` crate.

use std::path::PathBuf;

/// Error type for map construction, mutation and loading.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    /// Returned when a cell size is provided that is not positive.
    #[error("Invalid cell size: {0}")]
    InvalidCellSize(&'static str),
    /// Returned when map width or height is zero or too large.
    #[error("Invalid map dimensions: {0}")]
    InvalidDimensions(&'static str),
    /// Returned when attempting to access cells outside the valid range.
    #[error("Map access out of bounds: ({x}, {y})")]
    OutOfBounds {
        /// Requested column.
        x: usize,
        /// Requested row.
        y: usize,
    },
    /// The map file could not be opened or read.
    #[error("Failed to read map file {path}: {source}")]
    MapIo {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The map text did not follow the `rows cols` + matrix format.
    #[error("Malformed map data: {0}")]
    MalformedMap(String),
}
