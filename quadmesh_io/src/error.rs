// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for the codec and the configuration loader.

use std::path::PathBuf;

use quadmesh_grid::{Direction, GridError};
use thiserror::Error;

/// Failures while reading or writing a binary mesh file.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Underlying I/O failed.
    #[error("mesh file I/O failed")]
    Io(#[from] std::io::Error),
    /// The file was written by a newer (or corrupt) format version.
    #[error("unsupported mesh file version {0}")]
    UnsupportedVersion(i8),
    /// The byte length does not match the cell count in the header.
    #[error("mesh file is {actual} bytes, expected {expected}")]
    Length {
        /// Length implied by the header.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
    /// A header field has an impossible value.
    #[error("invalid header field {field}: {value}")]
    Header {
        /// Field name.
        field: &'static str,
        /// Stored value.
        value: i64,
    },
    /// A stored level is outside `1..=nr_levels`.
    #[error("cell {index} has stored level {value}")]
    Level {
        /// Cell index.
        index: usize,
        /// Stored (one-based) level.
        value: i8,
    },
    /// A stored row or column index is not positive.
    #[error("cell {index} has stored {what} index {value}")]
    CellIndex {
        /// Cell index.
        index: usize,
        /// `"n"` or `"m"`.
        what: &'static str,
        /// Stored (one-based) value.
        value: i32,
    },
    /// A neighbor level difference is outside `-1..=1`.
    #[error("cell {index} has level difference {value} towards {direction:?}")]
    Delta {
        /// Cell index.
        index: usize,
        /// Side of the cell.
        direction: Direction,
        /// Stored value.
        value: i8,
    },
    /// A neighbor reference is outside `0..=nr_cells`.
    #[error("cell {index} refers to neighbor {value} towards {direction:?}")]
    NeighborIndex {
        /// Cell index.
        index: usize,
        /// Side of the cell.
        direction: Direction,
        /// Stored (one-based) value.
        value: i32,
    },
    /// A value does not fit the on-disk integer width.
    #[error("{what} {value} does not fit the mesh file format")]
    TooLarge {
        /// Which value.
        what: &'static str,
        /// The value.
        value: usize,
    },
    /// The decoded parts do not form a valid mesh.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Failures while loading a build configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Cause.
        #[source]
        source: std::io::Error,
    },
    /// The configuration is not valid JSON for [`MeshConfig`](crate::MeshConfig).
    #[error("invalid mesh configuration")]
    Json(#[from] serde_json::Error),
    /// The configured grid cannot be built.
    #[error(transparent)]
    Grid(#[from] GridError),
}
