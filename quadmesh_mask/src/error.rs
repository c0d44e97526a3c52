// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mask errors.

use quadmesh_grid::GridError;
use thiserror::Error;

/// Failures while reading, writing, or applying a mask.
#[derive(Debug, Error)]
pub enum MaskError {
    /// Underlying I/O failed.
    #[error("mask file I/O failed")]
    Io(#[from] std::io::Error),
    /// The mask does not have one value per cell.
    #[error("mask has {actual} values, expected {expected}")]
    Length {
        /// Number of cells.
        expected: usize,
        /// Values supplied.
        actual: usize,
    },
    /// A stored value is not a mask value.
    #[error("mask value {value} at cell {index} is not in 0..=3")]
    Value {
        /// Cell index.
        index: usize,
        /// Stored value.
        value: i8,
    },
    /// Rebuilding the mesh failed.
    #[error(transparent)]
    Grid(#[from] GridError),
}
