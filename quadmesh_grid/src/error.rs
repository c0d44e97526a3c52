// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by mesh construction and derivation.

use thiserror::Error;

/// Failures while building or deriving a quadtree mesh.
#[derive(Debug, Error)]
pub enum GridError {
    /// The base grid has no rows or no columns.
    #[error("base grid must have at least one row and one column (got {nmax} x {mmax})")]
    EmptyGrid {
        /// Requested rows.
        nmax: u32,
        /// Requested columns.
        mmax: u32,
    },
    /// Cell size is not positive and finite, or the origin/rotation is not finite.
    #[error("grid geometry must be finite with positive cell size (got dx={dx}, dy={dy})")]
    InvalidGeometry {
        /// Requested cell width.
        dx: f64,
        /// Requested cell height.
        dy: f64,
    },
    /// A refinement level is deeper than the index space can address.
    #[error("refinement level {level} exceeds the supported maximum of {max}")]
    LevelTooDeep {
        /// Requested level.
        level: u8,
        /// Deepest supported level.
        max: u8,
    },
    /// A per-cell array does not have one entry per cell.
    #[error("{what} has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Which array was wrong.
        what: &'static str,
        /// Number of cells.
        expected: usize,
        /// Entries supplied.
        actual: usize,
    },
    /// Cells are not grouped by ascending level.
    #[error("cell {index} has level {level} after a cell of level {previous}")]
    UnsortedLevels {
        /// Offending cell.
        index: usize,
        /// Its level.
        level: u8,
        /// Level of the cell before it.
        previous: u8,
    },
    /// A cell names a level the mesh does not have.
    #[error("cell {index} has level {level}, but the mesh has {nr_levels} levels")]
    LevelOutOfRange {
        /// Offending cell.
        index: usize,
        /// Its level.
        level: u8,
        /// Number of levels in the mesh.
        nr_levels: u8,
    },
    /// A neighbor reference points past the end of the cell array.
    #[error("neighbor {neighbor} of cell {cell} is out of range for {nr_cells} cells")]
    NeighborOutOfRange {
        /// Cell holding the reference.
        cell: usize,
        /// Referenced index.
        neighbor: usize,
        /// Number of cells.
        nr_cells: usize,
    },
    /// The bathymetry collaborator failed.
    #[error("bathymetry lookup failed")]
    Bathymetry(#[source] Box<dyn std::error::Error + Send + Sync>),
}
