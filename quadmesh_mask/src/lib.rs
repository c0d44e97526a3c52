// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadmesh Mask: which cells of a [`QuadtreeMesh`](quadmesh_grid::QuadtreeMesh) are computed.
//!
//! A [`CellMask`] holds one [`MaskValue`] per cell: inactive, active, open boundary, or outflow
//! boundary. [`MaskBuilder`] derives one from elevations and polygons; [`cut_inactive_cells`]
//! drops the cells no mask uses; [`file`] persists masks as one byte per cell.

pub mod builder;
pub mod cut;
pub mod error;
pub mod file;
pub mod mask;

pub use builder::{ElevationRange, MaskBuilder, UNBOUNDED_ELEVATION};
pub use cut::{CutCells, cut_inactive_cells};
pub use error::MaskError;
pub use file::{decode_mask, load_mask, read_mask, save_mask, write_mask};
pub use mask::{CellMask, MaskSelection, MaskValue};
