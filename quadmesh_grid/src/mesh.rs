// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The quadtree mesh value.

use core::cell::OnceCell;
use std::time::Instant;

use kurbo::Point;
use tracing::{debug, info};

use crate::bathymetry::BathymetrySource;
use crate::coords;
use crate::error::GridError;
use crate::lookup::CellLookup;
use crate::neighbors::{CellNeighbors, Neighbor, find_neighbors};
use crate::refine::{RefinementPolygon, build_refinement_masks};
use crate::table::CellTable;
use crate::types::{BaseGrid, Direction, GridGeometry, level_scale};
use crate::ugrid::UnstructuredMesh;

/// An immutable quadtree mesh: cells, their neighbors, and per-cell elevation.
///
/// Derived data (the level lookup index, cell centres, and the unstructured form) is computed on
/// first use and owned by the value. Operations that change the mesh return a new value.
#[derive(Clone)]
pub struct QuadtreeMesh {
    geometry: GridGeometry,
    epsg: Option<i32>,
    cells: CellTable,
    neighbors: Vec<CellNeighbors>,
    z: Vec<f64>,
    lookup: OnceCell<CellLookup>,
    centres: OnceCell<Vec<Point>>,
    unstructured: OnceCell<UnstructuredMesh>,
}

impl core::fmt::Debug for QuadtreeMesh {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QuadtreeMesh")
            .field("geometry", &self.geometry)
            .field("epsg", &self.epsg)
            .field("cells", &self.cells.len())
            .field("nr_levels", &self.cells.nr_levels())
            .finish_non_exhaustive()
    }
}

impl QuadtreeMesh {
    /// Refine `base` with `polygons` and resolve neighbors.
    #[tracing::instrument(skip_all, name = "quadtree::build")]
    pub fn build(base: &BaseGrid, polygons: &[RefinementPolygon]) -> Result<Self, GridError> {
        let start = Instant::now();
        let masks = build_refinement_masks(base, polygons)?;
        let cells = CellTable::from_masks(&masks);
        let mesh = Self::from_cells(base.geometry, cells)?;
        info!(
            cells = mesh.len(),
            levels = mesh.nr_levels(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
            "built quadtree mesh"
        );
        Ok(mesh)
    }

    /// A mesh over an existing cell table; neighbors are resolved and elevations are unknown.
    pub fn from_cells(geometry: GridGeometry, cells: CellTable) -> Result<Self, GridError> {
        geometry.validate()?;
        let lookup = CellLookup::new(&cells);
        let neighbors = find_neighbors(&cells, &lookup);
        let z = vec![f64::NAN; cells.len()];
        Ok(Self {
            geometry,
            epsg: None,
            cells,
            neighbors,
            z,
            lookup: OnceCell::from(lookup),
            centres: OnceCell::new(),
            unstructured: OnceCell::new(),
        })
    }

    /// Assemble a mesh from stored parts, checking that every array has one entry per cell and
    /// every neighbor index is in range.
    pub fn from_raw_parts(
        geometry: GridGeometry,
        epsg: Option<i32>,
        cells: CellTable,
        neighbors: Vec<CellNeighbors>,
        z: Vec<f64>,
    ) -> Result<Self, GridError> {
        geometry.validate()?;
        let nr_cells = cells.len();
        for (what, actual) in [("neighbor table", neighbors.len()), ("elevation", z.len())] {
            if actual != nr_cells {
                return Err(GridError::LengthMismatch {
                    what,
                    expected: nr_cells,
                    actual,
                });
            }
        }
        for (cell, nbrs) in neighbors.iter().enumerate() {
            for (_, nb) in nbrs.iter() {
                if let Some(neighbor) = nb.indices().find(|&i| i >= nr_cells) {
                    return Err(GridError::NeighborOutOfRange {
                        cell,
                        neighbor,
                        nr_cells,
                    });
                }
            }
        }
        Ok(Self {
            geometry,
            epsg,
            cells,
            neighbors,
            z,
            lookup: OnceCell::new(),
            centres: OnceCell::new(),
            unstructured: OnceCell::new(),
        })
    }

    /// Placement of the base grid.
    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// EPSG code of the coordinate reference system, if known.
    pub fn epsg(&self) -> Option<i32> {
        self.epsg
    }

    /// The cell table.
    pub fn cells(&self) -> &CellTable {
        &self.cells
    }

    /// Neighbors of every cell, in table order.
    pub fn neighbors(&self) -> &[CellNeighbors] {
        &self.neighbors
    }

    /// Neighbor of `cell` across `direction`.
    pub fn neighbor(&self, cell: usize, direction: Direction) -> Neighbor {
        self.neighbors
            .get(cell)
            .map_or(Neighbor::None, |n| n.get(direction))
    }

    /// Bed elevation per cell; `NaN` where unknown.
    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the mesh has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of refinement levels.
    pub fn nr_levels(&self) -> u8 {
        self.cells.nr_levels()
    }

    /// Index of cells by `(level, n, m)`.
    pub fn lookup(&self) -> &CellLookup {
        self.lookup.get_or_init(|| CellLookup::new(&self.cells))
    }

    /// World coordinates of every cell centre.
    pub fn cell_centres(&self) -> &[Point] {
        self.centres
            .get_or_init(|| coords::cell_centres(&self.geometry, &self.cells))
    }

    /// Face mid-points of interior right and top faces; see [`coords::uv_points`].
    pub fn uv_points(&self) -> Vec<Point> {
        coords::uv_points(&self.geometry, &self.cells, &self.neighbors)
    }

    /// Node/face form of the mesh.
    pub fn unstructured(&self) -> &UnstructuredMesh {
        self.unstructured
            .get_or_init(|| UnstructuredMesh::from_cells(&self.geometry, &self.cells))
    }

    /// The cell containing world point `p`, searching the finest level first.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Indices are checked non-negative and below u32::MAX before the cast."
    )]
    pub fn locate(&self, p: Point) -> Option<usize> {
        let local = self.geometry.to_local(p);
        let lookup = self.lookup();
        (0..self.nr_levels()).rev().find_map(|level| {
            let size = self.geometry.cell_size(level);
            let m = (local.x / size.x).floor();
            let n = (local.y / size.y).floor();
            let in_range = |v: f64| v >= 0.0 && v < f64::from(u32::MAX);
            if !(in_range(m) && in_range(n)) {
                return None;
            }
            lookup.find(level, n as u32, m as u32)
        })
    }

    /// A new mesh holding only the cells where `keep` is true, with neighbors recomputed.
    pub fn retain_cells(&self, keep: &[bool]) -> Result<Self, GridError> {
        let cells = self.cells.retain(keep)?;
        let z = self
            .z
            .iter()
            .zip(keep)
            .filter_map(|(&z, &k)| k.then_some(z))
            .collect();
        debug!(kept = cells.len(), of = self.len(), "retained cells");
        let mesh = Self::from_cells(self.geometry, cells)?;
        Ok(Self {
            epsg: self.epsg,
            z,
            ..mesh
        })
    }

    /// Replace the per-cell elevations.
    pub fn with_z(self, z: Vec<f64>) -> Result<Self, GridError> {
        if z.len() != self.len() {
            return Err(GridError::LengthMismatch {
                what: "elevation",
                expected: self.len(),
                actual: z.len(),
            });
        }
        Ok(Self { z, ..self })
    }

    /// Set the EPSG code of the coordinate reference system.
    pub fn with_epsg(self, epsg: Option<i32>) -> Self {
        Self { epsg, ..self }
    }

    /// Sample elevations from `source`, one level at a time at that level's cell size.
    #[tracing::instrument(skip_all, name = "quadtree::bathymetry")]
    pub fn with_bathymetry<S: BathymetrySource>(self, source: &S) -> Result<Self, GridError> {
        let mut z = vec![f64::NAN; self.len()];
        let centres = self.cell_centres();
        for level in 0..self.nr_levels() {
            let range = self.cells.level_range(level);
            if range.is_empty() {
                continue;
            }
            let resolution = self.geometry.dx / level_scale(level);
            let values = source
                .elevations(&centres[range.clone()], resolution)
                .map_err(|e| GridError::Bathymetry(Box::new(e)))?;
            if values.len() != range.len() {
                return Err(GridError::LengthMismatch {
                    what: "bathymetry samples",
                    expected: range.len(),
                    actual: values.len(),
                });
            }
            debug!(level, cells = range.len(), resolution, "sampled bathymetry");
            z[range].copy_from_slice(&values);
        }
        Ok(Self { z, ..self })
    }
}
