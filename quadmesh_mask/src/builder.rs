// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rule-based construction of a [`CellMask`].

use kurbo::Point;
use quadmesh_grid::{Direction, Neighbor, Polygon, QuadtreeMesh};
use tracing::{debug, warn};

use crate::mask::{CellMask, MaskValue};

/// Sentinel bound for an unrestricted elevation range.
pub const UNBOUNDED_ELEVATION: f64 = 99999.0;

/// Inclusive elevation range. `NaN` elevations are never inside.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ElevationRange {
    /// Lowest elevation included.
    pub min: f64,
    /// Highest elevation included.
    pub max: f64,
}

impl ElevationRange {
    /// Range from `min` to `max`, inclusive.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `z` lies in the range.
    pub fn contains(&self, z: f64) -> bool {
        z >= self.min && z <= self.max
    }
}

impl Default for ElevationRange {
    fn default() -> Self {
        Self::new(-UNBOUNDED_ELEVATION, UNBOUNDED_ELEVATION)
    }
}

/// Polygons of one rule, with the elevation range cells must fall in to be affected.
#[derive(Clone, Debug, Default)]
struct PolygonRule {
    polygons: Vec<Polygon>,
    range: ElevationRange,
}

impl PolygonRule {
    /// Cells whose centre lies in any polygon and whose elevation is in range.
    fn matches(&self, centre: Point, z: f64) -> bool {
        self.range.contains(z) && self.polygons.iter().any(|p| p.contains(centre))
    }
}

/// Builds a mask from an elevation window and polygon rules, applied in a fixed order:
/// elevation window, include, exclude, open boundary, outflow boundary.
///
/// ```rust
/// use quadmesh_grid::{BaseGrid, GridGeometry, QuadtreeMesh};
/// use quadmesh_mask::{MaskBuilder, MaskValue};
///
/// let base = BaseGrid::new(GridGeometry::new(0.0, 0.0, 10.0, 10.0, 0.0), 2, 2);
/// let mesh = QuadtreeMesh::build(&base, &[]).unwrap().with_z(vec![-5.0, 1.0, 2.0, 20.0]).unwrap();
///
/// let mask = MaskBuilder::new().elevation(-10.0, 10.0).build(&mesh);
/// assert_eq!(mask.count(MaskValue::Active), 3);
/// ```
#[derive(Clone, Debug)]
pub struct MaskBuilder {
    zmin: f64,
    zmax: f64,
    include: PolygonRule,
    exclude: PolygonRule,
    open_boundary: PolygonRule,
    outflow_boundary: PolygonRule,
}

impl Default for MaskBuilder {
    fn default() -> Self {
        Self {
            zmin: UNBOUNDED_ELEVATION,
            zmax: -UNBOUNDED_ELEVATION,
            include: PolygonRule::default(),
            exclude: PolygonRule::default(),
            open_boundary: PolygonRule::default(),
            outflow_boundary: PolygonRule::default(),
        }
    }
}

impl MaskBuilder {
    /// A builder with an empty elevation window and no polygons.
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate cells with `zmin <= z <= zmax`. An empty window (`zmin >= zmax`) activates none.
    pub fn elevation(mut self, zmin: f64, zmax: f64) -> Self {
        self.zmin = zmin;
        self.zmax = zmax;
        self
    }

    /// Activate cells with their centre in `polygon`.
    pub fn include(mut self, polygon: Polygon) -> Self {
        self.include.polygons.push(polygon);
        self
    }

    /// Elevation range for include polygons.
    pub fn include_range(mut self, range: ElevationRange) -> Self {
        self.include.range = range;
        self
    }

    /// Deactivate cells with their centre in `polygon`.
    pub fn exclude(mut self, polygon: Polygon) -> Self {
        self.exclude.polygons.push(polygon);
        self
    }

    /// Elevation range for exclude polygons.
    pub fn exclude_range(mut self, range: ElevationRange) -> Self {
        self.exclude.range = range;
        self
    }

    /// Mark active cells at the edge of the active region inside `polygon` as open boundary.
    pub fn open_boundary(mut self, polygon: Polygon) -> Self {
        self.open_boundary.polygons.push(polygon);
        self
    }

    /// Elevation range for open-boundary polygons.
    pub fn open_boundary_range(mut self, range: ElevationRange) -> Self {
        self.open_boundary.range = range;
        self
    }

    /// Mark active cells at the edge of the active region inside `polygon` as outflow boundary.
    pub fn outflow_boundary(mut self, polygon: Polygon) -> Self {
        self.outflow_boundary.polygons.push(polygon);
        self
    }

    /// Elevation range for outflow-boundary polygons.
    pub fn outflow_boundary_range(mut self, range: ElevationRange) -> Self {
        self.outflow_boundary.range = range;
        self
    }

    /// Classify every cell of `mesh`.
    #[tracing::instrument(skip_all, name = "quadtree::mask", fields(cells = mesh.len()))]
    pub fn build(&self, mesh: &QuadtreeMesh) -> CellMask {
        let mut mask = CellMask::inactive(mesh.len());
        let z = mesh.z();
        let centres = mesh.cell_centres();

        if self.zmin >= self.zmax {
            if self.include.polygons.is_empty() {
                warn!(
                    zmin = self.zmin,
                    zmax = self.zmax,
                    "empty elevation window and no include polygons: every cell is inactive"
                );
                return mask;
            }
        } else {
            let window = ElevationRange::new(self.zmin, self.zmax);
            for (v, &z) in mask.values_mut().iter_mut().zip(z) {
                if window.contains(z) {
                    *v = MaskValue::Active;
                }
            }
        }

        let values = mask.values_mut();
        for (rule, value) in [
            (&self.include, MaskValue::Active),
            (&self.exclude, MaskValue::Inactive),
        ] {
            for ((v, &centre), &z) in values.iter_mut().zip(centres).zip(z) {
                if rule.matches(centre, z) {
                    *v = value;
                }
            }
        }
        for (rule, value) in [
            (&self.open_boundary, MaskValue::OpenBoundary),
            (&self.outflow_boundary, MaskValue::OutflowBoundary),
        ] {
            for i in 0..values.len() {
                if values[i].is_active()
                    && rule.matches(centres[i], z[i])
                    && borders_inactive(mesh, values, i)
                {
                    values[i] = value;
                }
            }
        }

        debug!(
            active = mask.count(MaskValue::Active),
            open = mask.count(MaskValue::OpenBoundary),
            outflow = mask.count(MaskValue::OutflowBoundary),
            "built mask"
        );
        mask
    }
}

/// Whether any side of `cell` faces an inactive cell or no cell at all.
fn borders_inactive(mesh: &QuadtreeMesh, values: &[MaskValue], cell: usize) -> bool {
    let inactive = |slot: Option<usize>| slot.is_none_or(|j| values[j] == MaskValue::Inactive);
    Direction::ALL
        .into_iter()
        .any(|d| match mesh.neighbor(cell, d) {
            Neighbor::None => true,
            Neighbor::Same(j) | Neighbor::Coarser(j) => inactive(Some(j)),
            Neighbor::Finer(a, b) => inactive(a) || inactive(b),
        })
}
