// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON build configuration for a quadtree mesh.

use std::fs;
use std::path::Path;

use kurbo::Point;
use quadmesh_grid::{BaseGrid, GridGeometry, Polygon, QuadtreeMesh, RefinementPolygon};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;

/// Everything needed to build a mesh: the base grid and its refinement polygons.
///
/// ```json
/// {
///   "x0": 0.0, "y0": 0.0, "dx": 100.0, "dy": 100.0, "rotation": 0.0,
///   "nmax": 4, "mmax": 4, "epsg": 32631,
///   "refinement": [
///     { "level": 1, "outline": [[100, 100], [200, 100], [200, 200], [100, 200]] }
///   ]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeshConfig {
    /// World x of the grid origin.
    pub x0: f64,
    /// World y of the grid origin.
    pub y0: f64,
    /// Level-0 cell width.
    pub dx: f64,
    /// Level-0 cell height.
    pub dy: f64,
    /// Counter-clockwise rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Level-0 rows.
    pub nmax: u32,
    /// Level-0 columns.
    pub mmax: u32,
    /// EPSG code of the coordinate reference system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epsg: Option<i32>,
    /// Refinement polygons.
    #[serde(default)]
    pub refinement: Vec<RefinementConfig>,
}

/// One refinement polygon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RefinementConfig {
    /// Target level.
    pub level: u8,
    /// Ring of `[x, y]` world coordinates.
    pub outline: Vec<[f64; 2]>,
}

impl MeshConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse the configuration file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The configured base grid.
    pub fn base_grid(&self) -> BaseGrid {
        BaseGrid::new(
            GridGeometry::new(self.x0, self.y0, self.dx, self.dy, self.rotation),
            self.nmax,
            self.mmax,
        )
    }

    /// The configured refinement polygons.
    pub fn refinement_polygons(&self) -> Vec<RefinementPolygon> {
        self.refinement
            .iter()
            .map(|r| {
                let outline = Polygon::new(r.outline.iter().map(|&[x, y]| Point::new(x, y)));
                RefinementPolygon::new(outline, r.level)
            })
            .collect()
    }

    /// Build the mesh.
    pub fn build(&self) -> Result<QuadtreeMesh, ConfigError> {
        info!(
            nmax = self.nmax,
            mmax = self.mmax,
            polygons = self.refinement.len(),
            "building mesh from configuration"
        );
        let mesh = QuadtreeMesh::build(&self.base_grid(), &self.refinement_polygons())?;
        Ok(mesh.with_epsg(self.epsg))
    }
}
