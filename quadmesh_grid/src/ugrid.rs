// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unstructured node/face form of a quadtree mesh.
//!
//! Corners are welded in the index space of the finest level, so nodes shared between
//! neighboring cells (of any level) appear once, without floating-point comparison.

use kurbo::Point;

use crate::table::CellTable;
use crate::types::{GridGeometry, level_scale};

/// Nodes and quadrilateral faces.
///
/// Faces list node indices counter-clockwise from the lower-left: LL, LR, UR, UL.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnstructuredMesh {
    /// Node coordinates in world space.
    pub nodes: Vec<Point>,
    /// One face per cell, in cell table order.
    pub faces: Vec<[usize; 4]>,
}

impl UnstructuredMesh {
    /// Derive the node/face form of `cells`.
    #[tracing::instrument(skip_all, name = "quadtree::unstructured", fields(cells = cells.len()))]
    pub fn from_cells(geometry: &GridGeometry, cells: &CellTable) -> Self {
        let nr_levels = cells.nr_levels();
        if nr_levels == 0 || cells.is_empty() {
            return Self::default();
        }
        let finest = nr_levels - 1;
        let factor = |level: u8| 1_u64 << (finest - level);

        let rows = cells
            .iter()
            .map(|k| (u64::from(k.n) + 1) * factor(k.level))
            .max()
            .unwrap_or(0);
        let stride = rows + 1;

        let corner_keys: Vec<[u64; 4]> = cells
            .iter()
            .map(|k| {
                let f = factor(k.level);
                let (n0, m0) = (u64::from(k.n) * f, u64::from(k.m) * f);
                let key = |n: u64, m: u64| m * stride + n;
                [
                    key(n0, m0),
                    key(n0, m0 + f),
                    key(n0 + f, m0 + f),
                    key(n0 + f, m0),
                ]
            })
            .collect();

        let mut unique: Vec<u64> = corner_keys.iter().flatten().copied().collect();
        unique.sort_unstable();
        unique.dedup();

        let faces = corner_keys
            .iter()
            .map(|corners| corners.map(|k| unique.partition_point(|&u| u < k)))
            .collect();

        let to_world = geometry.to_world();
        let scale = level_scale(finest);
        let (dxf, dyf) = (geometry.dx / scale, geometry.dy / scale);
        #[allow(
            clippy::cast_precision_loss,
            reason = "Finest-level indices are far below 2^52."
        )]
        let nodes = unique
            .iter()
            .map(|&k| {
                let (m, n) = (k / stride, k % stride);
                to_world * Point::new(m as f64 * dxf, n as f64 * dyf)
            })
            .collect();

        Self { nodes, faces }
    }

    /// Unique undirected face edges as `[lower, higher]` node index pairs, sorted.
    pub fn edges(&self) -> Vec<[usize; 2]> {
        let mut edges: Vec<[usize; 2]> = self
            .faces
            .iter()
            .flat_map(|f| {
                [(f[0], f[1]), (f[1], f[2]), (f[2], f[3]), (f[3], f[0])]
                    .map(|(a, b)| [a.min(b), a.max(b)])
            })
            .collect();
        edges.sort_unstable();
        edges.dedup();
        edges
    }
}
