// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! World coordinates of cell centres, corners, and face mid-points.

use kurbo::{Affine, Point};

use crate::neighbors::{CellNeighbors, Neighbor};
use crate::table::CellTable;
use crate::types::{CellKey, Direction, GridGeometry};

/// Grid-local point at fractional cell offsets `(fm, fn_)` from the lower-left of `key`.
fn local_point(geometry: &GridGeometry, key: CellKey, fm: f64, fn_: f64) -> Point {
    let size = geometry.cell_size(key.level);
    Point::new(
        (f64::from(key.m) + fm) * size.x,
        (f64::from(key.n) + fn_) * size.y,
    )
}

/// World coordinates of the centre of `key`.
pub fn cell_centre(geometry: &GridGeometry, key: CellKey) -> Point {
    geometry.to_world() * local_point(geometry, key, 0.5, 0.5)
}

/// World coordinates of every cell centre, in table order.
pub fn cell_centres(geometry: &GridGeometry, cells: &CellTable) -> Vec<Point> {
    let to_world = geometry.to_world();
    cells
        .iter()
        .map(|key| to_world * local_point(geometry, key, 0.5, 0.5))
        .collect()
}

/// Corners of `key` in world coordinates, counter-clockwise from the lower-left.
pub fn cell_corners(geometry: &GridGeometry, key: CellKey) -> [Point; 4] {
    let to_world = geometry.to_world();
    [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
        .map(|(fm, fn_)| to_world * local_point(geometry, key, fm, fn_))
}

/// Mid-points of the right and top faces of every cell that has a neighbor there.
///
/// A side facing two finer cells contributes the two quarter-points of that side instead.
/// Points are listed per cell, right side first, so every interior face appears exactly once.
pub fn uv_points(
    geometry: &GridGeometry,
    cells: &CellTable,
    neighbors: &[CellNeighbors],
) -> Vec<Point> {
    let to_world: Affine = geometry.to_world();
    let mut out = Vec::with_capacity(cells.len() * 2);
    for (key, nbrs) in cells.iter().zip(neighbors) {
        let mut push = |fm: f64, fn_: f64| out.push(to_world * local_point(geometry, key, fm, fn_));
        match nbrs.get(Direction::Right) {
            Neighbor::None => {}
            Neighbor::Same(_) | Neighbor::Coarser(_) => push(1.0, 0.5),
            Neighbor::Finer(a, b) => {
                if a.is_some() {
                    push(1.0, 0.25);
                }
                if b.is_some() {
                    push(1.0, 0.75);
                }
            }
        }
        match nbrs.get(Direction::Up) {
            Neighbor::None => {}
            Neighbor::Same(_) | Neighbor::Coarser(_) => push(0.5, 1.0),
            Neighbor::Finer(a, b) => {
                if a.is_some() {
                    push(0.25, 1.0);
                }
                if b.is_some() {
                    push(0.75, 1.0);
                }
            }
        }
    }
    out
}
