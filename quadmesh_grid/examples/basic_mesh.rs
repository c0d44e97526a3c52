// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build a small refined mesh and print its cells and neighbors.

use kurbo::Rect;
use quadmesh_grid::{
    BaseGrid, Direction, GridGeometry, Polygon, QuadtreeMesh, RefinementPolygon,
};

fn main() {
    let base = BaseGrid::new(GridGeometry::new(0.0, 0.0, 100.0, 100.0, 0.0), 4, 4);
    let refine = RefinementPolygon::new(
        Polygon::from_rect(Rect::new(100.0, 100.0, 200.0, 200.0)),
        1,
    );
    let mesh = QuadtreeMesh::build(&base, &[refine]).expect("valid base grid");

    println!("{} cells over {} levels", mesh.len(), mesh.nr_levels());
    for (i, key) in mesh.cells().iter().enumerate() {
        let centre = mesh.cell_centres()[i];
        println!(
            "#{i:2} level {} (n={}, m={}) at ({:.1}, {:.1}) right={:?} up={:?}",
            key.level,
            key.n,
            key.m,
            centre.x,
            centre.y,
            mesh.neighbor(i, Direction::Right),
            mesh.neighbor(i, Direction::Up),
        );
    }

    let ugrid = mesh.unstructured();
    println!(
        "{} nodes, {} faces, {} edges",
        ugrid.nodes.len(),
        ugrid.faces.len(),
        ugrid.edges().len()
    );
}
