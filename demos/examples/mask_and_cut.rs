// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mask a mesh and cut away the dry cells.
//!
//! Wet cells come from an elevation window, a dike polygon is excluded, and the seaward
//! edge becomes an open boundary. The mesh is then reduced to the active cells.
//!
//! Run:
//! - `cargo run -p quadmesh_demos --example mask_and_cut`

use kurbo::{Point, Rect};
use quadmesh_grid::{BaseGrid, GridGeometry, Polygon, QuadtreeMesh, RefinementPolygon};
use quadmesh_mask::{MaskBuilder, MaskSelection, MaskValue, cut_inactive_cells};

fn main() {
    let base = BaseGrid::new(GridGeometry::new(0.0, 0.0, 100.0, 100.0, 0.0), 10, 20);
    let coast = RefinementPolygon::new(Polygon::from_rect(Rect::new(800.0, 0.0, 1200.0, 1000.0)), 1);

    // Seabed at -10 m on the left rising to +10 m on the right.
    let mesh = QuadtreeMesh::build(&base, &[coast])
        .expect("valid base grid")
        .with_bathymetry(&|p: Point| p.x / 100.0 - 10.0)
        .expect("analytic bathymetry never fails");

    let mask = MaskBuilder::new()
        .elevation(-20.0, 1.0)
        .exclude(Polygon::from_rect(Rect::new(400.0, 450.0, 600.0, 550.0)))
        .open_boundary(Polygon::from_rect(Rect::new(-1.0, -1.0, 100.0, 1001.0)))
        .build(&mesh);

    for (label, value) in [
        ("inactive", MaskValue::Inactive),
        ("active", MaskValue::Active),
        ("open boundary", MaskValue::OpenBoundary),
        ("outflow boundary", MaskValue::OutflowBoundary),
    ] {
        println!("{label:>16}: {}", mask.count(value));
    }

    let boundary = mask
        .selected_points(&mesh, MaskSelection::OpenBoundary)
        .expect("mask matches mesh");
    if let Some(p) = boundary.first() {
        println!("first open boundary cell centre: ({:.1}, {:.1})", p.x, p.y);
    }

    let cut = cut_inactive_cells(&mesh, &mask, None).expect("mask matches mesh");
    println!(
        "cut {} -> {} cells; {} active after cut",
        mesh.len(),
        cut.mesh.len(),
        cut.flow.select(MaskSelection::Active).len()
    );
}
