// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Build, sample bathymetry, save, and load.
//!
//! Build a refined mesh, fill elevations from an analytic surface, write the binary
//! mesh file to the temp directory, and read it back.
//!
//! Run:
//! - `cargo run -p quadmesh_demos --example build_and_save`

use kurbo::{Point, Rect};
use quadmesh_grid::{BaseGrid, GridGeometry, Polygon, QuadtreeMesh, RefinementPolygon};

fn main() {
    let base = BaseGrid::new(GridGeometry::new(0.0, 0.0, 50.0, 50.0, 0.0), 16, 16);
    let channel = RefinementPolygon::new(
        Polygon::new(vec![
            Point::new(0.0, 300.0),
            Point::new(800.0, 400.0),
            Point::new(800.0, 500.0),
            Point::new(0.0, 400.0),
        ]),
        2,
    );
    let harbour = RefinementPolygon::new(Polygon::from_rect(Rect::new(500.0, 100.0, 700.0, 300.0)), 1);

    // A channel cut into a gently rising plain.
    let surface = |p: Point| {
        let plain = p.x / 100.0 - 2.0;
        let depth = (-(p.y - 400.0).powi(2) / 5000.0).exp() * 8.0;
        plain - depth
    };

    let mesh = QuadtreeMesh::build(&base, &[channel, harbour])
        .expect("valid base grid")
        .with_bathymetry(&surface)
        .expect("analytic bathymetry never fails")
        .with_epsg(Some(28992));

    let path = std::env::temp_dir().join("quadmesh_demo.qtr");
    quadmesh_io::save(&mesh, &path).expect("mesh file written");
    let back = quadmesh_io::load(&path).expect("mesh file read");
    let _ = std::fs::remove_file(&path);

    println!("saved and loaded {} cells", back.len());
    assert_eq!(back.cells(), mesh.cells());
    assert_eq!(back.neighbors(), mesh.neighbors());

    let (lo, hi) = back
        .z()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &z| {
            (lo.min(z), hi.max(z))
        });
    println!("elevation {lo:.2} .. {hi:.2} m");

    let ugrid = back.unstructured();
    println!(
        "unstructured: {} nodes, {} faces, {} edges, {} velocity points",
        ugrid.nodes.len(),
        ugrid.faces.len(),
        ugrid.edges().len(),
        back.uv_points().len()
    );
}
