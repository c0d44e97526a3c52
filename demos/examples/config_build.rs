// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mesh from a JSON configuration.
//!
//! Parse a base grid with two nested refinement polygons, build the mesh, and report
//! how many cells each level holds.
//!
//! Run:
//! - `cargo run -p quadmesh_demos --example config_build`

use quadmesh_io::MeshConfig;

const CONFIG: &str = r#"{
    "x0": 1000.0,
    "y0": 2000.0,
    "dx": 200.0,
    "dy": 200.0,
    "rotation": 30.0,
    "nmax": 8,
    "mmax": 12,
    "epsg": 32631,
    "refinement": [
        { "level": 1, "outline": [[1400.0, 2600.0], [2600.0, 2600.0], [2600.0, 3400.0], [1400.0, 3400.0]] },
        { "level": 2, "outline": [[1700.0, 2800.0], [2200.0, 2800.0], [2200.0, 3200.0], [1700.0, 3200.0]] }
    ]
}"#;

fn main() {
    let config = MeshConfig::from_json(CONFIG).expect("configuration parses");
    let mesh = config.build().expect("configuration describes a valid mesh");

    println!(
        "{} cells, {} levels, EPSG {:?}",
        mesh.len(),
        mesh.nr_levels(),
        mesh.epsg()
    );
    for level in 0..mesh.nr_levels() {
        let range = mesh.cells().level_range(level);
        let size = mesh.geometry().cell_size(level);
        println!(
            "  level {level}: {:5} cells of {:.1} x {:.1} m",
            range.len(),
            size.x,
            size.y
        );
    }

    // Round-trip the configuration itself.
    println!("{}", config.to_json().expect("configuration serializes"));
}
