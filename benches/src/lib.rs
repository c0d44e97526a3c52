// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared mesh fixtures for the Quadmesh benchmarks.

use kurbo::Point;
use quadmesh_grid::{BaseGrid, GridGeometry, Polygon, QuadtreeMesh, RefinementPolygon};

/// Xorshift64 generator for reproducible query points.
#[derive(Clone, Debug)]
pub struct Rng(u64);

impl Rng {
    /// Seeded generator; the seed must be non-zero.
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Next raw value.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    /// Uniform value in `[0, 1)`.
    #[allow(clippy::cast_precision_loss, reason = "53-bit mantissa is the point.")]
    pub fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1_u64 << 53) as f64)
    }
}

/// Base grid of `n x n` cells of 10 m with a refined diagonal band, `levels` deep.
///
/// The band is built from nested squares so each level keeps its 2:1 neighbors.
pub fn band_polygons(n: u32, levels: u8) -> (BaseGrid, Vec<RefinementPolygon>) {
    let base = BaseGrid::new(GridGeometry::new(0.0, 0.0, 10.0, 10.0, 0.0), n, n);
    let extent = f64::from(n) * 10.0;
    let polygons = (1..=levels)
        .map(|level| {
            let half = extent * 0.25 / f64::from(level);
            let outline = Polygon::new([
                Point::new(0.0, 0.0),
                Point::new(2.0 * half, 0.0),
                Point::new(extent, extent - 2.0 * half),
                Point::new(extent, extent),
                Point::new(extent - 2.0 * half, extent),
                Point::new(0.0, 2.0 * half),
            ]);
            RefinementPolygon::new(outline, level)
        })
        .collect();
    (base, polygons)
}

/// Build the banded mesh.
pub fn band_mesh(n: u32, levels: u8) -> QuadtreeMesh {
    let (base, polygons) = band_polygons(n, levels);
    match QuadtreeMesh::build(&base, &polygons) {
        Ok(mesh) => mesh,
        Err(e) => panic!("benchmark fixture must build: {e}"),
    }
}

/// `count` uniformly random points over the banded mesh's base grid.
pub fn query_points(n: u32, count: usize) -> Vec<Point> {
    let extent = f64::from(n) * 10.0;
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| Point::new(rng.next_f64() * extent, rng.next_f64() * extent))
        .collect()
}
