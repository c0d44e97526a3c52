// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadmesh Grid: adaptive, 2:1 balanced quadtree meshes over a rotated rectangular base grid.
//!
//! - Refine a base grid with polygons tagged by target level ([`build_refinement_masks`]).
//! - Flatten the refinement into a level-grouped [`CellTable`].
//! - Resolve neighbors across levels ([`find_neighbors`]); every side faces nothing, one cell of
//!   the same level, one coarser cell, or up to two finer cells.
//! - Derive cell centres, face points, and a welded node/face form ([`UnstructuredMesh`]).
//!
//! [`QuadtreeMesh`] ties these together and is what the I/O and mask crates consume.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Rect;
//! use quadmesh_grid::{BaseGrid, Direction, GridGeometry, Neighbor, Polygon, QuadtreeMesh, RefinementPolygon};
//!
//! // A 4 x 4 base grid of 100 m cells, with one cell refined once.
//! let base = BaseGrid::new(GridGeometry::new(0.0, 0.0, 100.0, 100.0, 0.0), 4, 4);
//! let refine = RefinementPolygon::new(Polygon::from_rect(Rect::new(100.0, 100.0, 200.0, 200.0)), 1);
//! let mesh = QuadtreeMesh::build(&base, &[refine]).unwrap();
//!
//! assert_eq!(mesh.nr_levels(), 2);
//! assert_eq!(mesh.len(), 19);
//!
//! // The coarse cell left of the refined one faces two finer cells.
//! let left = mesh.lookup().find(0, 1, 0).unwrap();
//! assert!(matches!(mesh.neighbor(left, Direction::Right), Neighbor::Finer(Some(_), Some(_))));
//! ```
//!
//! ## Indexing
//!
//! Cells are addressed by `(level, n, m)`: row `n` and column `m` in the full index space of that
//! level, which has `nmax · 2^level` rows and `mmax · 2^level` columns. Level 0 is the base grid.
//!
//! Logging goes through [`tracing`]; this crate never installs a subscriber.

pub mod bathymetry;
pub mod coords;
pub mod error;
pub mod lookup;
pub mod mesh;
pub mod neighbors;
pub mod polygon;
pub mod refine;
pub mod table;
pub mod types;
pub mod ugrid;

pub use bathymetry::{BathymetrySource, FlatBathymetry};
pub use error::GridError;
pub use lookup::{CellLookup, LevelIndex};
pub use mesh::QuadtreeMesh;
pub use neighbors::{CellNeighbors, Neighbor, find_neighbors};
pub use polygon::Polygon;
pub use refine::{
    CellMarks, LevelMask, RefinementMasks, RefinementPolygon, build_refinement_masks,
};
pub use table::CellTable;
pub use types::{BaseGrid, CellKey, Direction, GridGeometry, MAX_REFINEMENT_LEVELS};
pub use ugrid::UnstructuredMesh;

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Point, Rect};

    /// Xorshift64 generator for reproducible mesh configurations.
    struct Rng(u64);

    impl Rng {
        fn next_u64(&mut self) -> u64 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            self.0 = x;
            x
        }

        #[allow(clippy::cast_possible_truncation, reason = "Test ranges are small.")]
        fn range(&mut self, lo: u32, hi: u32) -> u32 {
            lo + (self.next_u64() % u64::from(hi - lo)) as u32
        }

        #[allow(clippy::cast_precision_loss, reason = "Test helper.")]
        fn unit(&mut self) -> f64 {
            (self.next_u64() >> 11) as f64 / (1_u64 << 53) as f64
        }
    }

    fn random_mesh(seed: u64) -> QuadtreeMesh {
        let mut rng = Rng(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1);
        let nmax = rng.range(2, 7);
        let mmax = rng.range(2, 7);
        let dx = 10.0 + 90.0 * rng.unit();
        let dy = 10.0 + 90.0 * rng.unit();
        let rotation = 360.0 * rng.unit() - 180.0;
        let geometry = GridGeometry::new(1000.0 * rng.unit(), -500.0 * rng.unit(), dx, dy, rotation);
        let base = BaseGrid::new(geometry, nmax, mmax);

        let to_world = geometry.to_world();
        let polygons = (0..rng.range(1, 4))
            .map(|_| {
                let w = f64::from(mmax) * dx;
                let h = f64::from(nmax) * dy;
                let x0 = w * rng.unit();
                let y0 = h * rng.unit();
                let x1 = x0 + (w - x0) * rng.unit();
                let y1 = y0 + (h - y0) * rng.unit();
                #[allow(clippy::cast_possible_truncation, reason = "Level is below 4.")]
                let level = rng.range(1, 4) as u8;
                let outline = Polygon::new(
                    [(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
                        .map(|(x, y)| to_world * Point::new(x, y)),
                );
                RefinementPolygon::new(outline, level)
            })
            .collect::<Vec<_>>();
        QuadtreeMesh::build(&base, &polygons).unwrap()
    }

    /// Cell extent `[m0, m1) x [n0, n1)` in the finest level's index space.
    fn finest_extent(mesh: &QuadtreeMesh, cell: usize) -> (u64, u64, u64, u64) {
        let key = mesh.cells().key(cell);
        let f = 1_u64 << (mesh.nr_levels() - 1 - key.level);
        let (m0, n0) = (u64::from(key.m) * f, u64::from(key.n) * f);
        (m0, m0 + f, n0, n0 + f)
    }

    fn geometric_neighbors(mesh: &QuadtreeMesh, cell: usize, dir: Direction) -> Vec<usize> {
        let (am0, am1, an0, an1) = finest_extent(mesh, cell);
        (0..mesh.len())
            .filter(|&j| {
                let (bm0, bm1, bn0, bn1) = finest_extent(mesh, j);
                let rows_overlap = bn0 < an1 && an0 < bn1;
                let cols_overlap = bm0 < am1 && am0 < bm1;
                match dir {
                    Direction::Right => bm0 == am1 && rows_overlap,
                    Direction::Left => bm1 == am0 && rows_overlap,
                    Direction::Up => bn0 == an1 && cols_overlap,
                    Direction::Down => bn1 == an0 && cols_overlap,
                }
            })
            .collect()
    }

    #[test]
    fn four_by_four_scenario() {
        let base = BaseGrid::new(GridGeometry::new(0.0, 0.0, 100.0, 100.0, 0.0), 4, 4);
        let poly = RefinementPolygon::new(
            Polygon::from_rect(Rect::new(100.0, 100.0, 200.0, 200.0)),
            1,
        );
        let mesh = QuadtreeMesh::build(&base, &[poly]).unwrap();
        assert_eq!(mesh.len(), 19);
        assert_eq!(mesh.cells().level_range(0), 0..15);
        assert_eq!(mesh.cells().level_range(1), 15..19);

        let fine: Vec<CellKey> = mesh.cells().level_range(1).map(|i| mesh.cells().key(i)).collect();
        assert_eq!(
            fine,
            vec![
                CellKey::new(1, 2, 2),
                CellKey::new(1, 3, 2),
                CellKey::new(1, 2, 3),
                CellKey::new(1, 3, 3),
            ]
        );

        let lookup = mesh.lookup();
        let left = lookup.find(0, 1, 0).unwrap();
        let f22 = lookup.find(1, 2, 2).unwrap();
        let f32_ = lookup.find(1, 3, 2).unwrap();
        assert_eq!(
            mesh.neighbor(left, Direction::Right),
            Neighbor::Finer(Some(f22), Some(f32_))
        );
        assert_eq!(mesh.neighbor(f22, Direction::Left), Neighbor::Coarser(left));
        assert_eq!(mesh.neighbor(f32_, Direction::Left), Neighbor::Coarser(left));

        let ugrid = mesh.unstructured();
        assert_eq!(ugrid.faces.len(), 19);
        assert_eq!(ugrid.nodes.len(), 30);
        // 24 interior base faces, 4 of them split in two, plus 4 inside the refined cell.
        assert_eq!(mesh.uv_points().len(), 32);
    }

    #[test]
    fn unrefined_grid_scenario() {
        let base = BaseGrid::new(GridGeometry::new(0.0, 0.0, 50.0, 50.0, 0.0), 3, 5);
        let mesh = QuadtreeMesh::build(&base, &[]).unwrap();
        assert_eq!(mesh.len(), 15);
        assert_eq!(mesh.nr_levels(), 1);
        assert!(
            mesh.neighbors()
                .iter()
                .flat_map(CellNeighbors::iter)
                .all(|(_, nb)| matches!(nb, Neighbor::None | Neighbor::Same(_)))
        );
        let ugrid = mesh.unstructured();
        assert_eq!(ugrid.nodes.len(), 4 * 6);
        assert_eq!(ugrid.edges().len(), 3 * 6 + 4 * 5);
    }

    #[test]
    fn neighbors_match_geometry() {
        for seed in 1..40 {
            let mesh = random_mesh(seed);
            for cell in 0..mesh.len() {
                for dir in Direction::ALL {
                    let mut found: Vec<usize> = mesh.neighbor(cell, dir).indices().collect();
                    found.sort_unstable();
                    assert_eq!(
                        found,
                        geometric_neighbors(&mesh, cell, dir),
                        "seed {seed}, cell {cell}, {dir:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn balance_and_symmetry() {
        for seed in 1..40 {
            let mesh = random_mesh(seed);
            let levels = mesh.cells().levels();
            for cell in 0..mesh.len() {
                for dir in Direction::ALL {
                    let nb = mesh.neighbor(cell, dir);
                    for other in nb.indices() {
                        let expected = i16::from(levels[cell]) + i16::from(nb.delta());
                        assert_eq!(i16::from(levels[other]), expected, "seed {seed}");
                        let back = mesh.neighbor(other, dir.opposite());
                        assert!(
                            back.indices().any(|i| i == cell),
                            "seed {seed}: {cell} -> {other} not mirrored"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn cells_tile_the_base_grid() {
        for seed in 1..40 {
            let mesh = random_mesh(seed);
            let extents: Vec<_> = (0..mesh.len()).map(|c| finest_extent(&mesh, c)).collect();
            let cols = extents.iter().map(|e| e.1).max().unwrap();
            let rows = extents.iter().map(|e| e.3).max().unwrap();
            let mut cover = vec![0_u8; usize::try_from(cols * rows).unwrap()];
            for &(m0, m1, n0, n1) in &extents {
                for n in n0..n1 {
                    for m in m0..m1 {
                        cover[usize::try_from(n * cols + m).unwrap()] += 1;
                    }
                }
            }
            assert!(cover.iter().all(|&c| c == 1), "seed {seed}: gap or overlap");
        }
    }

    #[test]
    fn levels_are_contiguous() {
        for seed in 1..20 {
            let mesh = random_mesh(seed);
            let cells = mesh.cells();
            assert!(cells.levels().windows(2).all(|w| w[0] <= w[1]));
            for level in 0..cells.nr_levels() {
                assert!(cells.level_range(level).all(|i| cells.key(i).level == level));
            }
            assert_eq!(cells.level_range(cells.nr_levels() - 1).end, cells.len());
        }
    }

    #[test]
    fn unstructured_nodes_are_welded() {
        for seed in 1..20 {
            let mesh = random_mesh(seed);
            let ugrid = mesh.unstructured();
            assert_eq!(ugrid.faces.len(), mesh.len());
            let min_size = mesh.geometry().cell_size(mesh.nr_levels() - 1);
            let tol = 0.25 * min_size.x.min(min_size.y);
            let mut nodes = ugrid.nodes.clone();
            nodes.sort_by(|a, b| a.x.total_cmp(&b.x));
            for (i, a) in nodes.iter().enumerate() {
                for b in nodes[i + 1..].iter().take_while(|b| b.x - a.x < tol) {
                    assert!((*a - *b).hypot() >= tol, "seed {seed}: duplicate node {a:?}");
                }
            }
            for (cell, face) in ugrid.faces.iter().enumerate() {
                let corners = coords::cell_corners(mesh.geometry(), mesh.cells().key(cell));
                for (k, &node) in face.iter().enumerate() {
                    assert!((ugrid.nodes[node] - corners[k]).hypot() < 1e-6);
                }
            }
        }
    }

    #[test]
    fn coordinates_are_deterministic() {
        let a = random_mesh(7);
        let b = random_mesh(7);
        assert_eq!(a.cell_centres(), b.cell_centres());
        assert_eq!(a.unstructured(), b.unstructured());
        for (i, &c) in a.cell_centres().iter().enumerate() {
            assert_eq!(a.locate(c), Some(i));
        }
    }
}
