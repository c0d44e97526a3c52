// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use quadmesh_benches::{band_mesh, query_points};
use quadmesh_grid::{QuadtreeMesh, coords::cell_corners};

use rstar::RTree;
use rstar::primitives::{GeomWithData, Rectangle};

type CellRect = GeomWithData<Rectangle<[f64; 2]>, usize>;

fn to_rstar_cells(mesh: &QuadtreeMesh) -> Vec<CellRect> {
    mesh.cells()
        .iter()
        .enumerate()
        .map(|(i, key)| {
            let [ll, _, ur, _] = cell_corners(mesh.geometry(), key);
            GeomWithData::new(Rectangle::from_corners([ll.x, ll.y], [ur.x, ur.y]), i)
        })
        .collect()
}

fn bench_locate_external_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate_external_compare");
    for &n in &[64_u32, 128] {
        let mesh = band_mesh(n, 3);
        let queries = query_points(n, 4096);
        group.throughput(Throughput::Elements(queries.len() as u64));

        group.bench_function(format!("quadmesh_locate_n{n}"), |b| {
            b.iter(|| {
                let hits = queries.iter().filter_map(|&p| mesh.locate(p)).count();
                black_box(hits)
            });
        });

        let tree = RTree::bulk_load(to_rstar_cells(&mesh));
        group.bench_function(format!("rstar_locate_n{n}"), |b| {
            b.iter(|| {
                let hits = queries
                    .iter()
                    .filter_map(|p| tree.locate_at_point(&[p.x, p.y]))
                    .count();
                black_box(hits)
            });
        });

        group.bench_function(format!("rstar_build_n{n}"), |b| {
            b.iter_batched(
                || to_rstar_cells(&mesh),
                |cells| black_box(RTree::bulk_load(cells).size()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_locate_external_compare);
criterion_main!(benches);
