// Copyright 2025 the Quadmesh Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use quadmesh_benches::{band_mesh, band_polygons, query_points};
use quadmesh_grid::{
    CellLookup, CellTable, QuadtreeMesh, UnstructuredMesh, build_refinement_masks, find_neighbors,
};

const SIZES: [u32; 3] = [32, 64, 128];
const LEVELS: u8 = 3;

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for n in SIZES {
        let (base, polygons) = band_polygons(n, LEVELS);
        let cells = band_mesh(n, LEVELS).len();
        group.throughput(Throughput::Elements(cells as u64));

        group.bench_function(format!("refine_n{n}"), |b| {
            b.iter(|| black_box(build_refinement_masks(&base, &polygons).unwrap().used_count()));
        });

        group.bench_function(format!("full_n{n}"), |b| {
            b.iter(|| black_box(QuadtreeMesh::build(&base, &polygons).unwrap().len()));
        });
    }
    group.finish();
}

fn bench_neighbors(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbors");
    for n in SIZES {
        let (base, polygons) = band_polygons(n, LEVELS);
        let table = CellTable::from_masks(&build_refinement_masks(&base, &polygons).unwrap());
        group.throughput(Throughput::Elements(table.len() as u64));

        group.bench_function(format!("lookup_n{n}"), |b| {
            b.iter(|| black_box(CellLookup::new(&table).stride()));
        });

        group.bench_function(format!("resolve_n{n}"), |b| {
            b.iter_batched(
                || CellLookup::new(&table),
                |lookup| black_box(find_neighbors(&table, &lookup).len()),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    for n in SIZES {
        let mesh = band_mesh(n, LEVELS);
        group.throughput(Throughput::Elements(mesh.len() as u64));

        group.bench_function(format!("unstructured_n{n}"), |b| {
            b.iter(|| {
                black_box(
                    UnstructuredMesh::from_cells(mesh.geometry(), mesh.cells())
                        .nodes
                        .len(),
                )
            });
        });

        let bytes = quadmesh_io::codec::to_bytes(&mesh).unwrap();
        group.bench_function(format!("encode_n{n}"), |b| {
            b.iter(|| black_box(quadmesh_io::codec::to_bytes(&mesh).unwrap().len()));
        });
        group.bench_function(format!("decode_n{n}"), |b| {
            b.iter(|| black_box(quadmesh_io::decode(&bytes).unwrap().len()));
        });
    }
    group.finish();
}

fn bench_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate");
    for n in SIZES {
        let mesh = band_mesh(n, LEVELS);
        let _ = mesh.lookup();
        let queries = query_points(n, 4096);
        group.throughput(Throughput::Elements(queries.len() as u64));

        group.bench_function(format!("points_n{n}"), |b| {
            b.iter(|| {
                let hits = queries.iter().filter_map(|&p| mesh.locate(p)).count();
                black_box(hits)
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_build,
    bench_neighbors,
    bench_export,
    bench_locate
);
criterion_main!(benches);
