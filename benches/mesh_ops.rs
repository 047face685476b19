//! Benchmarks for the surface partitioning pipeline.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use atrophy::prelude::*;
use nalgebra::Point3;

fn create_grid_mesh(n: usize) -> TriMesh {
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n * 2);

    // Gently curved so smoothing has work to do
    for j in 0..=n {
        for i in 0..=n {
            let z = ((i * 7 + j * 13) % 5) as f64 * 0.05;
            vertices.push(Point3::new(i as f64, j as f64, z));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;

            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }

    TriMesh::new(vertices, faces)
}

fn bench_adjacency(c: &mut Criterion) {
    let mesh = create_grid_mesh(100);

    c.bench_function("face_adjacency_100x100", |b| {
        b.iter(|| FaceAdjacency::from_triangles(black_box(&mesh.faces)));
    });
}

fn bench_smoothing(c: &mut Criterion) {
    let mesh = create_grid_mesh(100);

    c.bench_function("taubin_10_iterations", |b| {
        let opts = SmoothOptions::default().with_iterations(10);
        b.iter(|| {
            let mut m = mesh.clone();
            taubin_smooth(&mut m, &opts);
            m
        });
    });

    c.bench_function("taubin_10_iterations_sequential", |b| {
        let opts = SmoothOptions::default().with_iterations(10).sequential();
        b.iter(|| {
            let mut m = mesh.clone();
            taubin_smooth(&mut m, &opts);
            m
        });
    });
}

fn bench_partition(c: &mut Criterion) {
    let mesh = create_grid_mesh(100);
    let adjacency = FaceAdjacency::from_mesh(&mesh);
    let weights = node_weights_from_areas(&mesh.face_areas(), DEFAULT_WEIGHT_SCALE);
    let graph = Graph::from_adjacency(&adjacency, weights).unwrap();

    c.bench_function("partition_80_regions", |b| {
        b.iter(|| partition_graph(&graph, black_box(80), &PartitionOptions::default()).unwrap());
    });
}

criterion_group!(benches, bench_adjacency, bench_smoothing, bench_partition);
criterion_main!(benches);
