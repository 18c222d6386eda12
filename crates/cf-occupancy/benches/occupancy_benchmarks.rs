//! Benchmarks for occupancy map operations.
//!
//! Run with: cargo bench -p cf-occupancy
//!
//! To compare against baseline:
//! 1. First run: cargo bench -p cf-occupancy -- --save-baseline main
//! 2. After changes: cargo bench -p cf-occupancy -- --baseline main

#![allow(missing_docs, clippy::cast_precision_loss, clippy::unwrap_used)]

use cf_occupancy::{IndexParams, LinearIndex, OccupancyMap, PolygonTableParams, Triangle2};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use nalgebra::Point2;

// =============================================================================
// Test Surface Generation
// =============================================================================

/// A road lattice: `n x n` blocks, each a square split into two triangles,
/// with gaps between blocks.
fn create_lattice(n: usize) -> Vec<Triangle2> {
    let mut triangles = Vec::with_capacity(n * n * 2);
    for i in 0..n {
        for j in 0..n {
            let x = i as f64 * 10.0;
            let y = j as f64 * 10.0;
            triangles.push(Triangle2::from_arrays([x, y], [x + 8.0, y], [x + 8.0, y + 8.0]));
            triangles.push(Triangle2::from_arrays([x, y], [x + 8.0, y + 8.0], [x, y + 8.0]));
        }
    }
    triangles
}

// =============================================================================
// Index Benchmarks
// =============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("Build");

    for n in [16, 64, 128] {
        let triangles = create_lattice(n);
        group.throughput(Throughput::Elements(triangles.len() as u64));

        group.bench_with_input(BenchmarkId::new("bvh", n), &triangles, |b, t| {
            b.iter(|| OccupancyMap::build(black_box(t.clone())).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("bvh_sequential", n), &triangles, |b, t| {
            b.iter(|| {
                OccupancyMap::build_with(black_box(t.clone()), &IndexParams::sequential()).unwrap()
            });
        });
    }

    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("Query");

    let triangles = create_lattice(64);
    let bvh = OccupancyMap::build(triangles.clone()).unwrap();
    let linear: OccupancyMap<LinearIndex> =
        OccupancyMap::build_indexed(triangles, &IndexParams::default()).unwrap();
    let (min, max) = (Point2::new(200.0, 200.0), Point2::new(260.0, 240.0));

    group.bench_function("bvh", |b| {
        b.iter(|| bvh.query_intersect(black_box(min), black_box(max)));
    });
    group.bench_function("linear", |b| {
        b.iter(|| linear.query_intersect(black_box(min), black_box(max)));
    });

    group.finish();
}

// =============================================================================
// Raster and Table Benchmarks
// =============================================================================

fn bench_rasterize(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rasterize");
    let map = OccupancyMap::build(create_lattice(32)).unwrap();
    let (min, max) = (Point2::new(0.0, 0.0), Point2::new(320.0, 320.0));

    for resolution in [1.0, 0.5, 0.25] {
        group.bench_with_input(
            BenchmarkId::new("grid", resolution),
            &resolution,
            |b, &resolution| {
                b.iter(|| map.create_occupancy_grid(min, max, black_box(resolution)));
            },
        );
    }

    group.finish();
}

fn bench_polygon_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("PolygonTable");
    group.sample_size(10);

    let map = OccupancyMap::build(create_lattice(32)).unwrap();
    let (min, max) = (Point2::new(0.0, 0.0), Point2::new(320.0, 320.0));
    let params = PolygonTableParams::new(40.0, 0.25);

    group.bench_function("serial", |b| {
        b.iter(|| map.create_polygon_table_with(min, max, black_box(&params)));
    });
    group.bench_function("parallel", |b| {
        b.iter(|| map.create_polygon_table_par(min, max, black_box(&params)));
    });

    group.finish();
}

fn bench_intersects(c: &mut Criterion) {
    let map = OccupancyMap::build(create_lattice(64)).unwrap();
    let polygon = [
        Point2::new(305.0, 305.0),
        Point2::new(309.0, 305.0),
        Point2::new(309.0, 309.0),
        Point2::new(305.0, 309.0),
    ];

    c.bench_function("intersects", |b| {
        b.iter(|| map.intersects(black_box(&polygon)));
    });
}

criterion_group!(
    benches,
    bench_build,
    bench_query,
    bench_rasterize,
    bench_polygon_table,
    bench_intersects
);
criterion_main!(benches);
