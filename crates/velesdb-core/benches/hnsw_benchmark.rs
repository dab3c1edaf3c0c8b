//! HNSW index performance benchmarks.
//!
//! Run with: `cargo bench --bench hnsw_benchmark`
//!
//! Grounded on the teacher's `benches/hnsw_benchmark.rs`, adapted from the
//! teacher's `HnswIndex::new(dim, metric)` / `insert(id, &vec)` / `search(q,
//! k)` signatures to this crate's `HnswIndex::new(dim, metric, params)` /
//! `insert(id, values, metadata)` / `search(query, k, ef)`.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::HashMap;
use velesdb_core::{DistanceMetric, HnswIndex, HnswParams};

fn generate_vector(dim: usize, seed: u64) -> Vec<f32> {
    (0..dim)
        .map(|i| ((seed as f32 * 0.1 + i as f32 * 0.01).sin() + 1.0) / 2.0)
        .collect()
}

fn bench_hnsw_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_insert");

    for count in [1000, 10_000] {
        let dim = 768;
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(
            BenchmarkId::new("vectors", format!("{count}x{dim}d")),
            &count,
            |b, &count| {
                b.iter(|| {
                    let index = HnswIndex::new(dim, DistanceMetric::Cosine, HnswParams::default());
                    for i in 0..count {
                        let vector = generate_vector(dim, i as u64);
                        index
                            .insert(None, vector, HashMap::new())
                            .expect("insert");
                    }
                    black_box(index.len())
                });
            },
        );
    }

    group.finish();
}

fn bench_hnsw_search_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_search_latency");

    let dim = 768;
    let index = HnswIndex::new(dim, DistanceMetric::Cosine, HnswParams::default());
    for i in 0..10_000u64 {
        index
            .insert(None, generate_vector(dim, i), HashMap::new())
            .expect("insert");
    }

    let query = generate_vector(dim, 99999);

    for k in [10, 50, 100] {
        group.bench_with_input(BenchmarkId::new("top_k", k), &k, |b, &k| {
            b.iter(|| black_box(index.search(&query, k, 0).expect("search")));
        });
    }

    group.finish();
}

fn bench_hnsw_search_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("hnsw_search_throughput");

    let dim = 768;
    let index = HnswIndex::new(dim, DistanceMetric::Cosine, HnswParams::default());
    for i in 0..10_000u64 {
        index
            .insert(None, generate_vector(dim, i), HashMap::new())
            .expect("insert");
    }

    let queries: Vec<Vec<f32>> = (0..100).map(|i| generate_vector(dim, 100_000 + i)).collect();

    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("100_queries_top10", |b| {
        b.iter(|| {
            for query in &queries {
                black_box(index.search(query, 10, 0).expect("search"));
            }
        });
    });

    group.finish();
}

fn bench_distance_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance_metrics");

    let dim = 768;
    let query = generate_vector(dim, 0);

    for metric in [
        DistanceMetric::Cosine,
        DistanceMetric::Euclidean,
        DistanceMetric::InnerProduct,
    ] {
        let index = HnswIndex::new(dim, metric, HnswParams::default());
        for i in 0..5000u64 {
            index
                .insert(None, generate_vector(dim, i), HashMap::new())
                .expect("insert");
        }

        group.bench_with_input(
            BenchmarkId::new("search", format!("{metric:?}")),
            &metric,
            |b, _| {
                b.iter(|| black_box(index.search(&query, 10, 0).expect("search")));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_hnsw_insert,
    bench_hnsw_search_latency,
    bench_hnsw_search_throughput,
    bench_distance_metrics
);
criterion_main!(benches);
