use copkm::cluster::{Clustering, CopKmeans};
use copkm::{ConstraintKind, ConstraintStore, SparseVector};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::prelude::*;

fn bench_cop_kmeans(c: &mut Criterion) {
    let mut group = c.benchmark_group("cop_kmeans");

    // Generate synthetic sparse data
    let mut rng = StdRng::seed_from_u64(42);
    let n = 1000;
    let vocab = 512u64;
    let nnz = 16;
    let k = 10;

    let data: Vec<SparseVector> = (0..n)
        .map(|_| {
            (0..nnz)
                .map(|_| (rng.random_range(1..=vocab), rng.random::<f64>()))
                .collect()
        })
        .collect();

    let mut constraints = ConstraintStore::new(n);
    for i in (0..n - 1).step_by(20) {
        constraints
            .add_indices(i, i + 1, ConstraintKind::MustLink)
            .unwrap();
    }

    group.bench_function("fit_predict_n1000_nnz16_k10", |b| {
        b.iter(|| {
            let model = CopKmeans::new(k).with_max_iter(10).with_seed(42);
            model.fit_predict(black_box(&data)).unwrap();
        })
    });

    group.bench_function("fit_must_links_n1000_nnz16_k10", |b| {
        b.iter(|| {
            let model = CopKmeans::new(k).with_max_iter(10).with_seed(42);
            model.fit(black_box(&data), &constraints).unwrap();
        })
    });

    group.finish();
}

criterion_group!(benches, bench_cop_kmeans);
criterion_main!(benches);
