use criterion::{Criterion, black_box, criterion_group, criterion_main};
use popgrid::{
    BuildStrategy, CensusPoint, Config, Extent, GridGeometry, PointSet, QueryEngine,
    build_fork_join, build_lock_partitioned, build_sequential,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn generate_points(count: usize) -> PointSet {
    let mut rng = StdRng::seed_from_u64(1);
    let points = (0..count)
        .map(|_| {
            CensusPoint::new(
                rng.gen_range(1..=5000),
                rng.gen_range(-125.0..-65.0),
                rng.gen_range(24.0..49.0),
            )
        })
        .collect();
    PointSet::new(points).unwrap()
}

fn benchmark_extent_reduction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extent_reduction");
    let points = generate_points(200_000);

    group.bench_function("sequential", |b| {
        b.iter(|| Extent::reduce_sequential(black_box(&points), 0..points.len()).unwrap())
    });
    group.bench_function("fork_join_cutoff_1000", |b| {
        b.iter(|| Extent::reduce(black_box(&points), 0..points.len(), 1000).unwrap())
    });

    group.finish();
}

fn benchmark_build_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_strategies");
    let points = generate_points(200_000);
    let extent = Extent::reduce(&points, 0..points.len(), 1000).unwrap();
    let geometry = GridGeometry::derive(&extent, 100, 50).unwrap();
    let config = Config::default();

    group.bench_function("sequential", |b| {
        b.iter(|| build_sequential(black_box(&points), &geometry))
    });
    group.bench_function("fork_join", |b| {
        b.iter(|| build_fork_join(black_box(&points), &geometry, &config))
    });
    group.bench_function("lock_partitioned", |b| {
        b.iter(|| build_lock_partitioned(black_box(&points), &geometry, &config))
    });

    group.finish();
}

fn benchmark_query_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_paths");
    let mut engine = QueryEngine::new(generate_points(200_000), Config::default());
    engine.build(100, 50, BuildStrategy::ForkJoin).unwrap();

    group.bench_function("prefix_grid", |b| {
        b.iter(|| engine.query(black_box(20), 10, 80, 40).unwrap())
    });
    group.bench_function("direct_scan", |b| {
        b.iter(|| engine.query_scan(black_box(20), 10, 80, 40).unwrap())
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_extent_reduction,
    benchmark_build_strategies,
    benchmark_query_paths
);
criterion_main!(benches);
