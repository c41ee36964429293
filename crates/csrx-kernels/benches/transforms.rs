use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use csrx_core::CsrGraph;
use csrx_kernels::{
    build_reverse_map_using, lower_triangle, sort_rows_by_degree, transpose_graph, DegreeOrder,
    ReverseMapStrategy, TransformConfig,
};
use rand::prelude::StdRng;
use rand::{Rng, SeedableRng};

const SIZES: [usize; 3] = [10_000, 100_000, 1_000_000];

/// Seeded random graph with about `avg_degree` entries per row.
fn synthetic_graph(n: usize, avg_degree: usize) -> CsrGraph<i64> {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let ncols = i64::try_from(n).unwrap();
    let rows: Vec<Vec<i64>> = (0..n)
        .map(|_| {
            let d = rng.gen_range(0..=2 * avg_degree);
            (0..d).map(|_| rng.gen_range(0..ncols)).collect()
        })
        .collect();
    CsrGraph::from_rows(n, &rows).unwrap()
}

fn bench_transpose(c: &mut Criterion) {
    let mut group = c.benchmark_group("transpose");
    for n in SIZES {
        let g = synthetic_graph(n, 8);
        group.throughput(Throughput::Elements(g.nnz() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &g, |b, g| {
            b.iter(|| black_box(transpose_graph(g).unwrap().nnz()));
        });
    }
    group.finish();
}

fn bench_reverse_map(c: &mut Criterion) {
    let cfg = TransformConfig::default();
    let n = 1_000_000usize;
    let mut group = c.benchmark_group("reverse_map");
    group.throughput(Throughput::Elements(n as u64));
    for buckets in [16usize, 4096] {
        let mut rng = StdRng::seed_from_u64(0x5eed ^ u64::try_from(buckets).unwrap());
        let upper = i64::try_from(buckets).unwrap();
        let forward: Vec<i64> = (0..n).map(|_| rng.gen_range(0..upper)).collect();
        for (name, strategy) in [
            ("atomic", ReverseMapStrategy::Atomic),
            ("scaled", ReverseMapStrategy::ScaledBucket { scale_shift: 10 }),
        ] {
            group.bench_with_input(
                BenchmarkId::new(name, buckets),
                &forward,
                |b, forward| {
                    b.iter(|| {
                        black_box(
                            build_reverse_map_using(&cfg, strategy, n, buckets, forward)
                                .unwrap()
                                .entries
                                .len(),
                        )
                    });
                },
            );
        }
    }
    group.finish();
}

fn bench_triangle_and_sort(c: &mut Criterion) {
    let g = synthetic_graph(200_000, 8);
    c.bench_function("lower_triangle", |b| {
        b.iter(|| black_box(lower_triangle(&g, None).unwrap().nnz()));
    });
    c.bench_function("sort_rows_by_degree.zigzag", |b| {
        b.iter(|| black_box(sort_rows_by_degree(g.nrows, &g.indptr, DegreeOrder::ZigZag).unwrap()));
    });
}

criterion_group!(benches, bench_transpose, bench_reverse_map, bench_triangle_and_sort);
criterion_main!(benches);
