// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_rtree::{HyperRect, RTree, RTreeConfig, Rect, Rect2d, RectIdentity, SplitKind};

fn gen_grid_rects(n: usize, cell: f64) -> Vec<Rect2d> {
    let mut out = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            let x0 = x as f64 * cell;
            let y0 = y as f64 * cell;
            out.push(Rect::from_corners([x0, y0], [x0 + cell, y0 + cell]));
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

fn gen_clustered_rects(n_clusters: usize, per_cluster: usize, spread: f64) -> Vec<Rect2d> {
    let mut out = Vec::with_capacity(n_clusters * per_cluster);
    let mut rng = Rng::new(0xC1A5_7E55_9999_ABCD);
    let mut centers = Vec::with_capacity(n_clusters);
    for _ in 0..n_clusters {
        centers.push((rng.next_f64() * 2000.0, rng.next_f64() * 2000.0));
    }
    for (cx, cy) in centers {
        for _ in 0..per_cluster {
            let x0 = cx + (rng.next_f64() - 0.5) * spread;
            let y0 = cy + (rng.next_f64() - 0.5) * spread;
            out.push(Rect::from_corners([x0, y0], [x0 + 12.0, y0 + 12.0]));
        }
    }
    out
}

fn configs() -> [(&'static str, RTreeConfig); 3] {
    let quadratic = |min, max| RTreeConfig::new(min, max, SplitKind::Quadratic).unwrap();
    let axial = |min, max| RTreeConfig::new(min, max, SplitKind::Axial).unwrap();
    [
        ("axial_m2_M8", axial(2, 8)),
        ("quadratic_m2_M8", quadratic(2, 8)),
        ("quadratic_m4_M16", quadratic(4, 16)),
    ]
}

fn bench_build_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_query_grid");
    let query = Rect2d::from_corners([100.0, 100.0], [500.0, 500.0]);
    for &n in &[32usize, 64] {
        let rects = gen_grid_rects(n, 10.0);
        group.throughput(Throughput::Elements((n * n) as u64));
        for (name, config) in configs() {
            group.bench_function(format!("{name}_n{n}"), |b| {
                b.iter_batched(
                    || RTree::<Rect2d, _>::with_config(RectIdentity, config),
                    |mut tree| {
                        for r in &rects {
                            tree.add(*r);
                        }
                        let mut hits = 0;
                        tree.intersects_with(&query, |_| hits += 1);
                        black_box(hits);
                    },
                    BatchSize::SmallInput,
                )
            });
        }
    }
    group.finish();
}

fn bench_query_clustered(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_clustered");
    let rects = gen_clustered_rects(32, 128, 150.0);
    for (name, config) in configs() {
        let mut tree = RTree::<Rect2d, _>::with_config(RectIdentity, config);
        for r in &rects {
            tree.add(*r);
        }
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut total = 0usize;
                for q in 0..64 {
                    let x = (q % 8) as f64 * 250.0;
                    let y = (q / 8) as f64 * 250.0;
                    let window = Rect2d::from_corners([x, y], [x + 200.0, y + 200.0]);
                    tree.search_with(&window, |_| total += 1);
                }
                black_box(total);
            })
        });
    }
    group.finish();
}

fn bench_remove_reinsert(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_heavy");
    let rects = gen_grid_rects(48, 10.0);
    for (name, config) in configs() {
        group.bench_function(name, |b| {
            b.iter_batched(
                || {
                    let mut tree = RTree::<Rect2d, _>::with_config(RectIdentity, config);
                    for r in &rects {
                        tree.add(*r);
                    }
                    tree
                },
                |mut tree| {
                    for (j, r) in rects.iter().enumerate() {
                        let dx = (j % 5) as f64 - 2.0;
                        let (lo, hi) = (r.min(), r.max());
                        let moved = Rect2d::from_corners(
                            [lo.coords()[0] + dx, lo.coords()[1]],
                            [hi.coords()[0] + dx, hi.coords()[1]],
                        );
                        tree.update(r, moved);
                    }
                    black_box(tree.len());
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_concurrent_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_wrapper");
    let rects = gen_grid_rects(64, 10.0);
    let mut tree = RTree::<Rect2d, _>::new(RectIdentity);
    for r in &rects {
        tree.add(*r);
    }
    let shared = tree.into_concurrent();
    let query = Rect2d::from_corners([100.0, 100.0], [300.0, 300.0]);
    group.bench_function("locked_query", |b| {
        b.iter(|| {
            let mut hits = 0;
            shared.intersects_with(&query, |_| hits += 1);
            black_box(hits);
        })
    });
    group.bench_function("try_locked_query", |b| {
        b.iter(|| {
            let mut hits = 0;
            let ran = shared.try_intersects_with(&query, |_| hits += 1);
            black_box((ran, hits));
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_build_query,
    bench_query_clustered,
    bench_remove_reinsert,
    bench_concurrent_reads
);
criterion_main!(benches);
