// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_rtree::{HyperRect, RTree, RTreeConfig, Rect, Rect2d, RectIdentity, SplitKind};

use rstar::primitives::Rectangle;
use rstar::AABB;

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

fn to_rstar_rects(v: &[Rect2d]) -> Vec<Rectangle<[f64; 2]>> {
    v.iter()
        .map(|r| Rectangle::from_corners(*r.min().coords(), *r.max().coords()))
        .collect()
}

fn bench_rtree_external_compare_f64(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_external_compare_f64");
    for &n in &[64usize, 128] {
        let rects = gen_grid_rects(n, 10.0);
        let query = Rect2d::from_corners([100.0, 100.0], [500.0, 500.0]);
        group.throughput(Throughput::Elements((n * n) as u64));

        for split in [SplitKind::Axial, SplitKind::Quadratic] {
            let config = RTreeConfig::new(3, 8, split).unwrap();
            group.bench_function(format!("understory_{split:?}_build_query_n{n}"), |b| {
                b.iter_batched(
                    || RTree::<Rect2d, _>::with_config(RectIdentity, config),
                    |mut tree| {
                        for r in &rects {
                            tree.add(*r);
                        }
                        let mut hits = 0usize;
                        tree.intersects_with(&query, |_| hits += 1);
                        black_box(hits);
                    },
                    BatchSize::SmallInput,
                )
            });
        }

        group.bench_function(format!("rstar_build_query_n{n}"), |b| {
            b.iter_batched(
                || to_rstar_rects(&rects),
                |rectangles| {
                    let mut tree = rstar::RTree::new();
                    for r in rectangles {
                        tree.insert(r);
                    }
                    let aabb = AABB::from_corners(*query.min().coords(), *query.max().coords());
                    let hits: usize = tree.locate_in_envelope_intersecting(&aabb).count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rtree_external_compare_f64);
criterion_main!(benches);
