// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Understory R-tree: insert, query, remove, measure, and share.
//!
//! Run with `RUST_LOG=understory_rtree=debug` to see splits and root changes.

use std::sync::Arc;
use std::thread;

use tracing_subscriber::EnvFilter;
use understory_rtree::{Point2d, PointBuilder, RTree, RTreeConfig, Rect2d, SplitKind};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RTreeConfig::new(2, 4, SplitKind::Axial).unwrap();
    let mut tree = RTree::with_config(PointBuilder, config);
    for (x, y) in [(0.0, 0.0), (1.0, 3.0), (2.0, 1.0), (4.0, 4.0), (3.0, 2.0)] {
        tree.add(Point2d::new([x, y]));
    }
    println!("{} entries, height {}", tree.entry_count(), tree.height());

    // Containment versus overlap.
    let window = Rect2d::from_corners([0.0, 0.0], [2.0, 2.0]);
    let mut inside = Vec::new();
    tree.search_into(&window, &mut inside);
    println!("inside {window:?}: {inside:?}");

    let mut inst = tree.instrument();
    let mut overlapping = 0;
    inst.intersects_with(&window, |_| overlapping += 1);
    println!("{overlapping} overlapping, cost {:?}", inst.counts());

    tree.update(&Point2d::new([4.0, 4.0]), Point2d::new([0.5, 0.5]));
    tree.remove(&Point2d::new([1.0, 3.0]));
    let stats = tree.collect_stats();
    println!(
        "after edits: {} entries in {} leaves, {:.0}% leaf fill",
        stats.entry_count(),
        stats.leaf_count(),
        stats.leaf_fill_percentage()
    );

    // Share between threads.
    let shared = Arc::new(tree.into_concurrent());
    let writers: Vec<_> = (0..4_i32)
        .map(|t| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                for i in 0..50_i32 {
                    shared.add(Point2d::new([f64::from(t * 10), f64::from(i)]));
                }
            })
        })
        .collect();
    for w in writers {
        w.join().unwrap();
    }
    println!("shared tree holds {} entries", shared.entry_count());
    shared.with_read(|t| t.validate()).unwrap();
}
