// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_rtree --heading-base-level=0

//! Understory R-tree: a balanced, n-dimensional R-tree.
//!
//! - Insert, remove, and update entries of any type; each entry is bounded by
//!   a rectangle computed through a [`RectBuilder`].
//! - Query by containment ([`RTree::search`]) or overlap
//!   ([`RTree::intersects`]) into a slice, a `Vec`, or a visitor closure.
//! - Share a tree between threads with [`ConcurrentRTree`], a fair
//!   read/write-locked wrapper with non-blocking `try_` forms of every call.
//! - Measure query cost with [`RTree::instrument`] and the tree's shape with
//!   [`RTree::collect_stats`].
//!
//! The tree is generic over the geometry: it only talks to points and
//! rectangles through [`HyperPoint`] and [`HyperRect`], so any number of
//! dimensions and any [`Scalar`] works. [`Point`] and [`Rect`] are ready-made
//! const-generic implementations; with the `kurbo` feature, Kurbo's `Point`
//! and `Rect` implement the contract too.
//!
//! Overflowing nodes are split by a [`SplitKind`] chosen at construction:
//! `Axial` cuts along the widest dimension, `Quadratic` seeds two groups with
//! the most wasteful pair and distributes the rest greedily. Nodes left
//! underfull by a removal are dissolved and their entries inserted again, so
//! every non-root node stays within its fill factors and all leaves stay at
//! the same depth.
//!
//! # Example
//!
//! ```rust
//! use understory_rtree::{Point2d, PointBuilder, RTree, RTreeConfig, Rect2d, SplitKind};
//!
//! let config = RTreeConfig::new(2, 4, SplitKind::Quadratic).unwrap();
//! let mut tree = RTree::with_config(PointBuilder, config);
//! for (x, y) in [(0.0, 0.0), (1.0, 3.0), (2.0, 1.0), (4.0, 4.0), (3.0, 2.0)] {
//!     tree.add(Point2d::new([x, y]));
//! }
//! assert_eq!(tree.entry_count(), 5);
//! // The fifth point overflowed the root leaf.
//! assert_eq!(tree.height(), 2);
//!
//! let mut hits = Vec::new();
//! tree.search_into(&Rect2d::from_corners([0.0, 0.0], [2.0, 2.0]), &mut hits);
//! assert_eq!(hits.len(), 2);
//!
//! assert!(tree.remove(&Point2d::new([4.0, 4.0])));
//! assert_eq!(tree.entry_count(), 4);
//! ```
//!
//! Sharing between threads:
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//!
//! use understory_rtree::{Point2d, PointBuilder, RTree};
//!
//! let tree = Arc::new(RTree::<Point2d, _>::new(PointBuilder).into_concurrent());
//! let writers: Vec<_> = (0..4_i32)
//!     .map(|t| {
//!         let tree = Arc::clone(&tree);
//!         thread::spawn(move || {
//!             for i in 0..25_i32 {
//!                 tree.add(Point2d::new([f64::from(t), f64::from(i)]));
//!             }
//!         })
//!     })
//!     .collect();
//! for w in writers {
//!     w.join().unwrap();
//! }
//! assert_eq!(tree.entry_count(), 100);
//! assert_eq!(tree.try_entry_count(), Some(100));
//! ```
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates. Comparisons
//! involving NaN are treated as "not less or equal", which keeps every
//! operation total but makes such entries unreachable by queries.

pub mod concurrent;
pub mod config;
pub mod error;
pub mod geometry;
pub mod instrument;
pub mod search;
pub mod shapes;
pub mod split;
pub mod stats;
pub mod tree;

#[cfg(feature = "kurbo")]
mod kurbo_geometry;
mod node;

pub use concurrent::ConcurrentRTree;
pub use config::RTreeConfig;
pub use error::RTreeError;
pub use geometry::{HyperPoint, HyperRect, RectBuilder, Scalar};
pub use instrument::{Instrumented, Probe, QueryCounts};
pub use search::SpatialSearch;
pub use shapes::{Point, Point2d, Point3d, PointBuilder, Rect, Rect2d, Rect3d, RectIdentity};
pub use split::SplitKind;
pub use stats::Stats;
pub use tree::RTree;
