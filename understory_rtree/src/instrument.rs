// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query instrumentation.
//!
//! Every traversal carries a [`Probe`] that is told about each node it
//! enters. Plain queries pass `()`, which compiles away; custom probes go
//! through [`RTree::search_probed`] and [`RTree::intersects_probed`]. [`Instrumented`]
//! runs the same queries with a [`QueryCounts`] probe and keeps the totals,
//! so counting never changes what a query returns.

use core::fmt;

use crate::geometry::RectBuilder;
use crate::tree::RTree;

/// Receives traversal events.
pub trait Probe {
    /// A node was entered; `compared` of its rectangles will be tested
    /// against the query.
    fn enter(&mut self, compared: usize);
}

impl Probe for () {
    #[inline]
    fn enter(&mut self, _compared: usize) {}
}

/// Node and rectangle comparison counts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct QueryCounts {
    /// Nodes entered.
    pub nodes_visited: usize,
    /// Rectangles compared against the query rectangle.
    pub bbox_evals: usize,
}

impl Probe for QueryCounts {
    #[inline]
    fn enter(&mut self, compared: usize) {
        self.nodes_visited += 1;
        self.bbox_evals += compared;
    }
}

impl core::ops::AddAssign for QueryCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes_visited += rhs.nodes_visited;
        self.bbox_evals += rhs.bbox_evals;
    }
}

/// Counting view over a tree, from [`RTree::instrument`].
///
/// Query methods behave exactly like their [`RTree`] counterparts and add
/// their traversal cost to [`Instrumented::counts`].
///
/// The view borrows the tree rather than wrapping it, so it stacks with any
/// owner of one: inside [`ConcurrentRTree::with_read`] it measures queries
/// under the shared lock. Counts live in the view and are not shared between
/// threads.
///
/// [`ConcurrentRTree::with_read`]: crate::ConcurrentRTree::with_read
pub struct Instrumented<'a, T, B: RectBuilder<T>> {
    tree: &'a RTree<T, B>,
    counts: QueryCounts,
}

impl<T, B: RectBuilder<T>> fmt::Debug for Instrumented<'_, T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumented")
            .field("entries", &self.tree.len())
            .field("counts", &self.counts)
            .finish_non_exhaustive()
    }
}

impl<'a, T, B: RectBuilder<T>> Instrumented<'a, T, B> {
    pub(crate) fn new(tree: &'a RTree<T, B>) -> Self {
        Self {
            tree,
            counts: QueryCounts::default(),
        }
    }

    /// Totals since creation or the last [`reset`](Self::reset).
    pub fn counts(&self) -> QueryCounts {
        self.counts
    }

    /// Zero the totals, returning the previous ones.
    pub fn reset(&mut self) -> QueryCounts {
        core::mem::take(&mut self.counts)
    }

    /// Counting [`RTree::search_with`].
    pub fn search_with(&mut self, rect: &B::Rect, visit: impl FnMut(&T)) {
        self.tree.search_probed(rect, &mut self.counts, visit);
    }

    /// Counting [`RTree::intersects_with`].
    pub fn intersects_with(&mut self, rect: &B::Rect, visit: impl FnMut(&T)) {
        self.tree.intersects_probed(rect, &mut self.counts, visit);
    }
}

impl<T: Clone, B: RectBuilder<T>> Instrumented<'_, T, B> {
    /// Counting [`RTree::search`].
    pub fn search(&mut self, rect: &B::Rect, out: &mut [T]) -> usize {
        let mut n = 0;
        let _ = self
            .tree
            .root()
            .search(rect, &mut crate::tree::fill(out, &mut n), &mut self.counts);
        n
    }

    /// Counting [`RTree::intersects`].
    pub fn intersects(&mut self, rect: &B::Rect, out: &mut [T]) -> usize {
        let mut n = 0;
        let _ = self
            .tree
            .root()
            .intersects(rect, &mut crate::tree::fill(out, &mut n), &mut self.counts);
        n
    }
}

impl<T: PartialEq, B: RectBuilder<T>> Instrumented<'_, T, B> {
    /// Counting [`RTree::contains`].
    pub fn contains(&mut self, entry: &T) -> bool {
        let rect = self.tree.builder().bbox(entry);
        self.tree.root().contains(&rect, entry, &mut self.counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RTreeConfig;
    use crate::node::Node;
    use crate::shapes::{Point2d, PointBuilder, Rect2d, RectIdentity};
    use crate::split::SplitKind;

    fn grid(n: i32) -> RTree<Point2d, PointBuilder> {
        let config = RTreeConfig::new(2, 4, SplitKind::Axial).unwrap();
        let mut tree = RTree::with_config(PointBuilder, config);
        for x in 0..n {
            for y in 0..n {
                tree.add(Point2d::new([f64::from(x), f64::from(y)]));
            }
        }
        tree
    }

    #[test]
    fn unit_probe_and_counts() {
        let mut counts = QueryCounts::default();
        counts.enter(4);
        counts.enter(3);
        assert_eq!(
            counts,
            QueryCounts {
                nodes_visited: 2,
                bbox_evals: 7
            }
        );
        ().enter(10);

        let mut total = QueryCounts::default();
        total += counts;
        total += counts;
        assert_eq!(total.bbox_evals, 14);
    }

    #[test]
    fn counting_does_not_change_results() {
        let tree = grid(10);
        let query = Rect2d::from_corners([2.0, 2.0], [4.0, 5.0]);

        let mut plain = Vec::new();
        tree.search_with(&query, |p| plain.push(*p));

        let mut inst = tree.instrument();
        let mut counted = Vec::new();
        inst.search_with(&query, |p| counted.push(*p));

        assert_eq!(plain, counted);
        assert_eq!(counted.len(), 12);
        let c = inst.counts();
        assert!(c.nodes_visited >= tree.height());
        assert!(c.bbox_evals >= c.nodes_visited);
    }

    #[test]
    fn counts_accumulate_until_reset() {
        let tree = grid(6);
        let everything = Rect2d::from_corners([-1.0, -1.0], [10.0, 10.0]);
        let mut inst = tree.instrument();
        let mut out = vec![Point2d::new([0.0, 0.0]); 36];

        assert_eq!(inst.intersects(&everything, &mut out), 36);
        let once = inst.counts();
        assert_eq!(inst.intersects(&everything, &mut out), 36);
        assert_eq!(inst.counts().nodes_visited, 2 * once.nodes_visited);

        assert_eq!(inst.reset().bbox_evals, 2 * once.bbox_evals);
        assert_eq!(inst.counts(), QueryCounts::default());
    }

    #[test]
    fn contains_counts_only_covering_children() {
        let config = RTreeConfig::new(2, 4, SplitKind::Axial).unwrap();
        let mut tree = RTree::with_config(RectIdentity, config);
        for x in 0..8 {
            for y in 0..8 {
                let (x, y) = (f64::from(x), f64::from(y));
                tree.add(Rect2d::from_corners([x, y], [x + 0.5, y + 0.5]));
            }
        }
        let Node::Branch(_) = tree.root() else {
            panic!("64 rects should not fit in one leaf");
        };

        // Overlaps every child but lies inside none of them.
        let cover = Rect2d::from_corners([-1.0, -1.0], [10.0, 10.0]);
        let mut inst = tree.instrument();
        assert!(!inst.contains(&cover));
        let root_only = inst.reset();
        assert_eq!(root_only.nodes_visited, 1);
        assert_eq!(root_only.bbox_evals, tree.root().len());

        let stored = Rect2d::from_corners([3.0, 3.0], [3.5, 3.5]);
        assert!(inst.contains(&stored));
        let mut expected = QueryCounts::default();
        assert!(tree.root().contains(&stored, &stored, &mut expected));
        assert_eq!(inst.counts(), expected);
        assert!(expected.nodes_visited >= tree.height());
    }

    #[test]
    fn view_measures_under_the_shared_lock() {
        let shared = grid(6).into_concurrent();
        let window = Rect2d::from_corners([1.0, 1.0], [2.0, 2.0]);
        let (hits, counts) = shared.with_read(|t| {
            let mut inst = t.instrument();
            let mut hits = 0;
            inst.search_with(&window, |_| hits += 1);
            (hits, inst.counts())
        });
        assert_eq!(hits, 4);
        assert!(counts.nodes_visited >= 2);
    }

    #[test]
    fn selective_queries_visit_fewer_nodes() {
        let tree = grid(12);
        let mut inst = tree.instrument();
        let everything = Rect2d::from_corners([0.0, 0.0], [11.0, 11.0]);
        inst.intersects_with(&everything, |_| {});
        let full = inst.reset();

        assert!(inst.contains(&Point2d::new([3.0, 7.0])));
        let point = inst.reset();
        assert!(point.nodes_visited < full.nodes_visited);
        assert!(!inst.contains(&Point2d::new([30.0, 7.0])));
        assert_eq!(inst.counts().nodes_visited, 1);
    }
}
