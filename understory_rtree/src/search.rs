// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The index interface shared by [`RTree`] and its decorators.

use crate::geometry::{HyperRect, RectBuilder};
use crate::stats::Stats;
use crate::tree::RTree;

/// A mutable spatial index over entries bounded by rectangles.
///
/// Decorators such as [`ConcurrentRTree`](crate::ConcurrentRTree) wrap any
/// implementation and expose the same interface.
///
/// `search*` returns entries whose rectangle lies inside the query;
/// `intersects*` returns entries whose rectangle overlaps it. Boundaries are
/// inclusive in both cases.
pub trait SpatialSearch {
    /// Stored entry type.
    type Entry: Clone + PartialEq;
    /// Query rectangle type.
    type Rect: HyperRect;

    /// Insert `entry`.
    fn add(&mut self, entry: Self::Entry);

    /// Remove one entry equal to `entry`. Returns whether one was found.
    fn remove(&mut self, entry: &Self::Entry) -> bool;

    /// Remove `old`, then insert `new`. Returns whether `old` was found.
    fn update(&mut self, old: &Self::Entry, new: Self::Entry) -> bool;

    /// Fill `out` with contained entries, stopping when it is full.
    fn search(&self, rect: &Self::Rect, out: &mut [Self::Entry]) -> usize;

    /// Visit contained entries.
    fn search_with(&self, rect: &Self::Rect, visit: &mut dyn FnMut(&Self::Entry));

    /// Append contained entries to `out`.
    fn search_into(&self, rect: &Self::Rect, out: &mut Vec<Self::Entry>) -> usize {
        let before = out.len();
        self.search_with(rect, &mut |e| out.push(e.clone()));
        out.len() - before
    }

    /// Fill `out` with intersecting entries, stopping when it is full.
    fn intersects(&self, rect: &Self::Rect, out: &mut [Self::Entry]) -> usize;

    /// Visit intersecting entries.
    fn intersects_with(&self, rect: &Self::Rect, visit: &mut dyn FnMut(&Self::Entry));

    /// Append intersecting entries to `out`.
    fn intersects_into(&self, rect: &Self::Rect, out: &mut Vec<Self::Entry>) -> usize {
        let before = out.len();
        self.intersects_with(rect, &mut |e| out.push(e.clone()));
        out.len() - before
    }

    /// Whether an entry equal to `entry` is stored.
    fn contains(&self, entry: &Self::Entry) -> bool;

    /// Number of stored entries.
    fn entry_count(&self) -> usize;

    /// Visit every entry.
    fn for_each(&self, visit: &mut dyn FnMut(&Self::Entry));

    /// Structural report.
    fn collect_stats(&self) -> Stats;
}

impl<T: Clone + PartialEq, B: RectBuilder<T>> SpatialSearch for RTree<T, B> {
    type Entry = T;
    type Rect = B::Rect;

    fn add(&mut self, entry: T) {
        Self::add(self, entry);
    }

    fn remove(&mut self, entry: &T) -> bool {
        Self::remove(self, entry)
    }

    fn update(&mut self, old: &T, new: T) -> bool {
        Self::update(self, old, new)
    }

    fn search(&self, rect: &B::Rect, out: &mut [T]) -> usize {
        Self::search(self, rect, out)
    }

    fn search_with(&self, rect: &B::Rect, visit: &mut dyn FnMut(&T)) {
        Self::search_with(self, rect, visit);
    }

    fn search_into(&self, rect: &B::Rect, out: &mut Vec<T>) -> usize {
        Self::search_into(self, rect, out)
    }

    fn intersects(&self, rect: &B::Rect, out: &mut [T]) -> usize {
        Self::intersects(self, rect, out)
    }

    fn intersects_with(&self, rect: &B::Rect, visit: &mut dyn FnMut(&T)) {
        Self::intersects_with(self, rect, visit);
    }

    fn intersects_into(&self, rect: &B::Rect, out: &mut Vec<T>) -> usize {
        Self::intersects_into(self, rect, out)
    }

    fn contains(&self, entry: &T) -> bool {
        Self::contains(self, entry)
    }

    fn entry_count(&self) -> usize {
        Self::entry_count(self)
    }

    fn for_each(&self, visit: &mut dyn FnMut(&T)) {
        Self::for_each(self, visit);
    }

    fn collect_stats(&self) -> Stats {
        Self::collect_stats(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Point2d, PointBuilder, Rect2d};

    fn populate(index: &mut impl SpatialSearch<Entry = Point2d, Rect = Rect2d>) {
        for x in 0..10_i32 {
            index.add(Point2d::new([f64::from(x), f64::from(x % 3)]));
        }
    }

    #[test]
    fn tree_through_the_trait() {
        let mut tree: RTree<Point2d, PointBuilder> = RTree::new(PointBuilder);
        populate(&mut tree);
        let index: &mut dyn SpatialSearch<Entry = Point2d, Rect = Rect2d> = &mut tree;
        assert_eq!(index.entry_count(), 10);

        let band = Rect2d::from_corners([0.0, 0.0], [9.0, 0.0]);
        let mut hits = Vec::new();
        assert_eq!(index.search_into(&band, &mut hits), 4);
        assert!(hits.iter().all(|p| p.coords()[1] == 0.0));

        let mut seen = 0;
        index.for_each(&mut |_| seen += 1);
        assert_eq!(seen, 10);

        assert!(index.update(&Point2d::new([3.0, 0.0]), Point2d::new([3.0, 5.0])));
        assert!(!index.contains(&Point2d::new([3.0, 0.0])));
        assert_eq!(index.intersects_into(&band, &mut hits), 3);
        assert_eq!(index.collect_stats().entry_count(), 10);
    }
}
